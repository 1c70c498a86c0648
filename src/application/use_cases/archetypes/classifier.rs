use crate::domain::archetype::ArchetypeLabel;

const LOGIN_KEYWORDS: &[&str] = &[
    "login",
    "log in",
    "sign in",
    "signin",
    "ingresar",
    "iniciar sesión",
    "iniciar sesion",
    "autenticación",
    "autenticacion",
];

const ECOMMERCE_KEYWORDS: &[&str] = &[
    "carrito",
    "compra",
    "checkout",
    "cart",
    "purchase",
    "pago",
    "payment",
];

const FORM_KEYWORDS: &[&str] = &[
    "registro",
    "registrar",
    "formulario",
    "register",
    "registration",
    "sign up",
    "signup",
    "fill form",
    "submit form",
];

const RESPONSIVE_KEYWORDS: &[&str] = &[
    "responsive",
    "responsivo",
    "móvil",
    "movil",
    "mobile",
    "tablet",
    "viewport",
];

/// Checked in order; the first label with a matching keyword wins.
const RULES: [(ArchetypeLabel, &[&str]); 4] = [
    (ArchetypeLabel::Login, LOGIN_KEYWORDS),
    (ArchetypeLabel::Ecommerce, ECOMMERCE_KEYWORDS),
    (ArchetypeLabel::Form, FORM_KEYWORDS),
    (ArchetypeLabel::Responsive, RESPONSIVE_KEYWORDS),
];

/// Assigns an archetype from the scenario and action text. Total and deterministic.
pub fn classify(scenario: &str, actions: &str) -> ArchetypeLabel {
    let scenario = scenario.to_lowercase();
    let actions = actions.to_lowercase();

    RULES
        .iter()
        .find(|(_, keywords)| {
            keywords
                .iter()
                .any(|keyword| scenario.contains(keyword) || actions.contains(keyword))
        })
        .map(|(label, _)| *label)
        .unwrap_or(ArchetypeLabel::Generic)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_examples() {
        assert_eq!(classify("User Login Test", "click login button"), ArchetypeLabel::Login);
        assert_eq!(classify("Add to Cart", "click add to cart"), ArchetypeLabel::Ecommerce);
        assert_eq!(
            classify("Mobile Menu", "open on mobile viewport"),
            ArchetypeLabel::Responsive
        );
        assert_eq!(classify("Search results", "type a query"), ArchetypeLabel::Generic);
    }

    #[test]
    fn test_spanish_keywords() {
        assert_eq!(classify("Acceso", "Ingresar usuario"), ArchetypeLabel::Login);
        assert_eq!(classify("Compra de producto", "pulsar botón"), ArchetypeLabel::Ecommerce);
        assert_eq!(classify("Registro de usuario", "completar datos"), ArchetypeLabel::Form);
        assert_eq!(classify("Vista MÓVIL", ""), ArchetypeLabel::Responsive);
    }

    #[test]
    fn test_priority_order_login_first() {
        assert_eq!(
            classify("Checkout after login", "pay on mobile"),
            ArchetypeLabel::Login
        );
        assert_eq!(classify("Registro en móvil", ""), ArchetypeLabel::Form);
    }

    #[test]
    fn test_empty_input_is_generic() {
        assert_eq!(classify("", ""), ArchetypeLabel::Generic);
    }
}
