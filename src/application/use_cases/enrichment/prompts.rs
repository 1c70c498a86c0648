use crate::domain::archetype::ArchetypeTemplate;
use crate::domain::enrichment::{AnalyzedTestCase, EnrichedTestCase};
use crate::domain::test_case::TestCase;

/// Lines of an archetype copied into the Stage 1 prompt.
const EXTEND_TEMPLATE_EXCERPT_LINES: usize = 40;

fn template_excerpt(code: &str) -> String {
    let mut lines = code.lines();
    let mut excerpt: Vec<&str> = lines.by_ref().take(EXTEND_TEMPLATE_EXCERPT_LINES).collect();
    if lines.next().is_some() {
        excerpt.push("// ...");
    }
    excerpt.join("\n")
}

pub(crate) fn build_extend_system_prompt() -> String {
    "Eres un experto en automatización de pruebas con Playwright. Extiendes casos de prueba \
     manuales hasta que sean implementables: pasos concretos, selectores, datos de entrada, \
     validaciones y configuración de navegador. Responde solo con JSON."
        .to_string()
}

pub(crate) fn build_extend_user_prompt(
    case: &TestCase,
    archetype: Option<&ArchetypeTemplate>,
) -> String {
    let mut body = String::new();
    body.push_str("CASO DE PRUEBA:\n");
    body.push_str(&format!("- Escenario: {}\n", case.scenario));
    body.push_str(&format!("- Descripción: {}\n", case.description));
    body.push_str(&format!("- Precondiciones: {}\n", case.preconditions));
    body.push_str(&format!("- Acciones: {}\n", case.actions));
    body.push_str(&format!("- Técnica de prueba: {}\n", case.technique));
    body.push_str(&format!("- Prioridad: {}\n", case.priority));
    body.push_str(&format!("- Resultado esperado: {}\n", case.expected_result));

    if let Some(template) = archetype {
        body.push_str(&format!(
            "\nCategoría detectada: {}. Usa convenciones de selectores coherentes con ese tipo de flujo.\n",
            template.label
        ));
        body.push_str(&format!(
            "Arquetipo de referencia ({}):\n{}\n",
            template.label,
            template_excerpt(&template.code)
        ));
    }

    body.push_str(
        r#"
Devuelve un objeto JSON con esta estructura:
{
  "detailed_steps": ["paso 1", "paso 2"],
  "selectors": {"elemento": "selector"},
  "test_data": {"campo": "valor"},
  "validations": ["validación 1"],
  "browser_config": {"viewport": "1920x1080", "timeout": 30000}
}"#,
    );
    body
}

pub(crate) fn build_analyze_system_prompt() -> String {
    "Eres un analista de QA. Identificas los datos que faltan para implementar un caso de \
     prueba automatizado: URLs, credenciales, configuración, variables de entorno, \
     dependencias y timeouts. Responde solo con JSON."
        .to_string()
}

pub(crate) fn build_analyze_user_prompt(enriched: &EnrichedTestCase) -> String {
    let case_json = serde_json::to_string_pretty(enriched).unwrap_or_else(|_| "{}".to_string());
    format!(
        r#"CASO EXTENDIDO:
{}

Devuelve un objeto JSON con esta estructura:
{{
  "required_data": {{
    "urls": ["url"],
    "credentials": ["usuario", "contraseña"],
    "config": {{"clave": "descripción"}},
    "env_vars": ["VARIABLE"],
    "dependencies": ["dependencia"],
    "timeouts": {{"acción": 5000}}
  }},
  "missing_critical": ["dato faltante"],
  "assumptions": ["suposición"]
}}"#,
        case_json
    )
}

pub(crate) fn build_generate_system_prompt() -> String {
    "Eres un ingeniero de automatización que escribe tests de Playwright (@playwright/test) \
     completos y ejecutables. Sigue buenas prácticas: assertions específicas, esperas \
     explícitas, manejo de errores y captura de pantalla en fallos. Devuelve solo el código, \
     sin explicaciones."
        .to_string()
}

pub(crate) fn build_generate_user_prompt(analyzed: &AnalyzedTestCase) -> String {
    let case_json = serde_json::to_string_pretty(analyzed).unwrap_or_else(|_| "{}".to_string());
    let mut body = String::new();
    body.push_str("ANÁLISIS DEL CASO:\n");
    body.push_str(&case_json);
    body.push('\n');

    if let Some(template) = analyzed.enriched.template.as_ref() {
        body.push_str(&format!(
            "\nARQUETIPO DE REFERENCIA ({}), sigue su estructura y estilo:\n{}\n",
            template.label, template.code
        ));
    }

    body.push_str(
        "\nGenera un único archivo de test. Usa `import { test, expect } from '@playwright/test';`.",
    );
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::archetype::ArchetypeLabel;

    #[test]
    fn test_extend_prompt_embeds_every_field() {
        let case = TestCase {
            scenario: "S".to_string(),
            description: "D".to_string(),
            preconditions: "P".to_string(),
            actions: "A".to_string(),
            technique: "T".to_string(),
            priority: "Alta".to_string(),
            expected_result: "E".to_string(),
        };
        let prompt = build_extend_user_prompt(&case, None);
        for expected in [
            "Escenario: S",
            "Descripción: D",
            "Precondiciones: P",
            "Acciones: A",
            "Técnica de prueba: T",
            "Prioridad: Alta",
            "Resultado esperado: E",
            "\"detailed_steps\"",
        ] {
            assert!(prompt.contains(expected), "missing {expected}");
        }
        assert!(!prompt.contains("Categoría detectada"));
    }

    #[test]
    fn test_extend_prompt_mentions_archetype() {
        let template = ArchetypeTemplate {
            label: ArchetypeLabel::Login,
            code: "await page.fill('#username', user);".to_string(),
        };
        let prompt = build_extend_user_prompt(&TestCase::default(), Some(&template));
        assert!(prompt.contains("Categoría detectada: login"));
        assert!(prompt.contains("Arquetipo de referencia (login):\nawait page.fill('#username', user);"));
    }

    #[test]
    fn test_long_template_is_cut_to_excerpt() {
        let code: Vec<String> = (0..100).map(|n| format!("// line {n}")).collect();
        let excerpt = template_excerpt(&code.join("\n"));
        assert!(excerpt.contains("// line 39"));
        assert!(!excerpt.contains("// line 40"));
        assert!(excerpt.ends_with("// ..."));

        assert_eq!(template_excerpt("a\nb"), "a\nb");
    }
}
