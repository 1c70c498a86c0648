//! Maps raw sheet rows onto the canonical `TestCase` shape.
//!
//! Headers are matched after key normalization, so `Descripción del caso de prueba`,
//! `descripcion` and `description` all land in the same field. Normalization never
//! fails: anything missing becomes an empty string.

use std::collections::HashMap;

use crate::domain::csv::RawRecord;
use crate::domain::test_case::{TestCase, TestCaseField};

/// Lower-cases, folds the accented vowels and `ñ`, then collapses every run of
/// characters outside `[a-z0-9]` into a single `_`.
pub fn normalize_key(key: &str) -> String {
    let mut normalized = String::with_capacity(key.len());
    let mut in_separator = false;

    for ch in key.chars().flat_map(char::to_lowercase) {
        let folded = match ch {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' => 'u',
            'ñ' => 'n',
            other => other,
        };
        if folded.is_ascii_lowercase() || folded.is_ascii_digit() {
            normalized.push(folded);
            in_separator = false;
        } else if !in_separator {
            normalized.push('_');
            in_separator = true;
        }
    }

    normalized
}

/// Normalized header names accepted for each canonical field, in lookup order.
pub fn aliases(field: TestCaseField) -> &'static [&'static str] {
    match field {
        TestCaseField::Scenario => &["escenario", "scenario", "nombre_del_escenario"],
        TestCaseField::Description => &[
            "descripcion",
            "descripcion_del_caso_de_prueba",
            "description",
        ],
        TestCaseField::Preconditions => &["precondiciones", "preconditions", "precondicion"],
        TestCaseField::Actions => &[
            "acciones",
            "acciones_del_caso_de_prueba",
            "actions",
            "pasos",
            "steps",
        ],
        TestCaseField::Technique => &["tecnica", "tecnica_de_prueba", "technique"],
        TestCaseField::Priority => &["prioridad", "priority"],
        TestCaseField::ExpectedResult => &[
            "resultado_esperado",
            "expectedresult",
            "expected_result",
        ],
    }
}

/// Row Normalizer.
pub struct Normalizer;

impl Normalizer {
    /// Normalizes one raw row. Later duplicate headers win over earlier ones.
    pub fn normalize(record: &RawRecord) -> TestCase {
        let normalized: HashMap<String, &str> = record
            .fields
            .iter()
            .map(|field| (normalize_key(&field.name), field.value.as_str()))
            .collect();

        let mut case = TestCase::default();
        for field in TestCaseField::ALL {
            let value = aliases(field)
                .iter()
                .filter_map(|alias| normalized.get(*alias))
                .find(|value| !value.is_empty())
                .map(|value| value.to_string())
                .unwrap_or_default();
            case.set(field, value);
        }
        case
    }

    /// Normalizes a whole batch, preserving row order.
    pub fn normalize_all(records: &[RawRecord]) -> Vec<TestCase> {
        records.iter().map(Self::normalize).collect()
    }

    /// True when some accepted alias of `field` is present among `headers`.
    pub fn has_column(headers: &[String], field: TestCaseField) -> bool {
        let accepted = aliases(field);
        headers
            .iter()
            .map(|header| normalize_key(header))
            .any(|key| accepted.contains(&key.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key_strips_accents_and_separators() {
        assert_eq!(
            normalize_key("Descripción del caso de prueba"),
            "descripcion_del_caso_de_prueba"
        );
        assert_eq!(normalize_key("TÉCNICA"), "tecnica");
        assert_eq!(normalize_key("Resultado  -  Esperado"), "resultado_esperado");
        assert_eq!(normalize_key("Año"), "ano");
    }

    #[test]
    fn test_normalize_key_is_idempotent() {
        for key in ["Precondiciones", "resultado esperado", "expectedResult", "a--b"] {
            let once = normalize_key(key);
            assert_eq!(normalize_key(&once), once);
        }
    }

    #[test]
    fn test_normalize_accented_headers() {
        let record = RawRecord::from_pairs(
            0,
            [
                ("Escenario", "Login exitoso"),
                ("Descripción del caso de prueba", "Usuario válido"),
                ("Acciones", "Ingresar credenciales"),
                ("Técnica de prueba", "Caja negra"),
                ("Prioridad", "Alta"),
                ("Resultado esperado", "Ver dashboard"),
            ],
        );
        let case = Normalizer::normalize(&record);
        assert_eq!(case.scenario, "Login exitoso");
        assert_eq!(case.description, "Usuario válido");
        assert_eq!(case.actions, "Ingresar credenciales");
        assert_eq!(case.technique, "Caja negra");
        assert_eq!(case.priority, "Alta");
        assert_eq!(case.expected_result, "Ver dashboard");
        assert_eq!(case.preconditions, "");
    }

    #[test]
    fn test_first_non_empty_alias_wins() {
        let record = RawRecord::from_pairs(
            0,
            [("descripcion", ""), ("descripcion_del_caso_de_prueba", "larga")],
        );
        assert_eq!(Normalizer::normalize(&record).description, "larga");
    }

    #[test]
    fn test_canonical_case_round_trips() {
        let case = TestCase {
            scenario: "Add to Cart".to_string(),
            description: "d".to_string(),
            preconditions: "p".to_string(),
            actions: "click add to cart".to_string(),
            technique: "t".to_string(),
            priority: "high".to_string(),
            expected_result: "cart shows 1".to_string(),
        };
        let record = RawRecord::from_pairs(0, case.to_pairs());
        assert_eq!(Normalizer::normalize(&record), case);
    }

    #[test]
    fn test_missing_everything_yields_empty_case() {
        let record = RawRecord::from_pairs(0, [("unrelated", "x")]);
        assert_eq!(Normalizer::normalize(&record), TestCase::default());
    }

    #[test]
    fn test_has_column() {
        let headers = vec!["Escenario".to_string(), "Resultado Esperado".to_string()];
        assert!(Normalizer::has_column(&headers, TestCaseField::Scenario));
        assert!(Normalizer::has_column(&headers, TestCaseField::ExpectedResult));
        assert!(!Normalizer::has_column(&headers, TestCaseField::Actions));
    }
}
