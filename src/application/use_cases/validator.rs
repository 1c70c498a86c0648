//! Structural checks over a normalized batch.
//!
//! Findings are data: the validator never mutates cases and never stops the
//! pipeline. Rows are reported 1-based, matching what a user sees in the sheet.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

use crate::application::use_cases::normalizer::Normalizer;
use crate::domain::test_case::{TestCase, TestCaseField};
use crate::domain::validation::{
    Severity, ValidationRecommendation, ValidationReport, ValidationResult,
};

pub const REQUIRED_FIELDS: [TestCaseField; 3] = [
    TestCaseField::Scenario,
    TestCaseField::Actions,
    TestCaseField::ExpectedResult,
];

pub const MAX_LENGTHS: [(TestCaseField, usize); 4] = [
    (TestCaseField::Scenario, 200),
    (TestCaseField::Description, 1000),
    (TestCaseField::Actions, 2000),
    (TestCaseField::ExpectedResult, 500),
];

pub const ACCEPTED_PRIORITIES: [&str; 8] = [
    "alta", "media", "baja", "crítica", "high", "medium", "low", "critical",
];

/// Batches above this size get a "large file" note in the validation report.
const LARGE_BATCH_ROWS: usize = 50;

static SAFE_SCENARIO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9\s\-_À-ÿ]+$").unwrap());

pub struct Validator;

impl Validator {
    /// Validates the rows of a batch.
    pub fn validate(cases: &[TestCase]) -> ValidationResult {
        if cases.is_empty() {
            return ValidationResult {
                is_valid: false,
                errors: vec![
                    "El archivo está vacío o no se pudo parsear correctamente".to_string(),
                ],
                warnings: Vec::new(),
                total_rows: 0,
                valid_rows: 0,
            };
        }

        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let mut failing_rows = BTreeSet::new();

        for (index, case) in cases.iter().enumerate() {
            let row = index + 1;
            let row_errors = Self::row_errors(case, row);
            if !row_errors.is_empty() {
                failing_rows.insert(row);
            }
            errors.extend(row_errors);
            warnings.extend(Self::row_warnings(case, row));
        }

        ValidationResult {
            is_valid: errors.is_empty(),
            errors,
            warnings,
            total_rows: cases.len(),
            valid_rows: cases.len() - failing_rows.len(),
        }
    }

    /// Validates rows plus the header row they came from.
    pub fn validate_sheet(headers: &[String], cases: &[TestCase]) -> ValidationResult {
        let mut result = Self::validate(cases);
        let missing: Vec<String> = REQUIRED_FIELDS
            .iter()
            .filter(|field| !Normalizer::has_column(headers, **field))
            .map(|field| format!("Columna requerida faltante: {}", field.column_label()))
            .collect();

        if !missing.is_empty() {
            let mut errors = missing;
            errors.append(&mut result.errors);
            result.errors = errors;
            result.is_valid = false;
        }
        result
    }

    fn row_errors(case: &TestCase, row: usize) -> Vec<String> {
        REQUIRED_FIELDS
            .iter()
            .filter(|field| case.get(**field).trim().is_empty())
            .map(|field| {
                format!(
                    "Fila {}: Campo requerido vacío - {}",
                    row,
                    field.column_label()
                )
            })
            .collect()
    }

    fn row_warnings(case: &TestCase, row: usize) -> Vec<String> {
        let mut warnings = Vec::new();

        for (field, max) in MAX_LENGTHS {
            if case.get(field).chars().count() > max {
                warnings.push(format!(
                    "Fila {}: Campo {} excede la longitud máxima ({} caracteres)",
                    row,
                    field.column_label(),
                    max
                ));
            }
        }

        if !case.scenario.is_empty() && !SAFE_SCENARIO.is_match(&case.scenario) {
            warnings.push(format!(
                "Fila {}: El escenario contiene caracteres especiales que podrían causar problemas",
                row
            ));
        }

        let priority = case.priority.trim();
        if !priority.is_empty() && !ACCEPTED_PRIORITIES.contains(&priority.to_lowercase().as_str())
        {
            warnings.push(format!("Fila {}: Prioridad no reconocida - {}", row, priority));
        }

        warnings
    }

    pub fn recommendations(result: &ValidationResult) -> Vec<ValidationRecommendation> {
        let mut recommendations = Vec::new();

        if !result.errors.is_empty() {
            recommendations.push(ValidationRecommendation {
                severity: Severity::Error,
                title: "Errores Críticos".to_string(),
                message: "Corrige los errores antes de confiar en los tests generados.".to_string(),
                action: "Revisa y completa los campos requeridos faltantes".to_string(),
            });
        }

        if !result.warnings.is_empty() {
            recommendations.push(ValidationRecommendation {
                severity: Severity::Warning,
                title: "Advertencias".to_string(),
                message: "Hay advertencias que podrían afectar la generación de tests.".to_string(),
                action: "Revisa los campos señalados para mejorar la calidad".to_string(),
            });
        }

        if result.total_rows > LARGE_BATCH_ROWS {
            recommendations.push(ValidationRecommendation {
                severity: Severity::Info,
                title: "Archivo Grande".to_string(),
                message: "El archivo contiene muchas filas. El procesamiento puede tardar más."
                    .to_string(),
                action: "Considera dividirlo en archivos más pequeños".to_string(),
            });
        }

        recommendations
    }

    pub fn report(result: ValidationResult) -> ValidationReport {
        let recommendations = Self::recommendations(&result);
        ValidationReport {
            timestamp: chrono::Utc::now().to_rfc3339(),
            result,
            recommendations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_case() -> TestCase {
        TestCase {
            scenario: "Login exitoso".to_string(),
            description: "Usuario válido".to_string(),
            preconditions: "Usuario registrado".to_string(),
            actions: "Ingresar credenciales y pulsar entrar".to_string(),
            technique: "Caja negra".to_string(),
            priority: "Alta".to_string(),
            expected_result: "Se muestra el panel".to_string(),
        }
    }

    #[test]
    fn test_complete_batch_is_valid() {
        let result = Validator::validate(&[complete_case(), complete_case()]);
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
        assert_eq!(result.total_rows, 2);
        assert_eq!(result.valid_rows, 2);
    }

    #[test]
    fn test_missing_scenario_is_row_indexed_error() {
        let mut broken = complete_case();
        broken.scenario = "   ".to_string();
        let result = Validator::validate(&[complete_case(), broken]);

        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("Fila 2"));
        assert!(result.errors[0].contains("escenario"));
        assert_eq!(result.valid_rows, 1);
    }

    #[test]
    fn test_valid_rows_counts_rows_not_errors() {
        let result = Validator::validate(&[TestCase::default()]);
        assert_eq!(result.errors.len(), 3);
        assert_eq!(result.valid_rows, 0);
    }

    #[test]
    fn test_over_length_is_warning_only() {
        let mut long = complete_case();
        long.expected_result = "x".repeat(501);
        let result = Validator::validate(&[long]);
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("resultado_esperado"));
    }

    #[test]
    fn test_length_counts_chars_not_bytes() {
        let mut accented = complete_case();
        accented.scenario = "á".repeat(200);
        assert!(Validator::validate(&[accented]).warnings.is_empty());
    }

    #[test]
    fn test_special_characters_in_scenario_warn() {
        let mut odd = complete_case();
        odd.scenario = "Login <script>".to_string();
        let result = Validator::validate(&[odd]);
        assert!(result.is_valid);
        assert!(result.warnings[0].contains("caracteres especiales"));
    }

    #[test]
    fn test_priority_is_case_insensitive() {
        let mut upper = complete_case();
        upper.priority = "CRITICAL".to_string();
        let mut unknown = complete_case();
        unknown.priority = "urgente".to_string();

        assert!(Validator::validate(&[upper]).warnings.is_empty());
        let result = Validator::validate(&[unknown]);
        assert_eq!(result.warnings, vec!["Fila 1: Prioridad no reconocida - urgente".to_string()]);
    }

    #[test]
    fn test_empty_batch_is_invalid() {
        let result = Validator::validate(&[]);
        assert!(!result.is_valid);
        assert_eq!(result.total_rows, 0);
    }

    #[test]
    fn test_missing_required_column() {
        let headers = vec!["Escenario".to_string(), "Acciones".to_string()];
        let result = Validator::validate_sheet(&headers, &[complete_case()]);
        assert!(!result.is_valid);
        assert_eq!(
            result.errors[0],
            "Columna requerida faltante: resultado_esperado"
        );
    }

    #[test]
    fn test_recommendations() {
        let mut result = Validator::validate(&[TestCase::default()]);
        result.total_rows = 60;
        let titles: Vec<String> = Validator::recommendations(&result)
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, vec!["Errores Críticos", "Archivo Grande"]);
    }
}
