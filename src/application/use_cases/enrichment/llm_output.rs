use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::test_case::TestCase;
use crate::shared::json_span::extract_json_object;

pub(crate) const IMPORT_PREAMBLE: &str = "import { test, expect } from '@playwright/test';";

static REASONING_BLOCK_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<think>[\s\S]*?</think>|<think\s*/>|<reasoning>[\s\S]*?</reasoning>").unwrap()
});

static CODE_FENCE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```(?:javascript|typescript|jsx|tsx|js|ts)?").unwrap());

static IMPORT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bimport\b|\brequire\s*\(").unwrap());

/// Drops reasoning blocks some models emit ahead of the answer.
pub(crate) fn clean_llm_response(response: &str) -> String {
    REASONING_BLOCK_PATTERN
        .replace_all(response, "")
        .trim()
        .to_string()
}

/// Parses the first JSON object found in a completion into `T`.
///
/// Payload types coerce odd field shapes, so in practice the only failure is a
/// completion with no JSON object in it. The error string is only used for
/// logging; callers substitute a default.
pub(crate) fn parse_json_payload<T: DeserializeOwned>(output: &str) -> Result<T, String> {
    let cleaned = clean_llm_response(output);
    let object = extract_json_object(&cleaned)
        .ok_or_else(|| format!("no JSON object in response ({} chars)", cleaned.len()))?;
    serde_json::from_value(Value::Object(object))
        .map_err(|err| format!("JSON object has unexpected shape: {}", err))
}

/// Removes markdown fence markers, keeping the code between them.
pub(crate) fn strip_code_fences(code: &str) -> String {
    CODE_FENCE_PATTERN.replace_all(code, "").trim().to_string()
}

pub(crate) fn has_module_import(code: &str) -> bool {
    IMPORT_PATTERN.is_match(code)
}

/// Turns a completion into test source. `None` when nothing usable is left.
pub(crate) fn normalize_generated_code(output: &str) -> Option<String> {
    let code = strip_code_fences(&clean_llm_response(output));
    if code.is_empty() {
        return None;
    }
    if has_module_import(&code) {
        Some(code)
    } else {
        Some(format!("{}\n\n{}", IMPORT_PREAMBLE, code))
    }
}

fn comment_lines(text: &str, indent: &str) -> String {
    let lines: Vec<&str> = text.lines().filter(|line| !line.trim().is_empty()).collect();
    if lines.is_empty() {
        return format!("{}// (sin datos)", indent);
    }
    lines
        .iter()
        .map(|line| format!("{}// {}", indent, line.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn js_single_quoted(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', " ")
        .replace('\r', " ")
}

/// Skeleton written when code generation fails, so every row still gets a file.
pub(crate) fn fallback_skeleton(case: &TestCase) -> String {
    let title = if case.scenario.trim().is_empty() {
        "Caso de prueba".to_string()
    } else {
        js_single_quoted(case.scenario.trim())
    };

    format!(
        r#"{preamble}

test('{title}', async ({{ page }}) => {{
{description}

  // Precondiciones:
{preconditions}

  try {{
    // Acciones:
{actions}

    // Resultado esperado:
{expected}
  }} catch (error) {{
    await page.screenshot({{ path: 'test-failure.png' }});
    throw error;
  }}
}});
"#,
        preamble = IMPORT_PREAMBLE,
        title = title,
        description = comment_lines(&case.description, "  "),
        preconditions = comment_lines(&case.preconditions, "  "),
        actions = comment_lines(&case.actions, "    "),
        expected = comment_lines(&case.expected_result, "    "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::enrichment::{AnalysisPayload, ExtendedPayload};

    #[test]
    fn test_parse_payload_inside_prose_and_fences() {
        let output = "<think>plan</think>Aquí tienes:\n```json\n{\"detailed_steps\": [\"a\", \"b\"]}\n```";
        let payload: ExtendedPayload = parse_json_payload(output).unwrap();
        assert_eq!(payload.detailed_steps, vec!["a", "b"]);
    }

    #[test]
    fn test_parse_payload_coerces_field_shapes() {
        let output = r#"{"detailed_steps":["abrir /login","llenar"],"browser_config":{"viewport":{"width":1280,"height":720},"timeout":30000}}"#;
        let payload: ExtendedPayload = parse_json_payload(output).unwrap();
        assert_eq!(payload.detailed_steps, vec!["abrir /login", "llenar"]);
        assert_eq!(payload.browser_config.viewport, "1280x720");
        assert_eq!(payload.browser_config.timeout, 30_000);

        let payload: ExtendedPayload =
            parse_json_payload(r#"{"detailed_steps": "not a list"}"#).unwrap();
        assert_eq!(payload.detailed_steps, vec!["not a list"]);
    }

    #[test]
    fn test_parse_analysis_with_url_map() {
        let output = r#"Faltan datos: {"required_data": {"urls": {"base": "https://app.test"}}, "assumptions": []}"#;
        let payload: AnalysisPayload = parse_json_payload(output).unwrap();
        assert_eq!(payload.required_data.urls, vec!["https://app.test"]);
    }

    #[test]
    fn test_parse_payload_without_json_is_error() {
        let result: Result<ExtendedPayload, String> = parse_json_payload("lo siento, no puedo");
        assert!(result.is_err());
    }

    #[test]
    fn test_strip_code_fences() {
        let code = "```javascript\nconst a = 1;\n```";
        assert_eq!(strip_code_fences(code), "const a = 1;");
        assert_eq!(strip_code_fences("```ts\nlet b;\n```"), "let b;");
    }

    #[test]
    fn test_preamble_added_only_when_missing() {
        let with_import = "import { test } from '@playwright/test';\ntest('x', async () => {});";
        assert_eq!(normalize_generated_code(with_import).unwrap(), with_import);

        let with_require = "const { test } = require('@playwright/test');";
        assert_eq!(normalize_generated_code(with_require).unwrap(), with_require);

        let bare = "test('x', async ({ page }) => {});";
        let normalized = normalize_generated_code(bare).unwrap();
        assert!(normalized.starts_with(IMPORT_PREAMBLE));
        assert!(normalized.ends_with(bare));
    }

    #[test]
    fn test_empty_code_is_none() {
        assert!(normalize_generated_code("```js\n```").is_none());
        assert!(normalize_generated_code("   ").is_none());
    }

    #[test]
    fn test_fallback_skeleton_embeds_case() {
        let case = TestCase {
            scenario: "Login de 'admin'".to_string(),
            description: "Acceso de administrador".to_string(),
            preconditions: "Usuario creado".to_string(),
            actions: "Abrir login\nIngresar datos".to_string(),
            expected_result: "Ver panel".to_string(),
            ..TestCase::default()
        };
        let code = fallback_skeleton(&case);
        assert!(code.starts_with(IMPORT_PREAMBLE));
        assert!(code.contains(r"test('Login de \'admin\''"));
        assert!(code.contains("// Acceso de administrador"));
        assert!(code.contains("    // Abrir login\n    // Ingresar datos"));
        assert!(code.contains("// Ver panel"));
    }
}
