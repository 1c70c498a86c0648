//! Payloads produced by the three enrichment stages.
//!
//! A case moves through `EnrichedTestCase` (extended) -> `AnalyzedTestCase`
//! (analyzed) -> `GeneratedCase` (code). Each step consumes its predecessor and
//! returns a new value; nothing is mutated in place.

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::archetype::{ArchetypeLabel, ArchetypeTemplate};
use super::test_case::TestCase;

pub const DEFAULT_VIEWPORT: &str = "1920x1080";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Result of one stage: either the service output parsed cleanly, or the
/// deterministic default was substituted.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome<T> {
    Parsed(T),
    Fallback { value: T, reason: String },
}

impl<T> StageOutcome<T> {
    pub fn fallback(value: T, reason: impl Into<String>) -> Self {
        StageOutcome::Fallback {
            value,
            reason: reason.into(),
        }
    }

    pub fn into_value(self) -> T {
        match self {
            StageOutcome::Parsed(value) => value,
            StageOutcome::Fallback { value, .. } => value,
        }
    }

    pub fn source(&self) -> PayloadSource {
        match self {
            StageOutcome::Parsed(_) => PayloadSource::Generated,
            StageOutcome::Fallback { .. } => PayloadSource::Fallback,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PayloadSource {
    Generated,
    Fallback,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BrowserSettings {
    #[serde(default = "default_viewport", deserialize_with = "deserialize_viewport")]
    pub viewport: String,
    #[serde(default = "default_timeout", deserialize_with = "deserialize_timeout")]
    pub timeout: u64,
}

fn default_viewport() -> String {
    DEFAULT_VIEWPORT.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            viewport: default_viewport(),
            timeout: DEFAULT_TIMEOUT_MS,
        }
    }
}

/// Stage 1 output.
///
/// Models rarely follow the requested shape exactly, so every field accepts
/// whatever JSON it receives and coerces it. Keys outside the known set are kept
/// in `extra` and travel on to the later stages.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExtendedPayload {
    #[serde(default, deserialize_with = "deserialize_text_list")]
    pub detailed_steps: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_text_map")]
    pub selectors: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "deserialize_value_map")]
    pub test_data: BTreeMap<String, Value>,
    #[serde(default, deserialize_with = "deserialize_text_list")]
    pub validations: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_browser_settings")]
    pub browser_config: BrowserSettings,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ExtendedPayload {
    /// Default used when the service fails or answers with something unparseable.
    pub fn fallback_for(case: &TestCase) -> Self {
        Self {
            detailed_steps: vec![case.actions.clone()],
            validations: vec![case.expected_result.clone()],
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RequiredData {
    #[serde(default, deserialize_with = "deserialize_text_list")]
    pub urls: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_text_list")]
    pub credentials: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_value_map")]
    pub config: BTreeMap<String, Value>,
    #[serde(default, deserialize_with = "deserialize_text_list")]
    pub env_vars: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_text_list")]
    pub dependencies: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_value_map")]
    pub timeouts: BTreeMap<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Stage 2 output. The default value is also the stage fallback.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnalysisPayload {
    #[serde(default, deserialize_with = "deserialize_required_data")]
    pub required_data: RequiredData,
    #[serde(default, deserialize_with = "deserialize_text_list")]
    pub missing_critical: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_text_list")]
    pub assumptions: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// Lenient field coercion
// ---------------------------------------------------------------------------

/// Flattens any JSON value into display text. Strings stay as they are.
fn value_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

/// A list field: arrays map element-wise, objects contribute their values,
/// a scalar becomes a one-element list and `null` an empty one.
fn text_list(value: Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items
            .into_iter()
            .filter(|item| !item.is_null())
            .map(value_text)
            .collect(),
        Value::Object(map) => map
            .into_iter()
            .map(|(_, item)| item)
            .filter(|item| !item.is_null())
            .map(value_text)
            .collect(),
        scalar => vec![value_text(scalar)],
    }
}

fn value_map(value: Value) -> BTreeMap<String, Value> {
    match value {
        Value::Object(map) => map.into_iter().collect(),
        _ => BTreeMap::new(),
    }
}

/// `{"width": 1280, "height": 720}` and `[1280, 720]` both become `"1280x720"`.
fn viewport_text(value: Value) -> String {
    let dimensions = match &value {
        Value::Object(map) => map.get("width").zip(map.get("height")),
        Value::Array(items) if items.len() == 2 => items.first().zip(items.get(1)),
        _ => None,
    };
    if let Some((width, height)) = dimensions {
        return format!("{}x{}", value_text(width.clone()), value_text(height.clone()));
    }
    match value {
        Value::String(text) if !text.trim().is_empty() => text,
        Value::Null | Value::String(_) => default_viewport(),
        other => other.to_string(),
    }
}

fn timeout_millis(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| number.as_f64().filter(|ms| *ms >= 0.0).map(|ms| ms as u64)),
        Value::String(text) => text.trim().trim_end_matches("ms").trim().parse().ok(),
        _ => None,
    }
}

fn deserialize_text_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(text_list)
}

fn deserialize_text_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let map = value_map(Value::deserialize(deserializer)?);
    Ok(map
        .into_iter()
        .map(|(key, value)| (key, value_text(value)))
        .collect())
}

fn deserialize_value_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(value_map)
}

fn deserialize_viewport<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(viewport_text)
}

fn deserialize_timeout<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(timeout_millis(&value).unwrap_or(DEFAULT_TIMEOUT_MS))
}

fn deserialize_browser_settings<'de, D>(deserializer: D) -> Result<BrowserSettings, D::Error>
where
    D: Deserializer<'de>,
{
    let settings = match Value::deserialize(deserializer)? {
        Value::Object(map) => BrowserSettings {
            viewport: map
                .get("viewport")
                .cloned()
                .map(viewport_text)
                .unwrap_or_else(default_viewport),
            timeout: map
                .get("timeout")
                .and_then(timeout_millis)
                .unwrap_or(DEFAULT_TIMEOUT_MS),
        },
        _ => BrowserSettings::default(),
    };
    Ok(settings)
}

fn deserialize_required_data<'de, D>(deserializer: D) -> Result<RequiredData, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => serde_json::from_value(value).map_err(de::Error::custom),
        _ => Ok(RequiredData::default()),
    }
}

/// A case after Stage 1.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedTestCase {
    #[serde(skip)]
    pub index: usize,
    #[serde(flatten)]
    pub case: TestCase,
    pub archetype: ArchetypeLabel,
    #[serde(skip)]
    pub template: Option<ArchetypeTemplate>,
    pub extended: ExtendedPayload,
    #[serde(skip)]
    pub extended_source: PayloadSource,
}

/// A case after Stage 2.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzedTestCase {
    #[serde(flatten)]
    pub enriched: EnrichedTestCase,
    pub analyzed: AnalysisPayload,
    #[serde(skip)]
    pub analyzed_source: PayloadSource,
}

impl AnalyzedTestCase {
    pub fn case(&self) -> &TestCase {
        &self.enriched.case
    }
}

/// Source text of one runnable test file. Written once, never edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    pub code: String,
    pub source: PayloadSource,
}

/// A case after Stage 3.
#[derive(Debug, Clone)]
pub struct GeneratedCase {
    pub analyzed: AnalyzedTestCase,
    pub artifact: GeneratedArtifact,
}

impl GeneratedCase {
    pub fn index(&self) -> usize {
        self.analyzed.enriched.index
    }

    pub fn case(&self) -> &TestCase {
        self.analyzed.case()
    }

    /// Names of the stages that fell back to their default payload.
    pub fn fallback_stages(&self) -> Vec<&'static str> {
        let mut stages = Vec::new();
        if self.analyzed.enriched.extended_source == PayloadSource::Fallback {
            stages.push("extend");
        }
        if self.analyzed.analyzed_source == PayloadSource::Fallback {
            stages.push("analyze");
        }
        if self.artifact.source == PayloadSource::Fallback {
            stages.push("generate");
        }
        stages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extended_fallback_mirrors_case() {
        let case = TestCase {
            actions: "click login".to_string(),
            expected_result: "dashboard visible".to_string(),
            ..TestCase::default()
        };
        let payload = ExtendedPayload::fallback_for(&case);
        assert_eq!(payload.detailed_steps, vec!["click login".to_string()]);
        assert_eq!(payload.validations, vec!["dashboard visible".to_string()]);
        assert_eq!(payload.browser_config.viewport, "1920x1080");
        assert_eq!(payload.browser_config.timeout, 30_000);
    }

    #[test]
    fn test_partial_payload_deserializes_with_defaults() {
        let payload: ExtendedPayload =
            serde_json::from_str(r#"{"detailed_steps": ["open page"]}"#).unwrap();
        assert_eq!(payload.detailed_steps.len(), 1);
        assert!(payload.selectors.is_empty());
        assert_eq!(payload.browser_config, BrowserSettings::default());
    }

    #[test]
    fn test_viewport_object_and_loose_steps_are_kept() {
        let payload: ExtendedPayload = serde_json::from_str(
            r##"{
                "detailed_steps": [{"step": 1, "action": "abrir /login"}, "llenar", null],
                "selectors": {"user": "#user", "submit": {"css": "button"}},
                "validations": "ver panel",
                "browser_config": {"viewport": {"width": 1280, "height": 720}, "timeout": "5000"},
                "notes": "usar datos de staging"
            }"##,
        )
        .unwrap();

        assert_eq!(payload.detailed_steps.len(), 2);
        assert!(payload.detailed_steps[0].contains("abrir /login"));
        assert_eq!(payload.detailed_steps[1], "llenar");
        assert_eq!(payload.selectors["user"], "#user");
        assert_eq!(payload.selectors["submit"], r#"{"css":"button"}"#);
        assert_eq!(payload.validations, vec!["ver panel".to_string()]);
        assert_eq!(payload.browser_config.viewport, "1280x720");
        assert_eq!(payload.browser_config.timeout, 5000);
        assert_eq!(payload.extra["notes"], "usar datos de staging");
    }

    #[test]
    fn test_unusable_browser_config_falls_back_per_field() {
        let payload: ExtendedPayload =
            serde_json::from_str(r#"{"browser_config": {"viewport": null, "timeout": "soon"}}"#)
                .unwrap();
        assert_eq!(payload.browser_config, BrowserSettings::default());

        let payload: ExtendedPayload =
            serde_json::from_str(r#"{"browser_config": "chromium"}"#).unwrap();
        assert_eq!(payload.browser_config, BrowserSettings::default());
    }

    #[test]
    fn test_analysis_accepts_url_map_and_keeps_unknown_keys() {
        let payload: AnalysisPayload = serde_json::from_str(
            r#"{
                "required_data": {
                    "urls": {"base": "https://staging.example.com"},
                    "credentials": {"user": "qa", "password": "secret"},
                    "timeouts": 5000,
                    "browsers": ["chromium"]
                },
                "missing_critical": "URL base",
                "risk": "alto"
            }"#,
        )
        .unwrap();

        assert_eq!(payload.required_data.urls, vec!["https://staging.example.com"]);
        let mut credentials = payload.required_data.credentials.clone();
        credentials.sort();
        assert_eq!(credentials, vec!["qa", "secret"]);
        assert!(payload.required_data.timeouts.is_empty());
        assert_eq!(payload.required_data.extra["browsers"][0], "chromium");
        assert_eq!(payload.missing_critical, vec!["URL base"]);
        assert_eq!(payload.extra["risk"], "alto");

        // Unknown keys are serialized back out for the next stage's prompt.
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["risk"], "alto");
    }

    #[test]
    fn test_outcome_source() {
        let parsed: StageOutcome<u8> = StageOutcome::Parsed(1);
        let fallback = StageOutcome::fallback(2u8, "timeout");
        assert_eq!(parsed.source(), PayloadSource::Generated);
        assert_eq!(fallback.source(), PayloadSource::Fallback);
        assert_eq!(fallback.into_value(), 2);
    }
}
