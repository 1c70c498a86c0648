use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use validator::Validate;

use super::llm_config::{LLMConfig, LLMProvider};

/// Value shipped in sample env files; treated the same as a missing key.
pub const API_KEY_PLACEHOLDER: &str = "tu-api-key-aqui";

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BrowserEngine {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl BrowserEngine {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserEngine::Chromium => "chromium",
            BrowserEngine::Firefox => "firefox",
            BrowserEngine::Webkit => "webkit",
        }
    }

    /// Playwright device descriptor used for the single configured project.
    pub fn device(&self) -> &'static str {
        match self {
            BrowserEngine::Chromium => "Desktop Chrome",
            BrowserEngine::Firefox => "Desktop Firefox",
            BrowserEngine::Webkit => "Desktop Safari",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct AppConfig {
    #[serde(default)]
    pub gemini_api_key: Option<String>,
    #[validate(length(min = 1))]
    pub log_level: String,
    pub debug_mode: bool,
    #[validate(length(min = 1))]
    pub gemini_model: String,
    pub llm_provider: LLMProvider,
    #[serde(default)]
    pub llm_base_url: Option<String>,
    #[serde(default)]
    pub llm_temperature: Option<f32>,
    #[serde(default)]
    pub llm_max_tokens: Option<u32>,
    #[validate(range(min = 1, max = 3600))]
    pub llm_timeout_secs: u64,
    pub playwright_browser: BrowserEngine,
    pub playwright_headless: bool,
    pub use_archetypes: bool,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub archetypes_dir: PathBuf,
    #[validate(range(min = 1, max = 86400))]
    pub execution_timeout_secs: u64,
    pub settle_delay_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            log_level: "info".to_string(),
            debug_mode: false,
            gemini_model: "gemini-pro".to_string(),
            llm_provider: LLMProvider::Gemini,
            llm_base_url: None,
            llm_temperature: None,
            llm_max_tokens: None,
            llm_timeout_secs: 60,
            playwright_browser: BrowserEngine::Chromium,
            playwright_headless: false,
            use_archetypes: true,
            input_dir: PathBuf::from("IN"),
            output_dir: PathBuf::from("OUT"),
            archetypes_dir: PathBuf::from("Arquetipos"),
            execution_timeout_secs: 900,
            settle_delay_ms: 500,
        }
    }
}

impl AppConfig {
    /// Returns the API key when it is set to something other than the placeholder.
    pub fn usable_api_key(&self) -> Option<&str> {
        self.gemini_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && *key != API_KEY_PLACEHOLDER)
    }

    pub fn llm_config(&self) -> LLMConfig {
        let defaults = LLMConfig::default();
        LLMConfig {
            provider: self.llm_provider,
            base_url: self
                .llm_base_url
                .clone()
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| self.llm_provider.default_base_url().to_string()),
            model: self.gemini_model.clone(),
            api_key: self.usable_api_key().map(str::to_string),
            max_tokens: self.llm_max_tokens.or(defaults.max_tokens),
            temperature: self.llm_temperature.or(defaults.temperature),
            timeout_secs: self.llm_timeout_secs,
        }
    }

    pub fn execution_timeout(&self) -> Duration {
        Duration::from_secs(self.execution_timeout_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_key_is_not_usable() {
        let config = AppConfig {
            gemini_api_key: Some(API_KEY_PLACEHOLDER.to_string()),
            ..AppConfig::default()
        };
        assert!(config.usable_api_key().is_none());
    }

    #[test]
    fn test_llm_config_uses_provider_default_url() {
        let config = AppConfig {
            gemini_api_key: Some("abc".to_string()),
            llm_provider: LLMProvider::OpenRouter,
            ..AppConfig::default()
        };
        let llm = config.llm_config();
        assert_eq!(llm.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(llm.api_key.as_deref(), Some("abc"));
        assert_eq!(llm.timeout_secs, 60);
    }
}
