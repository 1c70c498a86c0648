//! Layered configuration: defaults, `testforge.toml`, environment, then CLI.

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::Serialize;
use tracing::debug;
use validator::Validate;

use crate::domain::app_config::AppConfig;
use crate::domain::error::{AppError, Result};
use crate::infrastructure::security::keyring::KeyringManager;

pub const KEYRING_SERVICE: &str = "testforge";
pub const KEYRING_API_KEY: &str = "gemini_api_key";
pub const CONFIG_FILE: &str = "testforge.toml";

/// Environment names recognized as configuration; anything else in the
/// environment is ignored.
const ENV_KEYS: [&str; 18] = [
    "GEMINI_API_KEY",
    "LOG_LEVEL",
    "DEBUG_MODE",
    "GEMINI_MODEL",
    "LLM_PROVIDER",
    "LLM_BASE_URL",
    "LLM_TEMPERATURE",
    "LLM_MAX_TOKENS",
    "LLM_TIMEOUT_SECS",
    "PLAYWRIGHT_BROWSER",
    "PLAYWRIGHT_HEADLESS",
    "USE_ARCHETYPES",
    "USE_ARCHEOTYPES",
    "INPUT_DIR",
    "OUTPUT_DIR",
    "ARCHETYPES_DIR",
    "EXECUTION_TIMEOUT_SECS",
    "SETTLE_DELAY_MS",
];

/// Loads `config.env` then `.env` into the process environment.
/// Variables already set are not overridden.
pub fn load_env_files() {
    for file in ["config.env", ".env"] {
        if let Ok(path) = dotenvy::from_filename(file) {
            debug!(path = %path.display(), "Loaded environment file");
        }
    }
}

pub struct ConfigService {
    config_file: PathBuf,
    keyring: Option<KeyringManager>,
    read_env: bool,
}

impl ConfigService {
    pub fn new() -> Self {
        Self {
            config_file: PathBuf::from(CONFIG_FILE),
            keyring: Some(KeyringManager::new(KEYRING_SERVICE)),
            read_env: true,
        }
    }

    pub fn with_config_file(mut self, path: impl AsRef<Path>) -> Self {
        self.config_file = path.as_ref().to_path_buf();
        self
    }

    fn figment<T: Serialize>(&self, overrides: &T) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(&self.config_file));

        if self.read_env {
            figment = figment.merge(Env::raw().only(&ENV_KEYS).map(|key| {
                // Legacy spelling from older env files.
                if key.as_str().eq_ignore_ascii_case("use_archeotypes") {
                    "use_archetypes".into()
                } else {
                    key.into()
                }
            }));
        }

        figment.merge(Serialized::defaults(overrides))
    }

    /// Resolves and validates the configuration. A missing or placeholder API
    /// key is a configuration error.
    pub fn load<T: Serialize>(&self, overrides: &T) -> Result<AppConfig> {
        let mut config: AppConfig = self
            .figment(overrides)
            .extract()
            .map_err(|e| AppError::Config(e.to_string()))?;

        config
            .validate()
            .map_err(|e| AppError::Config(e.to_string()))?;

        if config.usable_api_key().is_none() {
            config.gemini_api_key = self.api_key_from_keyring();
        }

        if config.usable_api_key().is_none() {
            return Err(AppError::Config(
                "GEMINI_API_KEY is not set (or still holds the placeholder value)".to_string(),
            ));
        }

        Ok(config)
    }

    fn api_key_from_keyring(&self) -> Option<String> {
        let keyring = self.keyring.as_ref()?;
        match keyring.get_secret(KEYRING_API_KEY) {
            Ok(secret) => Some(secret),
            Err(err) => {
                debug!(error = %err, "No API key in OS keyring");
                None
            }
        }
    }

    pub fn save_api_key(&self, key: &str) -> Result<()> {
        let keyring = self
            .keyring
            .as_ref()
            .ok_or_else(|| AppError::SecurityError("Keyring disabled".to_string()))?;
        keyring.set_secret(KEYRING_API_KEY, key)
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}
