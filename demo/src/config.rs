//! Runtime configuration.
//!
//! Settings come from an optional TOML file; every key has a default, so an
//! absent file or an empty one yields a working configuration:
//!
//! ```toml
//! [model]
//! name = "models/gemini-2.0-flash"
//! endpoint = "https://generativelanguage.googleapis.com/v1beta"
//! timeout_secs = 30
//!
//! [extraction]
//! max_retries = 1        # 0..=10
//!
//! [store]
//! path = "ehr_records.json"
//! ```
//!
//! The API key never lives in the file. It is read from `API_KEY` in the
//! environment (after `.env` has been loaded) only by commands that call the
//! model.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use secrecy::SecretString;
use serde::Deserialize;

use parley_contracts::error::{ParleyError, ParleyResult};
use parley_core::extraction::DEFAULT_MAX_RETRIES;
use parley_llm::{
    gemini::{DEFAULT_ENDPOINT, DEFAULT_MODEL},
    GeminiSettings,
};

pub const API_KEY_VAR: &str = "API_KEY";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_STORE_PATH: &str = "ehr_records.json";

/// Upper bound on `[extraction] max_retries`.
pub const MAX_RETRIES_LIMIT: u32 = 10;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub extraction: ExtractionConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    pub name: String,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractionConfig {
    /// Fallback attempts after the first one.
    pub max_retries: u32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_STORE_PATH),
        }
    }
}

impl AppConfig {
    /// Parse `s` as TOML configuration.
    ///
    /// Returns `ParleyError::Config` if the text is not valid TOML, names an
    /// unknown key, or a value has the wrong type.
    pub fn from_toml_str(s: &str) -> ParleyResult<Self> {
        let config: AppConfig = toml::from_str(s).map_err(|e| ParleyError::Config {
            reason: format!("failed to parse config TOML: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read the file at `path` and parse it as TOML configuration.
    pub fn from_file(path: &Path) -> ParleyResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ParleyError::Config {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// `from_file` when a path was given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> ParleyResult<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn gemini_settings(&self) -> GeminiSettings {
        GeminiSettings {
            model: self.model.name.clone(),
            endpoint: self.model.endpoint.clone(),
            timeout: Duration::from_secs(self.model.timeout_secs),
        }
    }

    fn validate(&self) -> ParleyResult<()> {
        if self.model.name.trim().is_empty() {
            return Err(ParleyError::Config {
                reason: "[model] name must not be empty".to_string(),
            });
        }
        if self.model.timeout_secs == 0 {
            return Err(ParleyError::Config {
                reason: "[model] timeout_secs must be at least 1".to_string(),
            });
        }
        if self.extraction.max_retries > MAX_RETRIES_LIMIT {
            return Err(ParleyError::Config {
                reason: format!(
                    "[extraction] max_retries must be at most {MAX_RETRIES_LIMIT}, got {}",
                    self.extraction.max_retries
                ),
            });
        }
        Ok(())
    }
}

/// Read the model API key from the environment.
pub fn api_key_from_env() -> ParleyResult<SecretString> {
    match std::env::var(API_KEY_VAR) {
        Ok(key) if !key.trim().is_empty() => Ok(SecretString::from(key)),
        _ => Err(ParleyError::Config {
            reason: format!("{API_KEY_VAR} is not set; put it in the environment or a .env file"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    use parley_contracts::error::ParleyError;

    use super::AppConfig;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();

        assert_eq!(config, AppConfig::default());
        assert_eq!(config.model.name, "models/gemini-2.0-flash");
        assert_eq!(config.extraction.max_retries, 1);
        assert_eq!(config.store.path, PathBuf::from("ehr_records.json"));
    }

    #[test]
    fn test_partial_config_overrides_only_named_keys() {
        let config = AppConfig::from_toml_str(
            r#"
[extraction]
max_retries = 3

[store]
path = "/var/lib/parley/records.json"
"#,
        )
        .unwrap();

        assert_eq!(config.extraction.max_retries, 3);
        assert_eq!(config.store.path, PathBuf::from("/var/lib/parley/records.json"));
        assert_eq!(config.model.timeout_secs, 30);
    }

    #[test]
    fn test_gemini_settings_follow_model_section() {
        let config = AppConfig::from_toml_str(
            r#"
[model]
name = "models/gemini-1.5-pro"
endpoint = "http://localhost:8080"
timeout_secs = 5
"#,
        )
        .unwrap();

        let settings = config.gemini_settings();
        assert_eq!(settings.timeout, Duration::from_secs(5));
        assert_eq!(
            settings.url(),
            "http://localhost:8080/models/gemini-1.5-pro:generateContent"
        );
    }

    #[test]
    fn test_unknown_key_is_config_error() {
        let err = AppConfig::from_toml_str("[extraction]\nmax_retry = 2\n").unwrap_err();
        assert!(matches!(err, ParleyError::Config { .. }), "got {:?}", err);
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = AppConfig::from_toml_str("[model\nname = ").unwrap_err();
        assert!(matches!(err, ParleyError::Config { .. }), "got {:?}", err);
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let err = AppConfig::from_toml_str("[model]\ntimeout_secs = 0\n").unwrap_err();
        match err {
            ParleyError::Config { reason } => assert!(reason.contains("timeout_secs")),
            other => panic!("expected Config, got {:?}", other),
        }
    }

    #[test]
    fn test_oversized_retry_bound_is_rejected() {
        let err = AppConfig::from_toml_str("[extraction]\nmax_retries = 4294967295\n").unwrap_err();
        match err {
            ParleyError::Config { reason } => assert!(reason.contains("max_retries")),
            other => panic!("expected Config, got {:?}", other),
        }
        assert!(AppConfig::from_toml_str("[extraction]\nmax_retries = 10\n").is_ok());
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = AppConfig::from_file(Path::new("/nonexistent/parley.toml")).unwrap_err();
        match err {
            ParleyError::Config { reason } => assert!(reason.contains("/nonexistent/parley.toml")),
            other => panic!("expected Config, got {:?}", other),
        }
    }

    #[test]
    fn test_load_without_path_is_default() {
        assert_eq!(AppConfig::load(None).unwrap(), AppConfig::default());
    }
}
