//! Configuration for the guardrails service

use diet_guard_core::EvaluationMode;
use serde::{Deserialize, Serialize};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Guardrails behaviour
    #[serde(default)]
    pub guardrails: GuardrailsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Guardrails configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardrailsConfig {
    /// Locale used when a request does not name one
    #[serde(default = "default_locale")]
    pub default_locale: String,

    /// Mode used when a request does not name one
    #[serde(default)]
    pub default_mode: EvaluationMode,
}

impl Default for GuardrailsConfig {
    fn default() -> Self {
        Self {
            default_locale: default_locale(),
            default_mode: EvaluationMode::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value helpers
fn default_locale() -> String {
    "nl".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl GuardConfig {
    /// Load configuration: defaults, then the optional file, then
    /// `DIET_GUARD_*` environment variables.
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&GuardConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        // DIET_GUARD__LOGGING__LEVEL=debug
        builder = builder.add_source(
            config::Environment::with_prefix("DIET_GUARD")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GuardConfig::default();
        assert_eq!(config.guardrails.default_locale, "nl");
        assert_eq!(config.guardrails.default_mode, EvaluationMode::PlanChat);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let config = GuardConfig::load(Some("does-not-exist-diet-guard")).unwrap();
        assert_eq!(config.guardrails.default_locale, "nl");
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: GuardConfig =
            serde_json::from_str(r#"{"guardrails": {"default_mode": "batch_generation"}}"#).unwrap();
        assert_eq!(config.guardrails.default_mode, EvaluationMode::BatchGeneration);
        assert_eq!(config.guardrails.default_locale, "nl");
        assert_eq!(config.logging.level, "info");
    }
}
