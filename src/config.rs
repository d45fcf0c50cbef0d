use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use validator::Validate;

use crate::type_mapping::{DefaultTypeMappingSource, Dialect};

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Translator configuration with validation
#[derive(Clone, Debug, Validate, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TranslatorConfig {
    /// SQL dialect whose default type mappings are used
    pub dialect: Dialect,

    /// Maximum query expression nesting the translator will recurse into
    #[validate(range(
        min = 1,
        max = 4096,
        message = "Max expression depth must be between 1 and 4096"
    ))]
    pub max_expression_depth: u32,

    /// Whether untranslatable top-level expressions are reported at warn level
    pub log_client_evaluation: bool,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::Ansi,
            max_expression_depth: 512,
            log_client_evaluation: true,
        }
    }
}

impl TranslatorConfig {
    /// Create configuration from environment variables with validation
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            dialect: parse_env_var("RELQ_DIALECT", "ansi")?,
            max_expression_depth: parse_env_var("RELQ_MAX_EXPRESSION_DEPTH", "512")?,
            log_client_evaluation: parse_env_var("RELQ_LOG_CLIENT_EVALUATION", "true")?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from YAML file
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            field: "yaml_file".to_string(),
            value: "file read failed".to_string(),
            source: Box::new(e),
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            field: "yaml_content".to_string(),
            value: content,
            source: Box::new(e),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Default type mapping source for the configured dialect
    pub fn type_mapping_source(&self) -> DefaultTypeMappingSource {
        DefaultTypeMappingSource::for_dialect(self.dialect)
    }
}

/// Parse an environment variable with a default value
fn parse_env_var<T: std::str::FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    value.parse().map_err(|e| ConfigError::Parse {
        field: key.to_string(),
        value,
        source: Box::new(e),
    })
}
