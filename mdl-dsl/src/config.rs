//! MDL Configuration Module
//!
//! Settings for schema location, validation reporting and serializer layout.
//! Configuration is loaded from environment variables with defaults suitable
//! for development.

use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?} ({reason})")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("missing required environment variable {var}")]
    Missing { var: &'static str },
}

/// How many violations a validation run reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Stop at the first violation.
    #[default]
    FailFast,
    /// Walk the whole tree and report every violation.
    CollectAll,
}

impl FromStr for ValidationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "fail_fast" => Ok(ValidationMode::FailFast),
            "collect_all" => Ok(ValidationMode::CollectAll),
            other => Err(format!("expected fail_fast or collect_all, got {}", other)),
        }
    }
}

// ============================================================================
// MDL CONFIGURATION
// ============================================================================

/// Process-level MDL settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MdlConfig {
    /// Path of the JSON schema document.
    pub schema_path: Option<PathBuf>,

    pub validation_mode: ValidationMode,

    /// Spaces per indentation level in serialized output.
    pub indent_width: usize,
}

impl Default for MdlConfig {
    fn default() -> Self {
        Self {
            schema_path: None,
            validation_mode: ValidationMode::FailFast,
            indent_width: 4,
        }
    }
}

pub const SCHEMA_PATH_VAR: &str = "MDL_SCHEMA_PATH";
pub const VALIDATION_MODE_VAR: &str = "MDL_VALIDATION_MODE";
pub const INDENT_WIDTH_VAR: &str = "MDL_INDENT_WIDTH";

impl MdlConfig {
    /// Create MdlConfig from environment variables.
    ///
    /// Environment variables:
    /// - `MDL_SCHEMA_PATH`: Path of the JSON schema document (default: unset)
    /// - `MDL_VALIDATION_MODE`: "fail_fast" or "collect_all" (default: fail_fast)
    /// - `MDL_INDENT_WIDTH`: Spaces per indentation level (default: 4)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let schema_path = lookup(SCHEMA_PATH_VAR)
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let validation_mode = match lookup(VALIDATION_MODE_VAR) {
            Some(value) => value
                .parse::<ValidationMode>()
                .map_err(|reason| ConfigError::InvalidValue {
                    var: VALIDATION_MODE_VAR,
                    value,
                    reason,
                })?,
            None => ValidationMode::default(),
        };

        let indent_width = match lookup(INDENT_WIDTH_VAR) {
            Some(value) => value
                .trim()
                .parse::<usize>()
                .map_err(|e| ConfigError::InvalidValue {
                    var: INDENT_WIDTH_VAR,
                    value: value.clone(),
                    reason: e.to_string(),
                })?,
            None => 4,
        };

        Ok(Self {
            schema_path,
            validation_mode,
            indent_width,
        })
    }

    /// The schema path, or an error naming the variable to set.
    pub fn require_schema_path(&self) -> Result<&PathBuf, ConfigError> {
        self.schema_path
            .as_ref()
            .ok_or(ConfigError::Missing { var: SCHEMA_PATH_VAR })
    }
}
