//! Configuration file
//!
//! `formgate.json`, every key optional:
//!
//! ```json
//! { "schema_dir": "./schemas", "pattern_size_limit": 1048576, "log_level": "info" }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::{CliError, CliResult};
use crate::observability::Severity;
use crate::validation::{FieldValidator, DEFAULT_PATTERN_SIZE_LIMIT};

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory of `<key>.json` form schemas (default "./schemas")
    #[serde(default = "default_schema_dir")]
    pub schema_dir: String,

    /// Compiled-size limit for field patterns in bytes (default 1MB)
    #[serde(default = "default_pattern_size_limit")]
    pub pattern_size_limit: usize,

    /// Minimum log severity (default "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_schema_dir() -> String {
    "./schemas".to_string()
}
fn default_pattern_size_limit() -> usize {
    DEFAULT_PATTERN_SIZE_LIMIT
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_dir: default_schema_dir(),
            pattern_size_limit: default_pattern_size_limit(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Load from `path` when given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> CliResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> CliResult<()> {
        if self.pattern_size_limit == 0 {
            return Err(CliError::config_error("pattern_size_limit must be > 0"));
        }

        if self.schema_dir.trim().is_empty() {
            return Err(CliError::config_error("schema_dir must not be empty"));
        }

        self.severity()?;

        Ok(())
    }

    /// Parsed `log_level`
    pub fn severity(&self) -> CliResult<Severity> {
        self.log_level.parse().map_err(CliError::config_error)
    }

    pub fn schema_path(&self) -> &Path {
        Path::new(&self.schema_dir)
    }

    /// Field validator honoring this configuration
    pub fn field_validator(&self) -> FieldValidator {
        FieldValidator::new().with_pattern_size_limit(self.pattern_size_limit)
    }
}
