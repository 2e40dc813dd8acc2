//! Configuration structures loaded from `banyan.toml`.
//!
//! ```toml
//! [engine]
//! verify_round_trip = true
//! log_raw_responses = false
//! # schema_path = "schemas/decision_response.schema.json"
//!
//! [evaluator]
//! base_schema = "schemas/entities.json"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// Default config file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "banyan.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BanyanConfig {
    /// Façade behaviour.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Settings handed to the evaluator when it is constructed.
    #[serde(default)]
    pub evaluator: EvaluatorConfig,
}

/// Façade configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Response schema override. Absent → the checked-in schema for the
    /// active protocol version.
    pub schema_path: Option<PathBuf>,

    /// Re-parse printed policy text and fail if the structured form changed.
    #[serde(default)]
    pub verify_round_trip: bool,

    /// Log every raw evaluator payload at trace level.
    #[serde(default)]
    pub log_raw_responses: bool,
}

/// Evaluator construction settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    /// Schema fragment placed ahead of every validation request's fragments.
    pub base_schema: Option<PathBuf>,
}

impl BanyanConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ProtocolError> {
        let content = std::fs::read_to_string(path).map_err(|e| ProtocolError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ProtocolError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Load configuration, falling back to defaults when the file is missing.
    ///
    /// A file that exists but does not parse is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self, ProtocolError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }
}
