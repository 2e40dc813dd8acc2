// error.rs — Error types for the Cedar evaluator.
//
// Inside the evaluator these carry what went wrong; at the trait boundary
// they flatten to an EvaluatorError (operation + message). Most of them never
// fail a call: authorize and validate_policy report them as diagnostics.

use std::path::PathBuf;

use banyan_protocol::EvaluatorError;
use thiserror::Error;

/// Errors raised while servicing an evaluator call.
#[derive(Debug, Error)]
pub enum CedarError {
    /// The JSON envelope of a call could not be decoded.
    #[error("malformed {operation} request: {source}")]
    Envelope {
        operation: &'static str,
        source: serde_json::Error,
    },

    /// A request field is blank or cannot be parsed.
    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// Policy source text does not parse.
    #[error("failed to parse policy: {0}")]
    PolicyParse(String),

    /// A schema document or fragment is invalid.
    #[error("invalid schema: {0}")]
    Schema(String),

    /// A structured statement could not be converted to or from policy text.
    #[error("failed to convert statement {index}: {reason}")]
    Conversion { index: usize, reason: String },

    /// Policy templates have no structured statement form here.
    #[error("policy templates are not supported")]
    TemplatesUnsupported,

    /// The configured base schema could not be read.
    #[error("failed to read base schema at {path}: {source}")]
    BaseSchema {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Serializing an evaluator result failed.
    #[error("failed to encode result: {0}")]
    Encode(#[source] serde_json::Error),
}

impl CedarError {
    /// Flatten into the boundary error for `operation`.
    pub fn into_evaluator_error(self, operation: &str) -> EvaluatorError {
        EvaluatorError::new(operation, self.to_string())
    }
}
