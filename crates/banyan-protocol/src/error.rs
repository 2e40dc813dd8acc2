// error.rs — Error types for the policy exchange protocol.
//
// Every failure at the evaluator boundary resolves to one of these variants.
// Callers always receive a value: either a schema-valid result or an explicit
// ProtocolError. Domain-level evaluation problems are NOT errors here; they
// travel inside a valid DecisionResponse's `errors` list.

use std::path::PathBuf;

use thiserror::Error;

use crate::schema::SchemaViolation;

/// Failure reported by an external evaluator operation.
///
/// The evaluator boundary is string-in/string-out, so the only thing it can
/// tell us on failure is which operation failed and a message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} failed: {message}")]
pub struct EvaluatorError {
    /// Boundary operation name (e.g., "authorize", "policy_to_json").
    pub operation: String,
    /// Evaluator-supplied diagnostic.
    pub message: String,
}

impl EvaluatorError {
    pub fn new(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

/// Errors that can occur while exchanging data with the policy evaluator.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The evaluator's raw output is not valid JSON (or not the expected JSON type).
    #[error("evaluator returned malformed JSON from {operation}: {source}")]
    Parse {
        operation: &'static str,
        source: serde_json::Error,
    },

    /// The JSON is well-formed but does not conform to the response schema.
    #[error("response does not conform to schema: {}", summarize(.violations))]
    SchemaValidation { violations: Vec<SchemaViolation> },

    /// Policy source text (or a structured statement) could not be converted.
    #[error("policy could not be parsed: {message}")]
    PolicyParse { message: String },

    /// The evaluator call itself failed.
    #[error("evaluator error: {0}")]
    Evaluator(#[from] EvaluatorError),

    /// Printing then re-parsing a policy set did not reproduce the input.
    #[error("policy round trip changed statement {index}: {detail}")]
    RoundTrip { index: usize, detail: String },

    /// A request could not be serialized for the evaluator.
    #[error("failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),

    /// The schema document itself could not be loaded.
    #[error("failed to load schema from {path}: {reason}")]
    Schema { path: PathBuf, reason: String },

    /// The configuration file could not be read or parsed.
    #[error("invalid configuration at {path}: {reason}")]
    Config { path: PathBuf, reason: String },
}

fn summarize(violations: &[SchemaViolation]) -> String {
    match violations {
        [] => "no violations recorded".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{} (and {} more)", first, rest.len()),
    }
}
