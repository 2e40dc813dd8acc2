// evaluator.rs — The boundary to the policy evaluator.
//
// The evaluator parses, prints, validates and evaluates policies. This crate
// never looks inside policy semantics; it only marshals JSON strings across
// this trait and checks what comes back.
//
// Every method is string-in/string-out, synchronous and side-effect free from
// the caller's point of view. Implementations must be safe to call from many
// threads at once (`Send + Sync`): the engine shares one handle across every
// caller and takes no lock around it.

use std::sync::Arc;

use crate::error::EvaluatorError;

/// Operations the external policy evaluator must provide.
pub trait PolicyEvaluator: Send + Sync {
    /// Evaluate a serialized `AuthorizationRequest`.
    ///
    /// Returns a serialized `DecisionResponse` candidate. The output is not
    /// trusted until it has been validated against the response schema.
    fn authorize(&self, request_json: &str) -> Result<String, EvaluatorError>;

    /// Parse policy source text into a JSON array of structured statements.
    fn policy_to_json(&self, policy_text: &str) -> Result<String, EvaluatorError>;

    /// Print `{"policies": [...]}` back to policy source text.
    fn policy_from_json(&self, request_json: &str) -> Result<String, EvaluatorError>;

    /// Validate `{"policy": ..., "additional_schema_fragments": [...]}`.
    ///
    /// Returns a serialized `ValidationResult`.
    fn validate_policy(&self, request_json: &str) -> Result<String, EvaluatorError>;
}

impl<T: PolicyEvaluator + ?Sized> PolicyEvaluator for Arc<T> {
    fn authorize(&self, request_json: &str) -> Result<String, EvaluatorError> {
        (**self).authorize(request_json)
    }

    fn policy_to_json(&self, policy_text: &str) -> Result<String, EvaluatorError> {
        (**self).policy_to_json(policy_text)
    }

    fn policy_from_json(&self, request_json: &str) -> Result<String, EvaluatorError> {
        (**self).policy_from_json(request_json)
    }

    fn validate_policy(&self, request_json: &str) -> Result<String, EvaluatorError> {
        (**self).validate_policy(request_json)
    }
}
