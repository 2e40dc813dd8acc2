// engine.rs — Invocation façade over the policy evaluator.
//
// PolicyEngine is the single entry point callers use. `invoke()`:
//
// 1. Serializes the request to JSON.
// 2. Calls the evaluator with it.
// 3. Parses the raw output → ParseError on failure.
// 4. Validates it against the response schema → SchemaValidationError.
// 5. Only then converts it into a typed DecisionResponse.
//
// A DecisionResponse never leaves this module without passing step 4.
// The engine holds no mutable state: one instance can serve any number of
// threads as long as the evaluator itself is thread-safe (the trait requires
// `Send + Sync`).

use std::sync::Arc;

use serde_json::Value;

use crate::codec::PolicyCodec;
use crate::config::EngineConfig;
use crate::envelope::{AuthorizationRequest, DecisionResponse};
use crate::error::ProtocolError;
use crate::evaluator::PolicyEvaluator;
use crate::schema::{JsonSchema, SchemaViolation, PROTOCOL_VERSION};
use crate::statement::PolicyStatement;
use crate::validation::{ValidatePolicyRequest, ValidationResult};

/// The invocation façade.
pub struct PolicyEngine {
    evaluator: Arc<dyn PolicyEvaluator>,
    response_schema: JsonSchema,
    config: EngineConfig,
}

impl PolicyEngine {
    /// Build an engine with default configuration and the embedded schema.
    pub fn new(evaluator: Arc<dyn PolicyEvaluator>) -> Result<Self, ProtocolError> {
        Self::with_config(evaluator, EngineConfig::default())
    }

    /// Build an engine, loading the response schema named by `config` if any.
    pub fn with_config(
        evaluator: Arc<dyn PolicyEvaluator>,
        config: EngineConfig,
    ) -> Result<Self, ProtocolError> {
        let response_schema = match &config.schema_path {
            Some(path) => {
                tracing::info!(path = %path.display(), "loading response schema override");
                JsonSchema::load(path)?
            }
            None => JsonSchema::decision_response(PROTOCOL_VERSION)?,
        };
        Ok(Self {
            evaluator,
            response_schema,
            config,
        })
    }

    pub fn response_schema(&self) -> &JsonSchema {
        &self.response_schema
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Evaluate an authorization request.
    ///
    /// Returns either a schema-valid response or an explicit error. Domain
    /// problems reported by the evaluator arrive in `DecisionResponse::errors`.
    pub fn invoke(&self, request: &AuthorizationRequest) -> Result<DecisionResponse, ProtocolError> {
        let payload = serde_json::to_string(request).map_err(ProtocolError::Encode)?;
        tracing::debug!(
            principal = %request.principal,
            action = %request.action,
            resource = %request.resource,
            "invoking policy evaluator"
        );

        let raw = self.evaluator.authorize(&payload).map_err(|e| {
            tracing::warn!(error = %e, "evaluator failed to authorize");
            ProtocolError::from(e)
        })?;
        if self.config.log_raw_responses {
            tracing::trace!(raw = %raw, "raw evaluator response");
        }

        let response = self.parse_response(&raw)?;
        tracing::debug!(
            decision = %response.decision,
            reasons = response.reasons.len(),
            errors = response.errors.len(),
            "policy decision"
        );
        Ok(response)
    }

    /// Parse and validate a raw `authorize` payload.
    pub fn parse_response(&self, raw: &str) -> Result<DecisionResponse, ProtocolError> {
        parse_response_payload(raw, &self.response_schema)
    }

    /// Parse policy text into structured statements.
    pub fn policy_to_json(&self, policy_text: &str) -> Result<Vec<PolicyStatement>, ProtocolError> {
        self.codec().to_json(policy_text)
    }

    /// Print structured statements back to policy text.
    pub fn policy_from_json(&self, statements: &[PolicyStatement]) -> Result<String, ProtocolError> {
        self.codec().from_json(statements)
    }

    /// Validate a policy against the evaluator's schema plus `request`'s fragments.
    pub fn validate_policy(
        &self,
        request: &ValidatePolicyRequest,
    ) -> Result<ValidationResult, ProtocolError> {
        let payload = serde_json::to_string(request).map_err(ProtocolError::Encode)?;
        let raw = self.evaluator.validate_policy(&payload)?;
        let value: Value = serde_json::from_str(&raw).map_err(|source| ProtocolError::Parse {
            operation: "validate_policy",
            source,
        })?;
        let result: ValidationResult =
            serde_json::from_value(value).map_err(|e| ProtocolError::SchemaValidation {
                violations: vec![SchemaViolation::new("", e.to_string())],
            })?;
        if !result.valid {
            tracing::debug!(errors = result.errors.len(), "policy failed validation");
        }
        Ok(result)
    }

    fn codec(&self) -> PolicyCodec<'_> {
        PolicyCodec::new(self.evaluator.as_ref()).verify_round_trip(self.config.verify_round_trip)
    }
}

/// Parse a raw decision payload and validate it against `schema`.
///
/// Never panics and never returns an unvalidated response.
pub fn parse_response_payload(
    raw: &str,
    schema: &JsonSchema,
) -> Result<DecisionResponse, ProtocolError> {
    let value: Value = serde_json::from_str(raw).map_err(|source| {
        tracing::warn!(error = %source, "evaluator response is not valid JSON");
        ProtocolError::Parse {
            operation: "authorize",
            source,
        }
    })?;

    let violations = schema.validate(&value);
    if !violations.is_empty() {
        tracing::warn!(
            count = violations.len(),
            first = %violations[0],
            "evaluator response failed schema validation"
        );
        return Err(ProtocolError::SchemaValidation { violations });
    }

    // A schema override may be looser than the typed model; treat any
    // remaining mismatch as a schema failure too.
    serde_json::from_value(value).map_err(|e| ProtocolError::SchemaValidation {
        violations: vec![SchemaViolation::new("", e.to_string())],
    })
}
