// evaluator.rs — CedarEvaluator: the PolicyEvaluator implementation.
//
// Built once at startup and shared by reference. It keeps only immutable
// configuration (the optional base schema text), so concurrent calls need no
// locking.

use banyan_protocol::{
    AuthorizationRequest, EvaluatorConfig, EvaluatorError, PolicyEvaluator, ValidatePolicyRequest,
};

use crate::error::CedarError;
use crate::{authorize, codec, validate};

/// In-process Cedar policy evaluator.
#[derive(Debug, Clone, Default)]
pub struct CedarEvaluator {
    base_schema: Option<String>,
}

impl CedarEvaluator {
    /// An evaluator with no base schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend `fragment` (schema JSON) to every validation request.
    pub fn with_base_schema(mut self, fragment: impl Into<String>) -> Self {
        self.base_schema = Some(fragment.into());
        self
    }

    /// Build from configuration, reading the base schema file if one is named.
    pub fn from_config(config: &EvaluatorConfig) -> Result<Self, CedarError> {
        let mut evaluator = Self::new();
        if let Some(path) = &config.base_schema {
            let text = std::fs::read_to_string(path).map_err(|source| CedarError::BaseSchema {
                path: path.clone(),
                source,
            })?;
            tracing::info!(path = %path.display(), "loaded base schema fragment");
            evaluator = evaluator.with_base_schema(text);
        }
        Ok(evaluator)
    }

    pub fn base_schema(&self) -> Option<&str> {
        self.base_schema.as_deref()
    }
}

impl PolicyEvaluator for CedarEvaluator {
    fn authorize(&self, request_json: &str) -> Result<String, EvaluatorError> {
        const OP: &str = "authorize";
        let request: AuthorizationRequest = serde_json::from_str(request_json).map_err(|source| {
            CedarError::Envelope {
                operation: OP,
                source,
            }
            .into_evaluator_error(OP)
        })?;
        let response = authorize::authorize(&request);
        serde_json::to_string(&response).map_err(|e| CedarError::Encode(e).into_evaluator_error(OP))
    }

    fn policy_to_json(&self, policy_text: &str) -> Result<String, EvaluatorError> {
        const OP: &str = "policy_to_json";
        let statements =
            codec::policy_to_json(policy_text).map_err(|e| e.into_evaluator_error(OP))?;
        Ok(statements.to_string())
    }

    fn policy_from_json(&self, request_json: &str) -> Result<String, EvaluatorError> {
        codec::policy_from_json(request_json).map_err(|e| e.into_evaluator_error("policy_from_json"))
    }

    fn validate_policy(&self, request_json: &str) -> Result<String, EvaluatorError> {
        const OP: &str = "validate_policy";
        let request: ValidatePolicyRequest = serde_json::from_str(request_json).map_err(|source| {
            CedarError::Envelope {
                operation: OP,
                source,
            }
            .into_evaluator_error(OP)
        })?;
        let result = validate::validate_policy(self.base_schema(), &request);
        serde_json::to_string(&result).map_err(|e| CedarError::Encode(e).into_evaluator_error(OP))
    }
}
