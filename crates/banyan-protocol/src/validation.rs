// validation.rs — Policy validation request/result envelopes.
//
// Validation checks policy text against a declared entity/attribute schema.
// The schema is assembled by the evaluator from an ordered list of fragments;
// when two fragments define the same thing, order decides, so the list is
// kept exactly as the caller supplied it.

use serde::{Deserialize, Serialize};

/// Input to `PolicyEvaluator::validate_policy`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatePolicyRequest {
    pub policy: String,
    /// Schema fragments (JSON text), merged in this order.
    #[serde(default)]
    pub additional_schema_fragments: Vec<String>,
}

impl ValidatePolicyRequest {
    pub fn new(policy: impl Into<String>) -> Self {
        Self {
            policy: policy.into(),
            additional_schema_fragments: Vec::new(),
        }
    }

    /// Append a fragment after any already supplied.
    pub fn with_fragment(mut self, fragment: impl Into<String>) -> Self {
        self.additional_schema_fragments.push(fragment.into());
        self
    }
}

/// Outcome of validating a policy. Diagnostics are passed through verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn passed() -> Self {
        Self {
            valid: true,
            ..Self::default()
        }
    }

    pub fn failed(errors: Vec<String>) -> Self {
        Self {
            valid: false,
            errors,
            warnings: Vec::new(),
        }
    }
}
