// validate.rs — Validate policy text against merged schema fragments.
//
// Fragments are merged in order: the evaluator's base fragment (if any)
// first, then the caller's fragments as supplied. A fragment or policy that
// fails to parse is a validation failure, reported in the result's errors.

use std::str::FromStr;

use banyan_protocol::{ValidatePolicyRequest, ValidationResult};
use cedar_policy::{PolicySet, Schema, SchemaFragment, ValidationMode, Validator};

use crate::error::CedarError;

pub(crate) fn validate_policy(
    base_schema: Option<&str>,
    request: &ValidatePolicyRequest,
) -> ValidationResult {
    match build_validator(base_schema, &request.additional_schema_fragments) {
        Ok(validator) => run(&validator, &request.policy),
        Err(e) => ValidationResult::failed(vec![e.to_string()]),
    }
}

fn build_validator(
    base_schema: Option<&str>,
    fragments: &[String],
) -> Result<Validator, CedarError> {
    let mut parsed = Vec::with_capacity(fragments.len() + 1);
    if let Some(base) = base_schema {
        let fragment = SchemaFragment::from_json_str(base)
            .map_err(|e| CedarError::Schema(format!("base schema: {}", e)))?;
        parsed.push(fragment);
    }
    for (index, text) in fragments.iter().enumerate() {
        let fragment = SchemaFragment::from_json_str(text)
            .map_err(|e| CedarError::Schema(format!("fragment {}: {}", index, e)))?;
        parsed.push(fragment);
    }
    let schema =
        Schema::from_schema_fragments(parsed).map_err(|e| CedarError::Schema(e.to_string()))?;
    Ok(Validator::new(schema))
}

fn run(validator: &Validator, policy: &str) -> ValidationResult {
    let set = match PolicySet::from_str(policy) {
        Ok(set) => set,
        Err(e) => {
            let err = CedarError::PolicyParse(e.to_string());
            return ValidationResult::failed(vec![err.to_string()]);
        }
    };
    let result = validator.validate(&set, ValidationMode::default());
    ValidationResult {
        valid: result.validation_passed(),
        errors: result.validation_errors().map(|e| e.to_string()).collect(),
        warnings: result.validation_warnings().map(|w| w.to_string()).collect(),
    }
}
