// codec.rs — Policy text ⇄ structured statements.
//
// Parsing and printing are done by the evaluator. The codec owns the contract
// around them:
//
// - to_json keeps statement order and annotations exactly as returned, and a
//   failed parse is a PolicyParse error, never an empty list.
// - from_json hands the statements over in order. With round-trip
//   verification on, the printed text is parsed again and must reproduce the
//   input statement for statement.

use serde::Serialize;
use serde_json::Value;

use crate::error::ProtocolError;
use crate::evaluator::PolicyEvaluator;
use crate::statement::{first_difference, PolicyStatement};

/// Wire form of a `policy_from_json` call.
#[derive(Debug, Serialize)]
struct FromJsonRequest<'a> {
    policies: &'a [PolicyStatement],
}

/// Converts between policy text and structured statements via an evaluator.
pub struct PolicyCodec<'a> {
    evaluator: &'a dyn PolicyEvaluator,
    verify_round_trip: bool,
}

impl<'a> PolicyCodec<'a> {
    pub fn new(evaluator: &'a dyn PolicyEvaluator) -> Self {
        Self {
            evaluator,
            verify_round_trip: false,
        }
    }

    /// Check every `from_json` result by parsing it back.
    pub fn verify_round_trip(mut self, enabled: bool) -> Self {
        self.verify_round_trip = enabled;
        self
    }

    /// Parse policy source text into statements, in source order.
    pub fn to_json(&self, policy_text: &str) -> Result<Vec<PolicyStatement>, ProtocolError> {
        let raw = self.evaluator.policy_to_json(policy_text).map_err(|e| {
            tracing::warn!(error = %e, "evaluator rejected policy text");
            ProtocolError::PolicyParse { message: e.message }
        })?;
        decode_statements(&raw)
    }

    /// Print statements back to policy source text.
    ///
    /// With verification on, statements must be in the canonical form
    /// `to_json` produces; any other encoding fails with `RoundTrip`.
    pub fn from_json(&self, statements: &[PolicyStatement]) -> Result<String, ProtocolError> {
        let request = serde_json::to_string(&FromJsonRequest {
            policies: statements,
        })
        .map_err(ProtocolError::Encode)?;

        let text = self.evaluator.policy_from_json(&request).map_err(|e| {
            tracing::warn!(error = %e, "evaluator could not print statements");
            ProtocolError::PolicyParse { message: e.message }
        })?;

        if self.verify_round_trip {
            let reparsed = self.to_json(&text)?;
            if let Some((index, detail)) = first_difference(statements, &reparsed) {
                tracing::warn!(index, %detail, "policy round trip mismatch");
                return Err(ProtocolError::RoundTrip { index, detail });
            }
        }
        Ok(text)
    }
}

/// Decode the evaluator's `policy_to_json` output.
fn decode_statements(raw: &str) -> Result<Vec<PolicyStatement>, ProtocolError> {
    let value: Value = serde_json::from_str(raw).map_err(|source| ProtocolError::Parse {
        operation: "policy_to_json",
        source,
    })?;
    serde_json::from_value(value).map_err(|e| ProtocolError::PolicyParse {
        message: format!("evaluator returned statements in an unexpected shape: {}", e),
    })
}
