// envelope.rs — Authorization request and decision response envelopes.
//
// These are the typed shapes that cross the evaluator boundary as JSON.
// A `DecisionResponse` is only ever built from a payload that has already
// passed the response schema (see engine.rs); there is no constructor that
// accepts an unvalidated `serde_json::Value`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Annotation key naming the side effect a statement triggers.
pub const ACTION_ANNOTATION: &str = "action";
/// Annotation key carrying a statement's display name.
pub const NAME_ANNOTATION: &str = "name";
/// Annotation key carrying a statement's user-facing message.
pub const MESSAGE_ANNOTATION: &str = "message";

/// An authorization request as sent to the evaluator.
///
/// `principal`, `action` and `resource` are entity references in
/// `Type::"id"` form. `entities` and `context` are JSON documents passed
/// through as text; `policy` is policy source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationRequest {
    pub principal: String,
    pub action: String,
    pub resource: String,
    pub policy: String,
    pub entities: String,
    pub context: String,
    /// Supplemental schema, omitted from the wire form when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
}

impl AuthorizationRequest {
    /// A request with no entities, an empty context and no schema.
    pub fn new(
        principal: impl Into<String>,
        action: impl Into<String>,
        resource: impl Into<String>,
        policy: impl Into<String>,
    ) -> Self {
        Self {
            principal: principal.into(),
            action: action.into(),
            resource: resource.into(),
            policy: policy.into(),
            entities: "[]".to_string(),
            context: "{}".to_string(),
            schema: None,
        }
    }

    pub fn with_entities(mut self, entities: impl Into<String>) -> Self {
        self.entities = entities.into();
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }
}

/// Overall outcome of an authorization request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    Allow,
    Deny,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Allow => write!(f, "Allow"),
            Decision::Deny => write!(f, "Deny"),
        }
    }
}

/// Side effect a statement asks the caller to carry out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TriggeredAction {
    #[serde(rename = "MFA")]
    Mfa,
    Notify,
}

impl FromStr for TriggeredAction {
    type Err = String;

    /// Case-sensitive: only the exact wire spellings are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MFA" => Ok(TriggeredAction::Mfa),
            "Notify" => Ok(TriggeredAction::Notify),
            other => Err(format!("unknown triggered action '{}'", other)),
        }
    }
}

impl fmt::Display for TriggeredAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggeredAction::Mfa => write!(f, "MFA"),
            TriggeredAction::Notify => write!(f, "Notify"),
        }
    }
}

/// Per-statement outcome within a decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementResult {
    pub policy_id: String,
    /// Whether this statement contributed to the decision.
    pub invoked: bool,
    pub annotations: BTreeMap<String, String>,
}

impl StatementResult {
    pub fn name(&self) -> Option<&str> {
        self.annotations.get(NAME_ANNOTATION).map(String::as_str)
    }

    pub fn message(&self) -> Option<&str> {
        self.annotations.get(MESSAGE_ANNOTATION).map(String::as_str)
    }

    /// The side effect named by the `action` annotation, if it is one we know.
    pub fn triggered_action(&self) -> Option<TriggeredAction> {
        let raw = self.annotations.get(ACTION_ANNOTATION)?;
        match raw.parse() {
            Ok(action) => Some(action),
            Err(reason) => {
                tracing::debug!(policy_id = %self.policy_id, %reason, "ignoring action annotation");
                None
            }
        }
    }
}

/// The evaluator's answer to an authorization request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionResponse {
    pub decision: Decision,
    /// One entry per evaluated statement, in policy order.
    pub reasons: Vec<StatementResult>,
    /// Domain-level problems reported by the evaluator. Empty on full success.
    pub errors: Vec<String>,
}

impl DecisionResponse {
    pub fn is_allowed(&self) -> bool {
        self.decision == Decision::Allow
    }

    /// Statements that contributed to the decision.
    pub fn invoked(&self) -> impl Iterator<Item = &StatementResult> {
        self.reasons.iter().filter(|r| r.invoked)
    }

    /// Distinct side effects requested by invoked statements, in reason order.
    pub fn triggered_actions(&self) -> Vec<TriggeredAction> {
        let mut actions = Vec::new();
        for action in self.invoked().filter_map(StatementResult::triggered_action) {
            if !actions.contains(&action) {
                actions.push(action);
            }
        }
        actions
    }
}
