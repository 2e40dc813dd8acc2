// statement.rs — Structured policy statements.
//
// A statement is the JSON form of one `permit`/`forbid` rule. The scope
// constraints and condition bodies are kept as opaque JSON: their grammar
// belongs to the evaluator, and this layer only has to carry them through
// unchanged. What this layer does own is statement order and annotations.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Whether a statement grants or blocks access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    Permit,
    Forbid,
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::Permit => write!(f, "permit"),
            Effect::Forbid => write!(f, "forbid"),
        }
    }
}

/// One policy statement in structured form.
///
/// The round-trip law holds for statements in the form the evaluator's
/// `policy_to_json` emits. Alternate encodings it accepts on input (entity
/// escapes, for one) print correctly but read back in that canonical form.
/// A valueless annotation such as `@audit` reads as `""`.
///
/// ```json
/// {
///   "effect": "forbid",
///   "principal": { "op": "All" },
///   "action": { "op": "==", "entity": { "type": "Action", "id": "transfer" } },
///   "resource": { "op": "All" },
///   "conditions": [ { "kind": "when", "body": { "...": "..." } } ],
///   "annotations": { "action": "MFA" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyStatement {
    pub effect: Effect,
    /// Principal scope constraint.
    pub principal: Value,
    /// Action scope constraint.
    pub action: Value,
    /// Resource scope constraint.
    pub resource: Value,
    /// `when`/`unless` clauses, in source order.
    #[serde(default)]
    pub conditions: Vec<Value>,
    /// Statement annotations. Keys are unique per statement.
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

impl PolicyStatement {
    /// Look up an annotation value.
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).map(String::as_str)
    }
}

/// Compare two statement sequences, returning the first index that differs.
///
/// Used to check the round-trip law: statements, order, and annotations must
/// all survive text printing and re-parsing.
pub fn first_difference(
    expected: &[PolicyStatement],
    actual: &[PolicyStatement],
) -> Option<(usize, String)> {
    for (index, (want, got)) in expected.iter().zip(actual.iter()).enumerate() {
        if want == got {
            continue;
        }
        let detail = if want.effect != got.effect {
            format!("effect {} became {}", want.effect, got.effect)
        } else if want.annotations != got.annotations {
            format!(
                "annotations {:?} became {:?}",
                want.annotations, got.annotations
            )
        } else if want.conditions != got.conditions {
            "conditions differ".to_string()
        } else {
            "scope constraints differ".to_string()
        };
        return Some((index, detail));
    }
    if expected.len() != actual.len() {
        return Some((
            expected.len().min(actual.len()),
            format!("expected {} statements, got {}", expected.len(), actual.len()),
        ));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn statement(effect: Effect, annotations: &[(&str, &str)]) -> PolicyStatement {
        PolicyStatement {
            effect,
            principal: json!({ "op": "All" }),
            action: json!({ "op": "All" }),
            resource: json!({ "op": "All" }),
            conditions: vec![],
            annotations: annotations
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn deserializes_structured_statement() {
        let value = json!({
            "effect": "permit",
            "principal": { "op": "==", "entity": { "type": "User", "id": "alice" } },
            "action": { "op": "All" },
            "resource": { "op": "All" },
            "conditions": [],
            "annotations": { "name": "alice-can" }
        });
        let parsed: PolicyStatement = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.effect, Effect::Permit);
        assert_eq!(parsed.annotation("name"), Some("alice-can"));
        assert_eq!(parsed.principal["entity"]["id"], "alice");
    }

    #[test]
    fn valueless_annotation_is_an_empty_string() {
        let value = json!({
            "effect": "permit",
            "principal": { "op": "All" },
            "action": { "op": "All" },
            "resource": { "op": "All" },
            "annotations": { "audit": "" }
        });
        let parsed: PolicyStatement = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.annotation("audit"), Some(""));
        assert_eq!(parsed.annotation("name"), None);
    }

    #[test]
    fn missing_conditions_and_annotations_default_to_empty() {
        let value = json!({
            "effect": "forbid",
            "principal": { "op": "All" },
            "action": { "op": "All" },
            "resource": { "op": "All" }
        });
        let parsed: PolicyStatement = serde_json::from_value(value).unwrap();
        assert!(parsed.conditions.is_empty());
        assert!(parsed.annotations.is_empty());
    }

    #[test]
    fn unknown_effect_is_rejected() {
        let value = json!({
            "effect": "allow",
            "principal": {}, "action": {}, "resource": {}
        });
        assert!(serde_json::from_value::<PolicyStatement>(value).is_err());
    }

    #[test]
    fn identical_sequences_have_no_difference() {
        let a = vec![statement(Effect::Permit, &[("id", "a")]), statement(Effect::Forbid, &[])];
        assert_eq!(first_difference(&a, &a.clone()), None);
    }

    #[test]
    fn reordering_is_a_difference() {
        let a = vec![statement(Effect::Permit, &[]), statement(Effect::Forbid, &[])];
        let b = vec![a[1].clone(), a[0].clone()];
        let (index, detail) = first_difference(&a, &b).unwrap();
        assert_eq!(index, 0);
        assert!(detail.contains("effect"));
    }

    #[test]
    fn dropped_annotation_is_a_difference() {
        let a = vec![statement(Effect::Permit, &[("action", "MFA")])];
        let b = vec![statement(Effect::Permit, &[])];
        let (_, detail) = first_difference(&a, &b).unwrap();
        assert!(detail.contains("annotations"));
    }

    #[test]
    fn dropped_statement_is_a_difference() {
        let a = vec![statement(Effect::Permit, &[]), statement(Effect::Forbid, &[])];
        let (index, detail) = first_difference(&a, &a[..1]).unwrap();
        assert_eq!(index, 1);
        assert!(detail.contains("expected 2 statements, got 1"));
    }
}
