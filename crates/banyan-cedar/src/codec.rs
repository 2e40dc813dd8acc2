// codec.rs — Cedar policy text ⇄ JSON statements.
//
// Statements are Cedar's JSON policy format with two adjustments so that
// `policy_to_json(policy_from_json(s)) == s` holds:
//
// - Valueless annotations (`@audit`) read as `""`, the same value
//   `authorize` reports for them. `""` prints back as `@audit("")`, which
//   Cedar treats identically.
// - Conditions are printed one clause at a time. Cedar's own printer folds
//   every clause into a single `when`, turning `unless { e }` into
//   `when { !(e) }`; printing clause by clause keeps each `kind` and the
//   clause order.
//
// The law holds for statements in the form `policy_to_json` emits. Cedar
// also accepts escapes such as `{"__entity": {...}}` on input; those print
// fine but read back in the canonical `{"type", "id"}` form.

use std::str::FromStr;

use cedar_policy::{Policy, PolicySet};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::error::CedarError;
use crate::policies::{ordered_policies, positional_id};

#[derive(Debug, Deserialize)]
struct FromJsonRequest {
    policies: Vec<Value>,
}

/// Parse policy text into a JSON array of statements, in source order.
pub(crate) fn policy_to_json(policy_text: &str) -> Result<Value, CedarError> {
    let set =
        PolicySet::from_str(policy_text).map_err(|e| CedarError::PolicyParse(e.to_string()))?;
    if set.templates().next().is_some() {
        return Err(CedarError::TemplatesUnsupported);
    }

    let statements = ordered_policies(&set)
        .into_iter()
        .enumerate()
        .map(|(index, policy)| {
            let mut statement = policy.to_json().map_err(|e| CedarError::Conversion {
                index,
                reason: e.to_string(),
            })?;
            fill_valueless_annotations(&mut statement);
            Ok(statement)
        })
        .collect::<Result<Vec<_>, CedarError>>()?;
    Ok(Value::Array(statements))
}

/// Print a `{"policies": [...]}` request as policy text, one block per statement.
pub(crate) fn policy_from_json(request_json: &str) -> Result<String, CedarError> {
    let request: FromJsonRequest =
        serde_json::from_str(request_json).map_err(|source| CedarError::Envelope {
            operation: "policy_from_json",
            source,
        })?;

    let mut blocks = Vec::with_capacity(request.policies.len());
    for (index, statement) in request.policies.into_iter().enumerate() {
        blocks.push(print_statement(index, statement)?);
    }
    Ok(blocks.join("\n\n"))
}

fn fill_valueless_annotations(statement: &mut Value) {
    if let Some(Value::Object(annotations)) = statement.get_mut("annotations") {
        for value in annotations.values_mut() {
            if value.is_null() {
                *value = Value::String(String::new());
            }
        }
    }
}

/// Print the scope with no conditions, then append each clause in order.
fn print_statement(index: usize, statement: Value) -> Result<String, CedarError> {
    let conversion = |reason: String| CedarError::Conversion { index, reason };

    let Value::Object(mut scope) = statement else {
        return Err(conversion("statement must be a JSON object".to_string()));
    };
    let conditions = match scope.insert("conditions".to_string(), json!([])) {
        None => Vec::new(),
        Some(Value::Array(conditions)) => conditions,
        Some(_) => return Err(conversion("'conditions' must be an array".to_string())),
    };

    let head = print_policy(index, Value::Object(scope))?;
    let head = head.trim_end();
    let mut text = head.strip_suffix(';').unwrap_or(head).to_string();

    for condition in conditions {
        let (kind, body) = split_condition(condition).map_err(conversion)?;
        let expr = print_expression(index, body)?;
        text.push_str(&format!("\n{} {{\n  {}\n}}", kind, expr));
    }
    text.push(';');
    Ok(text)
}

fn split_condition(condition: Value) -> Result<(String, Value), String> {
    let Value::Object(mut clause) = condition else {
        return Err("condition must be a JSON object".to_string());
    };
    let kind = match clause.get("kind").and_then(Value::as_str) {
        Some(kind @ ("when" | "unless")) => kind.to_string(),
        Some(other) => return Err(format!("unknown condition kind '{}'", other)),
        None => return Err("condition is missing 'kind'".to_string()),
    };
    let body = clause
        .remove("body")
        .ok_or_else(|| "condition is missing 'body'".to_string())?;
    Ok((kind, body))
}

/// Print one condition body as a bare Cedar expression.
///
/// The body is wrapped in an unscoped, unannotated `when` statement; with no
/// entity literals or annotations in the head, the first `{` opens the clause
/// and the last `}` closes it.
fn print_expression(index: usize, body: Value) -> Result<String, CedarError> {
    let mut carrier = Map::new();
    carrier.insert("effect".to_string(), json!("permit"));
    carrier.insert("principal".to_string(), json!({ "op": "All" }));
    carrier.insert("action".to_string(), json!({ "op": "All" }));
    carrier.insert("resource".to_string(), json!({ "op": "All" }));
    carrier.insert(
        "conditions".to_string(),
        json!([{ "kind": "when", "body": body }]),
    );
    let printed = print_policy(index, Value::Object(carrier))?;

    match (printed.find('{'), printed.rfind('}')) {
        (Some(open), Some(close)) if open < close => Ok(printed[open + 1..close].trim().to_string()),
        _ => Err(CedarError::Conversion {
            index,
            reason: "printed condition has no clause body".to_string(),
        }),
    }
}

fn print_policy(index: usize, statement: Value) -> Result<String, CedarError> {
    let policy = Policy::from_json(Some(positional_id(index)), statement).map_err(|e| {
        CedarError::Conversion {
            index,
            reason: e.to_string(),
        }
    })?;
    Ok(policy.to_cedar().unwrap_or_else(|| policy.to_string()))
}
