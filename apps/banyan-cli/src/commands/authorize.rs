// authorize.rs — `banyan authorize`: evaluate a request file.

use std::path::Path;

use anyhow::Context;
use banyan_protocol::{AuthorizationRequest, DecisionResponse, PolicyEngine};

use super::read_input;

pub fn execute(engine: &PolicyEngine, path: &Path) -> anyhow::Result<()> {
    let request: AuthorizationRequest = serde_json::from_str(&read_input(path)?)
        .with_context(|| format!("{} is not an authorization request", path.display()))?;

    let response = engine.invoke(&request)?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    eprintln!("{}", summary(&response));

    if !response.errors.is_empty() {
        tracing::warn!(count = response.errors.len(), "evaluator reported errors");
    }
    Ok(())
}

/// One-line summary: decision, invoked statements, triggered actions.
fn summary(response: &DecisionResponse) -> String {
    let invoked: Vec<&str> = response
        .invoked()
        .map(|r| r.name().unwrap_or(&r.policy_id))
        .collect();
    let actions: Vec<String> = response
        .triggered_actions()
        .iter()
        .map(ToString::to_string)
        .collect();

    let mut line = format!("{}", response.decision);
    if !invoked.is_empty() {
        line.push_str(&format!(" by {}", invoked.join(", ")));
    }
    if !actions.is_empty() {
        line.push_str(&format!(" (triggers: {})", actions.join(", ")));
    }
    line
}
