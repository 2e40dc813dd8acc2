// policy.rs — Policy conversion and validation subcommands.
//
// `banyan to-json` / `banyan from-json` print to stdout so they compose with
// pipes; `banyan validate` exits non-zero when the policy is invalid.

use std::path::{Path, PathBuf};

use anyhow::Context;
use banyan_protocol::{PolicyEngine, PolicyStatement, ValidatePolicyRequest, ValidationResult};

use super::read_input;

pub fn to_json(engine: &PolicyEngine, path: &Path) -> anyhow::Result<()> {
    let statements = engine.policy_to_json(&read_input(path)?)?;
    println!("{}", serde_json::to_string_pretty(&statements)?);
    Ok(())
}

pub fn from_json(engine: &PolicyEngine, path: &Path) -> anyhow::Result<()> {
    let statements: Vec<PolicyStatement> = serde_json::from_str(&read_input(path)?)
        .with_context(|| format!("{} is not a JSON array of statements", path.display()))?;
    println!("{}", engine.policy_from_json(&statements)?);
    Ok(())
}

pub fn validate(engine: &PolicyEngine, path: &Path, fragments: &[PathBuf]) -> anyhow::Result<()> {
    let request = build_request(path, fragments)?;
    let result = engine.validate_policy(&request)?;
    print!("{}", render(&result));
    if !result.valid {
        anyhow::bail!("policy {} failed validation", path.display());
    }
    Ok(())
}

fn build_request(path: &Path, fragments: &[PathBuf]) -> anyhow::Result<ValidatePolicyRequest> {
    let mut request = ValidatePolicyRequest::new(read_input(path)?);
    for fragment in fragments {
        request = request.with_fragment(read_input(fragment)?);
    }
    Ok(request)
}

fn render(result: &ValidationResult) -> String {
    let mut out = String::new();
    if result.valid {
        out.push_str("Policy is valid.\n");
    } else {
        out.push_str(&format!("Policy is INVALID ({} error(s)):\n", result.errors.len()));
    }
    for error in &result.errors {
        out.push_str(&format!("  error: {}\n", error));
    }
    for warning in &result.warnings {
        out.push_str(&format!("  warning: {}\n", warning));
    }
    out
}
