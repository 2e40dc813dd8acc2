// response.rs — `banyan check-response`: run the response schema alone.

use std::path::Path;

use banyan_protocol::{PolicyEngine, ProtocolError};

use super::read_input;

pub fn execute(engine: &PolicyEngine, path: &Path) -> anyhow::Result<()> {
    let raw = read_input(path)?;
    match engine.parse_response(&raw) {
        Ok(response) => {
            println!(
                "Response conforms: decision {}, {} reason(s), {} error(s).",
                response.decision,
                response.reasons.len(),
                response.errors.len()
            );
            Ok(())
        }
        Err(ProtocolError::SchemaValidation { violations }) => {
            println!("Response does NOT conform ({} violation(s)):", violations.len());
            for violation in &violations {
                println!("  {}", violation);
            }
            anyhow::bail!("{} failed schema validation", path.display());
        }
        Err(e) => Err(e.into()),
    }
}
