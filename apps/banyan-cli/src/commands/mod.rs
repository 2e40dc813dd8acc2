pub mod authorize;
pub mod policy;
pub mod response;

use std::path::Path;

use anyhow::Context;

/// Read a file named on the command line, naming it in the error.
pub(crate) fn read_input(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
