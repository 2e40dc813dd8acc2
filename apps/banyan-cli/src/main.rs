//! # banyan-cli
//!
//! Command-line interface for the Banyan policy exchange protocol.
//!
//! - `banyan authorize <request.json>` — evaluate an authorization request
//! - `banyan to-json <policy.cedar>` — policy text → structured statements
//! - `banyan from-json <statements.json>` — structured statements → policy text
//! - `banyan validate <policy.cedar> --fragment <schema.json>` — type-check a policy
//! - `banyan check-response <response.json>` — check a raw decision payload

mod commands;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use banyan_cedar::CedarEvaluator;
use banyan_protocol::{BanyanConfig, PolicyEngine, DEFAULT_CONFIG_FILE};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Banyan — authorize requests and manage policies.
#[derive(Parser)]
#[command(name = "banyan", version, about)]
struct Cli {
    /// Configuration file (missing file → defaults).
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate an authorization request (JSON file).
    Authorize {
        /// Path to the request.
        request: PathBuf,
    },
    /// Convert policy text to structured statements.
    ToJson {
        /// Path to the policy source.
        policy: PathBuf,
    },
    /// Convert structured statements back to policy text.
    FromJson {
        /// Path to a JSON array of statements.
        statements: PathBuf,
    },
    /// Validate a policy against schema fragments.
    Validate {
        /// Path to the policy source.
        policy: PathBuf,
        /// Schema fragment files, merged in the order given.
        #[arg(long = "fragment")]
        fragments: Vec<PathBuf>,
    },
    /// Check a raw decision payload against the response schema.
    CheckResponse {
        /// Path to the payload.
        response: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("banyan_protocol=info".parse()?)
                .add_directive("banyan_cedar=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();
    let config = BanyanConfig::load_or_default(&cli.config)?;

    // One evaluator handle for the whole process, passed into the engine.
    let evaluator = CedarEvaluator::from_config(&config.evaluator)
        .context("failed to initialize policy evaluator")?;
    let engine = PolicyEngine::with_config(Arc::new(evaluator), config.engine)?;

    match &cli.command {
        Commands::Authorize { request } => commands::authorize::execute(&engine, request),
        Commands::ToJson { policy } => commands::policy::to_json(&engine, policy),
        Commands::FromJson { statements } => commands::policy::from_json(&engine, statements),
        Commands::Validate { policy, fragments } => {
            commands::policy::validate(&engine, policy, fragments)
        }
        Commands::CheckResponse { response } => commands::response::execute(&engine, response),
    }
}
