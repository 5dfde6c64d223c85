//! Keystone developer CLI.
//!
//! Inspects the agent, tool and persona catalogs, runs built-in agents
//! through the runtime, resolves intents and checks tool permissions.
//!
//! Usage:
//!   cargo run -p keystone-cli -- agents --include-disabled
//!   cargo run -p keystone-cli -- run --agent echo --input hello
//!   cargo run -p keystone-cli -- route "please deploy the api"
//!   cargo run -p keystone-cli -- check --persona docs --tool shell.exec

mod catalog;
mod commands;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use keystone_policy::PolicyBook;

use catalog::Catalog;
use commands::{CliError, CommandOutput, Format};

/// Policy book compiled into the binary, used when `--policy` is absent.
pub const DEFAULT_POLICY: &str = include_str!("../config/policy.toml");

// ── CLI definition ────────────────────────────────────────────────────────────

/// Keystone: agent registry, routing, permission and runtime inspection.
#[derive(Parser)]
#[command(
    name = "keystone",
    about = "Keystone developer CLI (registry, routing, permissions, runtime)",
    version
)]
struct Cli {
    /// Catalog TOML with agents, tools and routing rules.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Policy book TOML with persona policies and tool permissions.
    #[arg(long, global = true)]
    policy: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show version metadata.
    Version {
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// List catalog agents.
    Agents {
        #[arg(long)]
        include_disabled: bool,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// List catalog tools.
    Tools {
        #[arg(long)]
        include_disabled: bool,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// List personas and the agents assigned to them.
    Personas {
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Run a built-in agent and print the result as JSON.
    ///
    /// Catalog `enabled = false` entries disable the matching built-in agent.
    Run {
        #[arg(long)]
        agent: String,
        #[arg(long)]
        input: String,
        #[arg(long)]
        trace_id: Option<String>,
        #[arg(long)]
        mode: Option<String>,
        /// Deny input containing this term (repeatable).
        #[arg(long = "block")]
        blocked_terms: Vec<String>,
    },
    /// Resolve intent text against the catalog routing rules.
    Route { text: String },
    /// Check whether a persona may invoke a tool.
    Check {
        #[arg(long)]
        persona: String,
        #[arg(long)]
        tool: String,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    match dispatch(cli) {
        Ok(output) => {
            println!("{}", output.body);
            if !output.success {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("keystone error: {}", e);
            std::process::exit(2);
        }
    }
}

fn dispatch(cli: Cli) -> Result<CommandOutput, CliError> {
    match cli.command {
        Command::Version { format } => commands::version(format),
        Command::Agents {
            include_disabled,
            format,
        } => commands::agents(&load_catalog(cli.config.as_deref())?, include_disabled, format),
        Command::Tools {
            include_disabled,
            format,
        } => commands::tools(&load_catalog(cli.config.as_deref())?, include_disabled, format),
        Command::Run {
            agent,
            input,
            trace_id,
            mode,
            blocked_terms,
        } => commands::run(
            &load_catalog(cli.config.as_deref())?,
            &agent,
            &input,
            trace_id,
            mode,
            &blocked_terms,
        ),
        Command::Personas { format } => {
            commands::personas(&load_catalog(cli.config.as_deref())?, format)
        }
        Command::Route { text } => commands::route(&load_catalog(cli.config.as_deref())?, &text),
        Command::Check { persona, tool } => {
            commands::check(&load_policy(cli.policy.as_deref())?, &persona, &tool)
        }
    }
}

fn load_catalog(path: Option<&Path>) -> Result<Catalog, CliError> {
    debug!(path = ?path, "loading catalog");
    Ok(Catalog::load(path)?)
}

fn load_policy(path: Option<&Path>) -> Result<PolicyBook, CliError> {
    debug!(path = ?path, "loading policy book");
    let book = match path {
        Some(path) => PolicyBook::from_file(path)?,
        None => PolicyBook::from_toml_str(DEFAULT_POLICY)?,
    };
    Ok(book)
}
