//! Subcommand implementations.
//!
//! Each command renders its output to a `String` so the binary only has to
//! print it and pick an exit code.

use clap::ValueEnum;
use serde_json::{json, Map, Value};
use thiserror::Error;

use keystone_contracts::{
    error::KeystoneError,
    registry::{Registration, RegistrySpec},
    runtime::{RequestMeta, RuntimeRequest, DEFAULT_MODE},
};
use keystone_core::{AgentRuntime, DefaultAgent, KeywordSafetyGate, MetadataEchoAgent, TemplateReplyAgent};
use keystone_policy::PolicyBook;
use keystone_registry::VersionedRegistry;

use crate::catalog::Catalog;

pub const CLI_NAME: &str = "keystone";

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Keystone(#[from] KeystoneError),

    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Format {
    #[default]
    Text,
    Json,
}

/// What a command produced. `success = false` maps to exit code 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub body: String,
    pub success: bool,
}

impl CommandOutput {
    fn ok(body: String) -> Self {
        Self { body, success: true }
    }
}

fn pretty(value: &Value) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn version(format: Format) -> Result<CommandOutput, CliError> {
    let version = env!("CARGO_PKG_VERSION");
    let body = match format {
        Format::Json => pretty(&json!({ "name": CLI_NAME, "version": version }))?,
        Format::Text => format!("{CLI_NAME} version\nversion: {version}"),
    };
    Ok(CommandOutput::ok(body))
}

pub fn agents(catalog: &Catalog, include_disabled: bool, format: Format) -> Result<CommandOutput, CliError> {
    let registry = catalog.agent_registry()?;
    render_listing("agents", &registry, include_disabled, format, |r| {
        (r.spec.agent_name.as_str(), r.spec.version.as_deref(), &r.spec.tags)
    })
}

pub fn tools(catalog: &Catalog, include_disabled: bool, format: Format) -> Result<CommandOutput, CliError> {
    let registry = catalog.tool_registry()?;
    render_listing("tools", &registry, include_disabled, format, |r| {
        (r.spec.tool_name.as_str(), r.spec.version.as_deref(), &r.spec.tags)
    })
}

fn render_listing<S, F>(
    label: &str,
    registry: &VersionedRegistry<S>,
    include_disabled: bool,
    format: Format,
    fields: F,
) -> Result<CommandOutput, CliError>
where
    S: RegistrySpec,
    F: for<'a> Fn(&'a Registration<S>) -> (&'a str, Option<&'a str>, &'a Vec<String>),
{
    let entries = registry.list_all(include_disabled);
    let name_key = format!("{}_name", S::KIND);

    let body = match format {
        Format::Json => {
            let items: Vec<Value> = entries
                .iter()
                .map(|&r| {
                    let (name, version, tags) = fields(r);
                    let mut item = Map::new();
                    item.insert(name_key.clone(), json!(name));
                    item.insert("version".to_string(), json!(version));
                    item.insert("enabled".to_string(), json!(r.enabled));
                    item.insert("tags".to_string(), json!(tags));
                    Value::Object(item)
                })
                .collect();
            let mut payload = Map::new();
            payload.insert("count".to_string(), json!(items.len()));
            payload.insert(label.to_string(), Value::Array(items));
            pretty(&Value::Object(payload))?
        }
        Format::Text => {
            let mut lines = vec![format!("{CLI_NAME} {label}")];
            for &r in &entries {
                let (name, version, tags) = fields(r);
                lines.push(format!(
                    "{name} | version={} | enabled={} | tags={}",
                    version.unwrap_or("none"),
                    r.enabled,
                    tags.join(",")
                ));
            }
            lines.push(format!("count: {}", entries.len()));
            lines.join("\n")
        }
    };
    Ok(CommandOutput::ok(body))
}

/// A runtime with every built-in agent registered.
pub fn builtin_runtime(blocked_terms: &[String]) -> Result<AgentRuntime, CliError> {
    let mut runtime = if blocked_terms.is_empty() {
        AgentRuntime::new()
    } else {
        AgentRuntime::new().with_safety_gate(KeywordSafetyGate::new(blocked_terms))
    };
    runtime.register_agent(DefaultAgent)?;
    runtime.register_agent(TemplateReplyAgent)?;
    runtime.register_agent(MetadataEchoAgent)?;
    Ok(runtime)
}

/// Run a built-in agent.
///
/// Only built-in agents have handlers. The catalog contributes enabled
/// flags: a built-in agent listed with `enabled = false` is refused as not
/// available. Catalog agents without a built-in handler are not found.
pub fn run(
    catalog: &Catalog,
    agent: &str,
    input: &str,
    trace_id: Option<String>,
    mode: Option<String>,
    blocked_terms: &[String],
) -> Result<CommandOutput, CliError> {
    let mut runtime = builtin_runtime(blocked_terms)?;
    for entry in &catalog.agents {
        let name = entry.spec.agent_name.as_str();
        if !entry.enabled && runtime.has_agent(name) {
            runtime.disable_agent(name)?;
        }
    }
    let mut request = RuntimeRequest::new(agent, input);
    request.meta = Some(RequestMeta {
        trace_id,
        mode: mode.unwrap_or_else(|| DEFAULT_MODE.to_string()),
    });

    let result = runtime.run_request(request);
    Ok(CommandOutput {
        body: serde_json::to_string_pretty(&result)?,
        success: result.is_ok(),
    })
}

/// Persona catalogue with the agents assigned to each persona.
pub fn personas(catalog: &Catalog, format: Format) -> Result<CommandOutput, CliError> {
    let registry = catalog.persona_registry()?;
    let personas = registry.list_personas();

    let body = match format {
        Format::Json => {
            let items: Vec<Value> = personas
                .iter()
                .map(|p| {
                    json!({
                        "persona": p.persona,
                        "display_name": p.display_name,
                        "description": p.description,
                        "agents": registry.agents_for_persona(&p.persona),
                    })
                })
                .collect();
            pretty(&json!({ "count": items.len(), "personas": items }))?
        }
        Format::Text => {
            let mut lines = vec![format!("{CLI_NAME} personas")];
            for p in &personas {
                lines.push(format!(
                    "{} | display={} | agents={}",
                    p.persona,
                    p.display_name,
                    registry.agents_for_persona(&p.persona).join(",")
                ));
            }
            lines.push(format!("count: {}", personas.len()));
            lines.join("\n")
        }
    };
    Ok(CommandOutput::ok(body))
}

pub fn route(catalog: &Catalog, text: &str) -> Result<CommandOutput, CliError> {
    let router = catalog.router()?;
    let result = router.route(text);
    Ok(CommandOutput {
        body: serde_json::to_string_pretty(&result)?,
        success: result.matched,
    })
}

pub fn check(book: &PolicyBook, persona: &str, tool: &str) -> Result<CommandOutput, CliError> {
    let decision = book.authorize(persona, tool);
    let body = pretty(&json!({
        "persona": persona,
        "tool": tool,
        "allowed": decision.allowed,
        "reason": decision.reason,
    }))?;
    Ok(CommandOutput {
        body,
        success: decision.allowed,
    })
}
