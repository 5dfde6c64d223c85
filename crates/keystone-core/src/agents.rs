//! Built-in deterministic agents.
//!
//! None of these touch the network, the filesystem, or a clock; the same
//! context always yields the same result.

use keystone_contracts::{
    error::HandlerError,
    runtime::{RuntimeContext, RuntimeResult},
};

use crate::traits::AgentHandler;

/// Returns the input unchanged. Seeded into every `AgentRuntime`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoAgent;

impl EchoAgent {
    pub const NAME: &'static str = "echo";
}

impl AgentHandler for EchoAgent {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Deterministic echo agent that returns input as output"
    }

    fn execute(&self, ctx: &RuntimeContext) -> Result<RuntimeResult, HandlerError> {
        Ok(RuntimeResult::ok(ctx, ctx.input()))
    }
}

/// Acknowledges the input with an `OK: ` prefix.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultAgent;

impl DefaultAgent {
    pub const NAME: &'static str = "default";
}

impl AgentHandler for DefaultAgent {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Minimal deterministic agent that acknowledges input"
    }

    fn execute(&self, ctx: &RuntimeContext) -> Result<RuntimeResult, HandlerError> {
        Ok(RuntimeResult::ok(ctx, format!("OK: {}", ctx.input())))
    }
}

/// Wraps the trimmed input in a fixed template.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateReplyAgent;

impl TemplateReplyAgent {
    pub const NAME: &'static str = "example.template_reply";
}

impl AgentHandler for TemplateReplyAgent {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Formats a deterministic response using a fixed prefix"
    }

    fn tags(&self) -> Vec<String> {
        vec!["example".to_string()]
    }

    fn execute(&self, ctx: &RuntimeContext) -> Result<RuntimeResult, HandlerError> {
        Ok(RuntimeResult::ok(
            ctx,
            format!("[template-reply] {}", ctx.input().trim()),
        ))
    }
}

/// Lists the context's metadata keys in sorted order.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataEchoAgent;

impl MetadataEchoAgent {
    pub const NAME: &'static str = "example.metadata_echo";
}

impl AgentHandler for MetadataEchoAgent {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Echoes context metadata keys in stable sorted order"
    }

    fn tags(&self) -> Vec<String> {
        vec!["example".to_string()]
    }

    fn execute(&self, ctx: &RuntimeContext) -> Result<RuntimeResult, HandlerError> {
        let mut keys: Vec<&str> = ctx.metadata().keys().map(String::as_str).collect();
        keys.sort_unstable();
        let listed = if keys.is_empty() {
            "<none>".to_string()
        } else {
            keys.join(",")
        };
        Ok(RuntimeResult::ok(ctx, format!("metadata_keys={listed}")))
    }
}
