//! Request, context, and result types for agent execution.
//!
//! One `RuntimeContext` is built per top-level request and is never shared.
//! Every outcome of a run, including failures to resolve the agent, is a
//! `RuntimeResult`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Mode assigned when a request does not specify one.
pub const DEFAULT_MODE: &str = "dev";

fn default_mode() -> String {
    DEFAULT_MODE.to_string()
}

/// Generate a fresh, unique trace id.
pub fn new_trace_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Optional request metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMeta {
    #[serde(default)]
    pub trace_id: Option<String>,
    #[serde(default = "default_mode")]
    pub mode: String,
}

impl Default for RequestMeta {
    fn default() -> Self {
        Self {
            trace_id: None,
            mode: default_mode(),
        }
    }
}

/// The wire shape of an execution request: `{agent, input, meta?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeRequest {
    pub agent: String,
    pub input: String,
    #[serde(default)]
    pub meta: Option<RequestMeta>,
}

impl RuntimeRequest {
    pub fn new(agent: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            input: input.into(),
            meta: None,
        }
    }

    /// Build the execution context, filling absent metadata with defaults.
    pub fn into_context(self) -> RuntimeContext {
        let meta = self.meta.unwrap_or_default();
        let ctx = RuntimeContext::new(self.agent, self.input).with_mode(meta.mode);
        match meta.trace_id {
            Some(trace_id) => ctx.with_trace_id(trace_id),
            None => ctx,
        }
    }
}

/// Per-invocation execution context.
///
/// Fields are fixed once construction (including the `with_*` builders)
/// is done; handlers only receive shared references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeContext {
    agent: String,
    input: String,
    trace_id: String,
    mode: String,
    metadata: Map<String, Value>,
}

impl RuntimeContext {
    /// A context with a generated trace id, mode `"dev"`, and no metadata.
    pub fn new(agent: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            input: input.into(),
            trace_id: new_trace_id(),
            mode: default_mode(),
            metadata: Map::new(),
        }
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = trace_id.into();
        self
    }

    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = mode.into();
        self
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn agent(&self) -> &str {
        &self.agent
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    pub fn mode(&self) -> &str {
        &self.mode
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeStatus {
    Ok,
    Error,
}

/// Closed taxonomy of request-level error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Safety-gate denial or malformed input at the runtime boundary.
    ValidationError,
    /// Unknown or disabled agent.
    AgentNotFound,
    /// The handler failed during execution.
    RuntimeError,
}

/// One structured error entry in a `RuntimeResult`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default)]
    pub details: Map<String, Value>,
}

impl ErrorInfo {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: Map::new(),
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

/// The normalized outcome of `AgentRuntime::run`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeResult {
    pub status: RuntimeStatus,
    pub trace_id: String,
    pub agent: Option<String>,
    pub output: Option<String>,
    /// Always present; empty on success.
    #[serde(default)]
    pub errors: Vec<ErrorInfo>,
}

impl RuntimeResult {
    /// A successful result for the agent in `ctx`.
    pub fn ok(ctx: &RuntimeContext, output: impl Into<String>) -> Self {
        Self {
            status: RuntimeStatus::Ok,
            trace_id: ctx.trace_id().to_string(),
            agent: Some(ctx.agent().to_string()),
            output: Some(output.into()),
            errors: Vec::new(),
        }
    }

    /// A failed result carrying a single error entry and no output.
    pub fn error(ctx: &RuntimeContext, error: ErrorInfo) -> Self {
        Self {
            status: RuntimeStatus::Error,
            trace_id: ctx.trace_id().to_string(),
            agent: Some(ctx.agent().to_string()),
            output: None,
            errors: vec![error],
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == RuntimeStatus::Ok
    }
}
