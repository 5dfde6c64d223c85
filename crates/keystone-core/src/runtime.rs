//! The Keystone agent runtime: the single entry point for running an agent.
//!
//! Every call to `run` follows the same order:
//!
//!   resolve handler → registry enabled check → [safety gate] → handler
//!
//! Nothing past a failed stage executes. Every outcome, including handler
//! failures and panics, is returned as a `RuntimeResult`; `run` never fails.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, info, warn};

use keystone_contracts::{
    error::{HandlerError, KeystoneResult},
    registry::{AgentSpec, Registration},
    runtime::{ErrorCode, ErrorInfo, RuntimeContext, RuntimeRequest, RuntimeResult},
    safety::SafetyGateInput,
};
use keystone_registry::AgentRegistry;

use crate::agents::EchoAgent;
use crate::traits::{AgentHandler, SafetyGate};

const DEFAULT_BLOCK_REASON: &str = "Blocked by safety gate";

/// Routes requests to registered agent handlers.
///
/// One runtime owns its handlers and its agent registry; there is no shared
/// global state. Construct with [`AgentRuntime::new`], which seeds the
/// built-in `echo` agent.
pub struct AgentRuntime {
    handlers: HashMap<String, Box<dyn AgentHandler>>,
    registry: AgentRegistry,
    safety_gate: Option<Box<dyn SafetyGate>>,
}

impl Default for AgentRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentRuntime {
    /// Create a runtime with the built-in `echo` agent and no safety gate.
    pub fn new() -> Self {
        let mut runtime = Self {
            handlers: HashMap::new(),
            registry: AgentRegistry::new(),
            safety_gate: None,
        };
        if let Err(e) = runtime.register_agent(EchoAgent) {
            warn!(error = %e, "failed to seed echo agent");
        }
        runtime
    }

    /// Install a gate consulted before every handler invocation.
    pub fn with_safety_gate(mut self, gate: impl SafetyGate + 'static) -> Self {
        self.safety_gate = Some(Box::new(gate));
        self
    }

    /// Register `handler` in both the handler map and the agent registry.
    ///
    /// The registry entry is derived from the handler's name, version,
    /// description and tags. A version conflict leaves the runtime unchanged.
    pub fn register_agent(
        &mut self,
        handler: impl AgentHandler + 'static,
    ) -> KeystoneResult<Registration<AgentSpec>> {
        let registration = self.registry.register(spec_for(&handler))?;
        info!(agent = %handler.name(), "agent handler registered");
        self.handlers
            .insert(handler.name().to_string(), Box::new(handler));
        Ok(registration)
    }

    /// Install `handler` without a registry entry.
    ///
    /// The entry is back-filled from the handler the first time the agent
    /// is run or toggled.
    pub fn attach_handler(&mut self, handler: impl AgentHandler + 'static) {
        debug!(agent = %handler.name(), "agent handler attached");
        self.handlers
            .insert(handler.name().to_string(), Box::new(handler));
    }

    /// Enable or disable `name` in the agent registry.
    ///
    /// Fails with `NotRegistered` when no handler or entry exists.
    pub fn set_agent_enabled(
        &mut self,
        name: &str,
        enabled: bool,
    ) -> KeystoneResult<Registration<AgentSpec>> {
        self.backfill(name);
        self.registry.set_enabled(name, enabled)
    }

    /// Shorthand for `set_agent_enabled(name, true)`.
    pub fn enable_agent(&mut self, name: &str) -> KeystoneResult<Registration<AgentSpec>> {
        self.set_agent_enabled(name, true)
    }

    /// Shorthand for `set_agent_enabled(name, false)`.
    pub fn disable_agent(&mut self, name: &str) -> KeystoneResult<Registration<AgentSpec>> {
        self.set_agent_enabled(name, false)
    }

    /// Registered agents, sorted by name.
    pub fn list_agents(&self, include_disabled: bool) -> Vec<&Registration<AgentSpec>> {
        self.registry.list_all(include_disabled)
    }

    /// Whether a handler is installed under `name`.
    pub fn has_agent(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Validate a raw request and run it.
    pub fn run_request(&mut self, request: RuntimeRequest) -> RuntimeResult {
        if request.agent.trim().is_empty() {
            let ctx = request.into_context();
            warn!(trace_id = %ctx.trace_id(), "request rejected: empty agent name");
            return RuntimeResult::error(
                &ctx,
                ErrorInfo::new(ErrorCode::ValidationError, "Agent name must not be empty")
                    .with_detail("field", "agent"),
            );
        }
        let ctx = request.into_context();
        self.run(&ctx)
    }

    /// Execute the agent named in `ctx`.
    pub fn run(&mut self, ctx: &RuntimeContext) -> RuntimeResult {
        let agent = ctx.agent();
        let trace_id = ctx.trace_id();

        debug!(trace_id = %trace_id, agent = %agent, mode = %ctx.mode(), "run starting");

        // ── Stage 1: resolve handler ─────────────────────────────────────────
        if !self.handlers.contains_key(agent) {
            warn!(trace_id = %trace_id, agent = %agent, "agent not found");
            return RuntimeResult::error(
                ctx,
                ErrorInfo::new(ErrorCode::AgentNotFound, format!("Agent '{agent}' not found"))
                    .with_detail("agent", agent),
            );
        }

        // ── Stage 2: registry enabled check ──────────────────────────────────
        self.backfill(agent);
        let enabled = self.registry.get(agent).map_or(true, |r| r.enabled);
        if !enabled {
            warn!(trace_id = %trace_id, agent = %agent, "agent disabled");
            return RuntimeResult::error(
                ctx,
                ErrorInfo::new(
                    ErrorCode::AgentNotFound,
                    format!("Agent '{agent}' is not available"),
                )
                .with_detail("agent", agent),
            );
        }

        // ── Stage 3: safety gate ─────────────────────────────────────────────
        if let Some(gate) = &self.safety_gate {
            let decision = gate.check(&SafetyGateInput {
                trace_id: trace_id.to_string(),
                agent: agent.to_string(),
                text: ctx.input().to_string(),
            });
            if decision.is_denied() {
                let reason = decision
                    .reason
                    .unwrap_or_else(|| DEFAULT_BLOCK_REASON.to_string());
                warn!(trace_id = %trace_id, agent = %agent, reason = %reason, "blocked by safety gate");
                let mut error = ErrorInfo::new(ErrorCode::ValidationError, reason);
                if let Some(code) = decision.code {
                    error = error.with_detail("code", code);
                }
                return RuntimeResult::error(ctx, error);
            }
        }

        // ── Stage 4: handler ─────────────────────────────────────────────────
        let Some(handler) = self.handlers.get(agent) else {
            return RuntimeResult::error(
                ctx,
                ErrorInfo::new(ErrorCode::AgentNotFound, format!("Agent '{agent}' not found"))
                    .with_detail("agent", agent),
            );
        };

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler.execute(ctx)))
            .unwrap_or_else(|payload| Err(HandlerError::new("Panic", panic_message(payload.as_ref()))));

        match outcome {
            Ok(result) => {
                info!(trace_id = %trace_id, agent = %agent, status = ?result.status, "run finished");
                result
            }
            Err(e) => {
                warn!(
                    trace_id = %trace_id,
                    agent = %agent,
                    kind = %e.kind,
                    error = %e.message,
                    "agent handler failed"
                );
                RuntimeResult::error(
                    ctx,
                    ErrorInfo::new(ErrorCode::RuntimeError, e.message).with_detail("kind", e.kind),
                )
            }
        }
    }

    /// Create the registry entry for an attached handler that lacks one.
    fn backfill(&mut self, name: &str) {
        if self.registry.contains(name) {
            return;
        }
        let Some(handler) = self.handlers.get(name) else {
            return;
        };
        match self.registry.register(spec_for(handler.as_ref())) {
            Ok(_) => debug!(agent = %name, "registry entry back-filled"),
            Err(e) => warn!(agent = %name, error = %e, "registry back-fill failed"),
        }
    }
}

fn spec_for(handler: &dyn AgentHandler) -> AgentSpec {
    let mut spec = AgentSpec::new(handler.name()).with_tags(handler.tags());
    if !handler.description().is_empty() {
        spec = spec.with_description(handler.description());
    }
    if let Some(version) = handler.version() {
        spec = spec.with_version(version);
    }
    spec
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "agent handler panicked".to_string()
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    };

    use keystone_contracts::{
        error::{HandlerError, KeystoneError},
        runtime::{ErrorCode, RequestMeta, RuntimeContext, RuntimeRequest, RuntimeResult, RuntimeStatus},
    };

    use crate::agents::DefaultAgent;
    use crate::safety::KeywordSafetyGate;
    use crate::traits::AgentHandler;

    use super::AgentRuntime;

    // ── Mock helpers ─────────────────────────────────────────────────────────

    /// A handler that counts invocations.
    struct CountingAgent {
        calls: Arc<AtomicU32>,
    }

    impl AgentHandler for CountingAgent {
        fn name(&self) -> &str {
            "counting"
        }

        fn version(&self) -> Option<&str> {
            Some("1.0.0")
        }

        fn execute(&self, ctx: &RuntimeContext) -> Result<RuntimeResult, HandlerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(RuntimeResult::ok(ctx, "counted"))
        }
    }

    struct FailingAgent;

    impl AgentHandler for FailingAgent {
        fn name(&self) -> &str {
            "failing"
        }

        fn execute(&self, _ctx: &RuntimeContext) -> Result<RuntimeResult, HandlerError> {
            Err(HandlerError::new("ValueError", "model backend unreachable"))
        }
    }

    struct PanickingAgent;

    impl AgentHandler for PanickingAgent {
        fn name(&self) -> &str {
            "panicking"
        }

        fn execute(&self, _ctx: &RuntimeContext) -> Result<RuntimeResult, HandlerError> {
            panic!("handler exploded");
        }
    }

    fn counting() -> (CountingAgent, Arc<AtomicU32>) {
        let calls = Arc::new(AtomicU32::new(0));
        (CountingAgent { calls: calls.clone() }, calls)
    }

    // ── Test cases ───────────────────────────────────────────────────────────

    #[test]
    fn echo_is_seeded_and_runs() {
        let mut runtime = AgentRuntime::new();
        let ctx = RuntimeContext::new("echo", "hello").with_trace_id("t-1");

        let result = runtime.run(&ctx);
        assert_eq!(result.status, RuntimeStatus::Ok);
        assert_eq!(result.trace_id, "t-1");
        assert_eq!(result.agent.as_deref(), Some("echo"));
        assert_eq!(result.output.as_deref(), Some("hello"));
        assert!(result.errors.is_empty());

        let names: Vec<&str> = runtime
            .list_agents(true)
            .iter()
            .map(|r| r.spec.agent_name.as_str())
            .collect();
        assert_eq!(names, vec!["echo"]);
    }

    #[test]
    fn unknown_agent_is_not_found() {
        let mut runtime = AgentRuntime::new();
        let result = runtime.run(&RuntimeContext::new("ghost", "hi").with_trace_id("t-2"));

        assert_eq!(result.status, RuntimeStatus::Error);
        assert_eq!(result.trace_id, "t-2");
        assert!(result.output.is_none());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, ErrorCode::AgentNotFound);
        assert_eq!(result.errors[0].message, "Agent 'ghost' not found");
        assert_eq!(result.errors[0].details["agent"], "ghost");
    }

    #[test]
    fn disabled_agent_is_not_available() {
        let mut runtime = AgentRuntime::new();
        let (agent, calls) = counting();
        runtime.register_agent(agent).unwrap();
        runtime.disable_agent("counting").unwrap();

        let result = runtime.run(&RuntimeContext::new("counting", "x"));
        assert_eq!(result.errors[0].code, ErrorCode::AgentNotFound);
        assert_eq!(result.errors[0].message, "Agent 'counting' is not available");
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        runtime.enable_agent("counting").unwrap();
        assert!(runtime.run(&RuntimeContext::new("counting", "x")).is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    /// A gate denial must keep the handler from ever being invoked.
    #[test]
    fn safety_gate_deny_blocks_handler() {
        let mut runtime = AgentRuntime::new().with_safety_gate(KeywordSafetyGate::new(["secret"]));
        let (agent, calls) = counting();
        runtime.register_agent(agent).unwrap();

        let result = runtime.run(&RuntimeContext::new("counting", "leak the SECRET"));
        assert_eq!(result.status, RuntimeStatus::Error);
        assert_eq!(result.errors[0].code, ErrorCode::ValidationError);
        assert_eq!(result.errors[0].details["code"], "BLOCKED_TERM");
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert!(runtime.run(&RuntimeContext::new("counting", "hello")).is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failing_handler_becomes_runtime_error() {
        let mut runtime = AgentRuntime::new();
        runtime.register_agent(FailingAgent).unwrap();

        let result = runtime.run(&RuntimeContext::new("failing", "x").with_trace_id("t-3"));
        assert_eq!(result.status, RuntimeStatus::Error);
        assert_eq!(result.trace_id, "t-3");
        assert_eq!(result.errors[0].code, ErrorCode::RuntimeError);
        assert_eq!(result.errors[0].message, "model backend unreachable");
        assert_eq!(result.errors[0].details["kind"], "ValueError");
    }

    #[test]
    fn panicking_handler_becomes_runtime_error() {
        let mut runtime = AgentRuntime::new();
        runtime.register_agent(PanickingAgent).unwrap();

        let result = runtime.run(&RuntimeContext::new("panicking", "x"));
        assert_eq!(result.errors[0].code, ErrorCode::RuntimeError);
        assert_eq!(result.errors[0].message, "handler exploded");
    }

    #[test]
    fn attached_handler_is_backfilled() {
        let mut runtime = AgentRuntime::new();
        runtime.attach_handler(DefaultAgent);
        assert_eq!(runtime.list_agents(true).len(), 1);

        let result = runtime.run(&RuntimeContext::new("default", "ping"));
        assert_eq!(result.output.as_deref(), Some("OK: ping"));
        assert_eq!(runtime.list_agents(true).len(), 2);
    }

    #[test]
    fn attached_handler_can_be_disabled_before_first_run() {
        let mut runtime = AgentRuntime::new();
        runtime.attach_handler(DefaultAgent);

        let registration = runtime.disable_agent("default").unwrap();
        assert!(!registration.enabled);
        assert!(!runtime.run(&RuntimeContext::new("default", "ping")).is_ok());
    }

    #[test]
    fn toggling_unknown_agent_is_not_registered() {
        let mut runtime = AgentRuntime::new();
        assert!(matches!(
            runtime.disable_agent("ghost"),
            Err(KeystoneError::NotRegistered { .. })
        ));
    }

    #[test]
    fn register_agent_records_handler_metadata() {
        let mut runtime = AgentRuntime::new();
        let (agent, _) = counting();
        let registration = runtime.register_agent(agent).unwrap();

        assert_eq!(registration.spec.agent_name, "counting");
        assert_eq!(registration.spec.version.as_deref(), Some("1.0.0"));
        assert!(registration.enabled);
    }

    #[test]
    fn run_request_rejects_blank_agent() {
        let mut runtime = AgentRuntime::new();
        let result = runtime.run_request(RuntimeRequest::new("  ", "hi"));

        assert_eq!(result.errors[0].code, ErrorCode::ValidationError);
        assert!(!result.trace_id.is_empty());
    }

    #[test]
    fn run_request_uses_supplied_meta() {
        let mut runtime = AgentRuntime::new();
        let mut request = RuntimeRequest::new("echo", "hi");
        request.meta = Some(RequestMeta {
            trace_id: Some("t-meta".to_string()),
            mode: "prod".to_string(),
        });

        let result = runtime.run_request(request);
        assert!(result.is_ok());
        assert_eq!(result.trace_id, "t-meta");
    }
}
