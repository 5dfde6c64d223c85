//! Trait seams of the Keystone runtime.
//!
//! - `AgentHandler`: the code behind a named agent. The runtime contains
//!   its failures.
//! - `SafetyGate`: an optional pre-execution check that can veto a run.

use keystone_contracts::{
    error::HandlerError,
    runtime::{RuntimeContext, RuntimeResult},
    safety::{SafetyDecision, SafetyGateInput},
};

/// An executable agent.
///
/// Handlers shape their own success result, including echoing the
/// request's `trace_id`. Any `Err` (or panic) is converted by the runtime
/// into a `RUNTIME_ERROR` result.
pub trait AgentHandler: Send + Sync {
    /// Unique agent name; the registry key.
    fn name(&self) -> &str;

    /// Human-readable description recorded in the agent registry.
    fn description(&self) -> &str {
        ""
    }

    /// Version recorded in the agent registry.
    fn version(&self) -> Option<&str> {
        None
    }

    /// Tags recorded in the agent registry.
    fn tags(&self) -> Vec<String> {
        Vec::new()
    }

    fn execute(&self, ctx: &RuntimeContext) -> Result<RuntimeResult, HandlerError>;
}

/// A pre-execution hook. Only a `Deny` decision blocks the handler.
pub trait SafetyGate: Send + Sync {
    fn check(&self, input: &SafetyGateInput) -> SafetyDecision;
}
