//! # keystone-core
//!
//! The synchronous orchestration core of Keystone.
//!
//! This crate provides:
//! - The two trait seams (`AgentHandler`, `SafetyGate`)
//! - `AgentRuntime`, which resolves, gates and runs agent handlers
//! - `IntentRouter`, priority-ordered keyword/pattern routing
//! - `PipelineRunner` and `PipelineAgent` for sequential step execution
//! - `run_with_retry`, a bounded retry loop
//!
//! ## Usage
//!
//! ```rust,ignore
//! use keystone_contracts::runtime::RuntimeContext;
//! use keystone_core::AgentRuntime;
//!
//! let mut runtime = AgentRuntime::new();
//! let result = runtime.run(&RuntimeContext::new("echo", "hello"));
//! assert_eq!(result.output.as_deref(), Some("hello"));
//! ```

pub mod agents;
pub mod pipeline;
pub mod pipeline_agent;
pub mod retry;
pub mod router;
pub mod runtime;
pub mod safety;
pub mod traits;

pub use agents::{DefaultAgent, EchoAgent, MetadataEchoAgent, TemplateReplyAgent};
pub use pipeline::{PipelineContext, PipelineRunner, StepHandler};
pub use pipeline_agent::PipelineAgent;
pub use retry::run_with_retry;
pub use router::IntentRouter;
pub use runtime::AgentRuntime;
pub use safety::{AllowAllSafetyGate, KeywordSafetyGate};
pub use traits::{AgentHandler, SafetyGate};
