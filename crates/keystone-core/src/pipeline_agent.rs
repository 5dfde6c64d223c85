//! An agent whose behavior is a pipeline.

use serde_json::Value;
use tracing::debug;

use keystone_contracts::{
    error::HandlerError,
    pipeline::{PipelineSpec, StepStatus},
    runtime::{RuntimeContext, RuntimeResult},
};

use crate::pipeline::{PipelineContext, PipelineRunner};
use crate::traits::AgentHandler;

/// Error kind reported when the underlying pipeline fails.
pub const PIPELINE_FAILED: &str = "PipelineFailed";

/// Runs `spec` for every request.
///
/// The pipeline context is seeded with `input`, `trace_id`, `agent` and
/// `mode`. The agent output is the output of the last completed step.
pub struct PipelineAgent {
    name: String,
    description: String,
    spec: PipelineSpec,
    runner: PipelineRunner,
}

impl PipelineAgent {
    pub fn new(name: impl Into<String>, spec: PipelineSpec, runner: PipelineRunner) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            spec,
            runner,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl AgentHandler for PipelineAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn tags(&self) -> Vec<String> {
        vec!["pipeline".to_string()]
    }

    fn execute(&self, ctx: &RuntimeContext) -> Result<RuntimeResult, HandlerError> {
        let mut seed = PipelineContext::new();
        seed.insert("input".to_string(), Value::from(ctx.input()));
        seed.insert("trace_id".to_string(), Value::from(ctx.trace_id()));
        seed.insert("agent".to_string(), Value::from(ctx.agent()));
        seed.insert("mode".to_string(), Value::from(ctx.mode()));

        let result = self.runner.run(&self.spec, Some(seed));
        debug!(
            trace_id = %ctx.trace_id(),
            pipeline = %result.pipeline_name,
            status = ?result.status,
            "pipeline agent finished"
        );

        if result.status == StepStatus::Failed {
            let (step, error) = result
                .first_failure()
                .map(|r| (r.step_name.as_str(), r.error.as_deref().unwrap_or("unknown error")))
                .unwrap_or(("<unknown>", "unknown error"));
            return Err(HandlerError::new(
                PIPELINE_FAILED,
                format!("Pipeline '{}' failed at step '{step}': {error}", result.pipeline_name),
            ));
        }

        let output = match result.last_completed().map(|r| &r.output) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
            None => None,
        };

        Ok(RuntimeResult {
            output,
            ..RuntimeResult::ok(ctx, "")
        })
    }
}
