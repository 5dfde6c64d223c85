//! Sequential pipeline runner.
//!
//! Steps run strictly in declared order against one shared, mutable context
//! map. After every executed step its `stop_condition` decides whether the
//! run halts:
//!
//!   disabled → skipped (never halts)
//!   handler missing → failed
//!   [authorization denied] → failed
//!   handler Ok → completed, Err → failed
//!
//! Step failures are recorded, never raised: the caller always receives a
//! `PipelineResult`.

use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use keystone_contracts::{
    error::HandlerError,
    permission::{AgentPolicy, ToolPermissions},
    pipeline::{PipelineResult, PipelineSpec, StepResult, StepStatus},
};
use keystone_policy::check_tool_permission;

/// Mutable state threaded through every step of a run.
pub type PipelineContext = Map<String, Value>;

/// A step handler: receives the shared context, returns the step output.
pub type StepHandler = Box<dyn Fn(&mut PipelineContext) -> Result<Value, HandlerError> + Send + Sync>;

/// Tool authorization applied before step handlers run.
struct StepAuthorization {
    policy: AgentPolicy,
    tools: BTreeMap<String, ToolPermissions>,
}

/// In-memory synchronous pipeline executor.
#[derive(Default)]
pub struct PipelineRunner {
    handlers: HashMap<String, StepHandler>,
    authorization: Option<StepAuthorization>,
}

impl PipelineRunner {
    /// Create a runner with no handlers and no authorization.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `name`, replacing any previous handler.
    pub fn register_handler<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(&mut PipelineContext) -> Result<Value, HandlerError> + Send + Sync + 'static,
    {
        let name = name.into();
        debug!(handler = %name, "step handler registered");
        self.handlers.insert(name, Box::new(handler));
    }

    /// Whether a handler is registered under `name`.
    pub fn has_handler(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Check every step whose handler names a declared tool against `policy`
    /// before running it. Handlers without a declaration are not checked.
    pub fn with_authorization<I>(mut self, policy: AgentPolicy, tools: I) -> Self
    where
        I: IntoIterator<Item = (String, ToolPermissions)>,
    {
        self.authorization = Some(StepAuthorization {
            policy,
            tools: tools.into_iter().collect(),
        });
        self
    }

    /// Execute `spec`, starting from `initial` (empty when `None`).
    pub fn run(&self, spec: &PipelineSpec, initial: Option<PipelineContext>) -> PipelineResult {
        let mut ctx = initial.unwrap_or_default();
        let mut results = Vec::with_capacity(spec.steps.len());
        let mut overall = StepStatus::Completed;

        info!(
            pipeline = %spec.pipeline_name,
            steps = spec.steps.len(),
            "pipeline starting"
        );

        for step in &spec.steps {
            if !step.enabled {
                debug!(pipeline = %spec.pipeline_name, step = %step.step_name, "step skipped");
                results.push(StepResult::skipped(&step.step_name));
                continue;
            }

            let result = self.run_step(&step.step_name, &step.handler, &mut ctx);
            let failed = result.status == StepStatus::Failed;
            if failed {
                warn!(
                    pipeline = %spec.pipeline_name,
                    step = %step.step_name,
                    error = ?result.error,
                    "step failed"
                );
                overall = StepStatus::Failed;
            }
            results.push(result);

            if step.stop_condition.halts(failed) {
                debug!(
                    pipeline = %spec.pipeline_name,
                    step = %step.step_name,
                    stop_condition = ?step.stop_condition,
                    "pipeline halted"
                );
                break;
            }
        }

        info!(
            pipeline = %spec.pipeline_name,
            status = ?overall,
            recorded = results.len(),
            "pipeline finished"
        );

        PipelineResult {
            pipeline_name: spec.pipeline_name.clone(),
            status: overall,
            step_results: results,
        }
    }

    fn run_step(&self, step_name: &str, handler_name: &str, ctx: &mut PipelineContext) -> StepResult {
        let Some(handler) = self.handlers.get(handler_name) else {
            return StepResult::failed(
                step_name,
                format!("No handler registered for '{}'", handler_name),
            );
        };

        if let Some(auth) = &self.authorization {
            if let Some(permissions) = auth.tools.get(handler_name) {
                let decision = check_tool_permission(&auth.policy, permissions, handler_name);
                if !decision.allowed {
                    return StepResult::failed(
                        step_name,
                        format!("Permission denied: {}", decision.reason),
                    );
                }
            }
        }

        match handler(ctx) {
            Ok(output) => StepResult::completed(step_name, output),
            Err(e) => StepResult::failed(step_name, e.message),
        }
    }
}
