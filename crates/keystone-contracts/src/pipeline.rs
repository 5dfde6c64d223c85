//! Pipeline step specifications and results.
//!
//! A `PipelineSpec` is an ordered list of named steps. The runner returns a
//! `PipelineResult` holding one `StepResult` per step that actually ran (or
//! was skipped); steps after a halt are not recorded.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Lifecycle state of a pipeline step, also used for the overall status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Skipped,
}

/// When the pipeline halts after a step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopCondition {
    /// Halt if the step failed.
    #[default]
    OnError,
    /// Halt if the step completed.
    OnSuccess,
    /// Halt after this step regardless of outcome.
    Always,
    /// Never halt because of this step.
    Never,
}

impl StopCondition {
    /// Whether a step that ended with `failed` (or not) should halt the run.
    pub fn halts(&self, failed: bool) -> bool {
        match self {
            StopCondition::Always => true,
            StopCondition::OnError => failed,
            StopCondition::OnSuccess => !failed,
            StopCondition::Never => false,
        }
    }
}

/// A single step in a pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineStep {
    /// Unique within the pipeline.
    pub step_name: String,
    /// Name of the registered handler that executes this step.
    pub handler: String,
    #[serde(default)]
    pub stop_condition: StopCondition,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

fn default_enabled() -> bool {
    true
}

impl PipelineStep {
    pub fn new(step_name: impl Into<String>, handler: impl Into<String>) -> Self {
        Self {
            step_name: step_name.into(),
            handler: handler.into(),
            stop_condition: StopCondition::default(),
            enabled: true,
            metadata: Map::new(),
        }
    }

    pub fn stop_on(mut self, stop_condition: StopCondition) -> Self {
        self.stop_condition = stop_condition;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Full specification of a pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSpec {
    pub pipeline_name: String,
    #[serde(default)]
    pub steps: Vec<PipelineStep>,
}

impl PipelineSpec {
    pub fn new(pipeline_name: impl Into<String>, steps: Vec<PipelineStep>) -> Self {
        Self {
            pipeline_name: pipeline_name.into(),
            steps,
        }
    }
}

/// Outcome of one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub step_name: String,
    pub status: StepStatus,
    /// Handler return value; `Null` when the step produced none.
    #[serde(default)]
    pub output: Value,
    #[serde(default)]
    pub error: Option<String>,
}

impl StepResult {
    pub fn completed(step_name: impl Into<String>, output: Value) -> Self {
        Self {
            step_name: step_name.into(),
            status: StepStatus::Completed,
            output,
            error: None,
        }
    }

    pub fn failed(step_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            step_name: step_name.into(),
            status: StepStatus::Failed,
            output: Value::Null,
            error: Some(error.into()),
        }
    }

    pub fn skipped(step_name: impl Into<String>) -> Self {
        Self {
            step_name: step_name.into(),
            status: StepStatus::Skipped,
            output: Value::Null,
            error: None,
        }
    }
}

/// Aggregate result of a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub pipeline_name: String,
    /// `Completed` unless any step failed, then `Failed`.
    pub status: StepStatus,
    pub step_results: Vec<StepResult>,
}

impl PipelineResult {
    /// The first failed step, if any.
    pub fn first_failure(&self) -> Option<&StepResult> {
        self.step_results
            .iter()
            .find(|r| r.status == StepStatus::Failed)
    }

    /// The last step that completed, if any.
    pub fn last_completed(&self) -> Option<&StepResult> {
        self.step_results
            .iter()
            .rev()
            .find(|r| r.status == StepStatus::Completed)
    }
}
