//! Safety gate input and decision types.

use serde::{Deserialize, Serialize};

/// What a safety gate sees before an agent runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyGateInput {
    pub trace_id: String,
    pub agent: String,
    /// User input text under inspection.
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyVerdict {
    Allow,
    Deny,
}

/// A safety gate's decision. Only `Deny` blocks execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyDecision {
    pub decision: SafetyVerdict,
    #[serde(default)]
    pub reason: Option<String>,
    /// Machine-readable deny code, e.g. `"POLICY_BLOCK"`.
    #[serde(default)]
    pub code: Option<String>,
}

impl SafetyDecision {
    pub fn allow() -> Self {
        Self {
            decision: SafetyVerdict::Allow,
            reason: None,
            code: None,
        }
    }

    pub fn deny(reason: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            decision: SafetyVerdict::Deny,
            reason: Some(reason.into()),
            code: Some(code.into()),
        }
    }

    pub fn is_denied(&self) -> bool {
        self.decision == SafetyVerdict::Deny
    }
}
