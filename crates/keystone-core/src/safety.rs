//! Safety gate implementations.

use tracing::warn;

use keystone_contracts::safety::{SafetyDecision, SafetyGateInput};

use crate::traits::SafetyGate;

/// Allows every run. The behavior of a runtime without a gate.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAllSafetyGate;

impl SafetyGate for AllowAllSafetyGate {
    fn check(&self, _input: &SafetyGateInput) -> SafetyDecision {
        SafetyDecision::allow()
    }
}

/// Denies input containing any blocked term (case-insensitive).
#[derive(Debug, Clone, Default)]
pub struct KeywordSafetyGate {
    /// Stored lowercased.
    blocked: Vec<String>,
}

impl KeywordSafetyGate {
    pub const CODE: &'static str = "BLOCKED_TERM";

    pub fn new<I, T>(blocked: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        Self {
            blocked: blocked
                .into_iter()
                .map(|t| t.as_ref().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }
}

impl SafetyGate for KeywordSafetyGate {
    fn check(&self, input: &SafetyGateInput) -> SafetyDecision {
        let text = input.text.to_lowercase();
        match self.blocked.iter().find(|term| text.contains(term.as_str())) {
            Some(term) => {
                warn!(trace_id = %input.trace_id, agent = %input.agent, term = %term, "blocked term in input");
                SafetyDecision::deny(format!("Input contains blocked term '{term}'"), Self::CODE)
            }
            None => SafetyDecision::allow(),
        }
    }
}
