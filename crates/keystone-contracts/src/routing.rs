//! Intent routing rule and result types.

use serde::{Deserialize, Serialize};

/// How a rule's `match_value` is compared against intent text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Case-insensitive substring test.
    Keyword,
    /// Case-insensitive regular-expression search.
    Pattern,
}

/// A single rule evaluated by the intent router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingRule {
    /// Unique within a router.
    pub rule_id: String,
    pub match_strategy: MatchStrategy,
    /// A keyword substring or a regex, depending on `match_strategy`.
    pub match_value: String,
    /// Persona the intent is routed to (e.g. "core", "infra", "docs").
    pub target_persona: String,
    #[serde(default)]
    pub target_agent: Option<String>,
    /// Higher value wins; ties break by insertion order.
    #[serde(default)]
    pub priority: i64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl RoutingRule {
    pub fn keyword(
        rule_id: impl Into<String>,
        keyword: impl Into<String>,
        target_persona: impl Into<String>,
    ) -> Self {
        Self::build(rule_id, MatchStrategy::Keyword, keyword, target_persona)
    }

    pub fn pattern(
        rule_id: impl Into<String>,
        pattern: impl Into<String>,
        target_persona: impl Into<String>,
    ) -> Self {
        Self::build(rule_id, MatchStrategy::Pattern, pattern, target_persona)
    }

    fn build(
        rule_id: impl Into<String>,
        match_strategy: MatchStrategy,
        match_value: impl Into<String>,
        target_persona: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            match_strategy,
            match_value: match_value.into(),
            target_persona: target_persona.into(),
            target_agent: None,
            priority: 0,
            enabled: true,
        }
    }

    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.target_agent = Some(agent.into());
        self
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Outcome of routing an intent string.
///
/// When `matched` is false every optional field is `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingResult {
    pub matched: bool,
    pub rule_id: Option<String>,
    pub target_persona: Option<String>,
    pub target_agent: Option<String>,
}

impl RoutingResult {
    pub fn unmatched() -> Self {
        Self::default()
    }

    pub fn from_rule(rule: &RoutingRule) -> Self {
        Self {
            matched: true,
            rule_id: Some(rule.rule_id.clone()),
            target_persona: Some(rule.target_persona.clone()),
            target_agent: rule.target_agent.clone(),
        }
    }
}
