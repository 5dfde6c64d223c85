//! Rule-based intent router.
//!
//! Rules are evaluated in priority order (highest first); rules with equal
//! priority keep their insertion order. The first enabled rule that matches
//! wins.

use std::cmp::Reverse;

use regex::{Regex, RegexBuilder};
use tracing::{debug, info};

use keystone_contracts::{
    error::{KeystoneError, KeystoneResult},
    routing::{MatchStrategy, RoutingResult, RoutingRule},
};

/// How a stored rule is tested against intent text.
#[derive(Debug, Clone)]
enum Matcher {
    /// Lowercased keyword for substring search.
    Keyword(String),
    /// Case-insensitive compiled pattern.
    Pattern(Regex),
}

impl Matcher {
    fn compile(rule: &RoutingRule) -> KeystoneResult<Self> {
        match rule.match_strategy {
            MatchStrategy::Keyword => Ok(Matcher::Keyword(rule.match_value.to_lowercase())),
            MatchStrategy::Pattern => RegexBuilder::new(&rule.match_value)
                .case_insensitive(true)
                .build()
                .map(Matcher::Pattern)
                .map_err(|e| KeystoneError::InvalidPattern {
                    rule_id: rule.rule_id.clone(),
                    reason: e.to_string(),
                }),
        }
    }

    fn matches(&self, intent: &str, intent_lower: &str) -> bool {
        match self {
            Matcher::Keyword(keyword) => intent_lower.contains(keyword.as_str()),
            Matcher::Pattern(re) => re.is_match(intent),
        }
    }
}

#[derive(Debug, Clone)]
struct StoredRule {
    rule: RoutingRule,
    matcher: Matcher,
}

/// In-memory, priority-ordered intent router.
#[derive(Debug, Clone, Default)]
pub struct IntentRouter {
    /// Insertion order; sorting happens on read.
    rules: Vec<StoredRule>,
}

impl IntentRouter {
    /// Create a router with no rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a router from `rules`, stopping at the first invalid one.
    pub fn from_rules<I: IntoIterator<Item = RoutingRule>>(rules: I) -> KeystoneResult<Self> {
        let mut router = Self::new();
        for rule in rules {
            router.add_rule(rule)?;
        }
        Ok(router)
    }

    /// Add a rule. Fails on a duplicate `rule_id` or an uncompilable pattern.
    pub fn add_rule(&mut self, rule: RoutingRule) -> KeystoneResult<()> {
        if self.rules.iter().any(|s| s.rule.rule_id == rule.rule_id) {
            return Err(KeystoneError::DuplicateRule {
                rule_id: rule.rule_id,
            });
        }

        let matcher = Matcher::compile(&rule)?;
        info!(
            rule_id = %rule.rule_id,
            priority = rule.priority,
            persona = %rule.target_persona,
            "routing rule added"
        );
        self.rules.push(StoredRule { rule, matcher });
        Ok(())
    }

    /// Remove a rule by id. Returns true if one was removed.
    pub fn remove_rule(&mut self, rule_id: &str) -> bool {
        let before = self.rules.len();
        self.rules.retain(|s| s.rule.rule_id != rule_id);
        self.rules.len() < before
    }

    /// All rules, priority descending, ties in insertion order.
    pub fn list_rules(&self) -> Vec<&RoutingRule> {
        self.ordered().into_iter().map(|s| &s.rule).collect()
    }

    /// Resolve `intent` to the first matching enabled rule.
    pub fn route(&self, intent: &str) -> RoutingResult {
        let intent_lower = intent.to_lowercase();

        for stored in self.ordered() {
            if !stored.rule.enabled {
                continue;
            }
            if stored.matcher.matches(intent, &intent_lower) {
                debug!(rule_id = %stored.rule.rule_id, "intent matched");
                return RoutingResult::from_rule(&stored.rule);
            }
        }

        debug!("no routing rule matched");
        RoutingResult::unmatched()
    }

    /// Number of rules, disabled ones included.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the router holds no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn ordered(&self) -> Vec<&StoredRule> {
        let mut ordered: Vec<&StoredRule> = self.rules.iter().collect();
        // `sort_by_key` is stable, which gives the insertion-order tie-break.
        ordered.sort_by_key(|s| Reverse(s.rule.priority));
        ordered
    }
}
