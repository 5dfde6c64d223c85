//! Tool permission checker.
//!
//! Checks run deny-first and short-circuit:
//!
//! 1. If the policy has a tool allowlist and the tool is not on it → deny.
//! 2. If any required permission is not granted → deny, listing every
//!    missing permission in sorted order.
//! 3. Otherwise → allow.
//!
//! Optional permissions never influence the decision.

use tracing::debug;

use keystone_contracts::permission::{AgentPolicy, PolicyDecision, ToolPermissions};

/// Reason attached to every allow decision.
pub const ALL_CHECKS_PASSED: &str = "All checks passed";

/// Decide whether `tool_name` may run under `policy`.
pub fn check_tool_permission(
    policy: &AgentPolicy,
    tool_permissions: &ToolPermissions,
    tool_name: &str,
) -> PolicyDecision {
    if !policy.allowed_tools.is_empty() && !policy.allowed_tools.iter().any(|t| t == tool_name) {
        debug!(persona = %policy.persona, tool = %tool_name, "tool not in allowlist");
        return PolicyDecision::deny(format!(
            "Tool '{}' is not in the allowlist for persona '{}'",
            tool_name, policy.persona
        ));
    }

    let mut missing: Vec<&str> = tool_permissions
        .required_permissions
        .iter()
        .filter(|p| !policy.grants(**p))
        .map(|p| p.as_str())
        .collect();

    if !missing.is_empty() {
        missing.sort_unstable();
        debug!(
            persona = %policy.persona,
            tool = %tool_name,
            missing = ?missing,
            "required permissions not granted"
        );
        return PolicyDecision::deny(format!(
            "Missing required permissions: {}",
            missing.join(", ")
        ));
    }

    PolicyDecision::allow(ALL_CHECKS_PASSED)
}
