//! # keystone-registry
//!
//! A deterministic, in-memory versioned registry shared by Keystone's agent
//! and tool catalogues.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use keystone_contracts::registry::AgentSpec;
//! use keystone_registry::AgentRegistry;
//!
//! let mut registry = AgentRegistry::new();
//! registry.register(AgentSpec::new("echo").with_version("1.0.0"))?;
//! registry.set_enabled("echo", false)?;
//! assert!(registry.list_all(false).is_empty());
//! ```

pub mod versioned;

use keystone_contracts::registry::{AgentSpec, ToolSpec};

pub use versioned::VersionedRegistry;

/// Registry of runnable agents.
pub type AgentRegistry = VersionedRegistry<AgentSpec>;

/// Registry of tools.
pub type ToolRegistry = VersionedRegistry<ToolSpec>;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::json;

    use keystone_contracts::{
        error::KeystoneError,
        registry::{AgentSpec, ToolSpec},
    };

    use super::{AgentRegistry, ToolRegistry};

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn tool(name: &str, version: &str) -> ToolSpec {
        ToolSpec::new(name, json!({"type": "object"}), json!({"type": "object"}))
            .with_version(version)
    }

    fn names(registry: &AgentRegistry, include_disabled: bool) -> Vec<String> {
        registry
            .list_all(include_disabled)
            .iter()
            .map(|r| r.spec.agent_name.clone())
            .collect()
    }

    // ── register ──────────────────────────────────────────────────────────────

    #[test]
    fn new_registration_is_enabled() {
        let mut registry = AgentRegistry::new();
        let registration = registry.register(AgentSpec::new("echo")).unwrap();

        assert!(registration.enabled);
        assert_eq!(registration.spec.agent_name, "echo");
        assert_eq!(registry.get("echo"), Some(&registration));
    }

    /// Listing order depends only on names, never on registration order.
    #[test]
    fn list_all_is_sorted_by_name() {
        let mut registry = AgentRegistry::new();
        registry.register(AgentSpec::new("bravo")).unwrap();
        registry.register(AgentSpec::new("charlie")).unwrap();
        registry.register(AgentSpec::new("alpha")).unwrap();

        assert_eq!(names(&registry, false), vec!["alpha", "bravo", "charlie"]);
    }

    #[test]
    fn identical_spec_is_a_no_op() {
        let mut registry = AgentRegistry::new();
        let spec = AgentSpec::new("echo").with_version("1.0.0");
        let first = registry.register(spec.clone()).unwrap();
        let second = registry.register(spec).unwrap();

        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn same_version_different_body_conflicts() {
        let mut registry = AgentRegistry::new();
        registry
            .register(AgentSpec::new("x").with_version("1.0.0"))
            .unwrap();

        let result = registry.register(
            AgentSpec::new("x")
                .with_version("1.0.0")
                .with_description("changed"),
        );

        match result {
            Err(KeystoneError::VersionConflict { kind, name, version }) => {
                assert_eq!(kind, "agent");
                assert_eq!(name, "x");
                assert_eq!(version, "'1.0.0'");
            }
            other => panic!("expected VersionConflict, got {:?}", other),
        }

        // The stored spec is untouched.
        assert_eq!(registry.get("x").unwrap().spec.description, None);
    }

    #[test]
    fn unversioned_conflict_is_reported_as_unversioned() {
        let mut registry = AgentRegistry::new();
        registry.register(AgentSpec::new("x")).unwrap();

        let err = registry
            .register(AgentSpec::new("x").with_description("changed"))
            .unwrap_err();
        assert!(err.to_string().contains("None (unversioned)"), "{err}");
    }

    /// A version bump replaces the spec, keeps `enabled`, and refreshes `created_at`.
    #[test]
    fn new_version_replaces_and_preserves_enabled() {
        let mut registry = ToolRegistry::new();
        let original = registry.register(tool("search", "1.0.0")).unwrap();
        registry.set_enabled("search", false).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));

        let updated = registry.register(tool("search", "2.0.0")).unwrap();

        assert_eq!(updated.spec.version.as_deref(), Some("2.0.0"));
        assert!(!updated.enabled, "enabled flag must survive a version change");
        assert!(updated.created_at > original.created_at);

        let stored = registry.get("search").unwrap();
        assert_eq!(stored, &updated);
        assert_ne!(stored.created_at, original.created_at);
    }

    // ── enable / disable ──────────────────────────────────────────────────────

    #[test]
    fn enable_disable_round_trip() {
        let mut registry = AgentRegistry::new();
        registry.register(AgentSpec::new("alpha")).unwrap();
        registry.register(AgentSpec::new("bravo")).unwrap();

        registry.set_enabled("alpha", false).unwrap();
        assert_eq!(names(&registry, false), vec!["bravo"]);

        let all = registry.list_all(true);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].spec.agent_name, "alpha");
        assert!(!all[0].enabled);

        registry.set_enabled("alpha", true).unwrap();
        assert_eq!(names(&registry, false), vec!["alpha", "bravo"]);
    }

    #[test]
    fn set_enabled_to_current_state_returns_unchanged() {
        let mut registry = AgentRegistry::new();
        let original = registry.register(AgentSpec::new("echo")).unwrap();

        let same = registry.set_enabled("echo", true).unwrap();
        assert_eq!(same, original);
    }

    #[test]
    fn set_enabled_keeps_created_at() {
        let mut registry = AgentRegistry::new();
        let original = registry.register(AgentSpec::new("echo")).unwrap();

        let disabled = registry.set_enabled("echo", false).unwrap();
        assert_eq!(disabled.created_at, original.created_at);
        assert_eq!(disabled.spec, original.spec);
    }

    #[test]
    fn set_enabled_unknown_name_fails() {
        let mut registry = ToolRegistry::new();
        match registry.set_enabled("ghost", false) {
            Err(KeystoneError::NotRegistered { kind, name }) => {
                assert_eq!(kind, "tool");
                assert_eq!(name, "ghost");
            }
            other => panic!("expected NotRegistered, got {:?}", other),
        }
    }

    // ── remove / snapshot ─────────────────────────────────────────────────────

    #[test]
    fn remove_is_idempotent() {
        let mut registry = AgentRegistry::new();
        registry.register(AgentSpec::new("echo")).unwrap();

        registry.remove("echo");
        assert!(registry.get("echo").is_none());
        registry.remove("echo");
        registry.remove("never-registered");
        assert!(registry.is_empty());
    }

    #[test]
    fn snapshot_includes_disabled_when_asked() {
        let mut registry = ToolRegistry::new();
        registry.register(tool("system.health", "v1")).unwrap();
        registry.register(tool("dummy.echo", "v1")).unwrap();
        registry.set_enabled("system.health", false).unwrap();

        let all = registry.snapshot(true);
        let names: Vec<&str> = all.entries.iter().map(|r| r.spec.tool_name.as_str()).collect();
        assert_eq!(names, vec!["dummy.echo", "system.health"]);

        assert_eq!(registry.snapshot(false).entries.len(), 1);
    }
}
