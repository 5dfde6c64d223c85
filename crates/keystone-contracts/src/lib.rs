//! # keystone-contracts
//!
//! Shared types, schemas, and contracts for the Keystone agent runtime.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate: only data definitions, constructors and error types.

pub mod error;
pub mod permission;
pub mod persona;
pub mod pipeline;
pub mod registry;
pub mod retry;
pub mod routing;
pub mod runtime;
pub mod safety;

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use error::{HandlerError, KeystoneError};
    use permission::{AgentPolicy, Permission, ToolPermissions};
    use pipeline::{PipelineStep, StepStatus, StopCondition};
    use registry::{AgentSpec, RegistrySpec, ToolSpec};
    use retry::RetryPolicy;
    use routing::{MatchStrategy, RoutingResult, RoutingRule};
    use runtime::{ErrorCode, ErrorInfo, RuntimeContext, RuntimeRequest, RuntimeResult};

    // ── Registry specs ───────────────────────────────────────────────────────

    #[test]
    fn agent_spec_equality_is_structural() {
        let a = AgentSpec::new("echo").with_version("1.0.0").with_tags(["core"]);
        let b = AgentSpec::new("echo").with_version("1.0.0").with_tags(["core"]);
        assert_eq!(a, b);
        assert_ne!(a, b.clone().with_description("different"));
        assert_eq!(a.name(), "echo");
        assert_eq!(a.version(), Some("1.0.0"));
        assert_eq!(AgentSpec::KIND, "agent");
    }

    #[test]
    fn tool_spec_deserializes_with_defaults() {
        let spec: ToolSpec = serde_json::from_value(json!({
            "tool_name": "dummy.echo",
            "input_schema": {"type": "object"},
            "output_schema": {"type": "object"}
        }))
        .unwrap();

        assert_eq!(spec.name(), "dummy.echo");
        assert_eq!(spec.version(), None);
        assert!(spec.tags.is_empty());
        assert_eq!(ToolSpec::KIND, "tool");
    }

    // ── Routing ──────────────────────────────────────────────────────────────

    #[test]
    fn routing_rule_defaults_from_json() {
        let rule: RoutingRule = serde_json::from_value(json!({
            "rule_id": "r1",
            "match_strategy": "keyword",
            "match_value": "deploy",
            "target_persona": "infra"
        }))
        .unwrap();

        assert_eq!(rule.match_strategy, MatchStrategy::Keyword);
        assert_eq!(rule.priority, 0);
        assert!(rule.enabled);
        assert_eq!(rule.target_agent, None);
    }

    #[test]
    fn routing_rule_rejects_unknown_strategy() {
        let parsed: Result<RoutingRule, _> = serde_json::from_value(json!({
            "rule_id": "r1",
            "match_strategy": "fuzzy",
            "match_value": "deploy",
            "target_persona": "infra"
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn unmatched_routing_result_has_no_fields() {
        let result = RoutingResult::unmatched();
        assert!(!result.matched);
        assert!(result.rule_id.is_none());
        assert!(result.target_persona.is_none());
        assert!(result.target_agent.is_none());
    }

    // ── Permissions ──────────────────────────────────────────────────────────

    #[test]
    fn permission_wire_names() {
        assert_eq!(
            serde_json::to_string(&Permission::ExecShell).unwrap(),
            "\"EXEC_SHELL\""
        );
        let parsed: Permission = serde_json::from_str("\"DB_WRITE\"").unwrap();
        assert_eq!(parsed, Permission::DbWrite);
        for p in Permission::ALL {
            assert_eq!(p.to_string(), p.as_str());
        }
    }

    #[test]
    fn policy_grants_only_listed_permissions() {
        let policy = AgentPolicy::new("docs", [Permission::ReadFs, Permission::WriteFs]);
        assert!(policy.grants(Permission::ReadFs));
        assert!(!policy.grants(Permission::ExecShell));
        assert!(policy.allowed_tools.is_empty());
    }

    #[test]
    fn tool_permissions_deduplicate() {
        let perms = ToolPermissions::requiring([Permission::NetHttp, Permission::NetHttp]);
        assert_eq!(perms.required_permissions.len(), 1);
        assert!(perms.optional_permissions.is_empty());
    }

    // ── Pipeline ─────────────────────────────────────────────────────────────

    #[test]
    fn step_defaults_to_stop_on_error() {
        let step = PipelineStep::new("fetch", "http_get");
        assert_eq!(step.stop_condition, StopCondition::OnError);
        assert!(step.enabled);
    }

    #[test]
    fn stop_condition_table() {
        assert!(StopCondition::Always.halts(true));
        assert!(StopCondition::Always.halts(false));
        assert!(StopCondition::OnError.halts(true));
        assert!(!StopCondition::OnError.halts(false));
        assert!(StopCondition::OnSuccess.halts(false));
        assert!(!StopCondition::OnSuccess.halts(true));
        assert!(!StopCondition::Never.halts(true));
        assert!(!StopCondition::Never.halts(false));
    }

    #[test]
    fn step_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&StepStatus::Skipped).unwrap(),
            "\"skipped\""
        );
    }

    // ── Runtime ──────────────────────────────────────────────────────────────

    #[test]
    fn request_without_meta_gets_defaults() {
        let request: RuntimeRequest =
            serde_json::from_value(json!({"agent": "echo", "input": "hello"})).unwrap();
        let ctx = request.into_context();

        assert_eq!(ctx.agent(), "echo");
        assert_eq!(ctx.input(), "hello");
        assert_eq!(ctx.mode(), "dev");
        assert!(!ctx.trace_id().is_empty());
    }

    #[test]
    fn request_meta_trace_id_is_kept() {
        let request: RuntimeRequest = serde_json::from_value(json!({
            "agent": "echo",
            "input": "hello",
            "meta": {"trace_id": "t-123", "mode": "prod"}
        }))
        .unwrap();
        let ctx = request.into_context();

        assert_eq!(ctx.trace_id(), "t-123");
        assert_eq!(ctx.mode(), "prod");
    }

    #[test]
    fn generated_trace_ids_are_unique() {
        let ids: std::collections::HashSet<String> = (0..100)
            .map(|_| RuntimeContext::new("echo", "x").trace_id().to_string())
            .collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn runtime_result_always_serializes_errors() {
        let ctx = RuntimeContext::new("echo", "hi").with_trace_id("t-1");
        let value = serde_json::to_value(RuntimeResult::ok(&ctx, "hi")).unwrap();

        assert_eq!(
            value,
            json!({
                "status": "ok",
                "trace_id": "t-1",
                "agent": "echo",
                "output": "hi",
                "errors": []
            })
        );
    }

    #[test]
    fn error_code_wire_names() {
        let ctx = RuntimeContext::new("ghost", "x");
        let result = RuntimeResult::error(
            &ctx,
            ErrorInfo::new(ErrorCode::AgentNotFound, "Agent 'ghost' not found")
                .with_detail("agent", "ghost"),
        );
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["status"], "error");
        assert_eq!(value["output"], serde_json::Value::Null);
        assert_eq!(value["errors"][0]["code"], "AGENT_NOT_FOUND");
        assert_eq!(value["errors"][0]["details"]["agent"], "ghost");
    }

    // ── Retry ────────────────────────────────────────────────────────────────

    #[test]
    fn retry_policy_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.timeout_seconds, 30.0);
        assert_eq!(policy.backoff_seconds, 0.0);
        assert!(policy.abort_on.is_empty());

        let partial: RetryPolicy = serde_json::from_value(json!({"max_retries": 5})).unwrap();
        assert_eq!(partial.max_retries, 5);
        assert_eq!(partial.timeout_seconds, 30.0);
    }

    // ── Errors ───────────────────────────────────────────────────────────────

    #[test]
    fn version_conflict_display_names_version() {
        let err = KeystoneError::VersionConflict {
            kind: "agent",
            name: "echo".to_string(),
            version: "'1.0.0'".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("agent 'echo'"));
        assert!(msg.contains("'1.0.0'"));
    }

    #[test]
    fn not_registered_display() {
        let err = KeystoneError::NotRegistered {
            kind: "tool",
            name: "ghost".to_string(),
        };
        assert_eq!(err.to_string(), "tool 'ghost' is not registered");
    }

    #[test]
    fn handler_error_from_keystone_error_keeps_message() {
        let err = HandlerError::from(KeystoneError::ConfigError {
            reason: "missing file".to_string(),
        });
        assert_eq!(err.kind, "ConfigError");
        assert_eq!(err.to_string(), "configuration error: missing file");
        assert_eq!(HandlerError::msg("boom").kind, HandlerError::GENERIC_KIND);
    }
}
