//! TOML-driven policy book.
//!
//! A `PolicyBook` maps persona labels to `AgentPolicy`s and tool names to
//! their declared `ToolPermissions`. It is loaded from a TOML document:
//!
//! ```toml
//! [[policies]]
//! persona = "docs"
//! allowed_permissions = ["READ_FS", "WRITE_FS"]
//!
//! [[tools]]
//! tool_name = "shell.exec"
//! required_permissions = ["EXEC_SHELL"]
//! ```
//!
//! Authorization through the book is deny-by-default: a persona without a
//! policy is denied every tool.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use keystone_contracts::{
    error::{KeystoneError, KeystoneResult},
    permission::{AgentPolicy, Permission, PolicyDecision, ToolPermissions},
};

use crate::{checker::check_tool_permission, personas};

/// Permission declaration for one tool, as written in TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolPermissionEntry {
    pub tool_name: String,
    #[serde(default)]
    pub required_permissions: BTreeSet<Permission>,
    #[serde(default)]
    pub optional_permissions: BTreeSet<Permission>,
}

/// The top-level structure deserialized from a TOML policy file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default)]
    pub policies: Vec<AgentPolicy>,
    #[serde(default)]
    pub tools: Vec<ToolPermissionEntry>,
}

/// Persona policies plus tool permission declarations.
#[derive(Debug, Clone, Default)]
pub struct PolicyBook {
    policies: BTreeMap<String, AgentPolicy>,
    tools: BTreeMap<String, ToolPermissions>,
}

impl PolicyBook {
    /// An empty book: every authorization is denied.
    pub fn new() -> Self {
        Self::default()
    }

    /// A book holding the built-in `core`, `docs`, and `infra` policies.
    pub fn builtin() -> Self {
        let mut book = Self::new();
        for policy in personas::builtin_policies() {
            book.insert_policy(policy);
        }
        book
    }

    /// Parse `s` as TOML and build a book from it.
    ///
    /// Returns `KeystoneError::ConfigError` if the TOML is malformed, does
    /// not match `PolicyConfig`, or defines a persona or tool twice.
    pub fn from_toml_str(s: &str) -> KeystoneResult<Self> {
        let config: PolicyConfig = toml::from_str(s).map_err(|e| KeystoneError::ConfigError {
            reason: format!("failed to parse policy TOML: {}", e),
        })?;
        Self::from_config(config)
    }

    /// Read the file at `path` and parse it as a TOML policy book.
    pub fn from_file(path: &Path) -> KeystoneResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| KeystoneError::ConfigError {
            reason: format!("failed to read policy file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_config(config: PolicyConfig) -> KeystoneResult<Self> {
        let mut book = Self::new();

        for policy in config.policies {
            if book.policies.contains_key(&policy.persona) {
                return Err(KeystoneError::ConfigError {
                    reason: format!("persona '{}' is defined more than once", policy.persona),
                });
            }
            book.insert_policy(policy);
        }

        for entry in config.tools {
            if book.tools.contains_key(&entry.tool_name) {
                return Err(KeystoneError::ConfigError {
                    reason: format!("tool '{}' is declared more than once", entry.tool_name),
                });
            }
            book.declare_tool(
                entry.tool_name,
                ToolPermissions {
                    required_permissions: entry.required_permissions,
                    optional_permissions: entry.optional_permissions,
                },
            );
        }

        debug!(
            personas = book.policies.len(),
            tools = book.tools.len(),
            "policy book loaded"
        );
        Ok(book)
    }

    /// Add or replace the policy for `policy.persona`.
    pub fn insert_policy(&mut self, policy: AgentPolicy) {
        self.policies.insert(policy.persona.clone(), policy);
    }

    /// Add or replace the permission declaration for `tool_name`.
    pub fn declare_tool(&mut self, tool_name: impl Into<String>, permissions: ToolPermissions) {
        self.tools.insert(tool_name.into(), permissions);
    }

    pub fn policy(&self, persona: &str) -> Option<&AgentPolicy> {
        self.policies.get(persona)
    }

    pub fn tool_permissions(&self, tool_name: &str) -> Option<&ToolPermissions> {
        self.tools.get(tool_name)
    }

    /// Persona labels, sorted.
    pub fn personas(&self) -> impl Iterator<Item = &str> {
        self.policies.keys().map(String::as_str)
    }

    /// All tool declarations, sorted by tool name.
    pub fn tools(&self) -> &BTreeMap<String, ToolPermissions> {
        &self.tools
    }

    /// Decide whether `persona` may run `tool_name`.
    ///
    /// A tool with no declaration requires no permissions; it is still
    /// subject to the persona's allowlist.
    pub fn authorize(&self, persona: &str, tool_name: &str) -> PolicyDecision {
        let Some(policy) = self.policy(persona) else {
            warn!(persona = %persona, tool = %tool_name, "no policy for persona; denying by default");
            return PolicyDecision::deny(format!(
                "denied by default: no policy defined for persona '{}'",
                persona
            ));
        };

        let undeclared = ToolPermissions::default();
        let permissions = self.tool_permissions(tool_name).unwrap_or(&undeclared);
        check_tool_permission(policy, permissions, tool_name)
    }
}
