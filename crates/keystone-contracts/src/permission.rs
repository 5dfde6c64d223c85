//! Permission model for tools and agent personas.
//!
//! Keystone is least-privilege: a tool declares the permissions it needs,
//! a persona policy declares what it grants, and anything not explicitly
//! granted is denied.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A capability a tool can require and a persona can grant.
///
/// The set is closed; extending it means adding a variant so every match
/// over permissions is revisited at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    /// Read files and directories.
    ReadFs,
    /// Create, modify, or delete files.
    WriteFs,
    /// Outbound HTTP/HTTPS requests.
    NetHttp,
    /// Run shell commands on the host.
    ExecShell,
    /// Read environment variables.
    ReadEnv,
    DbRead,
    DbWrite,
}

impl Permission {
    /// Every permission, in declaration order.
    pub const ALL: [Permission; 7] = [
        Permission::ReadFs,
        Permission::WriteFs,
        Permission::NetHttp,
        Permission::ExecShell,
        Permission::ReadEnv,
        Permission::DbRead,
        Permission::DbWrite,
    ];

    /// The wire name, e.g. `"EXEC_SHELL"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ReadFs => "READ_FS",
            Permission::WriteFs => "WRITE_FS",
            Permission::NetHttp => "NET_HTTP",
            Permission::ExecShell => "EXEC_SHELL",
            Permission::ReadEnv => "READ_ENV",
            Permission::DbRead => "DB_READ",
            Permission::DbWrite => "DB_WRITE",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Permissions declared by a tool.
///
/// Only `required_permissions` take part in authorization; the optional
/// set is advisory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolPermissions {
    #[serde(default)]
    pub required_permissions: BTreeSet<Permission>,
    #[serde(default)]
    pub optional_permissions: BTreeSet<Permission>,
}

impl ToolPermissions {
    pub fn requiring<I: IntoIterator<Item = Permission>>(required: I) -> Self {
        Self {
            required_permissions: required.into_iter().collect(),
            optional_permissions: BTreeSet::new(),
        }
    }

    pub fn with_optional<I: IntoIterator<Item = Permission>>(mut self, optional: I) -> Self {
        self.optional_permissions = optional.into_iter().collect();
        self
    }
}

/// The permission policy attached to a persona.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentPolicy {
    /// Persona label, e.g. "core", "infra", "docs".
    pub persona: String,
    #[serde(default)]
    pub allowed_permissions: BTreeSet<Permission>,
    /// Tool allowlist. Empty means every tool passes this check.
    #[serde(default)]
    pub allowed_tools: Vec<String>,
}

impl AgentPolicy {
    pub fn new<I: IntoIterator<Item = Permission>>(persona: impl Into<String>, allowed: I) -> Self {
        Self {
            persona: persona.into(),
            allowed_permissions: allowed.into_iter().collect(),
            allowed_tools: Vec::new(),
        }
    }

    pub fn with_tools<I, T>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.allowed_tools = tools.into_iter().map(Into::into).collect();
        self
    }

    /// True if this policy grants `permission`.
    pub fn grants(&self, permission: Permission) -> bool {
        self.allowed_permissions.contains(&permission)
    }
}

/// The result of an authorization check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDecision {
    pub allowed: bool,
    pub reason: String,
}

impl PolicyDecision {
    pub fn allow(reason: impl Into<String>) -> Self {
        Self { allowed: true, reason: reason.into() }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self { allowed: false, reason: reason.into() }
    }
}
