//! # keystone-policy
//!
//! Least-privilege authorization for Keystone tools.
//!
//! ## Overview
//!
//! [`check_tool_permission`] compares a persona's [`AgentPolicy`] against a
//! tool's declared [`ToolPermissions`]. Absence of an explicit grant is a
//! denial. [`PolicyBook`] layers a TOML-loadable catalogue of persona
//! policies and tool declarations on top of the checker, and
//! [`PersonaRegistry`] records which agents serve which persona.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use keystone_policy::PolicyBook;
//!
//! let book = PolicyBook::from_file(Path::new("policies/personas.toml"))?;
//! let decision = book.authorize("docs", "shell.exec");
//! assert!(!decision.allowed);
//! ```
//!
//! [`AgentPolicy`]: keystone_contracts::permission::AgentPolicy
//! [`ToolPermissions`]: keystone_contracts::permission::ToolPermissions

pub mod book;
pub mod checker;
pub mod persona_registry;
pub mod personas;

pub use book::{PolicyBook, PolicyConfig, ToolPermissionEntry};
pub use checker::{check_tool_permission, ALL_CHECKS_PASSED};
pub use persona_registry::PersonaRegistry;

// ── Tests ─────────────────────────────────────────────────────────────────────
