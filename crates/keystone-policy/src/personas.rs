//! Built-in persona policies.
//!
//! - `docs`: filesystem read/write only.
//! - `infra`: filesystem, shell, network, and environment reads.
//! - `core`: filesystem read, network, and environment reads; no shell.

use keystone_contracts::{
    permission::{AgentPolicy, Permission},
    persona::PersonaSpec,
};

pub const DOCS: &str = "docs";
pub const INFRA: &str = "infra";
pub const CORE: &str = "core";

pub fn docs_policy() -> AgentPolicy {
    AgentPolicy::new(DOCS, [Permission::ReadFs, Permission::WriteFs])
}

pub fn infra_policy() -> AgentPolicy {
    AgentPolicy::new(
        INFRA,
        [
            Permission::ReadFs,
            Permission::WriteFs,
            Permission::NetHttp,
            Permission::ExecShell,
            Permission::ReadEnv,
        ],
    )
}

pub fn core_policy() -> AgentPolicy {
    AgentPolicy::new(
        CORE,
        [Permission::ReadFs, Permission::NetHttp, Permission::ReadEnv],
    )
}

/// All built-in policies, sorted by persona.
pub fn builtin_policies() -> Vec<AgentPolicy> {
    vec![core_policy(), docs_policy(), infra_policy()]
}

/// Catalogue entries for the built-in personas, sorted by persona.
pub fn builtin_personas() -> Vec<PersonaSpec> {
    vec![
        PersonaSpec::new(CORE, "Core")
            .with_description("Core domain logic, runtime primitives, and contracts."),
        PersonaSpec::new(DOCS, "Docs")
            .with_description("Documentation updates and knowledge-base tasks."),
        PersonaSpec::new(INFRA, "Infra")
            .with_description("Infrastructure, deployment, and operational tasks."),
    ]
}
