//! The CLI catalog: agents, tools, persona assignments and routing rules
//! loaded from TOML.

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use keystone_contracts::{
    error::{KeystoneError, KeystoneResult},
    persona::PersonaAssignment,
    registry::{AgentSpec, RegistrySpec, ToolSpec},
    routing::RoutingRule,
};
use keystone_core::IntentRouter;
use keystone_policy::PersonaRegistry;
use keystone_registry::{AgentRegistry, ToolRegistry, VersionedRegistry};

/// Catalog compiled into the binary, used when `--config` is absent.
pub const DEFAULT_CATALOG: &str = include_str!("../config/catalog.toml");

fn enabled_by_default() -> bool {
    true
}

/// One registry entry plus its initial enabled flag.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry<S> {
    #[serde(flatten)]
    pub spec: S,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub agents: Vec<CatalogEntry<AgentSpec>>,
    #[serde(default)]
    pub tools: Vec<CatalogEntry<ToolSpec>>,
    #[serde(default)]
    pub assignments: Vec<PersonaAssignment>,
    #[serde(default)]
    pub routes: Vec<RoutingRule>,
}

impl Catalog {
    pub fn from_toml_str(s: &str) -> KeystoneResult<Self> {
        toml::from_str(s).map_err(|e| KeystoneError::ConfigError {
            reason: format!("failed to parse catalog TOML: {}", e),
        })
    }

    pub fn from_file(path: &Path) -> KeystoneResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| KeystoneError::ConfigError {
            reason: format!("failed to read catalog file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// The catalog at `path`, or the built-in one.
    pub fn load(path: Option<&Path>) -> KeystoneResult<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::from_toml_str(DEFAULT_CATALOG),
        }
    }

    pub fn agent_registry(&self) -> KeystoneResult<AgentRegistry> {
        build_registry(&self.agents)
    }

    pub fn tool_registry(&self) -> KeystoneResult<ToolRegistry> {
        build_registry(&self.tools)
    }

    /// Built-in personas with the catalog's agent assignments applied in order.
    pub fn persona_registry(&self) -> KeystoneResult<PersonaRegistry> {
        let mut registry = PersonaRegistry::new();
        for assignment in &self.assignments {
            registry.assign(&assignment.agent_name, &assignment.persona)?;
        }
        Ok(registry)
    }

    pub fn router(&self) -> KeystoneResult<IntentRouter> {
        IntentRouter::from_rules(self.routes.iter().cloned())
    }
}

fn build_registry<S: RegistrySpec>(entries: &[CatalogEntry<S>]) -> KeystoneResult<VersionedRegistry<S>> {
    let mut registry = VersionedRegistry::new();
    for entry in entries {
        let registration = registry.register(entry.spec.clone())?;
        if !entry.enabled {
            registry.set_enabled(registration.spec.name(), false)?;
        }
    }
    debug!(kind = S::KIND, entries = registry.len(), "catalog registry built");
    Ok(registry)
}
