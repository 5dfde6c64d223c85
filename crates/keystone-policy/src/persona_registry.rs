//! Persona catalogue and agent-to-persona assignments.
//!
//! Ties the persona a router picks (and a `PolicyBook` authorizes) back to
//! the agents that serve it. Every listing is sorted.

use std::collections::BTreeMap;

use tracing::{debug, info};

use keystone_contracts::{
    error::{KeystoneError, KeystoneResult},
    persona::{PersonaAssignment, PersonaSpec},
};

use crate::personas;

#[derive(Debug, Clone, Default)]
pub struct PersonaRegistry {
    personas: BTreeMap<String, PersonaSpec>,
    /// agent name → persona
    assignments: BTreeMap<String, String>,
}

impl PersonaRegistry {
    /// A registry holding the built-in `core`, `docs`, and `infra` personas.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for spec in personas::builtin_personas() {
            registry.insert_persona(spec);
        }
        registry
    }

    /// A registry with no personas; every assignment fails until one is added.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add or replace the catalogue entry for `spec.persona`.
    pub fn insert_persona(&mut self, spec: PersonaSpec) {
        debug!(persona = %spec.persona, "persona added");
        self.personas.insert(spec.persona.clone(), spec);
    }

    /// The catalogue entry for `persona`.
    pub fn get_persona(&self, persona: &str) -> Option<&PersonaSpec> {
        self.personas.get(persona)
    }

    /// Catalogue entries sorted by persona.
    pub fn list_personas(&self) -> Vec<&PersonaSpec> {
        self.personas.values().collect()
    }

    /// Assign `agent_name` to `persona`, replacing any previous assignment.
    ///
    /// Fails with `NotRegistered` when `persona` is not in the catalogue.
    pub fn assign(&mut self, agent_name: &str, persona: &str) -> KeystoneResult<PersonaAssignment> {
        if !self.personas.contains_key(persona) {
            return Err(KeystoneError::NotRegistered {
                kind: "persona",
                name: persona.to_string(),
            });
        }
        let previous = self
            .assignments
            .insert(agent_name.to_string(), persona.to_string());
        info!(agent = %agent_name, persona = %persona, previous = ?previous, "persona assigned");
        Ok(PersonaAssignment {
            agent_name: agent_name.to_string(),
            persona: persona.to_string(),
        })
    }

    /// The persona `agent_name` is assigned to, if any.
    pub fn get_assignment(&self, agent_name: &str) -> Option<PersonaAssignment> {
        self.assignments
            .get(agent_name)
            .map(|persona| PersonaAssignment {
                agent_name: agent_name.to_string(),
                persona: persona.clone(),
            })
    }

    /// All assignments sorted by agent name.
    pub fn list_assignments(&self) -> Vec<PersonaAssignment> {
        self.assignments
            .iter()
            .map(|(agent_name, persona)| PersonaAssignment {
                agent_name: agent_name.clone(),
                persona: persona.clone(),
            })
            .collect()
    }

    /// Agents assigned to `persona`, sorted.
    pub fn agents_for_persona(&self, persona: &str) -> Vec<&str> {
        self.assignments
            .iter()
            .filter(|(_, p)| p.as_str() == persona)
            .map(|(agent_name, _)| agent_name.as_str())
            .collect()
    }

    /// Remove the assignment for `agent_name`. Returns true if one existed.
    pub fn remove_assignment(&mut self, agent_name: &str) -> bool {
        let removed = self.assignments.remove(agent_name).is_some();
        if removed {
            info!(agent = %agent_name, "persona assignment removed");
        }
        removed
    }
}
