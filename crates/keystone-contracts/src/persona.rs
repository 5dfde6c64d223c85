//! Persona catalogue entries and agent assignments.

use serde::{Deserialize, Serialize};

/// A persona: a named permission and routing bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaSpec {
    /// Identifier shared with routing targets and policy books.
    pub persona: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
}

impl PersonaSpec {
    pub fn new(persona: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            persona: persona.into(),
            display_name: display_name.into(),
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Links an agent to the persona it serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaAssignment {
    pub agent_name: String,
    pub persona: String,
}
