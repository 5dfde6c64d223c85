//! Registry entry types for agents and tools.
//!
//! Both registries share one algorithm, so the specs implement a common
//! `RegistrySpec` trait and are wrapped in the same `Registration<S>`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The view of a specification that a versioned registry needs.
///
/// Equality (`PartialEq`) must be structural: two specs with the same
/// fields denote the same registration.
pub trait RegistrySpec: Clone + PartialEq {
    /// Entity label used in error messages ("agent", "tool").
    const KIND: &'static str;

    /// Unique registry key.
    fn name(&self) -> &str;

    /// Optional version identifier.
    fn version(&self) -> Option<&str>;
}

/// Specification of a runnable agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSpec {
    pub agent_name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl AgentSpec {
    pub fn new(agent_name: impl Into<String>) -> Self {
        Self {
            agent_name: agent_name.into(),
            version: None,
            description: None,
            tags: Vec::new(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

impl RegistrySpec for AgentSpec {
    const KIND: &'static str = "agent";

    fn name(&self) -> &str {
        &self.agent_name
    }

    fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}

/// Specification of a tool, including its input and output schemas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub tool_name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// JSON-serializable schema of the expected input.
    pub input_schema: Value,
    /// JSON-serializable schema of the produced output.
    pub output_schema: Value,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ToolSpec {
    pub fn new(tool_name: impl Into<String>, input_schema: Value, output_schema: Value) -> Self {
        Self {
            tool_name: tool_name.into(),
            version: None,
            description: None,
            input_schema,
            output_schema,
            tags: Vec::new(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

impl RegistrySpec for ToolSpec {
    const KIND: &'static str = "tool";

    fn name(&self) -> &str {
        &self.tool_name
    }

    fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}

/// A stored specification plus its enabled flag and registration time.
///
/// Registrations are replaced wholesale, never edited in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration<S> {
    pub spec: S,
    pub enabled: bool,
    /// When this registration (or its current version) was recorded.
    pub created_at: DateTime<Utc>,
}

impl<S> Registration<S> {
    /// A fresh, enabled registration stamped with the current time.
    pub fn new(spec: S) -> Self {
        Self {
            spec,
            enabled: true,
            created_at: Utc::now(),
        }
    }
}

/// Point-in-time copy of a registry, sorted by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrySnapshot<S> {
    pub entries: Vec<Registration<S>>,
}
