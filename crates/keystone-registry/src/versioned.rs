//! In-memory versioned registry.
//!
//! The core invariant: a given (name, version) pair denotes exactly one
//! immutable specification. Re-registering an identical spec is a no-op,
//! a new version replaces the old one, and a different body under the same
//! version is rejected.

use std::collections::BTreeMap;

use chrono::Utc;
use tracing::{debug, info, warn};

use keystone_contracts::{
    error::{KeystoneError, KeystoneResult},
    registry::{Registration, RegistrySnapshot, RegistrySpec},
};

/// A keyed store of specifications with enable/disable support.
///
/// Entries are kept in a `BTreeMap`, so every listing comes back sorted by
/// name regardless of registration order. No internal locking: callers
/// sharing a registry across threads must serialize access themselves.
#[derive(Debug, Clone)]
pub struct VersionedRegistry<S> {
    entries: BTreeMap<String, Registration<S>>,
}

impl<S> Default for VersionedRegistry<S> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<S: RegistrySpec> VersionedRegistry<S> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `spec`, returning the registration now stored under its name.
    ///
    /// - unseen name: new registration, enabled
    /// - identical spec: existing registration returned unchanged
    /// - different version: replaced, keeping the prior `enabled` flag and
    ///   stamping a new `created_at`
    /// - same version, different body: `KeystoneError::VersionConflict`
    pub fn register(&mut self, spec: S) -> KeystoneResult<Registration<S>> {
        let name = spec.name().to_string();

        let Some(existing) = self.entries.get(&name) else {
            info!(kind = S::KIND, name = %name, version = ?spec.version(), "registered");
            let registration = Registration::new(spec);
            self.entries.insert(name, registration.clone());
            return Ok(registration);
        };

        if existing.spec == spec {
            debug!(kind = S::KIND, name = %name, "identical spec re-registered, no change");
            return Ok(existing.clone());
        }

        if existing.spec.version() == spec.version() {
            let version = match spec.version() {
                Some(v) => format!("'{v}'"),
                None => "None (unversioned)".to_string(),
            };
            warn!(kind = S::KIND, name = %name, version = %version, "version conflict");
            return Err(KeystoneError::VersionConflict {
                kind: S::KIND,
                name,
                version,
            });
        }

        info!(
            kind = S::KIND,
            name = %name,
            from = ?existing.spec.version(),
            to = ?spec.version(),
            "replaced with new version"
        );
        let registration = Registration {
            spec,
            enabled: existing.enabled,
            created_at: Utc::now(),
        };
        self.entries.insert(name, registration.clone());
        Ok(registration)
    }

    /// All registrations sorted by name; disabled ones only when asked for.
    pub fn list_all(&self, include_disabled: bool) -> Vec<&Registration<S>> {
        self.entries
            .values()
            .filter(|r| include_disabled || r.enabled)
            .collect()
    }

    /// The registration stored under `name`, enabled or not.
    pub fn get(&self, name: &str) -> Option<&Registration<S>> {
        self.entries.get(name)
    }

    /// Whether `name` is registered, enabled or not.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Enable or disable `name`. Already being in the requested state is a no-op.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> KeystoneResult<Registration<S>> {
        let existing = self
            .entries
            .get_mut(name)
            .ok_or_else(|| KeystoneError::NotRegistered {
                kind: S::KIND,
                name: name.to_string(),
            })?;

        if existing.enabled != enabled {
            info!(kind = S::KIND, name = %name, enabled, "enabled flag changed");
            existing.enabled = enabled;
        }
        Ok(existing.clone())
    }

    /// Remove `name`. Removing an unknown name succeeds silently.
    pub fn remove(&mut self, name: &str) {
        if self.entries.remove(name).is_some() {
            info!(kind = S::KIND, name = %name, "removed");
        }
    }

    /// Copy of every registration (disabled included unless excluded), sorted by name.
    pub fn snapshot(&self, include_disabled: bool) -> RegistrySnapshot<S> {
        RegistrySnapshot {
            entries: self.list_all(include_disabled).into_iter().cloned().collect(),
        }
    }

    /// Number of registrations, disabled ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry holds no registrations.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
