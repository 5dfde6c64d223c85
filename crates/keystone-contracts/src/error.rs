//! Error types for the Keystone runtime.
//!
//! Two channels exist side by side:
//!
//! - `KeystoneError` is returned for caller programming errors (registry
//!   version conflicts, toggling an unknown entry, duplicate routing rules,
//!   unreadable configuration). These are hard failures.
//! - `HandlerError` is what agent handlers, pipeline step handlers, and
//!   retried operations return. The runtime converts it into a structured
//!   result and never lets it escape to the request caller.

use thiserror::Error;

/// The unified hard-error type for the Keystone crates.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeystoneError {
    /// The same (name, version) pair was registered with a different body.
    #[error(
        "Cannot register {kind} '{name}' with version {version}: a different specification \
         already exists with this version. Update the version to register a new specification."
    )]
    VersionConflict {
        kind: &'static str,
        name: String,
        /// Rendered version, `'1.0.0'` or `None (unversioned)`.
        version: String,
    },

    /// An operation targeted a name the registry does not hold.
    #[error("{kind} '{name}' is not registered")]
    NotRegistered { kind: &'static str, name: String },

    /// A routing rule with this id already exists in the router.
    #[error("duplicate rule_id: {rule_id}")]
    DuplicateRule { rule_id: String },

    /// A `pattern` routing rule carried a regular expression that does not compile.
    #[error("routing rule '{rule_id}' has an invalid pattern: {reason}")]
    InvalidPattern { rule_id: String, reason: String },

    /// A configuration document is missing, unreadable, or malformed.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },
}

/// Convenience alias used throughout the Keystone crates.
pub type KeystoneResult<T> = Result<T, KeystoneError>;

/// A failure raised by a handler or a retried operation.
///
/// `kind` classifies the failure (matched against `RetryPolicy::abort_on`);
/// `message` is the human-readable text surfaced in results.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct HandlerError {
    pub kind: String,
    pub message: String,
}

impl HandlerError {
    /// Kind assigned when the caller does not classify the failure.
    pub const GENERIC_KIND: &'static str = "Error";

    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// An unclassified failure carrying only a message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new(Self::GENERIC_KIND, message)
    }
}

impl From<KeystoneError> for HandlerError {
    fn from(err: KeystoneError) -> Self {
        let kind = match &err {
            KeystoneError::VersionConflict { .. } => "VersionConflict",
            KeystoneError::NotRegistered { .. } => "NotRegistered",
            KeystoneError::DuplicateRule { .. } => "DuplicateRule",
            KeystoneError::InvalidPattern { .. } => "InvalidPattern",
            KeystoneError::ConfigError { .. } => "ConfigError",
        };
        Self::new(kind, err.to_string())
    }
}
