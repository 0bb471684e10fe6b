//! Error types for the Troupe application.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Troupe application.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum TroupeError {
    /// Persona lookup failed against the catalog
    #[error("Persona not found: '{name}'")]
    PersonaNotFound { name: String },

    /// Session lookup failed against the session table
    #[error("Session not found: '{id}'")]
    SessionNotFound { id: String },

    /// No backend binding exists for the given persona
    #[error("No backend binding for persona '{persona}'")]
    BindingNotFound { persona: String },

    /// A backend failed to produce a generation (transient, retried by the
    /// orchestrator up to the retry policy limit)
    #[error("Backend generation failed: {message}")]
    Generation { message: String },

    /// Registry/graph-store error (surfaced to the caller, never retried here)
    #[error("Registry error: {message}")]
    Registry { message: String },

    /// A task run was cancelled before it could finish
    #[error("Task run cancelled")]
    Cancelled,

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TroupeError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a PersonaNotFound error
    pub fn persona_not_found(name: impl Into<String>) -> Self {
        Self::PersonaNotFound { name: name.into() }
    }

    /// Creates a SessionNotFound error
    pub fn session_not_found(id: impl Into<String>) -> Self {
        Self::SessionNotFound { id: id.into() }
    }

    /// Creates a BindingNotFound error
    pub fn binding_not_found(persona: impl Into<String>) -> Self {
        Self::BindingNotFound {
            persona: persona.into(),
        }
    }

    /// Creates a Generation error
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation {
            message: message.into(),
        }
    }

    /// Creates a Registry error
    pub fn registry(message: impl Into<String>) -> Self {
        Self::Registry {
            message: message.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a PersonaNotFound or SessionNotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::PersonaNotFound { .. } | Self::SessionNotFound { .. }
        )
    }

    /// Check if this is a Generation error
    pub fn is_generation(&self) -> bool {
        matches!(self, Self::Generation { .. })
    }

    /// Check if this is a Registry error
    pub fn is_registry(&self) -> bool {
        matches!(self, Self::Registry { .. })
    }

    /// Check if this is a Cancelled error
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for TroupeError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for TroupeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for TroupeError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for TroupeError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, TroupeError>`.
pub type Result<T> = std::result::Result<T, TroupeError>;
