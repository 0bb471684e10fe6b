//! AI backend capability contract and binding tables.
//!
//! The orchestrator talks to AI backends through a single capability:
//! `generate(prompt) -> Generation`. Which backend a persona uses is decided
//! at session-creation time through an explicit two-step lookup: a
//! [`BindingTable`] maps persona name to a binding key, and
//! [`BackendBindings`] maps binding key to a live backend. A persona with no
//! table entry, or a key with no backend, fails loudly with
//! `BindingNotFound`; there is no silent default.

use crate::error::{Result, TroupeError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Successful output of a backend generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generation {
    /// The generated response text
    pub text: String,
}

impl Generation {
    /// Wraps response text in a `Generation`.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// The uniform capability every AI backend must provide.
///
/// Implementations must fail with a typed error (`TroupeError::Generation`)
/// on any backend-side problem (timeout, auth failure, quota), never with a
/// silent empty string.
#[async_trait]
pub trait AiBackend: Send + Sync {
    /// Short backend identifier used in logs (e.g. "claude-api").
    fn name(&self) -> &str;

    /// Generates a response for the given prompt text.
    ///
    /// # Errors
    ///
    /// Returns `TroupeError::Generation` when the backend cannot produce a
    /// response. The orchestrator treats this as transient and retries under
    /// its policy.
    async fn generate(&self, prompt: &str) -> Result<Generation>;
}

impl std::fmt::Debug for dyn AiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiBackend").field("name", &self.name()).finish()
    }
}

/// Explicit persona-name → binding-key table.
///
/// Passed to `create_session` so the persona/backend pairing is visible at
/// the call site instead of being baked into the orchestrator.
#[derive(Debug, Clone, Default)]
pub struct BindingTable {
    entries: HashMap<String, String>,
}

impl BindingTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a persona name to a binding key (builder style).
    pub fn bind(mut self, persona: impl Into<String>, key: impl Into<String>) -> Self {
        self.entries.insert(persona.into(), key.into());
        self
    }

    /// Looks up the binding key for a persona name.
    pub fn key_for(&self, persona: &str) -> Option<&str> {
        self.entries.get(persona).map(String::as_str)
    }
}

/// Binding-key → backend capability map.
#[derive(Clone, Default)]
pub struct BackendBindings {
    backends: HashMap<String, Arc<dyn AiBackend>>,
}

impl BackendBindings {
    /// Creates an empty binding map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a backend under a binding key (builder style).
    pub fn insert(mut self, key: impl Into<String>, backend: Arc<dyn AiBackend>) -> Self {
        self.backends.insert(key.into(), backend);
        self
    }

    /// Looks up a backend by binding key.
    pub fn get(&self, key: &str) -> Option<Arc<dyn AiBackend>> {
        self.backends.get(key).cloned()
    }

    /// Resolves the backend bound to a persona through the binding table.
    ///
    /// # Errors
    ///
    /// Returns `TroupeError::BindingNotFound` when the persona has no table
    /// entry or the table entry names an unregistered key.
    pub fn resolve(&self, table: &BindingTable, persona: &str) -> Result<Arc<dyn AiBackend>> {
        let key = table
            .key_for(persona)
            .ok_or_else(|| TroupeError::binding_not_found(persona))?;
        self.get(key)
            .ok_or_else(|| TroupeError::binding_not_found(persona))
    }

    /// Returns all registered binding keys.
    pub fn keys(&self) -> Vec<String> {
        self.backends.keys().cloned().collect()
    }
}

impl std::fmt::Debug for BackendBindings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendBindings")
            .field("keys", &self.keys())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoBackend;

    #[async_trait]
    impl AiBackend for EchoBackend {
        fn name(&self) -> &str {
            "echo"
        }

        async fn generate(&self, prompt: &str) -> Result<Generation> {
            Ok(Generation::new(prompt))
        }
    }

    #[test]
    fn test_resolve_bound_persona() {
        let table = BindingTable::new().bind("Tester", "echo");
        let bindings = BackendBindings::new().insert("echo", Arc::new(EchoBackend));

        let backend = bindings.resolve(&table, "Tester").unwrap();
        assert_eq!(backend.name(), "echo");
    }

    #[test]
    fn test_resolve_unbound_persona_fails_loudly() {
        let table = BindingTable::new().bind("Tester", "echo");
        let bindings = BackendBindings::new().insert("echo", Arc::new(EchoBackend));

        let err = bindings.resolve(&table, "Planner").unwrap_err();
        assert!(matches!(err, TroupeError::BindingNotFound { persona } if persona == "Planner"));
    }

    #[test]
    fn test_resolve_dangling_key_fails_loudly() {
        let table = BindingTable::new().bind("Tester", "missing-key");
        let bindings = BackendBindings::new();

        let err = bindings.resolve(&table, "Tester").unwrap_err();
        assert!(matches!(err, TroupeError::BindingNotFound { .. }));
    }
}
