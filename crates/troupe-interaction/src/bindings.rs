//! Backend binding construction from configuration.
//!
//! Turns the `[backends.*]` and `[bindings]` config sections into the
//! explicit lookup tables the orchestrator requires at session creation.
//! A binding that references an undeclared backend key is a configuration
//! error; misconfiguration fails loudly instead of being masked by a
//! default.

use crate::claude_api::ClaudeApiBackend;
use crate::openai_api::OpenAiApiBackend;
use crate::scripted::ScriptedBackend;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;
use troupe_core::backend::{AiBackend, BackendBindings, BindingTable};
use troupe_core::{Result, TroupeError};

/// Which backend implementation a `[backends.*]` entry builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Claude REST API
    Claude,
    /// OpenAI-compatible chat-completions API
    OpenAi,
    /// Deterministic scripted backend (no network)
    Scripted,
}

/// One `[backends.<key>]` config entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Implementation to construct
    pub kind: BackendKind,
    /// Model override
    #[serde(default)]
    pub model: Option<String>,
    /// Endpoint override (OpenAI-compatible providers)
    #[serde(default)]
    pub base_url: Option<String>,
    /// System prompt sent with every request
    #[serde(default)]
    pub system: Option<String>,
    /// Generation token cap (Claude)
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

/// The `[backends.*]` + `[bindings]` configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InteractionConfig {
    /// Backend definitions keyed by binding key
    #[serde(default)]
    pub backends: HashMap<String, BackendConfig>,
    /// Persona name → binding key
    #[serde(default)]
    pub bindings: HashMap<String, String>,
}

/// Builds the binding tables from configuration.
///
/// API-keyed backends that cannot find their key in the environment fall
/// back to the scripted backend with a warning, so the process still comes
/// up in development environments. Bindings that name an undeclared
/// backend key are rejected outright.
///
/// # Errors
///
/// Returns `TroupeError::Config` when a `[bindings]` entry references a
/// backend key with no `[backends.*]` definition.
pub fn build_bindings(config: &InteractionConfig) -> Result<(BindingTable, BackendBindings)> {
    let mut bindings = BackendBindings::new();
    for (key, backend_config) in &config.backends {
        bindings = bindings.insert(key.clone(), build_backend(key, backend_config));
    }

    let mut table = BindingTable::new();
    for (persona, key) in &config.bindings {
        if !config.backends.contains_key(key) {
            return Err(TroupeError::config(format!(
                "binding '{persona}' references unknown backend '{key}'"
            )));
        }
        table = table.bind(persona.clone(), key.clone());
    }

    Ok((table, bindings))
}

fn build_backend(key: &str, config: &BackendConfig) -> Arc<dyn AiBackend> {
    match config.kind {
        BackendKind::Claude => match ClaudeApiBackend::try_from_env() {
            Ok(mut backend) => {
                if let Some(model) = &config.model {
                    backend = backend.with_model(model.clone());
                }
                if let Some(system) = &config.system {
                    backend = backend.with_system(system.clone());
                }
                if let Some(max_tokens) = config.max_tokens {
                    backend = backend.with_max_tokens(max_tokens);
                }
                Arc::new(backend)
            }
            Err(err) => scripted_fallback(key, err),
        },
        BackendKind::OpenAi => match OpenAiApiBackend::try_from_env() {
            Ok(mut backend) => {
                if let Some(model) = &config.model {
                    backend = backend.with_model(model.clone());
                }
                if let Some(base_url) = &config.base_url {
                    backend = backend.with_base_url(base_url.clone());
                }
                if let Some(system) = &config.system {
                    backend = backend.with_system(system.clone());
                }
                Arc::new(backend)
            }
            Err(err) => scripted_fallback(key, err),
        },
        BackendKind::Scripted => Arc::new(ScriptedBackend::new()),
    }
}

fn scripted_fallback(key: &str, err: TroupeError) -> Arc<dyn AiBackend> {
    warn!("Backend '{key}' is not usable ({err}), using scripted backend");
    Arc::new(ScriptedBackend::new())
}
