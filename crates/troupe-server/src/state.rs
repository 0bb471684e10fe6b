//! Shared application state.

use crate::config::AppConfig;
use std::sync::Arc;
use troupe_core::Result;
use troupe_core::agent::AgentRegistry;
use troupe_core::backend::{BackendBindings, BindingTable};
use troupe_core::persona::PersonaCatalog;
use troupe_core::session::{Orchestrator, RetryPolicy};
use troupe_core::task::TaskManager;
use troupe_interaction::build_bindings;
use troupe_registry::{GraphAgentRegistry, MemoryGraphStore};

/// Everything the route handlers need, cheaply cloneable.
#[derive(Clone)]
pub struct AppState {
    /// Session table and task execution
    pub orchestrator: Arc<Orchestrator>,
    /// Agent directory
    pub registry: Arc<dyn AgentRegistry>,
    /// Task batch lifecycle records
    pub tasks: Arc<TaskManager>,
    /// Persona directory
    pub catalog: Arc<PersonaCatalog>,
    /// Persona → binding key table
    pub table: Arc<BindingTable>,
    /// Binding key → backend map
    pub bindings: Arc<BackendBindings>,
    /// Default retry budget for submitted batches
    pub retry: RetryPolicy,
}

impl AppState {
    /// Wires the application together from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the persona catalog cannot be loaded or the
    /// binding configuration is inconsistent.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let catalog = config.load_catalog()?;
        let (table, bindings) = build_bindings(&config.interaction)?;

        Ok(Self {
            orchestrator: Arc::new(Orchestrator::new()),
            registry: Arc::new(GraphAgentRegistry::new(Arc::new(MemoryGraphStore::new()))),
            tasks: Arc::new(TaskManager::new()),
            catalog: Arc::new(catalog),
            table: Arc::new(table),
            bindings: Arc::new(bindings),
            retry: config.retry,
        })
    }
}
