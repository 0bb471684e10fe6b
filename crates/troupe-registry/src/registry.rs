//! Graph-backed agent registry.
//!
//! Implements the core [`AgentRegistry`] trait over a [`GraphStore`].
//! Every operation is a single query wrapped in a scoped session: the
//! session is opened at the start of the call and released on every exit
//! path. Store failures surface as `TroupeError::Registry`; no retry is
//! attempted at this layer.

use crate::graph::{GraphQuery, GraphStore, NodeProps, QueryOutput};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};
use troupe_core::agent::{AgentRecord, AgentRegistry};
use troupe_core::{Result, TroupeError};

/// Agent directory persisted in a property graph.
pub struct GraphAgentRegistry {
    store: Arc<dyn GraphStore>,
}

impl GraphAgentRegistry {
    /// Creates a registry over the given store.
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self { store }
    }

    /// Runs one query inside a scoped session.
    ///
    /// The session is released whether or not the query succeeds; a close
    /// failure after a successful query is logged rather than masking the
    /// query result.
    async fn run_scoped(&self, query: GraphQuery) -> Result<QueryOutput> {
        let mut session = self
            .store
            .open_session()
            .await
            .map_err(as_registry_error)?;

        let result = session.run(query).await.map_err(as_registry_error);
        if let Err(close_err) = session.close().await {
            warn!("Failed to release graph session: {close_err}");
        }
        result
    }
}

/// Any store-side failure propagates as a generic registry error.
fn as_registry_error(err: TroupeError) -> TroupeError {
    if err.is_registry() {
        err
    } else {
        TroupeError::registry(err.to_string())
    }
}

fn record_from_node(node: NodeProps) -> Result<AgentRecord> {
    AgentRecord::from_properties(node).map_err(as_registry_error)
}

#[async_trait]
impl AgentRegistry for GraphAgentRegistry {
    async fn register(&self, record: AgentRecord) -> Result<AgentRecord> {
        let id = record.id.clone();
        let props = record.to_properties()?;
        let output = self
            .run_scoped(GraphQuery::MergeAgent {
                id: id.clone(),
                props,
            })
            .await?;

        debug!(agent_id = %id, "Registered agent");
        let node = output
            .into_first()
            .ok_or_else(|| TroupeError::registry("merge returned no node"))?;
        record_from_node(node)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<AgentRecord>> {
        let output = self
            .run_scoped(GraphQuery::MatchAgent { id: id.to_string() })
            .await?;
        output.into_first().map(record_from_node).transpose()
    }

    async fn list(&self) -> Result<Vec<AgentRecord>> {
        let output = self.run_scoped(GraphQuery::MatchAllAgents).await?;
        output.nodes.into_iter().map(record_from_node).collect()
    }

    async fn find_by_capability(&self, capability: &str) -> Result<Vec<AgentRecord>> {
        let output = self
            .run_scoped(GraphQuery::MatchAgentsByCapability {
                capability: capability.to_string(),
            })
            .await?;
        output.nodes.into_iter().map(record_from_node).collect()
    }

    async fn update(&self, id: &str, partial: Map<String, Value>) -> Result<Option<AgentRecord>> {
        let output = self
            .run_scoped(GraphQuery::SetAgentProps {
                id: id.to_string(),
                props: partial,
            })
            .await?;
        output.into_first().map(record_from_node).transpose()
    }

    async fn remove(&self, id: &str) -> Result<()> {
        self.run_scoped(GraphQuery::DetachDeleteAgent { id: id.to_string() })
            .await?;
        debug!(agent_id = %id, "Removed agent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphSession;
    use crate::memory::MemoryGraphStore;
    use serde_json::json;

    fn registry() -> GraphAgentRegistry {
        GraphAgentRegistry::new(Arc::new(MemoryGraphStore::new()))
    }

    fn partial(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_register_is_an_upsert() {
        let registry = registry();
        let record = AgentRecord::new("a-1", "planner", "llm").with_capability("planning");

        let first = registry.register(record.clone()).await.unwrap();
        assert_eq!(first.name, "planner");

        // Same id again: merge, not insert-or-fail.
        let second = registry
            .register(AgentRecord::new("a-1", "planner-v2", "llm"))
            .await
            .unwrap();
        assert_eq!(second.name, "planner-v2");
        assert_eq!(registry.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_by_id_absence_is_none_not_error() {
        let registry = registry();
        assert!(registry.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_id_writes_nothing() {
        let registry = registry();
        let result = registry
            .update("ghost", partial(&[("status", json!("inactive"))]))
            .await
            .unwrap();
        assert!(result.is_none());
        assert!(registry.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_merges_onto_existing() {
        let registry = registry();
        registry
            .register(AgentRecord::new("a-1", "tester", "llm").with_capability("testing"))
            .await
            .unwrap();

        let updated = registry
            .update("a-1", partial(&[("status", json!("inactive"))]))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, "inactive");
        // Untouched properties survive the merge.
        assert!(updated.has_capability("testing"));
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let registry = registry();
        registry
            .register(AgentRecord::new("a-1", "tester", "llm"))
            .await
            .unwrap();

        registry.remove("a-1").await.unwrap();
        assert!(registry.get_by_id("a-1").await.unwrap().is_none());
        // Removing an id that no longer exists still succeeds.
        registry.remove("a-1").await.unwrap();
    }

    #[tokio::test]
    async fn test_find_by_capability() {
        let registry = registry();
        registry
            .register(AgentRecord::new("a-1", "tester", "llm").with_capability("testing"))
            .await
            .unwrap();
        registry
            .register(AgentRecord::new("a-2", "planner", "llm").with_capability("planning"))
            .await
            .unwrap();

        let testers = registry.find_by_capability("testing").await.unwrap();
        assert_eq!(testers.len(), 1);
        assert_eq!(testers[0].id, "a-1");
    }

    /// Store whose sessions always fail, for error-propagation tests.
    struct UnreachableStore;

    #[async_trait]
    impl GraphStore for UnreachableStore {
        async fn open_session(&self) -> Result<Box<dyn GraphSession>> {
            Err(TroupeError::io("connection refused"))
        }
    }

    #[tokio::test]
    async fn test_store_failure_surfaces_as_registry_error() {
        let registry = GraphAgentRegistry::new(Arc::new(UnreachableStore));
        let err = registry.list().await.unwrap_err();
        assert!(err.is_registry());
    }
}
