//! In-memory property-graph store.
//!
//! The default [`GraphStore`] implementation: `Agent` nodes keyed by id
//! with JSON property maps, plus a relationship table so detach-delete has
//! real semantics. A driver-backed store would implement the same traits
//! against a wire protocol; nothing above this module knows the difference.

use crate::graph::{GraphQuery, GraphSession, GraphStore, NodeProps, QueryOutput};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use troupe_core::Result;

/// A directed relationship between two nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub from: String,
    pub to: String,
    pub rel_type: String,
}

#[derive(Debug, Default)]
struct GraphData {
    /// `Agent` nodes keyed by id
    nodes: HashMap<String, NodeProps>,
    /// All relationships, in insertion order
    relationships: Vec<Relationship>,
}

impl GraphData {
    /// Merges `props` onto the node's map, keeping the node id
    /// authoritative over any "id" value inside the props.
    fn merge_props(node: &mut NodeProps, id: &str, props: NodeProps) {
        for (key, value) in props {
            node.insert(key, value);
        }
        node.insert("id".to_string(), Value::String(id.to_string()));
    }

    fn node_has_capability(node: &NodeProps, capability: &str) -> bool {
        node.get("capabilities")
            .and_then(Value::as_array)
            .is_some_and(|caps| caps.iter().any(|c| c.as_str() == Some(capability)))
    }
}

/// Shared in-memory graph.
///
/// Cloning is cheap; every clone and every open session sees the same
/// node table.
#[derive(Debug, Clone, Default)]
pub struct MemoryGraphStore {
    data: Arc<RwLock<GraphData>>,
}

impl MemoryGraphStore {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a relationship between two node ids.
    ///
    /// Relationships are removed when either endpoint is detach-deleted.
    pub async fn link(
        &self,
        from: impl Into<String>,
        to: impl Into<String>,
        rel_type: impl Into<String>,
    ) {
        self.data.write().await.relationships.push(Relationship {
            from: from.into(),
            to: to.into(),
            rel_type: rel_type.into(),
        });
    }

    /// Number of relationships currently stored.
    pub async fn relationship_count(&self) -> usize {
        self.data.read().await.relationships.len()
    }
}

#[async_trait]
impl GraphStore for MemoryGraphStore {
    async fn open_session(&self) -> Result<Box<dyn GraphSession>> {
        Ok(Box::new(MemoryGraphSession {
            data: self.data.clone(),
        }))
    }
}

struct MemoryGraphSession {
    data: Arc<RwLock<GraphData>>,
}

#[async_trait]
impl GraphSession for MemoryGraphSession {
    async fn run(&mut self, query: GraphQuery) -> Result<QueryOutput> {
        match query {
            GraphQuery::MergeAgent { id, props } => {
                let mut data = self.data.write().await;
                let node = data.nodes.entry(id.clone()).or_default();
                GraphData::merge_props(node, &id, props);
                Ok(QueryOutput::single(node.clone()))
            }
            GraphQuery::MatchAgent { id } => {
                let data = self.data.read().await;
                Ok(match data.nodes.get(&id) {
                    Some(node) => QueryOutput::single(node.clone()),
                    None => QueryOutput::empty(),
                })
            }
            GraphQuery::MatchAllAgents => {
                let data = self.data.read().await;
                Ok(QueryOutput {
                    nodes: data.nodes.values().cloned().collect(),
                })
            }
            GraphQuery::MatchAgentsByCapability { capability } => {
                let data = self.data.read().await;
                Ok(QueryOutput {
                    nodes: data
                        .nodes
                        .values()
                        .filter(|node| GraphData::node_has_capability(node, &capability))
                        .cloned()
                        .collect(),
                })
            }
            GraphQuery::SetAgentProps { id, props } => {
                let mut data = self.data.write().await;
                match data.nodes.get_mut(&id) {
                    Some(node) => {
                        GraphData::merge_props(node, &id, props);
                        Ok(QueryOutput::single(node.clone()))
                    }
                    // Strict update: absent nodes are not created.
                    None => Ok(QueryOutput::empty()),
                }
            }
            GraphQuery::DetachDeleteAgent { id } => {
                let mut data = self.data.write().await;
                data.nodes.remove(&id);
                data.relationships
                    .retain(|rel| rel.from != id && rel.to != id);
                Ok(QueryOutput::empty())
            }
        }
    }

    async fn close(self: Box<Self>) -> Result<()> {
        // Nothing to release for the in-memory store; the contract is
        // honored so driver-backed implementations can rely on it.
        Ok(())
    }
}
