//! Graph store contract.
//!
//! The registry talks to its backing store through a narrow session
//! contract: open a session, run parameterized queries, release the
//! session. Queries are not free-form strings; they are the fixed set of
//! CRUD shapes the registry needs, expressed as a typed enum so a store
//! implementation cannot be handed anything else.

use async_trait::async_trait;
use serde_json::{Map, Value};
use troupe_core::Result;

/// A node's property map (the graph-side shape of an agent record).
pub type NodeProps = Map<String, Value>;

/// The fixed query shapes the registry issues.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphQuery {
    /// Merge-by-id: overwrite matching properties on the `Agent` node with
    /// this id, creating the node when absent. Returns the resulting node.
    MergeAgent { id: String, props: NodeProps },
    /// Match one `Agent` node by id. Returns zero or one node.
    MatchAgent { id: String },
    /// Match every `Agent` node. Store order.
    MatchAllAgents,
    /// Match `Agent` nodes whose capability list contains the value.
    MatchAgentsByCapability { capability: String },
    /// Merge properties onto an existing `Agent` node only. Returns the
    /// merged node, or no node when the id does not exist (never creates).
    SetAgentProps { id: String, props: NodeProps },
    /// Detach-delete: remove the node and every relationship touching it.
    /// Returns nothing; deleting an absent id is not an error.
    DetachDeleteAgent { id: String },
}

/// Rows produced by a query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOutput {
    /// The matched or resulting nodes (empty for deletes and misses)
    pub nodes: Vec<NodeProps>,
}

impl QueryOutput {
    /// An output with no rows.
    pub fn empty() -> Self {
        Self::default()
    }

    /// An output with a single node row.
    pub fn single(node: NodeProps) -> Self {
        Self { nodes: vec![node] }
    }

    /// Consumes the output, returning its first node if any.
    pub fn into_first(mut self) -> Option<NodeProps> {
        if self.nodes.is_empty() {
            None
        } else {
            Some(self.nodes.swap_remove(0))
        }
    }
}

/// A graph database (or an in-memory stand-in) that can open sessions.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Opens a scoped session.
    ///
    /// The caller must release the session via [`GraphSession::close`] on
    /// every exit path, success or failure.
    async fn open_session(&self) -> Result<Box<dyn GraphSession>>;
}

/// A scoped unit of store work.
#[async_trait]
pub trait GraphSession: Send {
    /// Runs one query with its parameters.
    async fn run(&mut self, query: GraphQuery) -> Result<QueryOutput>;

    /// Releases the session.
    async fn close(self: Box<Self>) -> Result<()>;
}
