//! Agent registry trait.
//!
//! Defines the interface for the agent directory.

use super::model::AgentRecord;
use crate::error::Result;
use serde_json::{Map, Value};

/// An abstract directory of agent records.
///
/// This trait defines the contract for persisting and querying agent
/// records, decoupling the application's core logic from the specific
/// store (e.g. an in-memory property graph, a Bolt-backed graph database).
///
/// # Semantics
///
/// `register` and `update` are deliberately two distinct operations:
/// `register` is an upsert (merge-by-id, create when absent) while
/// `update` never creates: a strict update of a missing id returns
/// `Ok(None)` and performs no write.
#[async_trait::async_trait]
pub trait AgentRegistry: Send + Sync {
    /// Upserts a record by id: merges its properties onto the matching
    /// entry or creates it.
    ///
    /// # Returns
    ///
    /// - `Ok(AgentRecord)`: The resulting (merged) record
    /// - `Err(TroupeError::Registry)`: Store failure
    async fn register(&self, record: AgentRecord) -> Result<AgentRecord>;

    /// Finds a record by id.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(AgentRecord))`: Record found
    /// - `Ok(None)`: No record with that id (absence is not an error)
    /// - `Err(TroupeError::Registry)`: Store failure
    async fn get_by_id(&self, id: &str) -> Result<Option<AgentRecord>>;

    /// Lists all records, in store order.
    async fn list(&self) -> Result<Vec<AgentRecord>>;

    /// Lists records declaring the given capability.
    async fn find_by_capability(&self, capability: &str) -> Result<Vec<AgentRecord>>;

    /// Merges `partial` onto an existing record.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(AgentRecord))`: The merged record
    /// - `Ok(None)`: No record with that id, nothing was written
    /// - `Err(TroupeError::Registry)`: Store failure
    async fn update(&self, id: &str, partial: Map<String, Value>) -> Result<Option<AgentRecord>>;

    /// Detaches and deletes a record.
    ///
    /// Idempotent: removing an id that does not exist succeeds silently.
    async fn remove(&self, id: &str) -> Result<()>;
}
