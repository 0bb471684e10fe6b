//! Troupe graph-backed agent registry.
//!
//! The graph-store session contract, the fixed CRUD query shapes, the
//! in-memory property-graph store, and the registry implementation the
//! rest of the system consumes through `troupe_core::agent::AgentRegistry`.

pub mod graph;
pub mod memory;
pub mod registry;

pub use graph::{GraphQuery, GraphSession, GraphStore, NodeProps, QueryOutput};
pub use memory::MemoryGraphStore;
pub use registry::GraphAgentRegistry;
