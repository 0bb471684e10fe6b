//! Troupe core domain layer.
//!
//! Contains the shared error type, the persona catalog, the AI backend
//! contract and binding tables, the session orchestrator, the agent
//! registry trait, and task batch lifecycle records. Storage engines,
//! concrete backends, and the HTTP surface live in the sibling crates.

pub mod agent;
pub mod backend;
pub mod error;
pub mod persona;
pub mod session;
pub mod task;

// Re-export common error type
pub use error::{Result, TroupeError};
