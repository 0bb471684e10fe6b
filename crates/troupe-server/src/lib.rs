//! Troupe A2A HTTP surface.
//!
//! Exposes the agent directory (`/agents`), the task lifecycle
//! (`/tasks`), and the JSON-RPC A2A endpoint (`/a2a`) over the core
//! orchestrator, registry, and envelope validator.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::AppConfig;
pub use state::AppState;
