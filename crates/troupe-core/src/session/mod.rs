//! Session domain module.
//!
//! This module contains the session model, the retry policy, and the
//! orchestrator that drives task batches against sessions.
//!
//! # Module Structure
//!
//! - `model`: The live persona/backend pairing (`AgentSession`)
//! - `retry`: Bounded retry budget (`RetryPolicy`)
//! - `orchestrator`: Session table and sequential task execution

mod model;
mod orchestrator;
mod retry;

// Re-export public API
pub use model::AgentSession;
pub use orchestrator::Orchestrator;
pub use retry::RetryPolicy;
