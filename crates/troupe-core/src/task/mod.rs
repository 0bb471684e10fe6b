//! Task batch domain module.
//!
//! # Module Structure
//!
//! - `model`: Batch record and lifecycle status (`TaskBatch`, `TaskStatus`)
//! - `manager`: Batch table with per-batch cancellation (`TaskManager`)

mod manager;
mod model;

// Re-export public API
pub use manager::TaskManager;
pub use model::{TaskBatch, TaskStatus};
