//! Task batch domain model.
//!
//! A task batch is one submitted `run_sequential_tasks` call as seen by the
//! HTTP surface: the ordered task list, which session it runs against, and
//! where it is in its lifecycle.

use serde::{Deserialize, Serialize};

/// Represents the current status of a task batch.
///
/// Batches progress through these states as they are processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    /// The batch has been accepted but is not yet running.
    Pending,
    /// The batch is currently being executed.
    Running,
    /// Every task in the batch was processed (individual tasks may still
    /// have exhausted their retries and been skipped).
    Completed,
    /// The batch aborted with an error.
    Failed,
    /// The batch was cancelled before it could finish.
    Cancelled,
}

/// One submitted batch of tasks and its lifecycle state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskBatch {
    /// Unique batch identifier (UUID format)
    pub id: String,
    /// The session the batch runs against
    pub session_id: String,
    /// The ordered task texts
    pub tasks: Vec<String>,
    /// Current lifecycle status
    pub status: TaskStatus,
    /// Timestamp when the batch was submitted (ISO 8601 format)
    pub submitted_at: String,
    /// Error message when the batch failed or was cancelled
    pub error: Option<String>,
}
