//! Task batch lifecycle manager.

use super::model::{TaskBatch, TaskStatus};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

struct BatchEntry {
    batch: TaskBatch,
    cancel: CancellationToken,
}

/// The central state manager for task batches.
///
/// `TaskManager` records every submitted batch, tracks its lifecycle
/// status, and owns the cancellation token a caller can use to abort a
/// stuck run. It does not execute anything itself; the orchestrator does
/// the running, and callers update the status here as the run progresses.
#[derive(Default)]
pub struct TaskManager {
    batches: RwLock<HashMap<String, BatchEntry>>,
}

impl TaskManager {
    /// Creates a manager with no recorded batches.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a new pending batch and returns it.
    ///
    /// The batch gets a UUID-based id and a fresh cancellation token.
    pub async fn create(&self, session_id: &str, tasks: Vec<String>) -> TaskBatch {
        let batch = TaskBatch {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            tasks,
            status: TaskStatus::Pending,
            submitted_at: chrono::Utc::now().to_rfc3339(),
            error: None,
        };

        let entry = BatchEntry {
            batch: batch.clone(),
            cancel: CancellationToken::new(),
        };
        self.batches.write().await.insert(batch.id.clone(), entry);
        batch
    }

    /// Returns a batch by id.
    pub async fn get(&self, id: &str) -> Option<TaskBatch> {
        self.batches.read().await.get(id).map(|e| e.batch.clone())
    }

    /// Returns all recorded batches.
    pub async fn list(&self) -> Vec<TaskBatch> {
        self.batches
            .read()
            .await
            .values()
            .map(|e| e.batch.clone())
            .collect()
    }

    /// Returns the cancellation token for a batch.
    pub async fn token(&self, id: &str) -> Option<CancellationToken> {
        self.batches.read().await.get(id).map(|e| e.cancel.clone())
    }

    /// Triggers a batch's cancellation token.
    ///
    /// Returns false when the batch id is unknown. The batch status moves
    /// to `Cancelled` once the runner observes the token.
    pub async fn cancel(&self, id: &str) -> bool {
        match self.batches.read().await.get(id) {
            Some(entry) => {
                entry.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Moves a batch to a new status.
    pub async fn set_status(&self, id: &str, status: TaskStatus) {
        if let Some(entry) = self.batches.write().await.get_mut(id) {
            entry.batch.status = status;
        }
    }

    /// Moves a batch to a terminal status with an error message.
    pub async fn set_failed(&self, id: &str, status: TaskStatus, error: impl Into<String>) {
        if let Some(entry) = self.batches.write().await.get_mut(id) {
            entry.batch.status = status;
            entry.batch.error = Some(error.into());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_get() {
        let manager = TaskManager::new();
        let batch = manager.create("s1", vec!["a".to_string()]).await;

        let fetched = manager.get(&batch.id).await.unwrap();
        assert_eq!(fetched.session_id, "s1");
        assert_eq!(fetched.status, TaskStatus::Pending);
    }

    #[tokio::test]
    async fn test_batches_get_unique_ids() {
        let manager = TaskManager::new();
        let first = manager.create("s1", vec![]).await;
        let second = manager.create("s1", vec![]).await;
        assert_ne!(first.id, second.id);
        assert_eq!(manager.list().await.len(), 2);
    }

    #[tokio::test]
    async fn test_cancel_trips_token() {
        let manager = TaskManager::new();
        let batch = manager.create("s1", vec![]).await;

        let token = manager.token(&batch.id).await.unwrap();
        assert!(!token.is_cancelled());
        assert!(manager.cancel(&batch.id).await);
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancel_unknown_batch() {
        let manager = TaskManager::new();
        assert!(!manager.cancel("missing").await);
    }

    #[tokio::test]
    async fn test_status_transitions() {
        let manager = TaskManager::new();
        let batch = manager.create("s1", vec![]).await;

        manager.set_status(&batch.id, TaskStatus::Running).await;
        assert_eq!(
            manager.get(&batch.id).await.unwrap().status,
            TaskStatus::Running
        );

        manager
            .set_failed(&batch.id, TaskStatus::Failed, "backend unreachable")
            .await;
        let failed = manager.get(&batch.id).await.unwrap();
        assert_eq!(failed.status, TaskStatus::Failed);
        assert_eq!(failed.error.as_deref(), Some("backend unreachable"));
    }
}
