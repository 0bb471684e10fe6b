//! Session domain model.
//!
//! An [`AgentSession`] is a live pairing of a persona with a bound AI
//! backend, plus the accumulated task/response history. Sessions are created
//! once, live for the process lifetime, and are mutated only by task
//! execution appending to the history.

use crate::backend::AiBackend;
use crate::persona::AgentPersona;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// A live persona/backend pairing with its task history.
///
/// Locking discipline: the history has its own short-lived lock so that
/// reads stay snapshots even while a task run is sleeping between retries;
/// `run_lock` serializes whole task runs so tasks within a session never
/// interleave. Both locks are per-session, so unrelated sessions never wait
/// on each other.
pub struct AgentSession {
    /// Caller-supplied unique session identifier
    pub session_id: String,
    /// The persona this session speaks as (shared with the catalog)
    pub persona: Arc<AgentPersona>,
    /// The AI capability assigned at creation time
    pub backend: Arc<dyn AiBackend>,
    /// Reserved per-session state, currently opaque
    pub context: HashMap<String, serde_json::Value>,
    /// Timestamp when the session was created (ISO 8601 format)
    pub created_at: String,
    /// Task texts and successful response texts, interleaved in
    /// submission order
    history: Mutex<Vec<String>>,
    /// Held for the duration of one `run_sequential_tasks` call
    run_lock: Mutex<()>,
}

impl AgentSession {
    /// Creates a fresh session with an empty history.
    pub fn new(
        session_id: impl Into<String>,
        persona: Arc<AgentPersona>,
        backend: Arc<dyn AiBackend>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            persona,
            backend,
            context: HashMap::new(),
            created_at: chrono::Utc::now().to_rfc3339(),
            history: Mutex::new(Vec::new()),
            run_lock: Mutex::new(()),
        }
    }

    /// Appends one line (a task text or a response text) to the history.
    pub async fn append_history(&self, line: impl Into<String>) {
        self.history.lock().await.push(line.into());
    }

    /// Returns a snapshot of the history.
    ///
    /// The snapshot reflects whatever has been appended so far; a
    /// concurrently running task batch may still be appending.
    pub async fn history_snapshot(&self) -> Vec<String> {
        self.history.lock().await.clone()
    }

    /// Current history length.
    pub async fn history_len(&self) -> usize {
        self.history.lock().await.len()
    }

    /// Acquires the run lock, serializing task runs for this session.
    pub(crate) async fn acquire_run_lock(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.run_lock.lock().await
    }
}

impl std::fmt::Debug for AgentSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentSession")
            .field("session_id", &self.session_id)
            .field("persona", &self.persona.name)
            .field("backend", &self.backend.name())
            .field("created_at", &self.created_at)
            .finish()
    }
}
