//! Session orchestrator.
//!
//! Owns the table of active sessions and drives ordered task batches
//! against them with bounded retry. Tasks within one batch run strictly
//! sequentially; different sessions run concurrently with no mutual
//! ordering.

use super::model::AgentSession;
use super::retry::RetryPolicy;
use crate::backend::{BackendBindings, BindingTable};
use crate::error::{Result, TroupeError};
use crate::persona::PersonaCatalog;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Manages active sessions and task execution.
///
/// `Orchestrator` is responsible for:
/// - Creating sessions (persona + backend pairing)
/// - Running ordered task batches with retry-then-skip recovery
/// - Serving history snapshots
///
/// The session table is a read-mostly map guarded by an `RwLock`; the lock
/// is held only long enough to fetch or insert an entry. Everything
/// long-running happens under the per-session locks inside
/// [`AgentSession`], so unrelated sessions never serialize on each other.
#[derive(Debug, Default)]
pub struct Orchestrator {
    /// Active sessions keyed by session id
    sessions: RwLock<HashMap<String, Arc<AgentSession>>>,
}

impl Orchestrator {
    /// Creates an orchestrator with an empty session table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session pairing a persona with its bound backend.
    ///
    /// This is an upsert: creating a session under an id that already
    /// exists replaces the prior session (and its history), which allows
    /// callers to re-initialize a session deliberately.
    ///
    /// # Errors
    ///
    /// - `TroupeError::PersonaNotFound` when `persona_name` is not in the
    ///   catalog (nothing is stored)
    /// - `TroupeError::BindingNotFound` when no backend is bound for the
    ///   persona (nothing is stored)
    pub async fn create_session(
        &self,
        session_id: &str,
        persona_name: &str,
        catalog: &PersonaCatalog,
        table: &BindingTable,
        bindings: &BackendBindings,
    ) -> Result<()> {
        let persona = catalog
            .get(persona_name)
            .ok_or_else(|| TroupeError::persona_not_found(persona_name))?;
        let backend = bindings.resolve(table, persona_name)?;

        let session = Arc::new(AgentSession::new(session_id, persona, backend));

        let mut sessions = self.sessions.write().await;
        if sessions
            .insert(session_id.to_string(), session)
            .is_some()
        {
            info!(session_id, "Replaced existing session");
        } else {
            info!(session_id, persona_name, "Created session");
        }
        Ok(())
    }

    /// Runs a batch of tasks against a session, strictly in order.
    ///
    /// For each task: the task text is appended to the history before
    /// execution, then the backend is asked to generate a response with at
    /// most `policy.max_attempts()` attempts. A successful response is
    /// appended to the history. A task that exhausts its attempts is logged
    /// and skipped; the rest of the batch still runs.
    ///
    /// The cancellation token is checked before every attempt and raced
    /// against every retry sleep; cancellation aborts the remaining queue
    /// with `TroupeError::Cancelled`.
    ///
    /// # Errors
    ///
    /// - `TroupeError::SessionNotFound` when the session id is unknown
    /// - `TroupeError::Cancelled` when the token fires mid-run
    pub async fn run_sequential_tasks(
        &self,
        session_id: &str,
        tasks: &[String],
        policy: &RetryPolicy,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let session = self.session_entry(session_id).await?;
        // Serializes whole batches: a second call for the same session
        // waits here instead of interleaving its tasks.
        let _run = session.acquire_run_lock().await;

        info!(session_id, task_count = tasks.len(), "Running task batch");

        for task in tasks {
            // The submission is recorded before execution so an aborted
            // run still shows what was attempted.
            session.append_history(task.clone()).await;

            let mut attempt: u32 = 0;
            loop {
                if cancel.is_cancelled() {
                    info!(session_id, "Task run cancelled");
                    return Err(TroupeError::Cancelled);
                }
                attempt += 1;

                match session.backend.generate(task).await {
                    Ok(generation) => {
                        session.append_history(generation.text).await;
                        break;
                    }
                    Err(err) if attempt < policy.max_attempts() => {
                        warn!(
                            session_id,
                            attempt,
                            max_attempts = policy.max_attempts(),
                            "Task attempt failed, retrying: {err}"
                        );
                        tokio::select! {
                            _ = cancel.cancelled() => {
                                info!(session_id, "Task run cancelled during retry wait");
                                return Err(TroupeError::Cancelled);
                            }
                            _ = sleep(policy.interval()) => {}
                        }
                    }
                    Err(err) => {
                        // Retry budget exhausted: no response is appended
                        // and the batch moves on to the next task.
                        error!(
                            session_id,
                            attempts = attempt,
                            "Task failed after all attempts, skipping: {err}"
                        );
                        break;
                    }
                }
            }
        }

        Ok(())
    }

    /// Returns a snapshot of a session's history.
    ///
    /// Task texts and response texts appear interleaved in the order they
    /// were recorded. A concurrently running batch may still be appending.
    ///
    /// # Errors
    ///
    /// Returns `TroupeError::SessionNotFound` when the session id is
    /// unknown.
    pub async fn get_session_history(&self, session_id: &str) -> Result<Vec<String>> {
        let session = self.session_entry(session_id).await?;
        Ok(session.history_snapshot().await)
    }

    /// Returns true if a session with the given id exists.
    pub async fn contains_session(&self, session_id: &str) -> bool {
        self.sessions.read().await.contains_key(session_id)
    }

    /// Returns the ids of all active sessions.
    pub async fn session_ids(&self) -> Vec<String> {
        self.sessions.read().await.keys().cloned().collect()
    }

    async fn session_entry(&self, session_id: &str) -> Result<Arc<AgentSession>> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| TroupeError::session_not_found(session_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{AiBackend, Generation};
    use crate::persona::PersonaCatalog;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Backend stub that answers "resp-{task}" and fails every attempt for
    /// task texts listed in `fail_on`. Every call is recorded.
    struct StubBackend {
        fail_on: HashSet<String>,
        calls: Mutex<Vec<String>>,
    }

    impl StubBackend {
        fn new() -> Self {
            Self {
                fail_on: HashSet::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing_on(task: &str) -> Self {
            let mut stub = Self::new();
            stub.fail_on.insert(task.to_string());
            stub
        }

        fn calls_for(&self, task: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|t| t.as_str() == task)
                .count()
        }
    }

    #[async_trait]
    impl AiBackend for StubBackend {
        fn name(&self) -> &str {
            "stub"
        }

        async fn generate(&self, prompt: &str) -> Result<Generation> {
            self.calls.lock().unwrap().push(prompt.to_string());
            if self.fail_on.contains(prompt) {
                Err(TroupeError::generation("stub failure"))
            } else {
                Ok(Generation::new(format!("resp-{prompt}")))
            }
        }
    }

    /// Backend that fails and cancels the given token on its first call,
    /// so the run aborts at the next cancellation check.
    struct CancellingBackend {
        token: CancellationToken,
    }

    #[async_trait]
    impl AiBackend for CancellingBackend {
        fn name(&self) -> &str {
            "cancelling"
        }

        async fn generate(&self, _prompt: &str) -> Result<Generation> {
            self.token.cancel();
            Err(TroupeError::generation("backend went away"))
        }
    }

    fn tester_fixture(
        backend: Arc<dyn AiBackend>,
    ) -> (PersonaCatalog, BindingTable, BackendBindings) {
        let catalog = PersonaCatalog::with_presets();
        let table = BindingTable::new().bind("Tester", "stub");
        let bindings = BackendBindings::new().insert("stub", backend);
        (catalog, table, bindings)
    }

    fn tasks(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[tokio::test]
    async fn test_create_session_unknown_persona() {
        let orchestrator = Orchestrator::new();
        let (catalog, table, bindings) = tester_fixture(Arc::new(StubBackend::new()));

        let err = orchestrator
            .create_session("s1", "Nobody", &catalog, &table, &bindings)
            .await
            .unwrap_err();

        assert!(matches!(err, TroupeError::PersonaNotFound { name } if name == "Nobody"));
        assert!(!orchestrator.contains_session("s1").await);
    }

    #[tokio::test]
    async fn test_create_session_unbound_persona() {
        let orchestrator = Orchestrator::new();
        let (catalog, table, bindings) = tester_fixture(Arc::new(StubBackend::new()));

        // "Planner" is in the preset catalog but has no binding entry.
        let err = orchestrator
            .create_session("s1", "Planner", &catalog, &table, &bindings)
            .await
            .unwrap_err();

        assert!(matches!(err, TroupeError::BindingNotFound { .. }));
        assert!(!orchestrator.contains_session("s1").await);
    }

    #[tokio::test]
    async fn test_create_session_overwrites_prior_history() {
        let orchestrator = Orchestrator::new();
        let (catalog, table, bindings) = tester_fixture(Arc::new(StubBackend::new()));

        orchestrator
            .create_session("s1", "Tester", &catalog, &table, &bindings)
            .await
            .unwrap();
        orchestrator
            .run_sequential_tasks(
                "s1",
                &tasks(&["a"]),
                &RetryPolicy::none(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(orchestrator.get_session_history("s1").await.unwrap().len(), 2);

        // Re-creating under the same id resets the session state.
        orchestrator
            .create_session("s1", "Tester", &catalog, &table, &bindings)
            .await
            .unwrap();
        assert!(orchestrator.get_session_history("s1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_run_without_failures_interleaves_history() {
        let orchestrator = Orchestrator::new();
        let (catalog, table, bindings) = tester_fixture(Arc::new(StubBackend::new()));

        orchestrator
            .create_session("s1", "Tester", &catalog, &table, &bindings)
            .await
            .unwrap();
        orchestrator
            .run_sequential_tasks(
                "s1",
                &tasks(&["a", "b", "c"]),
                &RetryPolicy::none(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        let history = orchestrator.get_session_history("s1").await.unwrap();
        assert_eq!(
            history,
            vec!["a", "resp-a", "b", "resp-b", "c", "resp-c"]
        );
    }

    #[tokio::test]
    async fn test_failing_task_is_skipped_batch_continues() {
        let orchestrator = Orchestrator::new();
        let stub = Arc::new(StubBackend::failing_on("b"));
        let (catalog, table, bindings) = tester_fixture(stub.clone());

        orchestrator
            .create_session("s1", "Tester", &catalog, &table, &bindings)
            .await
            .unwrap();
        orchestrator
            .run_sequential_tasks(
                "s1",
                &tasks(&["a", "b", "c"]),
                &RetryPolicy::new(1, 0),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        // "b" is attempted maxRetries + 1 times, gets no response, and "c"
        // still runs.
        let history = orchestrator.get_session_history("s1").await.unwrap();
        assert_eq!(history, vec!["a", "resp-a", "b", "c", "resp-c"]);
        assert_eq!(stub.calls_for("b"), 2);
        assert_eq!(stub.calls_for("a"), 1);
        assert_eq!(stub.calls_for("c"), 1);
    }

    #[tokio::test]
    async fn test_zero_retries_means_single_attempt() {
        let orchestrator = Orchestrator::new();
        let stub = Arc::new(StubBackend::failing_on("only"));
        let (catalog, table, bindings) = tester_fixture(stub.clone());

        orchestrator
            .create_session("s1", "Tester", &catalog, &table, &bindings)
            .await
            .unwrap();
        orchestrator
            .run_sequential_tasks(
                "s1",
                &tasks(&["only"]),
                &RetryPolicy::none(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(stub.calls_for("only"), 1);
        assert_eq!(
            orchestrator.get_session_history("s1").await.unwrap(),
            vec!["only"]
        );
    }

    #[tokio::test]
    async fn test_run_unknown_session() {
        let orchestrator = Orchestrator::new();
        let err = orchestrator
            .run_sequential_tasks(
                "missing",
                &tasks(&["a"]),
                &RetryPolicy::none(),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, TroupeError::SessionNotFound { id } if id == "missing"));
    }

    #[tokio::test]
    async fn test_history_unknown_session() {
        let orchestrator = Orchestrator::new();
        let err = orchestrator.get_session_history("missing").await.unwrap_err();
        assert!(matches!(err, TroupeError::SessionNotFound { .. }));
    }

    #[tokio::test]
    async fn test_pre_cancelled_run_aborts_before_first_attempt() {
        let orchestrator = Orchestrator::new();
        let stub = Arc::new(StubBackend::new());
        let (catalog, table, bindings) = tester_fixture(stub.clone());

        orchestrator
            .create_session("s1", "Tester", &catalog, &table, &bindings)
            .await
            .unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = orchestrator
            .run_sequential_tasks("s1", &tasks(&["a"]), &RetryPolicy::none(), &cancel)
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        // The submission was recorded, the backend was never called.
        assert_eq!(
            orchestrator.get_session_history("s1").await.unwrap(),
            vec!["a"]
        );
        assert_eq!(stub.calls_for("a"), 0);
    }

    #[tokio::test]
    async fn test_cancellation_interrupts_retry_wait() {
        let orchestrator = Orchestrator::new();
        let cancel = CancellationToken::new();
        let backend = Arc::new(CancellingBackend {
            token: cancel.clone(),
        });

        let catalog = PersonaCatalog::with_presets();
        let table = BindingTable::new().bind("Tester", "cancelling");
        let bindings = BackendBindings::new().insert("cancelling", backend);

        orchestrator
            .create_session("s1", "Tester", &catalog, &table, &bindings)
            .await
            .unwrap();

        // A long interval would stall the run for a minute if cancellation
        // did not win the race against the retry sleep.
        let err = orchestrator
            .run_sequential_tasks("s1", &tasks(&["x", "y"]), &RetryPolicy::new(3, 60), &cancel)
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        let history = orchestrator.get_session_history("s1").await.unwrap();
        assert_eq!(history, vec!["x"]);
    }
}
