//! Scripted backend for tests and keyless operation.
//!
//! Plays back a fixed sequence of replies, then falls through to echoing
//! the prompt. Useful as a deterministic stand-in for a real backend in
//! tests, and as the fallback binding when no API key is configured.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use troupe_core::backend::{AiBackend, Generation};
use troupe_core::{Result, TroupeError};

/// One scripted step.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Respond with this text
    Text(String),
    /// Fail with a generation error carrying this message
    Failure(String),
}

/// Deterministic backend that replays a script.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    script: Mutex<VecDeque<ScriptedReply>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    /// A backend that echoes every prompt (empty script).
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend that plays the given replies in order, then echoes.
    pub fn with_script(replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
        Self {
            script: Mutex::new(replies.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every prompt this backend has been asked to generate for.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AiBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, prompt: &str) -> Result<Generation> {
        self.calls.lock().unwrap().push(prompt.to_string());

        match self.script.lock().unwrap().pop_front() {
            Some(ScriptedReply::Text(text)) => Ok(Generation::new(text)),
            Some(ScriptedReply::Failure(message)) => Err(TroupeError::generation(message)),
            None => Ok(Generation::new(format!("echo: {prompt}"))),
        }
    }
}
