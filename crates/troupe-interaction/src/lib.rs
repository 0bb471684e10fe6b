//! Troupe AI backend implementations.
//!
//! Concrete [`troupe_core::backend::AiBackend`] implementations (Claude
//! REST, OpenAI-compatible REST, scripted playback) and the construction
//! of backend binding tables from configuration.

pub mod bindings;
pub mod claude_api;
pub mod openai_api;
pub mod scripted;

pub use bindings::{BackendConfig, BackendKind, InteractionConfig, build_bindings};
pub use claude_api::ClaudeApiBackend;
pub use openai_api::OpenAiApiBackend;
pub use scripted::{ScriptedBackend, ScriptedReply};
