//! HTTP route assembly.

mod a2a;
mod agents;
mod tasks;

pub use tasks::{SubmitTasksRequest, submit_batch};

use crate::state::AppState;
use axum::Router;
use axum::routing::post;

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(agents::router())
        .merge(tasks::router())
        .route("/a2a", post(a2a::rpc))
        .with_state(state)
}
