//! Default persona presets.
//!
//! Provides system-defined default personas that are available when no
//! catalog file is configured.

use super::model::AgentPersona;

/// Returns the official preset persona configurations for the application.
///
/// These personas are system-defined and serve as the default agent roles:
/// - **Planner**: breaks a request down into an ordered task list
/// - **Builder**: executes implementation-shaped tasks
/// - **Tester**: exercises completed work and reports defects
pub fn get_default_presets() -> Vec<AgentPersona> {
    vec![
        AgentPersona::new(
            "Planner",
            "Task Planning Lead",
            "Decomposes incoming requests into small, ordered tasks and sequences them for execution.",
        )
        .with_capability("planning"),
        AgentPersona::new(
            "Builder",
            "Implementation Engineer",
            "Executes implementation tasks end to end and reports the produced artifacts.",
        )
        .with_capability("implementation"),
        AgentPersona::new(
            "Tester",
            "Quality Engineer",
            "Exercises completed work against its requirements and reports defects with reproduction steps.",
        )
        .with_capability("testing")
        .with_capability("reporting"),
    ]
}
