//! Persona domain model.
//!
//! Represents the named agent roles that sessions are created for.
//! Each persona has a role, a description, and a set of declared
//! capabilities, independent of any specific AI backend.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A named role definition for an agent.
///
/// Personas are static: they are loaded once (from presets or a TOML
/// catalog) and never mutated afterwards. Many sessions may reference the
/// same persona, so catalogs hand them out behind `Arc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentPersona {
    /// Unique persona name, the catalog key (e.g. "Tester")
    pub name: String,
    /// Role or title describing the persona's expertise
    pub role: String,
    /// Background description of the persona's responsibilities
    pub description: String,
    /// Declared capabilities (e.g. "testing", "planning")
    #[serde(default)]
    pub capabilities: BTreeSet<String>,
}

impl AgentPersona {
    /// Creates a persona with no declared capabilities.
    pub fn new(
        name: impl Into<String>,
        role: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            description: description.into(),
            capabilities: BTreeSet::new(),
        }
    }

    /// Adds a declared capability (builder style).
    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.insert(capability.into());
        self
    }

    /// Returns true if the persona declares the given capability.
    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.contains(capability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_capability() {
        let persona = AgentPersona::new("Tester", "Quality Engineer", "Runs test plans")
            .with_capability("testing")
            .with_capability("reporting");

        assert!(persona.has_capability("testing"));
        assert!(persona.has_capability("reporting"));
        assert!(!persona.has_capability("planning"));
    }

    #[test]
    fn test_toml_round_trip() {
        let persona = AgentPersona::new("Planner", "Task Planning Lead", "Breaks work down")
            .with_capability("planning");

        let encoded = toml::to_string(&persona).unwrap();
        let decoded: AgentPersona = toml::from_str(&encoded).unwrap();
        assert_eq!(persona, decoded);
    }
}
