//! Persona catalog.
//!
//! A read-only directory of personas keyed by name. Catalogs are built from
//! the built-in presets or parsed from a TOML file with `[[persona]]`
//! array-of-tables entries, and are shared across sessions behind `Arc`s.

use super::model::AgentPersona;
use super::preset::get_default_presets;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// TOML file shape for a persona catalog.
///
/// ```toml
/// [[persona]]
/// name = "Tester"
/// role = "Quality Engineer"
/// description = "Exercises completed work"
/// capabilities = ["testing"]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(rename = "persona", default)]
    pub personas: Vec<AgentPersona>,
}

/// An immutable directory of personas keyed by name.
#[derive(Debug, Clone, Default)]
pub struct PersonaCatalog {
    personas: HashMap<String, Arc<AgentPersona>>,
}

impl PersonaCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog containing the built-in preset personas.
    pub fn with_presets() -> Self {
        Self::from_personas(get_default_presets())
    }

    /// Builds a catalog from a list of personas.
    ///
    /// Later entries replace earlier ones with the same name.
    pub fn from_personas(personas: impl IntoIterator<Item = AgentPersona>) -> Self {
        let mut catalog = Self::new();
        for persona in personas {
            catalog.insert(persona);
        }
        catalog
    }

    /// Parses a catalog from TOML text.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the text is not a valid catalog.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(text)?;
        Ok(Self::from_personas(file.personas))
    }

    /// Inserts a persona, replacing any existing persona with the same name.
    pub fn insert(&mut self, persona: AgentPersona) {
        self.personas
            .insert(persona.name.clone(), Arc::new(persona));
    }

    /// Looks up a persona by name.
    pub fn get(&self, name: &str) -> Option<Arc<AgentPersona>> {
        self.personas.get(name).cloned()
    }

    /// Returns true if the catalog contains the given persona name.
    pub fn contains(&self, name: &str) -> bool {
        self.personas.contains_key(name)
    }

    /// Returns all persona names in the catalog.
    pub fn names(&self) -> Vec<String> {
        self.personas.keys().cloned().collect()
    }

    /// Number of personas in the catalog.
    pub fn len(&self) -> usize {
        self.personas.len()
    }

    /// Returns true if the catalog holds no personas.
    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_presets_contains_tester() {
        let catalog = PersonaCatalog::with_presets();
        assert!(catalog.contains("Tester"));
        assert!(!catalog.is_empty());
    }

    #[test]
    fn test_from_toml_str() {
        let catalog = PersonaCatalog::from_toml_str(
            r#"
            [[persona]]
            name = "Scribe"
            role = "Documentation Writer"
            description = "Writes things down"
            capabilities = ["writing"]
            "#,
        )
        .unwrap();

        let scribe = catalog.get("Scribe").unwrap();
        assert_eq!(scribe.role, "Documentation Writer");
        assert!(scribe.has_capability("writing"));
    }

    #[test]
    fn test_from_toml_str_rejects_garbage() {
        let result = PersonaCatalog::from_toml_str("persona = 12");
        assert!(result.is_err());
    }

    #[test]
    fn test_later_entries_replace_earlier_ones() {
        let catalog = PersonaCatalog::from_personas(vec![
            AgentPersona::new("Tester", "First", "first"),
            AgentPersona::new("Tester", "Second", "second"),
        ]);

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("Tester").unwrap().role, "Second");
    }
}
