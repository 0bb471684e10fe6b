//! Agent record domain model.
//!
//! An [`AgentRecord`] describes a discoverable agent's identity and
//! capabilities in the registry. It is distinct from a session: records are
//! directory entries, not live persona/backend pairings.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn default_status() -> String {
    "active".to_string()
}

/// A registry entry describing a discoverable agent.
///
/// Beyond the fixed fields, records carry arbitrary extra properties
/// (flattened into the same JSON object on the wire) which are merged
/// property-by-property on register/update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    /// Primary key, unique across the registry
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Agent type (wire field name: `type`)
    #[serde(rename = "type", default)]
    pub agent_type: String,
    /// Declared capabilities
    #[serde(default)]
    pub capabilities: Vec<String>,
    /// Free-form status, e.g. "active" / "inactive"
    #[serde(default = "default_status")]
    pub status: String,
    /// Arbitrary additional properties, merged on update
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AgentRecord {
    /// Creates a record with status "active" and no capabilities.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        agent_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            agent_type: agent_type.into(),
            capabilities: Vec::new(),
            status: default_status(),
            extra: Map::new(),
        }
    }

    /// Adds a capability (builder style).
    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.push(capability.into());
        self
    }

    /// Overrides the status (builder style).
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Returns true if the record declares the given capability.
    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| c == capability)
    }

    /// Flattens the record into a property map (the graph node shape).
    pub fn to_properties(&self) -> Result<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(crate::error::TroupeError::internal(format!(
                "agent record serialized to non-object: {other}"
            ))),
        }
    }

    /// Rebuilds a record from a graph node's property map.
    pub fn from_properties(props: Map<String, Value>) -> Result<Self> {
        Ok(serde_json::from_value(Value::Object(props))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_field_wire_name() {
        let record = AgentRecord::new("a-1", "planner", "llm");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], "llm");
        assert_eq!(value["status"], "active");
    }

    #[test]
    fn test_extra_properties_flatten() {
        let mut record = AgentRecord::new("a-1", "planner", "llm");
        record
            .extra
            .insert("endpoint".to_string(), json!("http://localhost:9000"));

        let props = record.to_properties().unwrap();
        assert_eq!(props["endpoint"], "http://localhost:9000");

        let rebuilt = AgentRecord::from_properties(props).unwrap();
        assert_eq!(rebuilt, record);
    }

    #[test]
    fn test_from_properties_defaults_missing_fields() {
        let mut props = Map::new();
        props.insert("id".to_string(), json!("a-2"));

        let record = AgentRecord::from_properties(props).unwrap();
        assert_eq!(record.id, "a-2");
        assert_eq!(record.status, "active");
        assert!(record.capabilities.is_empty());
    }
}
