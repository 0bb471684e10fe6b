//! A2A message envelope and its validator.
//!
//! The envelope is the sole external protocol contract between agents:
//! `{jsonrpc: "2.0", id: string, method: string, params: object}`. Every
//! inbound message is validated against this shape before any handler sees
//! it, and every violation is reported (not just the first) so a caller
//! can fix a malformed message in one pass.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// The literal protocol version every envelope must carry.
pub const JSONRPC_VERSION: &str = "2.0";

/// A validated A2A message envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageEnvelope {
    /// Protocol version, always "2.0"
    pub jsonrpc: String,
    /// Caller-chosen request identifier
    pub id: String,
    /// Method name, e.g. "tasks/submit"
    pub method: String,
    /// Method parameters
    pub params: Map<String, Value>,
}

impl MessageEnvelope {
    /// Creates an envelope with the fixed protocol version.
    pub fn new(id: impl Into<String>, method: impl Into<String>, params: Map<String, Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: id.into(),
            method: method.into(),
            params,
        }
    }

    /// Validates a candidate value and deserializes it into an envelope.
    ///
    /// # Errors
    ///
    /// Returns `EnvelopeValidationError` carrying every violation found
    /// when the candidate does not conform to the envelope shape.
    pub fn parse(candidate: &Value) -> Result<Self, EnvelopeValidationError> {
        let report = validate_envelope(candidate);
        if !report.valid {
            return Err(EnvelopeValidationError {
                violations: report.errors,
            });
        }
        // The shape checks above guarantee this cannot fail.
        serde_json::from_value(candidate.clone()).map_err(|e| EnvelopeValidationError {
            violations: vec![EnvelopeViolation::new("$", e.to_string())],
        })
    }
}

/// One violation of the envelope shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeViolation {
    /// The offending field ("$" for the envelope as a whole)
    pub field: String,
    /// What was wrong with it
    pub reason: String,
}

impl EnvelopeViolation {
    fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for EnvelopeViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Outcome of validating a candidate envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeReport {
    /// True when the candidate conforms to the envelope shape
    pub valid: bool,
    /// Every violation found (empty when valid)
    pub errors: Vec<EnvelopeViolation>,
}

/// Structured, exhaustive envelope rejection.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("Envelope validation failed: {}", format_violations(.violations))]
pub struct EnvelopeValidationError {
    /// Every violation found, never a partial list
    pub violations: Vec<EnvelopeViolation>,
}

fn format_violations(violations: &[EnvelopeViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validates a candidate value against the envelope shape.
///
/// Pure and stateless. Checks, in order: the value is an object; `jsonrpc`
/// equals "2.0"; `id` is a string; `method` is a string; `params` is
/// present and is an object. All violations are collected; validation
/// does not stop at the first problem.
pub fn validate_envelope(candidate: &Value) -> EnvelopeReport {
    let mut errors = Vec::new();

    let Some(object) = candidate.as_object() else {
        return EnvelopeReport {
            valid: false,
            errors: vec![EnvelopeViolation::new("$", "envelope must be a JSON object")],
        };
    };

    match object.get("jsonrpc") {
        None => errors.push(EnvelopeViolation::new("jsonrpc", "missing required field")),
        Some(Value::String(version)) if version == JSONRPC_VERSION => {}
        Some(_) => errors.push(EnvelopeViolation::new(
            "jsonrpc",
            format!("must equal \"{JSONRPC_VERSION}\""),
        )),
    }

    match object.get("id") {
        None => errors.push(EnvelopeViolation::new("id", "missing required field")),
        Some(Value::String(_)) => {}
        Some(_) => errors.push(EnvelopeViolation::new("id", "must be a string")),
    }

    match object.get("method") {
        None => errors.push(EnvelopeViolation::new("method", "missing required field")),
        Some(Value::String(_)) => {}
        Some(_) => errors.push(EnvelopeViolation::new("method", "must be a string")),
    }

    match object.get("params") {
        None => errors.push(EnvelopeViolation::new("params", "missing required field")),
        Some(Value::Object(_)) => {}
        Some(_) => errors.push(EnvelopeViolation::new("params", "must be an object")),
    }

    EnvelopeReport {
        valid: errors.is_empty(),
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_conforming_envelope_is_valid() {
        let report = validate_envelope(&json!({
            "jsonrpc": "2.0",
            "id": "1",
            "method": "m",
            "params": {}
        }));
        assert!(report.valid);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_wrong_version_reports_jsonrpc() {
        let report = validate_envelope(&json!({
            "jsonrpc": "1.0",
            "id": "1",
            "method": "m",
            "params": {}
        }));
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].field, "jsonrpc");
    }

    #[test]
    fn test_missing_jsonrpc_is_invalid() {
        let report = validate_envelope(&json!({
            "id": "1",
            "method": "m",
            "params": {}
        }));
        assert!(!report.valid);
        assert_eq!(report.errors[0].field, "jsonrpc");
    }

    #[test]
    fn test_two_omissions_yield_two_distinct_errors() {
        let report = validate_envelope(&json!({
            "jsonrpc": "2.0",
            "id": "1"
        }));
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 2);
        let fields: Vec<_> = report.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["method", "params"]);
    }

    #[test]
    fn test_non_object_candidate() {
        let report = validate_envelope(&json!(["not", "an", "object"]));
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].field, "$");
    }

    #[test]
    fn test_non_string_id_and_non_object_params() {
        let report = validate_envelope(&json!({
            "jsonrpc": "2.0",
            "id": 7,
            "method": "m",
            "params": "nope"
        }));
        assert!(!report.valid);
        let fields: Vec<_> = report.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["id", "params"]);
    }

    #[test]
    fn test_parse_returns_envelope() {
        let envelope = MessageEnvelope::parse(&json!({
            "jsonrpc": "2.0",
            "id": "req-1",
            "method": "tasks/submit",
            "params": {"session_id": "s1"}
        }))
        .unwrap();

        assert_eq!(envelope.id, "req-1");
        assert_eq!(envelope.method, "tasks/submit");
        assert_eq!(envelope.params["session_id"], "s1");
    }

    #[test]
    fn test_parse_error_carries_all_violations() {
        let err = MessageEnvelope::parse(&json!({"jsonrpc": "1.0"})).unwrap_err();
        // jsonrpc wrong, id/method/params missing
        assert_eq!(err.violations.len(), 4);
        let rendered = err.to_string();
        assert!(rendered.contains("jsonrpc"));
        assert!(rendered.contains("params"));
    }
}
