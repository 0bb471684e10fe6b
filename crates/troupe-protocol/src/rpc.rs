//! JSON-RPC 2.0 response types for the A2A surface.

use crate::envelope::JSONRPC_VERSION;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC 2.0 response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
    pub id: Value,
}

impl RpcResponse {
    /// Create a success response
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    /// Create an error response
    pub fn error(id: Value, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
                data: None,
            }),
            id,
        }
    }

    /// Create an error response with structured data
    pub fn error_with_data(
        id: Value,
        code: i32,
        message: impl Into<String>,
        data: Value,
    ) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
                data: Some(data),
            }),
            id,
        }
    }
}

/// JSON-RPC 2.0 error object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Standard JSON-RPC error codes
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;

    // Custom error codes (application-specific)
    pub const NOT_FOUND: i32 = -32000;
    pub const REGISTRY_ERROR: i32 = -32001;
    pub const BACKEND_ERROR: i32 = -32002;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_omits_error() {
        let response = RpcResponse::success(json!("1"), json!({"ok": true}));
        let encoded = serde_json::to_value(&response).unwrap();
        assert_eq!(encoded["jsonrpc"], "2.0");
        assert_eq!(encoded["result"]["ok"], true);
        assert!(encoded.get("error").is_none());
    }

    #[test]
    fn test_error_carries_code_and_data() {
        let response = RpcResponse::error_with_data(
            Value::Null,
            error_codes::INVALID_REQUEST,
            "Invalid request",
            json!([{"field": "params"}]),
        );
        let encoded = serde_json::to_value(&response).unwrap();
        assert_eq!(encoded["error"]["code"], -32600);
        assert_eq!(encoded["error"]["data"][0]["field"], "params");
        assert!(encoded.get("result").is_none());
    }
}
