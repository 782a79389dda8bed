//! JSON-RPC 2.0 message types for the retrieval protocol.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC 2.0 request
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// JSON-RPC 2.0 response
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<Value>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// JSON-RPC 2.0 error
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self {
            code: -32700,
            message: message.into(),
            data: None,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            code: -32600,
            message: message.into(),
            data: None,
        }
    }

    pub fn method_not_found(method: impl Into<String>) -> Self {
        Self {
            code: -32601,
            message: format!("Method not found: {}", method.into()),
            data: None,
        }
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self {
            code: -32602,
            message: message.into(),
            data: None,
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self {
            code: -32603,
            message: message.into(),
            data: None,
        }
    }
}

/// Params for `retrieve`
#[derive(Debug, Clone, Deserialize)]
pub struct RetrieveParams {
    pub query: String,
}

/// Params for `search`
#[derive(Debug, Clone, Deserialize)]
pub struct SearchParams {
    pub query: String,
    #[serde(default = "default_k")]
    pub k: usize,
}

fn default_k() -> usize {
    3
}

/// One retrieved document
#[derive(Debug, Clone, Serialize)]
pub struct RetrievedDocument {
    pub slot: usize,
    pub name: String,
    pub text: String,
    /// Squared L2 distance to the query
    pub distance: f32,
}

/// Result of `search`
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub results: Vec<RetrievedDocument>,
}

/// Result of `ping`
#[derive(Debug, Clone, Serialize)]
pub struct PingResult {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_params_default_k() {
        let params: SearchParams = serde_json::from_str(r#"{"query":"fever"}"#).unwrap();
        assert_eq!(params.k, 3);
    }

    #[test]
    fn test_error_response_omits_result() {
        let response = JsonRpcResponse::error(
            Some(Value::from(7)),
            JsonRpcError::method_not_found("frobnicate"),
        );
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["error"]["code"], -32601);
        assert!(json.get("result").is_none());
    }
}
