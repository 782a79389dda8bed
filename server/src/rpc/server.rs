//! JSON-RPC request handling

use medrag_retrieval::RetrievalError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncWrite};

use super::protocol::*;
use super::transport::LineTransport;
use crate::backend::RetrievalBackend;
use crate::error::{ServerError, ServerResult};

/// Routes requests to the retrieval backend
pub struct RpcServer {
    backend: RetrievalBackend,
}

impl RpcServer {
    pub fn new(backend: RetrievalBackend) -> Self {
        Self { backend }
    }

    /// Serve on stdin/stdout until EOF
    pub async fn serve_stdio(&self) -> std::io::Result<()> {
        let mut transport = LineTransport::stdio();
        self.run(&mut transport).await
    }

    /// Run the request loop until the reader hits EOF
    pub async fn run<R, W>(&self, transport: &mut LineTransport<R, W>) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        tracing::info!("JSON-RPC server ready");

        while let Some(line) = transport.read_message().await? {
            if let Some(response) = self.handle_message(&line).await {
                transport.write_response(&response).await?;
            }
        }

        tracing::info!("Client disconnected");
        Ok(())
    }

    /// Handle one raw message; `None` for notifications
    pub async fn handle_message(&self, line: &str) -> Option<JsonRpcResponse> {
        let message: Value = match serde_json::from_str(line) {
            Ok(message) => message,
            Err(e) => {
                tracing::error!("Failed to parse JSON-RPC message: {}", e);
                return Some(JsonRpcResponse::error(
                    None,
                    JsonRpcError::parse_error(format!("Parse error: {}", e)),
                ));
            }
        };

        // Well-formed JSON that is not a request object
        let request: JsonRpcRequest = match serde_json::from_value(message.clone()) {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!("Invalid JSON-RPC request: {}", e);
                let error = JsonRpcError::invalid_request(format!("Invalid request: {}", e));
                return match (message.get("id"), message.get("method")) {
                    (Some(id), _) => Some(JsonRpcResponse::error(Some(id.clone()), error)),
                    // Malformed notification
                    (None, Some(_)) => None,
                    (None, None) => Some(JsonRpcResponse::error(None, error)),
                };
            }
        };

        if request.jsonrpc != "2.0" {
            tracing::debug!("Rejected message with jsonrpc {:?}", request.jsonrpc);
            return request.id.map(|id| {
                JsonRpcResponse::error(
                    Some(id),
                    JsonRpcError::invalid_request("jsonrpc must be \"2.0\""),
                )
            });
        }

        let id = request.id.clone();
        let response = self.handle_request(request).await;
        id.map(|_| response)
    }

    /// Handle a parsed request
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        tracing::debug!("Handling request: {}", request.method);

        let result = match request.method.as_str() {
            "ping" => to_value(PingResult {}),
            "retrieve" => self.handle_retrieve(request.params).await,
            "search" => self.handle_search(request.params).await,
            "stats" => Ok(self.backend.stats()),
            _ => {
                return JsonRpcResponse::error(
                    request.id,
                    JsonRpcError::method_not_found(&request.method),
                )
            }
        };

        match result {
            Ok(value) => JsonRpcResponse::success(request.id, value),
            Err(e) => {
                if e.is_client_error() {
                    tracing::debug!("Rejected {}: {}", request.method, e);
                } else {
                    tracing::error!("{} failed: {}", request.method, e);
                }
                JsonRpcResponse::error(request.id, e.into())
            }
        }
    }

    async fn handle_retrieve(&self, params: Option<Value>) -> ServerResult<Value> {
        let params: RetrieveParams = parse_params(params)?;
        let mut hits = self.backend.search(params.query, 1).await?;
        let hit = hits.pop().ok_or(RetrievalError::EmptyIndex)?;

        to_value(RetrievedDocument {
            slot: hit.document.id,
            name: hit.document.name,
            text: hit.document.text,
            distance: hit.distance,
        })
    }

    async fn handle_search(&self, params: Option<Value>) -> ServerResult<Value> {
        let params: SearchParams = parse_params(params)?;
        let hits = self.backend.search(params.query, params.k).await?;

        to_value(SearchResult {
            results: hits
                .into_iter()
                .map(|hit| RetrievedDocument {
                    slot: hit.document.id,
                    name: hit.document.name,
                    text: hit.document.text,
                    distance: hit.distance,
                })
                .collect(),
        })
    }
}

fn parse_params<T: DeserializeOwned>(params: Option<Value>) -> ServerResult<T> {
    let params = params.ok_or_else(|| ServerError::InvalidParams("missing params".to_string()))?;
    serde_json::from_value(params).map_err(|e| ServerError::InvalidParams(e.to_string()))
}

fn to_value<T: serde::Serialize>(value: T) -> ServerResult<Value> {
    Ok(serde_json::to_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use medrag_retrieval::{HashingEmbedder, RetrievalEngine, SourceDocument};
    use serde_json::json;
    use std::sync::Arc;

    fn engine() -> Arc<RetrievalEngine> {
        Arc::new(
            RetrievalEngine::new(Arc::new(HashingEmbedder::with_dimension(384).unwrap())).unwrap(),
        )
    }

    fn loaded_server() -> RpcServer {
        let engine = engine();
        engine
            .index_documents(vec![
                SourceDocument::new("flu.txt", "fever, cough, sore throat"),
                SourceDocument::new("diabetes.txt", "high blood sugar, frequent urination"),
            ])
            .unwrap();
        RpcServer::new(RetrievalBackend::new(engine))
    }

    async fn call(server: &RpcServer, request: Value) -> Value {
        let response = server
            .handle_message(&request.to_string())
            .await
            .expect("request with id gets a response");
        serde_json::to_value(response).unwrap()
    }

    #[tokio::test]
    async fn test_retrieve_returns_nearest_document() {
        let server = loaded_server();
        let response = call(
            &server,
            json!({"jsonrpc": "2.0", "id": 1, "method": "retrieve",
                   "params": {"query": "I have a fever and cough"}}),
        )
        .await;

        assert_eq!(response["result"]["name"], "flu.txt");
        assert_eq!(response["result"]["slot"], 0);
        assert_eq!(response["result"]["text"], "fever, cough, sore throat");
    }

    #[tokio::test]
    async fn test_search_returns_ranked_results() {
        let server = loaded_server();
        let response = call(
            &server,
            json!({"jsonrpc": "2.0", "id": 2, "method": "search",
                   "params": {"query": "blood sugar", "k": 5}}),
        )
        .await;

        let results = response["result"]["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["name"], "diabetes.txt");
    }

    #[tokio::test]
    async fn test_missing_params_is_invalid_params() {
        let server = loaded_server();
        let response = call(&server, json!({"jsonrpc": "2.0", "id": 3, "method": "retrieve"})).await;
        assert_eq!(response["error"]["code"], -32602);
    }

    #[tokio::test]
    async fn test_zero_k_is_invalid_params() {
        let server = loaded_server();
        let response = call(
            &server,
            json!({"jsonrpc": "2.0", "id": 4, "method": "search",
                   "params": {"query": "fever", "k": 0}}),
        )
        .await;
        assert_eq!(response["error"]["code"], -32602);
    }

    #[tokio::test]
    async fn test_empty_engine_is_internal_error() {
        let server = RpcServer::new(RetrievalBackend::new(engine()));
        let response = call(
            &server,
            json!({"jsonrpc": "2.0", "id": 5, "method": "retrieve",
                   "params": {"query": "fever"}}),
        )
        .await;
        assert_eq!(response["error"]["code"], -32603);
    }

    #[tokio::test]
    async fn test_parse_error_and_unknown_method() {
        let server = loaded_server();

        let response = server.handle_message("{not json").await.unwrap();
        assert_eq!(response.error.unwrap().code, -32700);

        let response = call(&server, json!({"jsonrpc": "2.0", "id": 6, "method": "diagnose"})).await;
        assert_eq!(response["error"]["code"], -32601);
    }

    #[tokio::test]
    async fn test_notifications_get_no_response() {
        let server = loaded_server();
        let response = server
            .handle_message(r#"{"jsonrpc":"2.0","method":"ping"}"#)
            .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_missing_method_is_invalid_request() {
        let server = loaded_server();
        let response = call(&server, json!({"jsonrpc": "2.0", "id": 7})).await;
        assert_eq!(response["error"]["code"], -32600);
        assert_eq!(response["id"], 7);

        let response = server.handle_message("[1, 2, 3]").await.unwrap();
        assert_eq!(response.error.unwrap().code, -32600);
        assert!(response.id.is_none());
    }

    #[tokio::test]
    async fn test_wrong_version_with_id_is_invalid_request() {
        let server = loaded_server();
        let response = call(&server, json!({"jsonrpc": "1.0", "id": 8, "method": "ping"})).await;
        assert_eq!(response["error"]["code"], -32600);
    }

    #[tokio::test]
    async fn test_invalid_notifications_get_no_response() {
        let server = loaded_server();

        let response = server
            .handle_message(r#"{"jsonrpc":"1.0","method":"ping"}"#)
            .await;
        assert!(response.is_none());

        let response = server
            .handle_message(r#"{"jsonrpc":"2.0","method":42}"#)
            .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_run_over_in_memory_transport() {
        let server = loaded_server();
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"stats"}"#,
            "\n"
        );
        let mut transport = LineTransport::new(input.as_bytes(), Vec::new());

        server.run(&mut transport).await.unwrap();

        let output = String::from_utf8(transport.into_writer()).unwrap();
        let responses: Vec<Value> = output
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["id"], 1);
        assert_eq!(responses[1]["result"]["documentCount"], 2);
    }
}
