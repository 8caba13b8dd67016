//! Plain JSON-RPC block source.
//!
//! Sends `eth_blockNumber` as a JSON-RPC 2.0 POST and decodes the hex
//! quantity in `result`. No provider stack involved; any node that speaks
//! the Ethereum JSON-RPC API will do.

use crate::{BlockSourceError, BlockSourceFactory, BlockSourceInterface, BlockSourceRegistry};
use async_trait::async_trait;
use presale_types::{
	parse_hex_quantity, ConfigSchema, Field, FieldType, ImplementationRegistry, Schema,
	ValidationError,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const JSONRPC_VERSION: &str = "2.0";
const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

/// JSON-RPC 2.0 request envelope.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
	pub jsonrpc: &'static str,
	pub id: u64,
	pub method: &'static str,
	pub params: Vec<Value>,
}

impl JsonRpcRequest {
	/// `{"jsonrpc":"2.0","id":1,"method":"eth_blockNumber","params":[]}`
	pub fn block_number() -> Self {
		Self {
			jsonrpc: JSONRPC_VERSION,
			id: 1,
			method: "eth_blockNumber",
			params: Vec::new(),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcErrorObject {
	pub code: i64,
	pub message: String,
}

/// JSON-RPC 2.0 response envelope; exactly one of `result`/`error` is set.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
	#[serde(default)]
	pub result: Option<Value>,
	#[serde(default)]
	pub error: Option<JsonRpcErrorObject>,
}

impl JsonRpcResponse {
	/// Extracts the block height from an `eth_blockNumber` response.
	pub fn into_block_number(self) -> Result<u64, BlockSourceError> {
		if let Some(error) = self.error {
			return Err(BlockSourceError::Rpc {
				code: error.code,
				message: error.message,
			});
		}
		let result = self
			.result
			.ok_or_else(|| BlockSourceError::Parse("Response has no result".to_string()))?;
		let quantity = result.as_str().ok_or_else(|| {
			BlockSourceError::Parse(format!("Expected hex string result, got {}", result))
		})?;
		parse_hex_quantity(quantity).map_err(|e| BlockSourceError::Parse(e.to_string()))
	}
}

/// Block source speaking raw JSON-RPC over HTTP.
pub struct JsonRpcBlockSource {
	client: reqwest::Client,
	rpc_url: String,
}

impl JsonRpcBlockSource {
	pub fn new(rpc_url: String, timeout: Duration) -> Result<Self, BlockSourceError> {
		let client = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| BlockSourceError::Configuration(format!("HTTP client: {}", e)))?;
		Ok(Self { client, rpc_url })
	}
}

/// Configuration schema for the JSON-RPC block source.
pub struct JsonRpcSchema;

impl ConfigSchema for JsonRpcSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![Field::new("rpc_url", FieldType::Url)],
			vec![Field::new(
				"timeout_seconds",
				FieldType::Integer {
					min: Some(1),
					max: Some(300),
				},
			)],
		);
		schema.validate(config)
	}
}

#[async_trait]
impl BlockSourceInterface for JsonRpcBlockSource {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(JsonRpcSchema)
	}

	async fn block_number(&self) -> Result<u64, BlockSourceError> {
		let response = self
			.client
			.post(&self.rpc_url)
			.json(&JsonRpcRequest::block_number())
			.send()
			.await
			.map_err(|e| BlockSourceError::Network(e.to_string()))?;

		let status = response.status();
		if !status.is_success() {
			return Err(BlockSourceError::Network(format!(
				"RPC endpoint returned HTTP {}",
				status
			)));
		}

		let body: JsonRpcResponse = response
			.json()
			.await
			.map_err(|e| BlockSourceError::Parse(e.to_string()))?;
		body.into_block_number()
	}
}

/// Factory function to create a JSON-RPC block source from configuration.
///
/// Configuration parameters:
/// - `rpc_url` (required): node endpoint
/// - `timeout_seconds` (optional, default 10): per-request timeout
pub fn create_source(
	config: &toml::Value,
) -> Result<Box<dyn BlockSourceInterface>, BlockSourceError> {
	JsonRpcSchema
		.validate(config)
		.map_err(|e| BlockSourceError::Configuration(format!("Invalid configuration: {}", e)))?;

	let rpc_url = config
		.get("rpc_url")
		.and_then(|v| v.as_str())
		.ok_or_else(|| BlockSourceError::Configuration("rpc_url is required".to_string()))?;
	let timeout_seconds = config
		.get("timeout_seconds")
		.and_then(|v| v.as_integer())
		.map(|v| v as u64)
		.unwrap_or(DEFAULT_TIMEOUT_SECONDS);

	Ok(Box::new(JsonRpcBlockSource::new(
		rpc_url.to_string(),
		Duration::from_secs(timeout_seconds),
	)?))
}

/// Registry for the JSON-RPC block source.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "jsonrpc";
	type Factory = BlockSourceFactory;

	fn factory() -> Self::Factory {
		create_source
	}
}

impl BlockSourceRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::{http::StatusCode, routing::post, Json, Router};
	use presale_types::with_0x_prefix;
	use serde_json::json;

	async fn spawn_node(router: Router) -> String {
		let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		tokio::spawn(async move {
			axum::serve(listener, router).await.unwrap();
		});
		format!("http://{}", addr)
	}

	fn source(url: String) -> JsonRpcBlockSource {
		JsonRpcBlockSource::new(url, Duration::from_secs(5)).unwrap()
	}

	#[test]
	fn test_request_envelope() {
		let body = serde_json::to_string(&JsonRpcRequest::block_number()).unwrap();
		assert_eq!(
			body,
			r#"{"jsonrpc":"2.0","id":1,"method":"eth_blockNumber","params":[]}"#
		);
	}

	#[test]
	fn test_response_decoding() {
		let ok: JsonRpcResponse =
			serde_json::from_value(json!({"jsonrpc": "2.0", "id": 1, "result": "0x51b9e0"}))
				.unwrap();
		assert_eq!(ok.into_block_number().unwrap(), 5_356_000);

		let rpc_err: JsonRpcResponse = serde_json::from_value(json!({
			"jsonrpc": "2.0",
			"id": 1,
			"error": {"code": -32005, "message": "limit exceeded"}
		}))
		.unwrap();
		assert!(matches!(
			rpc_err.into_block_number(),
			Err(BlockSourceError::Rpc { code: -32005, .. })
		));

		let not_hex: JsonRpcResponse =
			serde_json::from_value(json!({"jsonrpc": "2.0", "id": 1, "result": 5})).unwrap();
		assert!(matches!(
			not_hex.into_block_number(),
			Err(BlockSourceError::Parse(_))
		));

		let empty: JsonRpcResponse =
			serde_json::from_value(json!({"jsonrpc": "2.0", "id": 1})).unwrap();
		assert!(matches!(
			empty.into_block_number(),
			Err(BlockSourceError::Parse(_))
		));
	}

	#[tokio::test]
	async fn test_fetches_block_number_from_node() {
		let router = Router::new().route(
			"/",
			post(|Json(request): Json<Value>| async move {
				assert_eq!(request["method"], "eth_blockNumber");
				assert_eq!(request["params"], json!([]));
				Json(json!({
					"jsonrpc": "2.0",
					"id": request["id"],
					"result": with_0x_prefix(&format!("{:x}", 5_355_000u64)),
				}))
			}),
		);
		let url = spawn_node(router).await;

		assert_eq!(source(url).block_number().await.unwrap(), 5_355_000);
	}

	#[tokio::test]
	async fn test_http_error_is_network_error() {
		let router = Router::new().route(
			"/",
			post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "busy") }),
		);
		let url = spawn_node(router).await;

		let err = source(url).block_number().await.unwrap_err();
		assert!(matches!(err, BlockSourceError::Network(_)));
		assert!(err.to_string().contains("503"));
	}

	#[tokio::test]
	async fn test_garbage_body_is_parse_error() {
		let router = Router::new().route("/", post(|| async { "not json" }));
		let url = spawn_node(router).await;

		assert!(matches!(
			source(url).block_number().await,
			Err(BlockSourceError::Parse(_))
		));
	}

	#[tokio::test]
	async fn test_unreachable_node_is_network_error() {
		// Bind then drop to get a port nobody listens on
		let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		drop(listener);

		assert!(matches!(
			source(format!("http://{}", addr)).block_number().await,
			Err(BlockSourceError::Network(_))
		));
	}

	#[test]
	fn test_factory_defaults() {
		let config: toml::Value = toml::from_str("rpc_url = \"https://node.example\"").unwrap();
		let source = create_source(&config).unwrap();
		assert!(source.config_schema().validate(&config).is_ok());
	}
}
