//! Alloy-based block source.
//!
//! Uses an alloy HTTP provider for `eth_blockNumber`. Suitable when the node
//! needs the provider's request handling rather than the bare JSON-RPC
//! source.

use crate::{BlockSourceError, BlockSourceFactory, BlockSourceInterface, BlockSourceRegistry};
use alloy_provider::{Provider, RootProvider};
use alloy_transport_http::Http;
use async_trait::async_trait;
use presale_types::{
	ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, ValidationError,
};

/// Block source backed by an alloy root provider.
pub struct AlloyBlockSource {
	provider: RootProvider<Http<reqwest::Client>>,
}

impl AlloyBlockSource {
	pub fn new(rpc_url: &str) -> Result<Self, BlockSourceError> {
		let url = rpc_url.parse().map_err(|e| {
			BlockSourceError::Configuration(format!("Invalid RPC URL '{}': {}", rpc_url, e))
		})?;
		Ok(Self {
			provider: RootProvider::new_http(url),
		})
	}
}

/// Configuration schema for the alloy block source.
pub struct AlloySchema;

impl ConfigSchema for AlloySchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		Schema::new(vec![Field::new("rpc_url", FieldType::Url)], vec![]).validate(config)
	}
}

#[async_trait]
impl BlockSourceInterface for AlloyBlockSource {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(AlloySchema)
	}

	async fn block_number(&self) -> Result<u64, BlockSourceError> {
		self.provider
			.get_block_number()
			.await
			.map_err(|e| BlockSourceError::Network(format!("Failed to get block number: {}", e)))
	}
}

/// Factory function to create an alloy block source from configuration.
///
/// Configuration parameters:
/// - `rpc_url` (required): node endpoint
pub fn create_source(
	config: &toml::Value,
) -> Result<Box<dyn BlockSourceInterface>, BlockSourceError> {
	AlloySchema
		.validate(config)
		.map_err(|e| BlockSourceError::Configuration(format!("Invalid configuration: {}", e)))?;

	let rpc_url = config
		.get("rpc_url")
		.and_then(|v| v.as_str())
		.ok_or_else(|| BlockSourceError::Configuration("rpc_url is required".to_string()))?;

	Ok(Box::new(AlloyBlockSource::new(rpc_url)?))
}

/// Registry for the alloy block source.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "alloy";
	type Factory = BlockSourceFactory;

	fn factory() -> Self::Factory {
		create_source
	}
}

impl BlockSourceRegistry for Registry {}
