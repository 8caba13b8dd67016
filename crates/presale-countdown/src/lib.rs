//! Block-height countdown for the presale.
//!
//! The countdown polls a block source for the latest block height, compares
//! it with the sale-start block and projects when the sale will open. Results
//! are written to a [`CountdownDisplay`]. Polling stops for good once the
//! target block is reached.

use async_trait::async_trait;
use presale_types::{ConfigSchema, ImplementationRegistry};
use thiserror::Error;

pub mod display;
pub mod monitor;
pub mod projection;
pub mod task;

/// Block source implementations.
pub mod implementations {
	pub mod alloy;
	pub mod jsonrpc;
}

pub use display::{CountdownDisplay, DisplayUpdate, SnapshotDisplay, TracingDisplay};
pub use monitor::{CountdownMonitor, CountdownSettings};
pub use projection::{countdown_text, project_sale_date};
pub use task::{spawn_repeating, PollHandle, PollTask};

/// Errors that can occur while fetching the block height.
#[derive(Debug, Error)]
pub enum BlockSourceError {
	/// Transport failure or non-success HTTP status.
	#[error("Network error: {0}")]
	Network(String),
	/// The node answered with a JSON-RPC error object.
	#[error("RPC error {code}: {message}")]
	Rpc { code: i64, message: String },
	/// The response could not be decoded into a block height.
	#[error("Parse error: {0}")]
	Parse(String),
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Source of the latest block height of a chain.
#[async_trait]
pub trait BlockSourceInterface: Send + Sync {
	/// Returns the schema the implementation's configuration table must match.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Fetches the latest block number (`eth_blockNumber`).
	async fn block_number(&self) -> Result<u64, BlockSourceError>;
}

/// Builds a block source from its configuration table.
pub type BlockSourceFactory =
	fn(&toml::Value) -> Result<Box<dyn BlockSourceInterface>, BlockSourceError>;

/// Registry trait for block source implementations.
pub trait BlockSourceRegistry: ImplementationRegistry<Factory = BlockSourceFactory> {}

/// Returns every available block source as `(name, factory)` pairs.
pub fn get_all_implementations() -> Vec<(&'static str, BlockSourceFactory)> {
	use implementations::{alloy, jsonrpc};

	vec![
		(jsonrpc::Registry::NAME, jsonrpc::Registry::factory()),
		(alloy::Registry::NAME, alloy::Registry::factory()),
	]
}

/// Creates the block source registered under `name`.
pub fn create_block_source(
	name: &str,
	config: &toml::Value,
) -> Result<Box<dyn BlockSourceInterface>, BlockSourceError> {
	let factory = get_all_implementations()
		.into_iter()
		.find(|(registered, _)| *registered == name)
		.map(|(_, factory)| factory)
		.ok_or_else(|| {
			BlockSourceError::Configuration(format!("Unknown block source '{}'", name))
		})?;
	factory(config)
}
