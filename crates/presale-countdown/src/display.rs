//! Countdown displays.
//!
//! The page shows the countdown twice: a dial bounded to `[0, target]` and a
//! text line with the projected date. A [`CountdownDisplay`] receives both
//! values in one [`DisplayUpdate`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use presale_types::CountdownSnapshot;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Values written to the display after a successful poll.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayUpdate {
	pub current_block: u64,
	pub dial_value: u64,
	pub dial_max: u64,
	pub text: String,
	pub started: bool,
	pub at: DateTime<Utc>,
}

/// Sink for countdown updates.
#[async_trait]
pub trait CountdownDisplay: Send + Sync {
	async fn render(&self, update: &DisplayUpdate);
}

/// Keeps the latest update in memory for the HTTP API to serve.
#[derive(Clone)]
pub struct SnapshotDisplay {
	snapshot: Arc<RwLock<CountdownSnapshot>>,
}

impl SnapshotDisplay {
	/// Starts out showing [`CountdownSnapshot::pending`].
	pub fn new(target_block: u64) -> Self {
		Self {
			snapshot: Arc::new(RwLock::new(CountdownSnapshot::pending(target_block))),
		}
	}

	pub async fn snapshot(&self) -> CountdownSnapshot {
		self.snapshot.read().await.clone()
	}
}

#[async_trait]
impl CountdownDisplay for SnapshotDisplay {
	async fn render(&self, update: &DisplayUpdate) {
		let mut snapshot = self.snapshot.write().await;
		snapshot.current_block = Some(update.current_block);
		snapshot.dial_value = update.dial_value;
		snapshot.dial_max = update.dial_max;
		snapshot.text = update.text.clone();
		snapshot.started = update.started;
		snapshot.updated_at = Some(update.at);
	}
}

/// Writes every update to the log; used when no API server is running.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDisplay;

#[async_trait]
impl CountdownDisplay for TracingDisplay {
	async fn render(&self, update: &DisplayUpdate) {
		tracing::info!(
			block = update.current_block,
			dial = %format!("{}/{}", update.dial_value, update.dial_max),
			started = update.started,
			"{}",
			update.text
		);
	}
}
