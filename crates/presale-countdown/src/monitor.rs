//! Block-height polling loop.
//!
//! Each tick fetches the latest block height and, if that succeeded, writes
//! the dial position and the projected sale date to the display. The first
//! tick that observes the target block cancels the loop for good.

use crate::display::{CountdownDisplay, DisplayUpdate};
use crate::projection::countdown_text;
use crate::task::{spawn_repeating, PollHandle, PollTask};
use crate::BlockSourceInterface;
use chrono::{DateTime, Utc};
use presale_types::{CountdownEvent, EventBus, PresaleEvent, SaleSchedule};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::instrument;

/// Display settings of the countdown.
#[derive(Debug, Clone)]
pub struct CountdownSettings {
	pub schedule: SaleSchedule,
	/// Shown instead of a date once the target is reached.
	pub started_message: String,
	/// chrono format string for the projected date.
	pub date_format: String,
}

/// Polls a block source and keeps a countdown display up to date.
pub struct CountdownMonitor {
	source: Arc<dyn BlockSourceInterface>,
	display: Arc<dyn CountdownDisplay>,
	settings: CountdownSettings,
	event_bus: EventBus,
	/// Latest successfully fetched height; reset on restart.
	current_block: RwLock<Option<u64>>,
}

impl CountdownMonitor {
	pub fn new(
		source: Arc<dyn BlockSourceInterface>,
		display: Arc<dyn CountdownDisplay>,
		settings: CountdownSettings,
		event_bus: EventBus,
	) -> Self {
		Self {
			source,
			display,
			settings,
			event_bus,
			current_block: RwLock::new(None),
		}
	}

	pub fn schedule(&self) -> &SaleSchedule {
		&self.settings.schedule
	}

	/// Latest block height observed, if any fetch has succeeded.
	pub async fn current_block(&self) -> Option<u64> {
		*self.current_block.read().await
	}

	/// Fetches the block height and records it.
	///
	/// Failures are logged and published but otherwise swallowed: the caller
	/// gets `None` and the previous height stays in place.
	pub async fn fetch_block_height(&self) -> Option<u64> {
		match self.source.block_number().await {
			Ok(block) => {
				*self.current_block.write().await = Some(block);
				Some(block)
			},
			Err(e) => {
				tracing::warn!(error = %e, "Failed to fetch block height");
				self.event_bus
					.publish(PresaleEvent::Countdown(CountdownEvent::FetchFailed {
						error: e.to_string(),
					}))
					.ok();
				None
			},
		}
	}

	/// Writes `current` and the projected sale date to the display.
	pub async fn update_display(&self, current: u64) {
		self.update_display_at(current, Utc::now()).await
	}

	/// Same as [`update_display`](Self::update_display) with an explicit clock.
	pub async fn update_display_at(&self, current: u64, now: DateTime<Utc>) {
		let schedule = &self.settings.schedule;
		let target = schedule.target_block();
		let update = DisplayUpdate {
			current_block: current,
			dial_value: current.min(target),
			dial_max: target,
			text: countdown_text(
				schedule,
				current,
				now,
				&self.settings.started_message,
				&self.settings.date_format,
			),
			started: schedule.is_reached(current),
			at: now,
		};
		self.display.render(&update).await;

		self.event_bus
			.publish(PresaleEvent::Countdown(CountdownEvent::HeightUpdated {
				block: current,
				target,
			}))
			.ok();
	}

	/// One poll: fetch, update, and cancel through `handle` once the target
	/// block is reached.
	#[instrument(skip_all, fields(target_block = self.settings.schedule.target_block()))]
	pub async fn tick(&self, handle: &PollHandle) {
		let Some(block) = self.fetch_block_height().await else {
			return;
		};
		self.update_display(block).await;

		if !self.settings.schedule.is_reached(block) {
			let remaining = self.settings.schedule.blocks_remaining(block);
			tracing::debug!(block, remaining, "Countdown updated");
			return;
		}

		if handle.cancel() {
			tracing::info!(block, "Sale target block reached, polling stopped");
			self.event_bus
				.publish(PresaleEvent::Countdown(CountdownEvent::SaleStarted { block }))
				.ok();
		}
	}

	/// Starts polling: one tick now, then one every `interval`.
	pub fn start(self: Arc<Self>, interval: Duration) -> PollTask {
		tracing::info!(
			target_block = self.settings.schedule.target_block(),
			interval_secs = interval.as_secs(),
			"Starting countdown"
		);
		spawn_repeating(interval, move |handle| {
			let monitor = Arc::clone(&self);
			async move { monitor.tick(&handle).await }
		})
	}
}
