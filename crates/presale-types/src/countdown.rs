//! Countdown value types.
//!
//! The countdown compares the latest block height of a chain against a fixed
//! sale-start block. These types describe that schedule and the values the
//! countdown last put on display.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a sale schedule is constructed with unusable values.
#[derive(Debug, Error, PartialEq)]
pub enum ScheduleError {
	/// The target block must be above the genesis block.
	#[error("Sale target block must be greater than 0")]
	ZeroTarget,
	/// The average block time must be a finite positive number of seconds.
	#[error("Average block time must be a positive number of seconds, got {0}")]
	InvalidBlockTime(f64),
}

/// Fixed sale-start block together with the chain's average block time.
///
/// Both values are immutable once the schedule is built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSaleSchedule")]
pub struct SaleSchedule {
	target_block: u64,
	average_block_time: f64,
}

/// Unchecked wire form; deserialization goes through [`SaleSchedule::new`].
#[derive(Deserialize)]
struct RawSaleSchedule {
	target_block: u64,
	average_block_time: f64,
}

impl TryFrom<RawSaleSchedule> for SaleSchedule {
	type Error = ScheduleError;

	fn try_from(raw: RawSaleSchedule) -> Result<Self, Self::Error> {
		SaleSchedule::new(raw.target_block, raw.average_block_time)
	}
}

impl SaleSchedule {
	/// Creates a schedule, rejecting a zero target or a non-positive block time.
	pub fn new(target_block: u64, average_block_time: f64) -> Result<Self, ScheduleError> {
		if target_block == 0 {
			return Err(ScheduleError::ZeroTarget);
		}
		if !average_block_time.is_finite() || average_block_time <= 0.0 {
			return Err(ScheduleError::InvalidBlockTime(average_block_time));
		}
		Ok(Self {
			target_block,
			average_block_time,
		})
	}

	/// Block number at which the sale is considered started.
	pub fn target_block(&self) -> u64 {
		self.target_block
	}

	/// Average seconds between blocks.
	pub fn average_block_time(&self) -> f64 {
		self.average_block_time
	}

	/// Returns true once `current` has reached the target block.
	pub fn is_reached(&self, current: u64) -> bool {
		current >= self.target_block
	}

	/// Signed number of blocks left until the target; negative past the target.
	pub fn blocks_remaining(&self, current: u64) -> i128 {
		self.target_block as i128 - current as i128
	}
}

/// What the countdown display currently shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountdownSnapshot {
	/// Latest observed block height, `None` until the first successful fetch.
	pub current_block: Option<u64>,
	/// Sale-start block.
	pub target_block: u64,
	/// Dial position, bounded to `[0, dial_max]`.
	pub dial_value: u64,
	/// Upper bound of the dial; equal to the target block.
	pub dial_max: u64,
	/// Projected sale date or the "started" message.
	pub text: String,
	/// Whether the target block has been reached.
	pub started: bool,
	/// When the display was last written.
	pub updated_at: Option<DateTime<Utc>>,
}

impl CountdownSnapshot {
	/// Snapshot shown before any block height is known.
	pub fn pending(target_block: u64) -> Self {
		Self {
			current_block: None,
			target_block,
			dial_value: 0,
			dial_max: target_block,
			text: String::new(),
			started: false,
			updated_at: None,
		}
	}
}
