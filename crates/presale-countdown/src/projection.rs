//! Sale date projection.

use chrono::{DateTime, TimeDelta, Utc};
use presale_types::SaleSchedule;
use std::fmt::Write;

/// Projects the wall-clock time at which `target` will be mined.
///
/// `seconds_remaining = (target - current) * average_block_time`, added to
/// `now`. A `current` past the target yields a date in the past. Results
/// outside chrono's range saturate at its bounds.
pub fn project_sale_date(
	current: u64,
	target: u64,
	average_block_time: f64,
	now: DateTime<Utc>,
) -> DateTime<Utc> {
	let blocks_remaining = target as f64 - current as f64;
	let millis = (blocks_remaining * average_block_time * 1000.0).round();

	let projected = if millis.is_finite() && millis.abs() < i64::MAX as f64 {
		TimeDelta::try_milliseconds(millis as i64).and_then(|delta| now.checked_add_signed(delta))
	} else {
		None
	};

	projected.unwrap_or(if millis > 0.0 {
		DateTime::<Utc>::MAX_UTC
	} else {
		DateTime::<Utc>::MIN_UTC
	})
}

/// Text for the countdown display: the projected sale date, or
/// `started_message` once the target block is reached.
pub fn countdown_text(
	schedule: &SaleSchedule,
	current: u64,
	now: DateTime<Utc>,
	started_message: &str,
	date_format: &str,
) -> String {
	if schedule.is_reached(current) {
		return started_message.to_string();
	}

	let projected = project_sale_date(
		current,
		schedule.target_block(),
		schedule.average_block_time(),
		now,
	);

	// An invalid format string makes chrono's Display fail; fall back to RFC 3339
	let mut text = String::new();
	if write!(text, "{}", projected.format(date_format)).is_err() {
		return projected.to_rfc3339();
	}
	text
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;

	const TARGET: u64 = 5_356_000;

	fn now() -> DateTime<Utc> {
		Utc.with_ymd_and_hms(2018, 3, 1, 12, 0, 0).unwrap()
	}

	#[test]
	fn test_projects_thousand_blocks_ahead() {
		let projected = project_sale_date(TARGET - 1000, TARGET, 14.5, now());
		assert_eq!((projected - now()).num_seconds(), 14_500);
	}

	#[test]
	fn test_fractional_seconds_are_kept() {
		let projected = project_sale_date(TARGET - 1, TARGET, 14.5, now());
		assert_eq!((projected - now()).num_milliseconds(), 14_500);
	}

	#[test]
	fn test_past_target_yields_past_date() {
		let projected = project_sale_date(TARGET + 10, TARGET, 14.5, now());
		assert_eq!((now() - projected).num_seconds(), 145);
	}

	#[test]
	fn test_at_target_is_now() {
		assert_eq!(project_sale_date(TARGET, TARGET, 14.5, now()), now());
	}

	#[test]
	fn test_huge_distance_saturates() {
		let projected = project_sale_date(0, u64::MAX, 1e6, now());
		assert_eq!(projected, DateTime::<Utc>::MAX_UTC);
	}

	#[test]
	fn test_text_before_and_after_target() {
		let schedule = SaleSchedule::new(TARGET, 14.5).unwrap();

		let before = countdown_text(&schedule, TARGET - 1000, now(), "Started", "%Y-%m-%d %H:%M:%S");
		assert_eq!(before, "2018-03-01 16:01:40");

		assert_eq!(
			countdown_text(&schedule, TARGET, now(), "Started", "%Y-%m-%d"),
			"Started"
		);
		assert_eq!(
			countdown_text(&schedule, TARGET + 5, now(), "Started", "%Y-%m-%d"),
			"Started"
		);
	}

	#[test]
	fn test_invalid_format_falls_back() {
		let schedule = SaleSchedule::new(TARGET, 14.5).unwrap();
		let text = countdown_text(&schedule, TARGET - 1000, now(), "Started", "%Q");
		assert_eq!(text, "2018-03-01T16:01:40+00:00");
	}
}
