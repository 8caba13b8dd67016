//! Cancellable repeating task.
//!
//! [`spawn_repeating`] runs an async tick immediately and then once per
//! period until cancelled. Ticks never overlap: the next one starts only
//! after the previous one finished, and a tick that overruns the period
//! delays the schedule instead of bursting to catch up.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::MissedTickBehavior;

/// Handle that stops a [`PollTask`]. Clones share the same signal.
#[derive(Clone, Debug)]
pub struct PollHandle {
	cancel: Arc<watch::Sender<bool>>,
}

impl PollHandle {
	fn new() -> (Self, watch::Receiver<bool>) {
		let (sender, receiver) = watch::channel(false);
		(
			Self {
				cancel: Arc::new(sender),
			},
			receiver,
		)
	}

	/// Requests cancellation.
	///
	/// Returns true only for the call that actually cancelled the task;
	/// later calls are no-ops and return false.
	pub fn cancel(&self) -> bool {
		self.cancel.send_if_modified(|cancelled| {
			if *cancelled {
				false
			} else {
				*cancelled = true;
				true
			}
		})
	}

	pub fn is_cancelled(&self) -> bool {
		*self.cancel.borrow()
	}
}

/// A running repeating task.
pub struct PollTask {
	handle: PollHandle,
	join: JoinHandle<u64>,
}

impl PollTask {
	pub fn handle(&self) -> PollHandle {
		self.handle.clone()
	}

	/// Stops the task after the tick in progress, if any.
	pub fn cancel(&self) -> bool {
		self.handle.cancel()
	}

	/// Waits for the task to stop and returns how many ticks ran.
	pub async fn join(self) -> Result<u64, JoinError> {
		self.join.await
	}
}

/// Spawns `tick` on the runtime, running it now and then every `period`.
///
/// Each tick receives a [`PollHandle`] so it can cancel the task itself.
pub fn spawn_repeating<F, Fut>(period: Duration, mut tick: F) -> PollTask
where
	F: FnMut(PollHandle) -> Fut + Send + 'static,
	Fut: Future<Output = ()> + Send + 'static,
{
	let (handle, mut cancelled) = PollHandle::new();
	let task_handle = handle.clone();

	let join = tokio::spawn(async move {
		let mut interval = tokio::time::interval(period);
		interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
		let mut ticks = 0u64;

		loop {
			tokio::select! {
				_ = interval.tick() => {},
				_ = cancelled.changed() => {},
			}
			if task_handle.is_cancelled() {
				break;
			}

			tick(task_handle.clone()).await;
			ticks += 1;

			if task_handle.is_cancelled() {
				break;
			}
		}

		ticks
	});

	PollTask { handle, join }
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::atomic::{AtomicU64, Ordering};

	#[tokio::test(start_paused = true)]
	async fn test_runs_immediately_then_on_period() {
		let counter = Arc::new(AtomicU64::new(0));
		let ticks = counter.clone();
		let task = spawn_repeating(Duration::from_secs(20), move |_| {
			let ticks = ticks.clone();
			async move {
				ticks.fetch_add(1, Ordering::SeqCst);
			}
		});

		tokio::time::sleep(Duration::from_millis(1)).await;
		assert_eq!(counter.load(Ordering::SeqCst), 1);

		tokio::time::sleep(Duration::from_secs(40)).await;
		assert_eq!(counter.load(Ordering::SeqCst), 3);

		assert!(task.cancel());
		assert!(!task.cancel());
		assert_eq!(task.join().await.unwrap(), 3);
	}

	#[tokio::test(start_paused = true)]
	async fn test_tick_can_cancel_itself() {
		let task = spawn_repeating(Duration::from_secs(1), |handle| async move {
			handle.cancel();
		});
		assert_eq!(task.join().await.unwrap(), 1);
	}

	#[tokio::test(start_paused = true)]
	async fn test_cancel_interrupts_wait() {
		let task = spawn_repeating(Duration::from_secs(3600), |_| async {});
		tokio::time::sleep(Duration::from_millis(1)).await;

		let handle = task.handle();
		assert!(!handle.is_cancelled());
		assert!(handle.cancel());
		assert!(handle.is_cancelled());

		// Returns without waiting out the hour-long period
		let joined = tokio::time::timeout(Duration::from_secs(1), task.join()).await;
		assert_eq!(joined.unwrap().unwrap(), 1);
	}

	#[tokio::test(start_paused = true)]
	async fn test_slow_ticks_do_not_overlap() {
		let active = Arc::new(AtomicU64::new(0));
		let overlaps = Arc::new(AtomicU64::new(0));
		let (a, o) = (active.clone(), overlaps.clone());

		let task = spawn_repeating(Duration::from_secs(1), move |_| {
			let (active, overlaps) = (a.clone(), o.clone());
			async move {
				if active.fetch_add(1, Ordering::SeqCst) > 0 {
					overlaps.fetch_add(1, Ordering::SeqCst);
				}
				tokio::time::sleep(Duration::from_secs(5)).await;
				active.fetch_sub(1, Ordering::SeqCst);
			}
		});

		tokio::time::sleep(Duration::from_secs(30)).await;
		task.cancel();
		task.join().await.unwrap();
		assert_eq!(overlaps.load(Ordering::SeqCst), 0);
	}
}
