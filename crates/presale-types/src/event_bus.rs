//! Broadcast event bus shared by the presale components.

use crate::PresaleEvent;
use tokio::sync::broadcast;

/// Fan-out channel for [`PresaleEvent`]s.
///
/// Publishing never blocks; slow subscribers lose the oldest events once the
/// channel capacity is exceeded.
#[derive(Clone)]
pub struct EventBus {
	sender: broadcast::Sender<PresaleEvent>,
}

impl EventBus {
	/// Creates a bus that buffers up to `capacity` events per subscriber.
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	/// Subscribes to all events published after this call.
	pub fn subscribe(&self) -> broadcast::Receiver<PresaleEvent> {
		self.sender.subscribe()
	}

	/// Publishes an event to every current subscriber.
	///
	/// Returns an error when nobody is subscribed; callers usually ignore it.
	pub fn publish(
		&self,
		event: PresaleEvent,
	) -> Result<usize, broadcast::error::SendError<PresaleEvent>> {
		self.sender.send(event)
	}
}

impl Default for EventBus {
	fn default() -> Self {
		Self::new(1000)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::CountdownEvent;

	#[tokio::test]
	async fn test_publish_reaches_subscribers() {
		let bus = EventBus::new(16);
		let mut first = bus.subscribe();
		let mut second = bus.subscribe();

		let delivered = bus
			.publish(PresaleEvent::Countdown(CountdownEvent::SaleStarted {
				block: 42,
			}))
			.unwrap();
		assert_eq!(delivered, 2);

		for receiver in [&mut first, &mut second] {
			match receiver.recv().await.unwrap() {
				PresaleEvent::Countdown(CountdownEvent::SaleStarted { block }) => {
					assert_eq!(block, 42)
				},
				other => panic!("unexpected event: {:?}", other),
			}
		}
	}

	#[test]
	fn test_publish_without_subscribers_is_an_error() {
		let bus = EventBus::default();
		assert!(bus
			.publish(PresaleEvent::Countdown(CountdownEvent::FetchFailed {
				error: "timeout".into(),
			}))
			.is_err());
	}
}
