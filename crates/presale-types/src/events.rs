//! Event types for inter-component communication.
//!
//! The countdown and registration components publish events on the
//! [`EventBus`](crate::EventBus); the service subscribes to log them.

use serde::{Deserialize, Serialize};

/// Main event type encompassing all presale events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PresaleEvent {
	/// Events from the block-height countdown.
	Countdown(CountdownEvent),
	/// Events from the registration flow.
	Registration(RegistrationEvent),
}

/// Events related to the block-height countdown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum CountdownEvent {
	/// A new block height was fetched and put on display.
	HeightUpdated { block: u64, target: u64 },
	/// Fetching the block height failed; the display was left untouched.
	FetchFailed { error: String },
	/// The target block was reached and polling stopped.
	SaleStarted { block: u64 },
}

/// Events related to the registration flow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum RegistrationEvent {
	/// A submission passed validation and is being sent.
	Submitted { submission_id: String },
	/// The backend accepted the registration.
	Accepted { submission_id: String },
	/// The backend or the transport rejected the registration.
	Rejected {
		submission_id: String,
		reason: String,
	},
	/// The form failed client-side validation.
	Invalid { reason: String },
}
