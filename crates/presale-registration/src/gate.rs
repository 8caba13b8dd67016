//! Submit button gate.
//!
//! The submit control is usable only while the gate is [`GateState::Unlocked`].
//! Every transition is a pure function of the current state and the event,
//! so the same rules hold on the page and in the service.

use thiserror::Error;

/// Whether a submission may start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GateState {
	#[default]
	Locked,
	Unlocked,
}

/// Things that move the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateEvent {
	/// The CAPTCHA widget reported a solved challenge.
	CaptchaSolved,
	/// The solved challenge expired before submission.
	CaptchaExpired,
	/// The user submitted the form.
	SubmissionStarted,
	/// Local validation rejected the form. The CAPTCHA stays solved.
	ValidationFailed,
	/// The backend rejected the submission or could not be reached. The
	/// CAPTCHA has already been reset when this is applied.
	SubmissionFailed,
}

impl GateState {
	/// State after `event`.
	pub fn on(self, event: GateEvent) -> GateState {
		match event {
			GateEvent::CaptchaSolved => GateState::Unlocked,
			GateEvent::CaptchaExpired => GateState::Locked,
			GateEvent::SubmissionStarted => GateState::Locked,
			GateEvent::ValidationFailed => GateState::Unlocked,
			GateEvent::SubmissionFailed => GateState::Unlocked,
		}
	}

	pub fn is_unlocked(self) -> bool {
		self == GateState::Unlocked
	}
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GateError {
	#[error("Submission is locked until the CAPTCHA is solved")]
	Locked,
}

/// Holds the current [`GateState`].
#[derive(Debug, Default)]
pub struct SubmitGate {
	state: GateState,
}

impl SubmitGate {
	/// A new gate starts locked.
	pub fn new() -> Self {
		Self::default()
	}

	pub fn state(&self) -> GateState {
		self.state
	}

	/// Applies `event` and returns the new state.
	pub fn apply(&mut self, event: GateEvent) -> GateState {
		let next = self.state.on(event);
		if next != self.state {
			tracing::debug!(from = ?self.state, to = ?next, event = ?event, "Submit gate changed");
		}
		self.state = next;
		next
	}

	/// Starts a submission: fails while locked, otherwise locks the gate.
	pub fn begin_submission(&mut self) -> Result<(), GateError> {
		if !self.state.is_unlocked() {
			return Err(GateError::Locked);
		}
		self.apply(GateEvent::SubmissionStarted);
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_starts_locked() {
		assert_eq!(SubmitGate::new().state(), GateState::Locked);
	}

	#[test]
	fn test_captcha_lifecycle() {
		let mut gate = SubmitGate::new();
		assert_eq!(gate.apply(GateEvent::CaptchaSolved), GateState::Unlocked);
		assert_eq!(gate.apply(GateEvent::CaptchaExpired), GateState::Locked);
		assert_eq!(gate.apply(GateEvent::CaptchaSolved), GateState::Unlocked);
	}

	#[test]
	fn test_submission_locks_until_resolved() {
		let mut gate = SubmitGate::new();
		gate.apply(GateEvent::CaptchaSolved);

		gate.begin_submission().unwrap();
		assert_eq!(gate.state(), GateState::Locked);
		assert_eq!(gate.begin_submission(), Err(GateError::Locked));

		assert_eq!(gate.apply(GateEvent::SubmissionFailed), GateState::Unlocked);
		gate.begin_submission().unwrap();
		assert_eq!(gate.apply(GateEvent::ValidationFailed), GateState::Unlocked);
	}

	#[test]
	fn test_submit_while_locked_has_no_effect() {
		let mut gate = SubmitGate::new();
		assert_eq!(gate.begin_submission(), Err(GateError::Locked));
		assert_eq!(gate.state(), GateState::Locked);
	}

	#[test]
	fn test_expiry_always_locks() {
		for start in [GateState::Locked, GateState::Unlocked] {
			assert_eq!(start.on(GateEvent::CaptchaExpired), GateState::Locked);
			assert_eq!(start.on(GateEvent::SubmissionStarted), GateState::Locked);
		}
	}
}
