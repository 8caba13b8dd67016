//! Presale registration flow.
//!
//! Collects a registration from the page, checks it, and posts it to the
//! registration backend. Submission is gated behind a solved CAPTCHA: the
//! [`SubmitGate`] starts locked, unlocks when the widget reports a solved
//! challenge and relocks while a submission is in flight.

use async_trait::async_trait;
use presale_types::RegistrationRequest;
use thiserror::Error;

pub mod captcha;
pub mod flow;
pub mod form;
pub mod gate;
pub mod site;

/// Registration backend clients.
pub mod implementations {
	pub mod http;
}

pub use captcha::{CaptchaOptions, CaptchaWidget};
pub use flow::{FlowSettings, RegistrationFlow, RegistrationView};
pub use form::{build_request, validate, FormError};
pub use gate::{GateError, GateEvent, GateState, SubmitGate};
pub use implementations::http::HttpRegistrationApi;
pub use site::{resolve_registration_host, SiteConfig, SiteConfigError};

/// Errors returned by the registration backend.
#[derive(Debug, Error)]
pub enum RegistrationError {
	/// The backend answered with a non-success status.
	#[error("Registration rejected with HTTP {status}")]
	Rejected {
		status: u16,
		/// The `error` field of the response body, when present.
		message: Option<String>,
	},
	/// The request never got a response.
	#[error("Network error: {0}")]
	Network(String),
	#[error("Configuration error: {0}")]
	Configuration(String),
}

impl RegistrationError {
	/// Message supplied by the backend, suitable for showing to the user.
	pub fn server_message(&self) -> Option<&str> {
		match self {
			RegistrationError::Rejected {
				message: Some(message),
				..
			} => Some(message.as_str()),
			_ => None,
		}
	}
}

/// Registration backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationApiInterface: Send + Sync {
	/// Submits one registration. `Ok` means the backend accepted it.
	async fn register(&self, request: &RegistrationRequest) -> Result<(), RegistrationError>;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_server_message_only_from_rejection_body() {
		let with_body = RegistrationError::Rejected {
			status: 409,
			message: Some("Wallet already registered".into()),
		};
		assert_eq!(with_body.server_message(), Some("Wallet already registered"));

		let without_body = RegistrationError::Rejected {
			status: 500,
			message: None,
		};
		assert_eq!(without_body.server_message(), None);

		assert_eq!(
			RegistrationError::Network("timed out".into()).server_message(),
			None
		);
	}
}
