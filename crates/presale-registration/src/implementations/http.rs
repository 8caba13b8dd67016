//! HTTP registration backend.

use crate::{RegistrationApiInterface, RegistrationError};
use async_trait::async_trait;
use presale_types::{mask_email, RegistrationRequest};
use serde::Deserialize;
use std::time::Duration;

/// Error body returned by the backend on failure.
#[derive(Debug, Deserialize)]
struct ErrorBody {
	error: Option<String>,
}

/// Posts registrations as JSON to `{host}{register_path}`.
pub struct HttpRegistrationApi {
	client: reqwest::Client,
	endpoint: String,
}

impl HttpRegistrationApi {
	pub fn new(
		host: &str,
		register_path: &str,
		timeout: Duration,
	) -> Result<Self, RegistrationError> {
		let client = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| {
				RegistrationError::Configuration(format!("Failed to build HTTP client: {}", e))
			})?;
		Ok(Self::with_client(client, host, register_path))
	}

	/// Uses an existing client, e.g. one shared with the site config fetch.
	pub fn with_client(client: reqwest::Client, host: &str, register_path: &str) -> Self {
		Self {
			client,
			endpoint: format!("{}{}", host.trim_end_matches('/'), register_path),
		}
	}

	pub fn endpoint(&self) -> &str {
		&self.endpoint
	}
}

#[async_trait]
impl RegistrationApiInterface for HttpRegistrationApi {
	async fn register(&self, request: &RegistrationRequest) -> Result<(), RegistrationError> {
		tracing::debug!(
			endpoint = %self.endpoint,
			email = %mask_email(&request.email),
			"Posting registration"
		);

		let response = self
			.client
			.post(&self.endpoint)
			.json(request)
			.send()
			.await
			.map_err(|e| RegistrationError::Network(e.to_string()))?;

		let status = response.status();
		if status.is_success() {
			return Ok(());
		}

		// Anything but {"error": "<string>"} leaves the message empty
		let message = response
			.json::<ErrorBody>()
			.await
			.ok()
			.and_then(|body| body.error);
		Err(RegistrationError::Rejected {
			status: status.as_u16(),
			message,
		})
	}
}
