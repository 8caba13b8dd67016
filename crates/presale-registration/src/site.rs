//! Remote site configuration.
//!
//! The page learns which backend host to post registrations to from a small
//! JSON document published next to it. It is read once at start-up.

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SiteConfigError {
	#[error("Failed to fetch site config from {url}: {message}")]
	Fetch { url: String, message: String },
	#[error("Invalid site config: {0}")]
	Invalid(String),
	#[error("Neither a registration host nor a site config URL is configured")]
	Missing,
}

/// The remote site configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SiteConfig {
	/// Base URL of the registration backend.
	pub host: String,
}

impl SiteConfig {
	/// Downloads and parses the document at `url`.
	pub async fn fetch(client: &reqwest::Client, url: &str) -> Result<Self, SiteConfigError> {
		let fetch_error = |message: String| SiteConfigError::Fetch {
			url: url.to_string(),
			message,
		};

		let response = client
			.get(url)
			.send()
			.await
			.map_err(|e| fetch_error(e.to_string()))?;
		let status = response.status();
		if !status.is_success() {
			return Err(fetch_error(format!("HTTP {}", status)));
		}

		let config: SiteConfig = response
			.json()
			.await
			.map_err(|e| SiteConfigError::Invalid(e.to_string()))?;
		if config.host.trim().is_empty() {
			return Err(SiteConfigError::Invalid("host is empty".to_string()));
		}
		Ok(config)
	}
}

/// Picks the registration host: a locally configured `host_override` wins,
/// otherwise the remote document at `config_url` is fetched.
pub async fn resolve_registration_host(
	client: &reqwest::Client,
	host_override: Option<&str>,
	config_url: Option<&str>,
) -> Result<String, SiteConfigError> {
	if let Some(host) = host_override {
		tracing::debug!(host, "Using configured registration host");
		return Ok(host.to_string());
	}

	let url = config_url.ok_or(SiteConfigError::Missing)?;
	let config = SiteConfig::fetch(client, url).await?;
	tracing::info!(host = %config.host, "Loaded remote site config");
	Ok(config.host)
}
