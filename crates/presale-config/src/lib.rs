//! Configuration for the presale site services.
//!
//! Configuration is read from TOML. `${VAR}` and `${VAR:-default}` references
//! are resolved from the environment before parsing, and a file may pull in
//! other files with `include = ["countdown.toml", ...]` as long as every
//! top-level section is defined exactly once.

mod loader;

use presale_types::{SaleSchedule, ScheduleError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error("Configuration error: {0}")]
	Parse(String),
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep the message only; the default rendering echoes the whole input
		ConfigError::Parse(err.message().to_string())
	}
}

impl From<ScheduleError> for ConfigError {
	fn from(err: ScheduleError) -> Self {
		ConfigError::Validation(err.to_string())
	}
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Identity of this deployment.
	pub presale: PresaleConfig,
	/// Block-height countdown settings.
	pub countdown: CountdownConfig,
	/// Registration flow settings; required when the API is enabled.
	pub registration: Option<RegistrationConfig>,
	/// HTTP API server settings.
	pub api: Option<ApiConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PresaleConfig {
	/// Identifier used in logs.
	pub id: String,
}

/// Countdown settings.
///
/// `implementations` holds one raw table per block source; `primary` picks
/// the one the monitor polls.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CountdownConfig {
	pub primary: String,
	pub implementations: HashMap<String, toml::Value>,
	/// Block number at which the sale starts.
	pub sale_target_block: u64,
	/// Average seconds between blocks, used to project the sale date.
	pub average_block_time_seconds: f64,
	#[serde(default = "default_poll_interval_seconds")]
	pub poll_interval_seconds: u64,
	/// Text shown instead of a date once the target block is reached.
	#[serde(default = "default_started_message")]
	pub started_message: String,
	/// chrono format string for the projected date.
	#[serde(default = "default_date_format")]
	pub date_format: String,
}

impl CountdownConfig {
	/// Builds the sale schedule described by this section.
	pub fn schedule(&self) -> Result<SaleSchedule, ConfigError> {
		Ok(SaleSchedule::new(
			self.sale_target_block,
			self.average_block_time_seconds,
		)?)
	}

	/// Returns the raw table of the primary block source.
	pub fn primary_implementation(&self) -> Option<&toml::Value> {
		self.implementations.get(&self.primary)
	}
}

fn default_poll_interval_seconds() -> u64 {
	20
}

fn default_started_message() -> String {
	"The presale has started!".to_string()
}

fn default_date_format() -> String {
	"%B %-d, %Y %H:%M UTC".to_string()
}

/// Registration flow settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegistrationConfig {
	/// Remote JSON document supplying the registration API `host`.
	pub config_url: Option<String>,
	/// Registration API base URL; takes precedence over `config_url`.
	pub host: Option<String>,
	#[serde(default = "default_register_path")]
	pub register_path: String,
	/// Where the browser goes after a successful registration.
	#[serde(default = "default_redirect_path")]
	pub redirect_path: String,
	/// Public CAPTCHA site key handed to the widget.
	pub captcha_sitekey: String,
	/// Element id the CAPTCHA widget renders into.
	#[serde(default = "default_captcha_container")]
	pub captcha_container: String,
	#[serde(default = "default_fallback_error")]
	pub fallback_error: String,
	#[serde(default = "default_mismatch_error")]
	pub mismatch_error: String,
	#[serde(default = "default_registration_timeout")]
	pub timeout_seconds: u64,
}

impl RegistrationConfig {
	fn validate(&self) -> Result<(), ConfigError> {
		if self.config_url.is_none() && self.host.is_none() {
			return Err(ConfigError::Validation(
				"Registration requires either 'config_url' or 'host'".into(),
			));
		}
		for (name, url) in [
			("config_url", &self.config_url),
			("host", &self.host),
		] {
			if let Some(url) = url {
				if !(url.starts_with("http://") || url.starts_with("https://")) {
					return Err(ConfigError::Validation(format!(
						"Registration {} must be an http(s) URL, got '{}'",
						name, url
					)));
				}
			}
		}
		for (name, path) in [
			("register_path", &self.register_path),
			("redirect_path", &self.redirect_path),
		] {
			if !path.starts_with('/') {
				return Err(ConfigError::Validation(format!(
					"Registration {} must start with '/', got '{}'",
					name, path
				)));
			}
		}
		if self.captcha_sitekey.is_empty() {
			return Err(ConfigError::Validation(
				"Registration captcha_sitekey cannot be empty".into(),
			));
		}
		if self.timeout_seconds == 0 {
			return Err(ConfigError::Validation(
				"Registration timeout_seconds must be greater than 0".into(),
			));
		}

		Ok(())
	}
}

fn default_register_path() -> String {
	"/api/v1/register".to_string()
}

fn default_redirect_path() -> String {
	"/registered/".to_string()
}

fn default_captcha_container() -> String {
	"recaptcha".to_string()
}

fn default_fallback_error() -> String {
	"Something went wrong".to_string()
}

fn default_mismatch_error() -> String {
	"Email addresses do not match.".to_string()
}

fn default_registration_timeout() -> u64 {
	20
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	#[serde(default)]
	pub enabled: bool,
	#[serde(default = "default_api_host")]
	pub host: String,
	#[serde(default = "default_api_port")]
	pub port: u16,
	/// Request timeout in seconds. Must exceed the registration backend
	/// timeout so a slow backend is answered by the registration flow.
	#[serde(default = "default_api_timeout")]
	pub timeout_seconds: u64,
	/// Maximum request body size in bytes.
	#[serde(default = "default_max_request_size")]
	pub max_request_size: usize,
	pub cors: Option<CorsConfig>,
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
	pub allowed_origins: Vec<String>,
}

fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
	3000
}

fn default_api_timeout() -> u64 {
	30
}

fn default_max_request_size() -> usize {
	64 * 1024
}

/// Resolves environment variables in a string.
///
/// Replaces `${VAR_NAME}` with the value of `VAR_NAME` and supports defaults
/// with `${VAR_NAME:-default_value}`. Inputs over 1MB are rejected.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = String::with_capacity(input.len());
	let mut last_end = 0;

	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let value = match std::env::var(var_name.as_str()) {
			Ok(v) => v,
			Err(_) => match cap.get(2) {
				Some(default) => default.as_str().to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name.as_str()
					)))
				},
			},
		};

		result.push_str(&input[last_end..full_match.start()]);
		result.push_str(&value);
		last_end = full_match.end();
	}
	result.push_str(&input[last_end..]);

	Ok(result)
}

impl Config {
	/// Loads configuration from a file, following `include` directives.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let path_buf = Path::new(path);
		let base_dir = path_buf.parent().unwrap_or_else(|| Path::new("."));

		let mut loader = loader::ConfigLoader::new(base_dir);
		let file_name = path_buf
			.file_name()
			.ok_or_else(|| ConfigError::Validation(format!("Invalid path: {}", path)))?;
		loader.load_config(file_name).await
	}

	/// Deserializes and validates an already env-resolved TOML document.
	pub(crate) fn from_toml(value: toml::Value) -> Result<Self, ConfigError> {
		let config: Config = value.try_into()?;
		config.validate()?;
		Ok(config)
	}

	/// Registration API base URL configured locally, if any.
	pub fn registration_host(&self) -> Option<&str> {
		self.registration.as_ref().and_then(|r| r.host.as_deref())
	}

	/// API settings, if the API server is enabled.
	pub fn enabled_api(&self) -> Option<&ApiConfig> {
		self.api.as_ref().filter(|api| api.enabled)
	}

	fn validate(&self) -> Result<(), ConfigError> {
		if self.presale.id.is_empty() {
			return Err(ConfigError::Validation("Presale ID cannot be empty".into()));
		}

		// Countdown
		let countdown = &self.countdown;
		if countdown.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"At least one countdown implementation must be configured".into(),
			));
		}
		if countdown.primary_implementation().is_none() {
			return Err(ConfigError::Validation(format!(
				"Primary countdown implementation '{}' not found in implementations",
				countdown.primary
			)));
		}
		countdown.schedule()?;
		if countdown.poll_interval_seconds == 0 || countdown.poll_interval_seconds > 3600 {
			return Err(ConfigError::Validation(
				"Countdown poll_interval_seconds must be between 1 and 3600".into(),
			));
		}
		if countdown.started_message.is_empty() {
			return Err(ConfigError::Validation(
				"Countdown started_message cannot be empty".into(),
			));
		}

		// The registration endpoint exists only when the API is served
		if let Some(api) = self.enabled_api() {
			if api.port == 0 {
				return Err(ConfigError::Validation(
					"API port must be greater than 0".into(),
				));
			}
			let registration = self.registration.as_ref().ok_or_else(|| {
				ConfigError::Validation(
					"A [registration] section is required when the API is enabled".into(),
				)
			})?;
			registration.validate()?;
			if registration.timeout_seconds >= api.timeout_seconds {
				return Err(ConfigError::Validation(format!(
					"Registration timeout_seconds ({}) must be lower than API timeout_seconds ({})",
					registration.timeout_seconds, api.timeout_seconds
				)));
			}
		}

		Ok(())
	}
}

/// Parses a TOML string, resolving environment variables and validating.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let value: toml::Value = toml::from_str(&resolved)?;
		Config::from_toml(value)
	}
}

/// Minimal valid configuration for tests in dependent crates.
#[cfg(any(test, feature = "testing"))]
pub const SAMPLE_CONFIG: &str = r#"
[presale]
id = "test-presale"

[countdown]
primary = "jsonrpc"
sale_target_block = 5356000
average_block_time_seconds = 14.5
[countdown.implementations.jsonrpc]
rpc_url = "http://127.0.0.1:8545"

[registration]
host = "http://127.0.0.1:9000"
captcha_sitekey = "test-sitekey"

[api]
enabled = true
port = 3000
"#;

#[cfg(test)]
mod tests {
	use super::*;

	fn replace(config: &str, from: &str, to: &str) -> String {
		assert!(config.contains(from), "fixture does not contain {}", from);
		config.replace(from, to)
	}

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("PRESALE_TEST_HOST", "localhost");
		std::env::set_var("PRESALE_TEST_PORT", "8545");

		let input = "url = \"http://${PRESALE_TEST_HOST}:${PRESALE_TEST_PORT}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "url = \"http://localhost:8545\"");

		std::env::remove_var("PRESALE_TEST_HOST");
		std::env::remove_var("PRESALE_TEST_PORT");
	}

	#[test]
	fn test_env_var_with_default() {
		let input = "value = \"${PRESALE_MISSING_VAR:-fallback}\"";
		assert_eq!(resolve_env_vars(input).unwrap(), "value = \"fallback\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let result = resolve_env_vars("value = \"${PRESALE_MISSING_VAR}\"");
		assert!(result.unwrap_err().to_string().contains("PRESALE_MISSING_VAR"));
	}

	#[test]
	fn test_sample_config_defaults() {
		let config: Config = SAMPLE_CONFIG.parse().unwrap();
		assert_eq!(config.presale.id, "test-presale");
		assert_eq!(config.countdown.poll_interval_seconds, 20);
		assert_eq!(config.countdown.started_message, "The presale has started!");
		let registration = config.registration.as_ref().unwrap();
		assert_eq!(registration.register_path, "/api/v1/register");
		assert_eq!(registration.redirect_path, "/registered/");
		assert_eq!(registration.fallback_error, "Something went wrong");
		assert_eq!(registration.mismatch_error, "Email addresses do not match.");
		assert_eq!(registration.timeout_seconds, 20);
		assert_eq!(config.enabled_api().map(|api| api.timeout_seconds), Some(30));
		assert_eq!(config.registration_host(), Some("http://127.0.0.1:9000"));

		let schedule = config.countdown.schedule().unwrap();
		assert_eq!(schedule.target_block(), 5_356_000);
		assert_eq!(schedule.average_block_time(), 14.5);
	}

	#[test]
	fn test_config_with_env_vars() {
		std::env::set_var("PRESALE_TEST_RPC", "https://node.example/rpc");
		let config_str = replace(
			SAMPLE_CONFIG,
			"rpc_url = \"http://127.0.0.1:8545\"",
			"rpc_url = \"${PRESALE_TEST_RPC}\"",
		);

		let config: Config = config_str.parse().unwrap();
		let rpc_url = config
			.countdown
			.primary_implementation()
			.and_then(|v| v.get("rpc_url"))
			.and_then(|v| v.as_str());
		assert_eq!(rpc_url, Some("https://node.example/rpc"));

		std::env::remove_var("PRESALE_TEST_RPC");
	}

	#[test]
	fn test_unknown_primary_rejected() {
		let config_str = replace(SAMPLE_CONFIG, "primary = \"jsonrpc\"", "primary = \"alloy\"");
		let err = Config::from_str(&config_str).unwrap_err();
		assert!(err.to_string().contains("'alloy' not found"));
	}

	#[test]
	fn test_invalid_schedule_rejected() {
		let config_str = replace(
			SAMPLE_CONFIG,
			"average_block_time_seconds = 14.5",
			"average_block_time_seconds = 0.0",
		);
		let err = Config::from_str(&config_str).unwrap_err();
		assert!(err.to_string().contains("Average block time"));

		let config_str = replace(
			SAMPLE_CONFIG,
			"sale_target_block = 5356000",
			"sale_target_block = 0",
		);
		assert!(Config::from_str(&config_str).is_err());
	}

	#[test]
	fn test_poll_interval_bounds() {
		let config_str = replace(
			SAMPLE_CONFIG,
			"average_block_time_seconds = 14.5",
			"average_block_time_seconds = 14.5\npoll_interval_seconds = 0",
		);
		let err = Config::from_str(&config_str).unwrap_err();
		assert!(err.to_string().contains("poll_interval_seconds"));
	}

	#[test]
	fn test_registration_requires_host_source() {
		let config_str = replace(SAMPLE_CONFIG, "host = \"http://127.0.0.1:9000\"\n", "");
		let err = Config::from_str(&config_str).unwrap_err();
		assert!(err.to_string().contains("'config_url' or 'host'"));
	}

	#[test]
	fn test_registration_paths_and_urls_validated() {
		let config_str = replace(
			SAMPLE_CONFIG,
			"captcha_sitekey = \"test-sitekey\"",
			"captcha_sitekey = \"test-sitekey\"\nredirect_path = \"registered\"",
		);
		let err = Config::from_str(&config_str).unwrap_err();
		assert!(err.to_string().contains("redirect_path must start with '/'"));

		let config_str = replace(
			SAMPLE_CONFIG,
			"host = \"http://127.0.0.1:9000\"",
			"host = \"127.0.0.1:9000\"",
		);
		let err = Config::from_str(&config_str).unwrap_err();
		assert!(err.to_string().contains("host must be an http(s) URL"));
	}

	#[test]
	fn test_registration_timeout_below_api_timeout() {
		let config_str = replace(
			SAMPLE_CONFIG,
			"captcha_sitekey = \"test-sitekey\"",
			"captcha_sitekey = \"test-sitekey\"\ntimeout_seconds = 30",
		);
		let err = Config::from_str(&config_str).unwrap_err();
		assert!(err.to_string().contains("must be lower than API timeout_seconds"));

		let config_str = replace(&config_str, "port = 3000", "port = 3000\ntimeout_seconds = 31");
		assert!(Config::from_str(&config_str).is_ok());
	}

	#[test]
	fn test_countdown_only_needs_no_registration() {
		let start = SAMPLE_CONFIG.find("[registration]").unwrap();
		let countdown_only = format!("{}[api]\nenabled = false\n", &SAMPLE_CONFIG[..start]);

		let config = Config::from_str(&countdown_only).unwrap();
		assert!(config.registration.is_none());
		assert!(config.enabled_api().is_none());

		// An unused registration section is not validated either
		let config = Config::from_str(&format!(
			"{}[registration]\ncaptcha_sitekey = \"\"\n",
			countdown_only
		))
		.unwrap();
		assert!(config.registration.is_some());

		let api_without_registration =
			format!("{}[api]\nenabled = true\n", &SAMPLE_CONFIG[..start]);
		let err = Config::from_str(&api_without_registration).unwrap_err();
		assert!(err.to_string().contains("[registration] section is required"));
	}

	#[test]
	fn test_parse_error_is_short() {
		let err = Config::from_str("[presale\nid = 1").unwrap_err();
		assert!(matches!(err, ConfigError::Parse(_)));
	}
}
