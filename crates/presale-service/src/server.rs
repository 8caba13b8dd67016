//! HTTP server for the presale API.

use crate::apis::{countdown::get_countdown, health::get_health, register::handle_register};
use crate::apis::register::RegistrationService;
use axum::{
	extract::DefaultBodyLimit,
	http::{header, HeaderValue, Method},
	routing::{get, post},
	Router,
};
use presale_config::ApiConfig;
use presale_countdown::SnapshotDisplay;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// Latest countdown values written by the monitor.
	pub countdown: SnapshotDisplay,
	pub registration: Arc<RegistrationService>,
}

/// Builds the router with its middleware stack.
pub fn build_router(state: AppState, api_config: &ApiConfig) -> Router {
	Router::new()
		.route("/health", get(get_health))
		.nest(
			"/api",
			Router::new()
				.route("/countdown", get(get_countdown))
				.route("/register", post(handle_register)),
		)
		.layer(
			ServiceBuilder::new()
				.layer(TraceLayer::new_for_http())
				.layer(cors_layer(api_config))
				.layer(TimeoutLayer::new(Duration::from_secs(
					api_config.timeout_seconds,
				)))
				.layer(DefaultBodyLimit::max(api_config.max_request_size)),
		)
		.with_state(state)
}

/// Permissive unless specific origins are configured.
fn cors_layer(api_config: &ApiConfig) -> CorsLayer {
	let Some(cors) = &api_config.cors else {
		return CorsLayer::permissive();
	};

	let origins: Vec<HeaderValue> = cors
		.allowed_origins
		.iter()
		.filter_map(|origin| match HeaderValue::from_str(origin) {
			Ok(value) => Some(value),
			Err(_) => {
				tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
				None
			},
		})
		.collect();

	CorsLayer::new()
		.allow_origin(origins)
		.allow_methods([Method::GET, Method::POST])
		.allow_headers([header::CONTENT_TYPE])
}

/// Binds the configured address and serves until the listener fails.
pub async fn start_server(
	api_config: ApiConfig,
	state: AppState,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = build_router(state, &api_config);

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Presale API server starting on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}
