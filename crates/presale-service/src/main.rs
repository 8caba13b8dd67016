//! Main entry point for the presale site service.
//!
//! Polls the chain for the block-height countdown and, when the API is
//! enabled, serves the countdown snapshot and the registration endpoint
//! over HTTP.

use clap::Parser;
use presale_config::Config;
use presale_countdown::{
	create_block_source, CountdownDisplay, CountdownMonitor, CountdownSettings, SnapshotDisplay,
	TracingDisplay,
};
use presale_registration::{resolve_registration_host, FlowSettings, HttpRegistrationApi};
use presale_types::{CountdownEvent, EventBus, PresaleEvent, RegistrationEvent};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::{error::RecvError, Receiver};
use tokio::task::JoinHandle;

mod apis;
mod server;

use apis::register::RegistrationService;

/// Command-line arguments for the presale service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	tracing::info!("Started presale service");

	let config_path = args
		.config
		.to_str()
		.ok_or("Configuration path is not valid UTF-8")?;
	let config = Config::from_file(config_path).await?;
	tracing::info!("Loaded configuration [{}]", config.presale.id);

	let event_bus = EventBus::default();
	let event_logger = spawn_event_logger(event_bus.subscribe());
	let poll_interval = Duration::from_secs(config.countdown.poll_interval_seconds);

	match config.enabled_api().cloned() {
		Some(api_config) => {
			let display = SnapshotDisplay::new(config.countdown.sale_target_block);
			let monitor = build_countdown(&config, Arc::new(display.clone()), event_bus.clone())?;
			let registration = build_registration(&config, event_bus.clone()).await?;

			let state = server::AppState {
				countdown: display,
				registration: Arc::new(registration),
			};

			// The server keeps running after the countdown has finished
			let countdown = monitor.start(poll_interval);
			tokio::select! {
				result = server::start_server(api_config, state) => {
					tracing::info!("API server finished");
					result?;
				}
				_ = tokio::signal::ctrl_c() => {
					tracing::info!("Shutdown requested");
				}
			}
			countdown.cancel();
		},
		None => {
			tracing::info!("Starting countdown only");
			let monitor = build_countdown(&config, Arc::new(TracingDisplay), event_bus.clone())?;
			let countdown = monitor.start(poll_interval);
			let handle = countdown.handle();
			tokio::select! {
				result = countdown.join() => {
					let ticks = result?;
					tracing::info!(ticks, "Countdown finished");
				}
				_ = tokio::signal::ctrl_c() => {
					tracing::info!("Shutdown requested");
					handle.cancel();
				}
			}
		},
	}

	event_logger.abort();
	tracing::info!("Stopped presale service");
	Ok(())
}

/// Builds the countdown monitor around the configured primary block source.
fn build_countdown(
	config: &Config,
	display: Arc<dyn CountdownDisplay>,
	event_bus: EventBus,
) -> Result<Arc<CountdownMonitor>, Box<dyn std::error::Error>> {
	let countdown = &config.countdown;
	let implementation = countdown.primary_implementation().ok_or_else(|| {
		format!(
			"Primary countdown implementation '{}' is not configured",
			countdown.primary
		)
	})?;
	let source = create_block_source(&countdown.primary, implementation)?;
	tracing::info!(source = %countdown.primary, "Block source ready");

	let settings = CountdownSettings {
		schedule: countdown.schedule()?,
		started_message: countdown.started_message.clone(),
		date_format: countdown.date_format.clone(),
	};
	Ok(Arc::new(CountdownMonitor::new(
		Arc::from(source),
		display,
		settings,
		event_bus,
	)))
}

/// Resolves the registration host and builds the endpoint's backend.
async fn build_registration(
	config: &Config,
	event_bus: EventBus,
) -> Result<RegistrationService, Box<dyn std::error::Error>> {
	let registration = config
		.registration
		.as_ref()
		.ok_or("Registration settings are required to serve the API")?;
	let client = reqwest::Client::builder()
		.timeout(Duration::from_secs(registration.timeout_seconds))
		.build()?;

	let host = resolve_registration_host(
		&client,
		config.registration_host(),
		registration.config_url.as_deref(),
	)
	.await?;
	let api = HttpRegistrationApi::with_client(client, &host, &registration.register_path);
	tracing::info!("Registrations will be posted to {}", api.endpoint());

	let settings = FlowSettings {
		captcha_container: registration.captcha_container.clone(),
		captcha_sitekey: registration.captcha_sitekey.clone(),
		redirect_path: registration.redirect_path.clone(),
		fallback_error: registration.fallback_error.clone(),
		mismatch_error: registration.mismatch_error.clone(),
	};
	Ok(RegistrationService::new(Arc::new(api), settings, event_bus))
}

/// Logs every event published on the bus until the bus is dropped.
fn spawn_event_logger(mut events: Receiver<PresaleEvent>) -> JoinHandle<()> {
	tokio::spawn(async move {
		loop {
			match events.recv().await {
				Ok(event) => log_event(&event),
				Err(RecvError::Lagged(skipped)) => {
					tracing::warn!(skipped, "Event logger fell behind");
				},
				Err(RecvError::Closed) => break,
			}
		}
	})
}

fn log_event(event: &PresaleEvent) {
	match event {
		PresaleEvent::Countdown(CountdownEvent::HeightUpdated { block, target }) => {
			tracing::debug!(block, target, "Block height updated");
		},
		PresaleEvent::Countdown(CountdownEvent::FetchFailed { error }) => {
			tracing::debug!(%error, "Block height fetch failed");
		},
		PresaleEvent::Countdown(CountdownEvent::SaleStarted { block }) => {
			tracing::info!(block, "Presale started");
		},
		PresaleEvent::Registration(RegistrationEvent::Submitted { submission_id }) => {
			tracing::debug!(%submission_id, "Registration submitted");
		},
		PresaleEvent::Registration(RegistrationEvent::Accepted { submission_id }) => {
			tracing::info!(%submission_id, "Registration accepted");
		},
		PresaleEvent::Registration(RegistrationEvent::Rejected {
			submission_id,
			reason,
		}) => {
			tracing::info!(%submission_id, %reason, "Registration rejected");
		},
		PresaleEvent::Registration(RegistrationEvent::Invalid { reason }) => {
			tracing::debug!(%reason, "Registration form invalid");
		},
	}
}
