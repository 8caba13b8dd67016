//! Registration API.
//!
//! Every request runs its own [`RegistrationFlow`]. The CAPTCHA is solved in
//! the browser, so a non-empty token in the form stands in for the widget's
//! solved callback, and a reset requested by the flow is reported back to
//! the page in the response.

use crate::server::AppState;
use axum::{extract::State, http::StatusCode, Json};
use presale_registration::{
	CaptchaOptions, CaptchaWidget, FlowSettings, RegistrationApiInterface, RegistrationError,
	RegistrationFlow, RegistrationView,
};
use presale_types::{EventBus, RegistrationForm, RegistrationOutcome};
use serde::Serialize;
use std::sync::Arc;

/// Body of a POST /api/register response.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
	#[serde(flatten)]
	pub outcome: RegistrationOutcome,
	/// Set when the page must reset its CAPTCHA widget.
	#[serde(skip_serializing_if = "std::ops::Not::not")]
	pub reset_captcha: bool,
}

/// Widget stand-in that remembers whether a reset was requested.
#[derive(Debug, Default)]
pub struct SubmittedCaptcha {
	reset_requested: bool,
}

impl SubmittedCaptcha {
	pub fn reset_requested(&self) -> bool {
		self.reset_requested
	}
}

impl CaptchaWidget for SubmittedCaptcha {
	fn render(&mut self, container_id: &str, options: &CaptchaOptions) {
		tracing::trace!(container_id, sitekey = %options.sitekey, "CAPTCHA rendered by the page");
	}

	fn reset(&mut self) {
		self.reset_requested = true;
	}
}

/// Page actions have no page to act on here; they are traced instead.
#[derive(Debug, Default)]
pub struct TracingView;

impl RegistrationView for TracingView {
	fn show_error(&mut self, message: &str) {
		tracing::debug!(error = message, "Registration error shown");
	}

	fn clear_error(&mut self) {}

	fn set_submit_enabled(&mut self, enabled: bool) {
		tracing::trace!(enabled, "Submit control toggled");
	}

	fn redirect(&mut self, location: &str) {
		tracing::debug!(location, "Registration redirect");
	}
}

/// Runs registration sessions against one backend.
pub struct RegistrationService {
	api: Arc<dyn RegistrationApiInterface>,
	settings: FlowSettings,
	event_bus: EventBus,
}

impl RegistrationService {
	pub fn new(
		api: Arc<dyn RegistrationApiInterface>,
		settings: FlowSettings,
		event_bus: EventBus,
	) -> Self {
		Self {
			api,
			settings,
			event_bus,
		}
	}

	/// Runs one submission and maps its result to an HTTP status.
	///
	/// - 200 with `redirect` on success
	/// - 400 when no solved CAPTCHA came with the form
	/// - 422 when the form itself is invalid
	/// - the backend's status for a 4xx rejection, 502 for anything else
	pub async fn register(&self, form: RegistrationForm) -> (StatusCode, RegisterResponse) {
		let mut flow = RegistrationFlow::new(
			Arc::clone(&self.api),
			SubmittedCaptcha::default(),
			TracingView,
			self.settings.clone(),
			self.event_bus.clone(),
		);
		flow.render_captcha();
		if !form.captcha_token.is_empty() {
			flow.on_captcha_solved();
		}

		let outcome = match flow.submit(&form).await {
			Ok(outcome) => outcome,
			Err(e) => {
				return (
					StatusCode::BAD_REQUEST,
					RegisterResponse {
						outcome: RegistrationOutcome::Failed {
							message: e.to_string(),
						},
						reset_captcha: false,
					},
				);
			},
		};

		let status = match (&outcome, flow.last_failure()) {
			(RegistrationOutcome::Redirect { .. }, _) => StatusCode::OK,
			(RegistrationOutcome::Failed { .. }, None) => StatusCode::UNPROCESSABLE_ENTITY,
			(_, Some(RegistrationError::Rejected { status, .. })) if (400..500).contains(status) => {
				StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
			},
			(_, Some(_)) => StatusCode::BAD_GATEWAY,
		};

		(
			status,
			RegisterResponse {
				outcome,
				reset_captcha: flow.captcha().reset_requested(),
			},
		)
	}
}

/// Handles POST /api/register requests.
pub async fn handle_register(
	State(state): State<AppState>,
	Json(form): Json<RegistrationForm>,
) -> (StatusCode, Json<RegisterResponse>) {
	let (status, response) = state.registration.register(form).await;
	(status, Json(response))
}
