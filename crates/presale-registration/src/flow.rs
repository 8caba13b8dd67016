//! Registration session.
//!
//! A [`RegistrationFlow`] ties the pieces of one registration page
//! together: it renders the CAPTCHA, tracks the submit gate, validates and
//! posts the form, and reports the outcome to the [`RegistrationView`].

use crate::captcha::{CaptchaOptions, CaptchaWidget};
use crate::form::{build_request, validate};
use crate::gate::{GateError, GateEvent, GateState, SubmitGate};
use crate::{RegistrationApiInterface, RegistrationError};
use presale_types::{
	mask_email, EventBus, PresaleEvent, RegistrationEvent, RegistrationForm, RegistrationOutcome,
};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// What the flow can do to the page.
pub trait RegistrationView: Send {
	fn show_error(&mut self, message: &str);
	fn clear_error(&mut self);
	fn set_submit_enabled(&mut self, enabled: bool);
	/// Navigates away after a successful registration.
	fn redirect(&mut self, location: &str);
}

/// Fixed texts and paths used by the flow.
#[derive(Debug, Clone)]
pub struct FlowSettings {
	pub captcha_container: String,
	pub captcha_sitekey: String,
	pub redirect_path: String,
	/// Shown when a failure carries no message of its own.
	pub fallback_error: String,
	pub mismatch_error: String,
}

impl Default for FlowSettings {
	fn default() -> Self {
		Self {
			captcha_container: "recaptcha".to_string(),
			captcha_sitekey: String::new(),
			redirect_path: "/registered/".to_string(),
			fallback_error: "Something went wrong".to_string(),
			mismatch_error: "Email addresses do not match.".to_string(),
		}
	}
}

/// One registration session.
pub struct RegistrationFlow<C, V> {
	api: Arc<dyn RegistrationApiInterface>,
	captcha: C,
	view: V,
	gate: SubmitGate,
	settings: FlowSettings,
	event_bus: EventBus,
	last_failure: Option<RegistrationError>,
}

impl<C: CaptchaWidget, V: RegistrationView> RegistrationFlow<C, V> {
	/// Creates the session with the submit control disabled.
	pub fn new(
		api: Arc<dyn RegistrationApiInterface>,
		captcha: C,
		mut view: V,
		settings: FlowSettings,
		event_bus: EventBus,
	) -> Self {
		view.set_submit_enabled(false);
		Self {
			api,
			captcha,
			view,
			gate: SubmitGate::new(),
			settings,
			event_bus,
			last_failure: None,
		}
	}

	/// Places the CAPTCHA widget in its container.
	pub fn render_captcha(&mut self) {
		let options = CaptchaOptions {
			sitekey: self.settings.captcha_sitekey.clone(),
		};
		self.captcha
			.render(&self.settings.captcha_container, &options);
	}

	pub fn on_captcha_solved(&mut self) {
		self.transition(GateEvent::CaptchaSolved);
	}

	pub fn on_captcha_expired(&mut self) {
		self.transition(GateEvent::CaptchaExpired);
	}

	pub fn gate_state(&self) -> GateState {
		self.gate.state()
	}

	pub fn view(&self) -> &V {
		&self.view
	}

	pub fn captcha(&self) -> &C {
		&self.captcha
	}

	/// Backend error of the latest submission, if it failed there.
	pub fn last_failure(&self) -> Option<&RegistrationError> {
		self.last_failure.as_ref()
	}

	/// Handles a form submission.
	///
	/// Rejected with [`GateError::Locked`], and without touching the page,
	/// while the gate is locked. Otherwise the outcome is also reflected in
	/// the view: a redirect on success, an inline error on failure.
	#[instrument(skip_all)]
	pub async fn submit(
		&mut self,
		form: &RegistrationForm,
	) -> Result<RegistrationOutcome, GateError> {
		self.gate.begin_submission()?;
		self.last_failure = None;
		self.view.set_submit_enabled(false);
		self.view.clear_error();

		if let Err(e) = validate(form) {
			tracing::debug!(error = %e, "Registration form rejected");
			let message = self.settings.mismatch_error.clone();
			self.view.show_error(&message);
			self.transition(GateEvent::ValidationFailed);
			self.publish(RegistrationEvent::Invalid {
				reason: e.to_string(),
			});
			return Ok(RegistrationOutcome::Failed { message });
		}

		let request = build_request(form);
		let submission_id = Uuid::new_v4().to_string();
		tracing::info!(
			submission_id = %submission_id,
			email = %mask_email(&request.email),
			"Submitting registration"
		);
		self.publish(RegistrationEvent::Submitted {
			submission_id: submission_id.clone(),
		});

		match self.api.register(&request).await {
			Ok(()) => {
				tracing::info!(submission_id = %submission_id, "Registration accepted");
				let location = self.settings.redirect_path.clone();
				self.view.redirect(&location);
				self.publish(RegistrationEvent::Accepted { submission_id });
				Ok(RegistrationOutcome::Redirect { location })
			},
			Err(e) => {
				tracing::warn!(submission_id = %submission_id, error = %e, "Registration failed");
				let message = e
					.server_message()
					.unwrap_or(self.settings.fallback_error.as_str())
					.to_string();
				self.captcha.reset();
				self.transition(GateEvent::SubmissionFailed);
				self.view.show_error(&message);
				self.publish(RegistrationEvent::Rejected {
					submission_id,
					reason: message.clone(),
				});
				self.last_failure = Some(e);
				Ok(RegistrationOutcome::Failed { message })
			},
		}
	}

	fn transition(&mut self, event: GateEvent) {
		let state = self.gate.apply(event);
		self.view.set_submit_enabled(state.is_unlocked());
	}

	fn publish(&self, event: RegistrationEvent) {
		self.event_bus.publish(PresaleEvent::Registration(event)).ok();
	}
}
