//! CAPTCHA widget seam.
//!
//! The widget itself lives on the page. The flow only needs to place it and
//! to reset it after a failed submission; solved and expired notifications
//! come back through [`RegistrationFlow::on_captcha_solved`] and
//! [`RegistrationFlow::on_captcha_expired`].
//!
//! [`RegistrationFlow::on_captcha_solved`]: crate::RegistrationFlow::on_captcha_solved
//! [`RegistrationFlow::on_captcha_expired`]: crate::RegistrationFlow::on_captcha_expired

use serde::{Deserialize, Serialize};

/// Options passed to the widget when it is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptchaOptions {
	pub sitekey: String,
}

#[cfg_attr(test, mockall::automock)]
pub trait CaptchaWidget: Send {
	/// Places the widget in the element with id `container_id`.
	fn render(&mut self, container_id: &str, options: &CaptchaOptions);

	/// Clears the solved challenge so a new one must be solved.
	fn reset(&mut self);
}
