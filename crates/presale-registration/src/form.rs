//! Form checks and request building.

use presale_types::{RegistrationForm, RegistrationRequest, SecretString};
use thiserror::Error;

/// Value the legal checkbox submits when ticked.
const CHECKBOX_ON: &str = "on";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
	#[error("Email and confirmation do not match")]
	EmailMismatch,
}

/// Checks the form before anything is sent.
///
/// The email and its confirmation must match exactly, case included.
pub fn validate(form: &RegistrationForm) -> Result<(), FormError> {
	if form.email != form.email_confirm {
		return Err(FormError::EmailMismatch);
	}
	Ok(())
}

/// Builds the backend request from a validated form.
///
/// The contribution keeps the leading integer of the field (`"150 ETH"` is
/// 150) and falls back to 0 when there is none. The legal flag is true only
/// when the checkbox reported `"on"`.
pub fn build_request(form: &RegistrationForm) -> RegistrationRequest {
	RegistrationRequest {
		email: form.email.clone(),
		telegram_handle: form.telegram.clone(),
		contribution_amount: parse_contribution(&form.contrib),
		wallet_address: form.wallet.clone(),
		country: form.country.clone(),
		legal_accepted: form.legal.as_deref() == Some(CHECKBOX_ON),
		captcha_token: SecretString::from(form.captcha_token.as_str()),
	}
}

/// Leading optionally-signed decimal integer of `raw`, or 0.
fn parse_contribution(raw: &str) -> i64 {
	let trimmed = raw.trim_start();
	let (sign, digits) = match trimmed.as_bytes().first() {
		Some(b'-') => ("-", &trimmed[1..]),
		Some(b'+') => ("", &trimmed[1..]),
		_ => ("", trimmed),
	};
	let end = digits
		.find(|c: char| !c.is_ascii_digit())
		.unwrap_or(digits.len());
	if end == 0 {
		return 0;
	}
	format!("{}{}", sign, &digits[..end]).parse().unwrap_or(0)
}
