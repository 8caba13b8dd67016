//! Registration types for the presale sign-up flow.
//!
//! A [`RegistrationForm`] holds raw field values exactly as the page submits
//! them. The registration component turns it into a [`RegistrationRequest`]
//! for the backend and reports a [`RegistrationOutcome`] back to the page.

use crate::SecretString;
use serde::{Deserialize, Serialize, Serializer};

/// Raw values of the presale registration form.
///
/// Every field is optional on the wire and defaults to an empty string, the
/// way an untouched text input submits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RegistrationForm {
	#[serde(default)]
	pub email: String,
	/// Confirmation copy of the email; must match `email` exactly.
	#[serde(default)]
	pub email_confirm: String,
	#[serde(default)]
	pub telegram: String,
	/// Intended contribution as typed by the user.
	#[serde(default)]
	pub contrib: String,
	#[serde(default)]
	pub wallet: String,
	#[serde(default)]
	pub country: String,
	/// Checkbox value; browsers send `"on"` when ticked and omit it otherwise.
	#[serde(default)]
	pub legal: Option<String>,
	/// Token issued by the CAPTCHA widget once solved.
	#[serde(default, alias = "g-recaptcha-response")]
	pub captcha_token: String,
}

/// Registration payload sent to the backend.
///
/// Field names on the wire follow the backend contract:
/// `{email, telegram, contrib, wallet, country, legalchecked, grecaptcha}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationRequest {
	pub email: String,
	#[serde(rename = "telegram")]
	pub telegram_handle: String,
	#[serde(rename = "contrib")]
	pub contribution_amount: i64,
	#[serde(rename = "wallet")]
	pub wallet_address: String,
	pub country: String,
	#[serde(rename = "legalchecked")]
	pub legal_accepted: bool,
	#[serde(rename = "grecaptcha", serialize_with = "serialize_exposed")]
	pub captcha_token: SecretString,
}

fn serialize_exposed<S>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	secret.with_exposed(|value| serializer.serialize_str(value))
}

/// Result of one registration attempt as presented to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RegistrationOutcome {
	/// The backend accepted the registration; the browser goes to `location`.
	Redirect {
		#[serde(rename = "redirect")]
		location: String,
	},
	/// The attempt failed; `message` is shown in the inline error area.
	Failed {
		#[serde(rename = "error")]
		message: String,
	},
}

impl RegistrationOutcome {
	/// Returns true for a successful registration.
	pub fn is_redirect(&self) -> bool {
		matches!(self, RegistrationOutcome::Redirect { .. })
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_request_wire_format_exposes_captcha() {
		let request = RegistrationRequest {
			email: "alice@example.com".to_string(),
			telegram_handle: "@alice".to_string(),
			contribution_amount: 150,
			wallet_address: "0xabc".to_string(),
			country: "PT".to_string(),
			legal_accepted: true,
			captcha_token: SecretString::from("captcha-123"),
		};

		let value = serde_json::to_value(&request).unwrap();
		assert_eq!(
			value,
			json!({
				"email": "alice@example.com",
				"telegram": "@alice",
				"contrib": 150,
				"wallet": "0xabc",
				"country": "PT",
				"legalchecked": true,
				"grecaptcha": "captcha-123",
			})
		);

		// Debug output keeps the token hidden
		assert!(!format!("{:?}", request).contains("captcha-123"));
	}

	#[test]
	fn test_form_accepts_recaptcha_field_name() {
		let form: RegistrationForm = serde_json::from_value(json!({
			"email": "a@b.c",
			"g-recaptcha-response": "tok",
		}))
		.unwrap();
		assert_eq!(form.captcha_token, "tok");
		assert_eq!(form.legal, None);
		assert_eq!(form.contrib, "");
	}

	#[test]
	fn test_outcome_json_shape() {
		let ok = RegistrationOutcome::Redirect {
			location: "/registered/".to_string(),
		};
		assert_eq!(
			serde_json::to_value(&ok).unwrap(),
			json!({"redirect": "/registered/"})
		);
		assert!(ok.is_redirect());

		let failed = RegistrationOutcome::Failed {
			message: "Something went wrong".to_string(),
		};
		assert_eq!(
			serde_json::to_value(&failed).unwrap(),
			json!({"error": "Something went wrong"})
		);
	}
}
