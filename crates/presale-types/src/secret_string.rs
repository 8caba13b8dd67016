//! Redacting string wrapper for sensitive values.
//!
//! CAPTCHA response tokens are bearer credentials for the registration
//! backend. `SecretString` keeps them out of logs and debug output and zeroes
//! the memory when dropped.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::Zeroizing;

const REDACTED: &str = "***REDACTED***";

/// A string that never shows its contents through `Debug`, `Display` or
/// `Serialize`.
#[derive(Clone, Default)]
pub struct SecretString(Zeroizing<String>);

impl SecretString {
	pub fn new(s: String) -> Self {
		Self(Zeroizing::new(s))
	}

	/// Exposes the secret to a closure.
	///
	/// Wire encoders use this to write the real value; nothing else should.
	pub fn with_exposed<F, R>(&self, f: F) -> R
	where
		F: FnOnce(&str) -> R,
	{
		f(&self.0)
	}

	/// Returns true if no secret was provided.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl fmt::Debug for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "SecretString({})", REDACTED)
	}
}

impl fmt::Display for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl From<String> for SecretString {
	fn from(s: String) -> Self {
		Self::new(s)
	}
}

impl From<&str> for SecretString {
	fn from(s: &str) -> Self {
		Self::new(s.to_string())
	}
}

impl PartialEq for SecretString {
	fn eq(&self, other: &Self) -> bool {
		self.0.as_str() == other.0.as_str()
	}
}

impl Eq for SecretString {}

// Serializing always redacts; wire formats opt in through `with_exposed`.
impl Serialize for SecretString {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(REDACTED)
	}
}

impl<'de> Deserialize<'de> for SecretString {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		String::deserialize(deserializer).map(SecretString::new)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_token_never_printed() {
		let token = SecretString::from("03AGdBq25-token");
		assert_eq!(format!("{:?}", token), "SecretString(***REDACTED***)");
		assert_eq!(token.to_string(), "***REDACTED***");
		assert_eq!(
			serde_json::to_string(&token).unwrap(),
			"\"***REDACTED***\""
		);
	}

	#[test]
	fn test_with_exposed_and_empty() {
		let token = SecretString::from("abc");
		assert_eq!(token.with_exposed(|s| s.len()), 3);
		assert!(!token.is_empty());
		assert!(SecretString::default().is_empty());
	}

	#[test]
	fn test_deserialize_keeps_value() {
		let token: SecretString = serde_json::from_str("\"tok\"").unwrap();
		assert_eq!(token, SecretString::from("tok"));
	}
}
