//! String formatting helpers for hex values and log output.

/// Adds a "0x" prefix to a hex string if it doesn't already have one.
pub fn with_0x_prefix(hex_str: &str) -> String {
	if hex_str.to_lowercase().starts_with("0x") {
		hex_str.to_string()
	} else {
		format!("0x{}", hex_str)
	}
}

/// Removes a "0x" or "0X" prefix from a hex string if present.
pub fn without_0x_prefix(hex_str: &str) -> &str {
	hex_str
		.strip_prefix("0x")
		.or_else(|| hex_str.strip_prefix("0X"))
		.unwrap_or(hex_str)
}

/// Masks the local part of an email address for logging.
///
/// Keeps the first character and the domain: `alice@example.com` becomes
/// `a***@example.com`. Strings without an `@` are masked entirely.
pub fn mask_email(email: &str) -> String {
	match email.split_once('@') {
		Some((local, domain)) => {
			let first = local.chars().next().map(String::from).unwrap_or_default();
			format!("{}***@{}", first, domain)
		},
		None => "***".to_string(),
	}
}
