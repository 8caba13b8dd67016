//! Conversions for JSON-RPC quantities.

use super::formatting::without_0x_prefix;
use thiserror::Error;

/// Errors produced when decoding a hex-encoded quantity.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HexQuantityError {
	#[error("Empty hex quantity")]
	Empty,
	#[error("Invalid hex quantity '{0}'")]
	Invalid(String),
}

/// Parses a JSON-RPC hex quantity such as `"0x51b9e0"` into a `u64`.
///
/// The `0x` prefix is optional. Leading zeros are accepted even though the
/// JSON-RPC encoding rules forbid them, since some nodes emit them anyway.
pub fn parse_hex_quantity(quantity: &str) -> Result<u64, HexQuantityError> {
	let digits = without_0x_prefix(quantity.trim());
	if digits.is_empty() {
		return Err(HexQuantityError::Empty);
	}
	u64::from_str_radix(digits, 16).map_err(|_| HexQuantityError::Invalid(quantity.to_string()))
}
