//! Schema validation for implementation configuration tables.
//!
//! Pluggable implementations (block sources, for example) receive their
//! settings as raw TOML tables. Each one declares a [`Schema`] describing the
//! fields it expects so that bad configuration is rejected before anything is
//! constructed.

use thiserror::Error;

/// Errors that can occur during configuration validation.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
	#[error("Missing required field: {0}")]
	MissingField(String),
	#[error("Invalid value for field '{field}': {message}")]
	InvalidValue { field: String, message: String },
	#[error("Type mismatch for field '{field}': expected {expected}, got {actual}")]
	TypeMismatch {
		field: String,
		expected: String,
		actual: String,
	},
}

/// Type of a configuration field.
#[derive(Debug)]
pub enum FieldType {
	/// An integer with optional inclusive bounds.
	Integer { min: Option<i64>, max: Option<i64> },
	/// An absolute `http://` or `https://` URL.
	Url,
}

/// A named field in a [`Schema`].
#[derive(Debug)]
pub struct Field {
	pub name: String,
	pub field_type: FieldType,
}

impl Field {
	pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
		Self {
			name: name.into(),
			field_type,
		}
	}
}

/// Required and optional fields of a configuration table.
#[derive(Debug)]
pub struct Schema {
	pub required: Vec<Field>,
	pub optional: Vec<Field>,
}

impl Schema {
	pub fn new(required: Vec<Field>, optional: Vec<Field>) -> Self {
		Self { required, optional }
	}

	/// Validates a TOML table against this schema.
	///
	/// Required fields must be present; optional fields are checked only when
	/// present. Unknown fields are ignored.
	pub fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let table = config
			.as_table()
			.ok_or_else(|| ValidationError::TypeMismatch {
				field: "root".to_string(),
				expected: "table".to_string(),
				actual: config.type_str().to_string(),
			})?;

		for field in &self.required {
			let value = table
				.get(&field.name)
				.ok_or_else(|| ValidationError::MissingField(field.name.clone()))?;
			validate_field_type(&field.name, value, &field.field_type)?;
		}

		for field in &self.optional {
			if let Some(value) = table.get(&field.name) {
				validate_field_type(&field.name, value, &field.field_type)?;
			}
		}

		Ok(())
	}
}

fn mismatch(field_name: &str, expected: &str, value: &toml::Value) -> ValidationError {
	ValidationError::TypeMismatch {
		field: field_name.to_string(),
		expected: expected.to_string(),
		actual: value.type_str().to_string(),
	}
}

fn invalid(field_name: &str, message: String) -> ValidationError {
	ValidationError::InvalidValue {
		field: field_name.to_string(),
		message,
	}
}

fn validate_field_type(
	field_name: &str,
	value: &toml::Value,
	expected_type: &FieldType,
) -> Result<(), ValidationError> {
	match expected_type {
		FieldType::Integer { min, max } => {
			let int_val = value
				.as_integer()
				.ok_or_else(|| mismatch(field_name, "integer", value))?;
			if let Some(min_val) = min {
				if int_val < *min_val {
					return Err(invalid(
						field_name,
						format!("Value {} is less than minimum {}", int_val, min_val),
					));
				}
			}
			if let Some(max_val) = max {
				if int_val > *max_val {
					return Err(invalid(
						field_name,
						format!("Value {} is greater than maximum {}", int_val, max_val),
					));
				}
			}
		},
		FieldType::Url => {
			let url = value
				.as_str()
				.ok_or_else(|| mismatch(field_name, "string", value))?;
			if !(url.starts_with("http://") || url.starts_with("https://")) {
				return Err(invalid(
					field_name,
					format!("'{}' is not an http(s) URL", url),
				));
			}
		},
	}

	Ok(())
}

/// A configuration schema that can validate TOML values.
pub trait ConfigSchema: Send + Sync {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError>;
}

#[cfg(test)]
mod tests {
	use super::*;

	fn table(src: &str) -> toml::Value {
		toml::from_str(src).unwrap()
	}

	fn rpc_schema() -> Schema {
		Schema::new(
			vec![Field::new("rpc_url", FieldType::Url)],
			vec![
				Field::new(
					"timeout_seconds",
					FieldType::Integer {
						min: Some(1),
						max: Some(300),
					},
				),
			],
		)
	}

	#[test]
	fn test_valid_table_passes() {
		let config = table("rpc_url = \"https://node.example\"\ntimeout_seconds = 10");
		assert!(rpc_schema().validate(&config).is_ok());
	}

	#[test]
	fn test_missing_required_field() {
		let config = table("timeout_seconds = 10");
		assert_eq!(
			rpc_schema().validate(&config),
			Err(ValidationError::MissingField("rpc_url".into()))
		);
	}

	#[test]
	fn test_url_and_bounds_checked() {
		let err = rpc_schema()
			.validate(&table("rpc_url = \"node.example\""))
			.unwrap_err();
		assert!(err.to_string().contains("not an http(s) URL"));

		let err = rpc_schema()
			.validate(&table("rpc_url = \"http://a\"\ntimeout_seconds = 0"))
			.unwrap_err();
		assert!(err.to_string().contains("less than minimum"));

		let err = rpc_schema()
			.validate(&table("rpc_url = \"http://a\"\ntimeout_seconds = 301"))
			.unwrap_err();
		assert!(err.to_string().contains("greater than maximum"));
	}

	#[test]
	fn test_type_mismatch() {
		assert!(matches!(
			rpc_schema().validate(&table("rpc_url = 3")),
			Err(ValidationError::TypeMismatch { .. })
		));
		assert!(matches!(
			rpc_schema().validate(&table("rpc_url = \"http://a\"\ntimeout_seconds = \"10\"")),
			Err(ValidationError::TypeMismatch { .. })
		));
		assert!(matches!(
			rpc_schema().validate(&toml::Value::String("x".into())),
			Err(ValidationError::TypeMismatch { .. })
		));
	}
}
