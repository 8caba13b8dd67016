//! Common types for the presale site services.
//!
//! This crate defines the value types, events and validation helpers shared
//! by the countdown, registration, configuration and service crates.

/// Countdown value types: sale schedule and display snapshot.
pub mod countdown;
/// Broadcast channel carrying presale events between components.
pub mod event_bus;
/// Event types published by the countdown and registration components.
pub mod events;
/// Registration form, request and outcome types.
pub mod registration;
/// Self-registering implementation trait.
pub mod registry;
/// Redacting wrapper for sensitive strings such as CAPTCHA tokens.
pub mod secret_string;
/// Utility functions for hex quantities and log-safe formatting.
pub mod utils;
/// Configuration validation types for implementation tables.
pub mod validation;

pub use countdown::*;
pub use event_bus::EventBus;
pub use events::*;
pub use registration::*;
pub use registry::ImplementationRegistry;
pub use secret_string::SecretString;
pub use utils::{
	mask_email, parse_hex_quantity, with_0x_prefix, without_0x_prefix, HexQuantityError,
};
pub use validation::*;
