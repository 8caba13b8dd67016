//! Utility functions shared by the presale crates.

pub mod conversion;
pub mod formatting;

pub use conversion::{parse_hex_quantity, HexQuantityError};
pub use formatting::{mask_email, with_0x_prefix, without_0x_prefix};
