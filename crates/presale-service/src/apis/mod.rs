//! Request handlers of the presale API.

pub mod countdown;
pub mod health;
pub mod register;
