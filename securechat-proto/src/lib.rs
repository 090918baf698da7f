//! Shared wire definitions for the `SecureChat` HTTP API.

pub mod codec;
pub mod message;
pub mod switch;
