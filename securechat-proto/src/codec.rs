//! JSON encoding and decoding for `SecureChat` request and response bodies.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::message::{Message, SubmitAck};

/// Error type for codec encode/decode operations.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Encodes a request body as JSON bytes.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if the value cannot be serialized.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(value).map_err(|e| CodecError::Serialization(e.to_string()))
}

/// Decodes a JSON body into `T`.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if the bytes are not valid JSON for `T`.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    serde_json::from_slice(bytes).map_err(|e| CodecError::Serialization(e.to_string()))
}

/// Decodes a `GET /get_messages` response body.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if the body is not a JSON array of
/// messages.
pub fn decode_messages(bytes: &[u8]) -> Result<Vec<Message>, CodecError> {
    decode(bytes)
}

/// Decodes a `POST /submit_message` response body.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if the body is not a JSON object.
pub fn decode_ack(bytes: &[u8]) -> Result<SubmitAck, CodecError> {
    decode(bytes)
}
