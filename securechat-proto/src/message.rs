//! Chat message types exchanged with the `SecureChat` server.
//!
//! Field names match the server's JSON exactly; they are part of the wire
//! contract and must not be renamed.

use serde::{Deserialize, Serialize};

/// Path of the endpoint returning the current message log.
pub const GET_MESSAGES_PATH: &str = "/get_messages";

/// Path of the endpoint accepting a new message.
pub const SUBMIT_MESSAGE_PATH: &str = "/submit_message";

/// A single chat entry as stored by the server.
///
/// Messages are immutable once fetched. Ordering is whatever the server
/// returns (chronological in practice).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Username of the author.
    pub user_id: String,
    /// Stored body: plaintext, or a cipher token when `encrypted` is set.
    pub message: String,
    /// Server-formatted timestamp, displayed verbatim.
    pub timestamp: String,
    /// Whether `message` holds ciphertext. Servers that predate
    /// client-side encryption omit the field.
    #[serde(default)]
    pub encrypted: bool,
}

impl Message {
    /// Create a plaintext message.
    #[must_use]
    pub fn plain(
        user_id: impl Into<String>,
        message: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            message: message.into(),
            timestamp: timestamp.into(),
            encrypted: false,
        }
    }

    /// Create a message whose body is a cipher token.
    #[must_use]
    pub fn encrypted(
        user_id: impl Into<String>,
        token: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            encrypted: true,
            ..Self::plain(user_id, token, timestamp)
        }
    }
}

/// Body of `POST /submit_message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitMessage {
    /// Sending user. `null` when the session has no username.
    pub user_id: Option<String>,
    /// The text to store, already encrypted if `message_encrypted` is set.
    pub message_content: String,
    /// Whether `message_content` is a cipher token.
    pub message_encrypted: bool,
}

/// Response of `POST /submit_message`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubmitAck {
    /// `true` when the server stored the message. Absent means failure.
    #[serde(default)]
    pub success: bool,
}
