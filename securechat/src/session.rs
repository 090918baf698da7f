//! Per-session client context.
//!
//! The [`SessionContext`] is built once at startup from configuration and
//! handed to the components that need it. Nothing mutates it afterwards.

use crate::crypto::fernet::FernetCipher;

/// Shown in place of the key when the session has none.
pub const NO_KEY_NOTICE: &str = "No encryption key found. This is a result of starting without a \
                                 session key. You must log in again to obtain one.";

/// Shown in place of the username when the session has none.
pub const NO_USERNAME_NOTICE: &str = "No username found.";

/// Interpret an encryption flag rendered by the server.
///
/// The server renders Python booleans, so only the exact string `"True"`
/// means enabled. Anything else, including `"true"`, is disabled.
#[must_use]
pub fn parse_encryption_flag(value: &str) -> bool {
    value == "True"
}

/// Username, key and encryption flag for one client session.
#[derive(Clone, Default)]
pub struct SessionContext {
    username: Option<String>,
    encryption_key: Option<String>,
    encryption_enabled: bool,
}

impl SessionContext {
    /// Create a session context.
    ///
    /// Empty strings are treated as absent values.
    #[must_use]
    pub fn new(
        username: Option<String>,
        encryption_key: Option<String>,
        encryption_enabled: bool,
    ) -> Self {
        Self {
            username: username.filter(|u| !u.is_empty()),
            encryption_key: encryption_key.filter(|k| !k.is_empty()),
            encryption_enabled,
        }
    }

    /// The session username, if any.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// The session encryption key, if any.
    #[must_use]
    pub fn encryption_key(&self) -> Option<&str> {
        self.encryption_key.as_deref()
    }

    /// Whether outgoing messages should be encrypted when a key is present.
    #[must_use]
    pub const fn encryption_enabled(&self) -> bool {
        self.encryption_enabled
    }

    /// Derive the message cipher for this session's key.
    ///
    /// Returns `None` when the session has no key. Key derivation is
    /// slow, so call this once and share the result.
    #[must_use]
    pub fn cipher(&self, kdf_iterations: u32) -> Option<FernetCipher> {
        self.encryption_key
            .as_deref()
            .map(|key| FernetCipher::from_password(key, kdf_iterations))
    }

    /// Text for the username display.
    #[must_use]
    pub fn username_display(&self) -> String {
        self.username().map_or_else(
            || NO_USERNAME_NOTICE.to_string(),
            |name| format!("Username: {name}"),
        )
    }

    /// Text for the encryption key display.
    #[must_use]
    pub fn key_display(&self) -> String {
        self.encryption_key().map_or_else(
            || NO_KEY_NOTICE.to_string(),
            |key| format!("Encryption Key: {key}"),
        )
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("username", &self.username)
            .field(
                "encryption_key",
                &self.encryption_key.as_ref().map(|_| "<redacted>"),
            )
            .field("encryption_enabled", &self.encryption_enabled)
            .finish()
    }
}
