//! Message body encryption for `SecureChat`.
//!
//! Defines the [`MessageCipher`] trait used by the sync loop to encrypt
//! outgoing bodies and decrypt fetched ones. The only implementation is
//! [`fernet::FernetCipher`], which produces tokens the `SecureChat` server
//! can read with the same password.
//!
//! This is a client-side obfuscation pass keyed by a shared session
//! password. It does not authenticate participants and gives no forward
//! secrecy.

pub mod fernet;

/// Errors that can occur during cryptographic operations.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// The supplied key is not usable (wrong length or encoding).
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// The token is not valid base64 or has an impossible layout.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// The token's MAC does not match (wrong key or tampered data).
    #[error("token authentication failed")]
    AuthenticationFailed,

    /// Encryption failed.
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    /// Decryption failed after authentication (bad padding or non-UTF-8).
    #[error("decryption failed: {0}")]
    DecryptionFailed(String),
}

/// Trait for encrypting and decrypting chat message bodies.
///
/// Bodies travel as text, so both directions work on `str`: `encrypt`
/// returns a printable token and `decrypt` takes one.
pub trait MessageCipher: Send + Sync {
    /// Encrypt a plaintext body into a printable token.
    fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError>;

    /// Recover the plaintext from a token.
    ///
    /// Returns an error if the token is corrupted, tampered with, or was
    /// produced under a different key.
    fn decrypt(&self, token: &str) -> Result<String, CryptoError>;
}
