//! Fernet-compatible message cipher.
//!
//! Tokens follow the Fernet layout used by the `SecureChat` server:
//!
//! ```text
//! 0x80 | timestamp (u64 BE) | IV (16) | AES-128-CBC ciphertext | HMAC-SHA256 (32)
//! ```
//!
//! encoded as URL-safe base64 with padding. The 32-byte key is split into a
//! 16-byte signing half and a 16-byte encryption half. Password keys are
//! stretched with PBKDF2-HMAC-SHA256 over an empty salt, matching the
//! server's derivation so both sides agree on the key for a given password.

use aes::Aes128;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroize;

use super::{CryptoError, MessageCipher};

type HmacSha256 = Hmac<Sha256>;

/// PBKDF2 iteration count used by the `SecureChat` server.
pub const DEFAULT_KDF_ITERATIONS: u32 = 100_000;

const VERSION: u8 = 0x80;
const KEY_LEN: usize = 32;
const HALF_KEY_LEN: usize = KEY_LEN / 2;
const BLOCK_LEN: usize = 16;
const TIMESTAMP_LEN: usize = 8;
const HEADER_LEN: usize = 1 + TIMESTAMP_LEN + BLOCK_LEN;
const TAG_LEN: usize = 32;

/// Symmetric cipher producing and consuming Fernet tokens.
pub struct FernetCipher {
    signing_key: [u8; HALF_KEY_LEN],
    encryption_key: [u8; HALF_KEY_LEN],
}

impl FernetCipher {
    /// Derive a cipher from a password.
    ///
    /// Runs PBKDF2-HMAC-SHA256 with an empty salt for `iterations` rounds.
    /// Slow at the default count; derive once per session, not per message.
    #[must_use]
    pub fn from_password(password: &str, iterations: u32) -> Self {
        let mut derived = [0u8; KEY_LEN];
        pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), b"", iterations.max(1), &mut derived);
        let cipher = Self::from_key_bytes(&derived);
        derived.zeroize();
        cipher
    }

    /// Build a cipher from raw key bytes.
    #[must_use]
    pub fn from_key_bytes(key: &[u8; KEY_LEN]) -> Self {
        let mut signing_key = [0u8; HALF_KEY_LEN];
        let mut encryption_key = [0u8; HALF_KEY_LEN];
        signing_key.copy_from_slice(&key[..HALF_KEY_LEN]);
        encryption_key.copy_from_slice(&key[HALF_KEY_LEN..]);
        Self {
            signing_key,
            encryption_key,
        }
    }

    /// Build a cipher from a standard Fernet key (URL-safe base64 of 32 bytes).
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKey`] if the text is not base64 or does
    /// not decode to exactly 32 bytes.
    pub fn from_base64_key(key: &str) -> Result<Self, CryptoError> {
        let mut raw = URL_SAFE
            .decode(key.trim())
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        let result = <[u8; KEY_LEN]>::try_from(raw.as_slice())
            .map(|bytes| Self::from_key_bytes(&bytes))
            .map_err(|_| {
                CryptoError::InvalidKey(format!("expected {KEY_LEN} bytes, got {}", raw.len()))
            });
        raw.zeroize();
        result
    }

    /// Encrypt with an explicit timestamp and IV.
    ///
    /// [`MessageCipher::encrypt`] supplies the current time and a random IV.
    pub(crate) fn encrypt_with(
        &self,
        plaintext: &[u8],
        timestamp: u64,
        iv: [u8; BLOCK_LEN],
    ) -> Result<String, CryptoError> {
        // Plaintext plus room for a full block of PKCS#7 padding.
        let mut buf = vec![0u8; plaintext.len() + BLOCK_LEN];
        buf[..plaintext.len()].copy_from_slice(plaintext);

        let ciphertext_len = cbc::Encryptor::<Aes128>::new_from_slices(&self.encryption_key, &iv)
            .map_err(|_| CryptoError::EncryptionFailed("invalid key or IV length".into()))?
            .encrypt_padded_mut::<Pkcs7>(&mut buf, plaintext.len())
            .map_err(|_| CryptoError::EncryptionFailed("padding buffer too small".into()))?
            .len();

        let mut token = Vec::with_capacity(HEADER_LEN + ciphertext_len + TAG_LEN);
        token.push(VERSION);
        token.extend_from_slice(&timestamp.to_be_bytes());
        token.extend_from_slice(&iv);
        token.extend_from_slice(&buf[..ciphertext_len]);

        let mut mac = self.mac()?;
        mac.update(&token);
        token.extend_from_slice(&mac.finalize().into_bytes());

        Ok(URL_SAFE.encode(token))
    }

    fn mac(&self) -> Result<HmacSha256, CryptoError> {
        <HmacSha256 as Mac>::new_from_slice(&self.signing_key)
            .map_err(|_| CryptoError::InvalidKey("signing key rejected by HMAC".into()))
    }
}

impl MessageCipher for FernetCipher {
    fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        let now = u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0);
        self.encrypt_with(plaintext.as_bytes(), now, rand::random())
    }

    fn decrypt(&self, token: &str) -> Result<String, CryptoError> {
        let raw = URL_SAFE
            .decode(token.trim())
            .map_err(|e| CryptoError::MalformedToken(e.to_string()))?;

        if raw.len() < HEADER_LEN + BLOCK_LEN + TAG_LEN {
            return Err(CryptoError::MalformedToken(format!(
                "token too short: {} bytes",
                raw.len()
            )));
        }
        if raw[0] != VERSION {
            return Err(CryptoError::MalformedToken(format!(
                "unknown version byte {:#04x}",
                raw[0]
            )));
        }

        let (signed, tag) = raw.split_at(raw.len() - TAG_LEN);
        if (signed.len() - HEADER_LEN) % BLOCK_LEN != 0 {
            return Err(CryptoError::MalformedToken(
                "ciphertext is not block aligned".into(),
            ));
        }

        // Authenticate before touching the ciphertext.
        let mut mac = self.mac()?;
        mac.update(signed);
        mac.verify_slice(tag)
            .map_err(|_| CryptoError::AuthenticationFailed)?;

        let iv = &signed[1 + TIMESTAMP_LEN..HEADER_LEN];
        let mut buf = signed[HEADER_LEN..].to_vec();
        let plaintext = cbc::Decryptor::<Aes128>::new_from_slices(&self.encryption_key, iv)
            .map_err(|_| CryptoError::DecryptionFailed("invalid key or IV length".into()))?
            .decrypt_padded_mut::<Pkcs7>(&mut buf)
            .map_err(|_| CryptoError::DecryptionFailed("invalid padding".into()))?;

        String::from_utf8(plaintext.to_vec()).map_err(|e| CryptoError::DecryptionFailed(e.to_string()))
    }
}

impl Drop for FernetCipher {
    fn drop(&mut self) {
        self.signing_key.zeroize();
        self.encryption_key.zeroize();
    }
}

impl std::fmt::Debug for FernetCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FernetCipher").finish_non_exhaustive()
    }
}
