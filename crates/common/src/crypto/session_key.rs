//! Leaf encryption using AES-256-CBC
//!
//! A `SessionKey` is generated once per codec and encrypts every leaf of every
//! payload that codec handles. Each call draws a fresh IV, so equal plaintexts
//! never produce equal ciphertexts.

use std::fmt;
use std::ops::Deref;

use aes::Aes256;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::rngs::OsRng;
use rand::RngCore;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Size of the AES-256 session key in bytes
pub const SESSION_KEY_SIZE: usize = 32;
/// Size of the AES-CBC initialization vector in bytes
pub const IV_SIZE: usize = 16;

/// Errors that can occur while decrypting a single leaf
#[derive(Debug, thiserror::Error)]
pub enum DecryptionError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("ciphertext too short: {len} bytes, expected at least {IV_SIZE} bytes of IV")]
    Truncated { len: usize },
    #[error("cipher rejected ciphertext (bad length or padding)")]
    Cipher,
    #[error("plaintext is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// A 256-bit symmetric key shared with the counterparty for one session
///
/// The encrypted format is: `iv (16 bytes) || aes-256-cbc(plaintext)` with
/// PKCS#7 padding, so ciphertext length is always `IV_SIZE` plus a non-zero
/// multiple of the block size.
///
/// # Examples
///
/// ```ignore
/// let key = SessionKey::generate();
/// let ciphertext = key.encrypt(b"DDB2023");
/// assert_eq!(key.decrypt(&ciphertext)?, b"DDB2023");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct SessionKey([u8; SESSION_KEY_SIZE]);

// Key bytes stay out of logs.
impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionKey(..)")
    }
}

impl Deref for SessionKey {
    type Target = [u8; SESSION_KEY_SIZE];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<[u8; SESSION_KEY_SIZE]> for SessionKey {
    fn from(bytes: [u8; SESSION_KEY_SIZE]) -> Self {
        SessionKey(bytes)
    }
}

impl SessionKey {
    /// Generate a new random session key from the OS CSPRNG
    pub fn generate() -> Self {
        let mut buff = [0; SESSION_KEY_SIZE];
        OsRng.fill_bytes(&mut buff);
        Self(buff)
    }

    /// Create a session key from a byte slice
    ///
    /// Returns `None` if the slice is not exactly `SESSION_KEY_SIZE` bytes.
    pub fn from_slice(data: &[u8]) -> Option<Self> {
        let buff: [u8; SESSION_KEY_SIZE] = data.try_into().ok()?;
        Some(buff.into())
    }

    /// Get a reference to the key bytes
    pub fn bytes(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Encrypt data under a freshly generated IV
    ///
    /// Returns `iv || ciphertext`.
    pub fn encrypt(&self, data: &[u8]) -> Vec<u8> {
        let mut iv = [0u8; IV_SIZE];
        OsRng.fill_bytes(&mut iv);

        let ciphertext =
            Aes256CbcEnc::new((&self.0).into(), (&iv).into()).encrypt_padded_vec_mut::<Pkcs7>(data);

        let mut out = Vec::with_capacity(IV_SIZE + ciphertext.len());
        out.extend_from_slice(&iv);
        out.extend_from_slice(&ciphertext);
        out
    }

    /// Decrypt data in the format produced by [`SessionKey::encrypt`]
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Data is shorter than the IV
    /// - The remaining ciphertext is not a whole number of blocks
    /// - PKCS#7 padding validation fails (wrong key or tampered data)
    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, DecryptionError> {
        if data.len() < IV_SIZE {
            return Err(DecryptionError::Truncated { len: data.len() });
        }

        let (iv, ciphertext) = data.split_at(IV_SIZE);
        Aes256CbcDec::new_from_slices(self.bytes(), iv)
            .map_err(|_| DecryptionError::Cipher)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| DecryptionError::Cipher)
    }
}
