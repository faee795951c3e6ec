//! Cryptographic primitives for the CIB envelope
//!
//! The counterparty API encrypts every value of a request individually and
//! keeps every key in plaintext. Two primitives make that work:
//!
//! - **Session key**: a random AES-256 key held for the lifetime of a codec.
//!   Each leaf is encrypted with AES-256-CBC (PKCS#7 padding) under a fresh
//!   random IV, and the IV travels in front of the ciphertext.
//! - **Counterparty key**: the bank's RSA public key. The session key is
//!   encrypted under it with PKCS#1 v1.5 padding and sent with each request,
//!   so the bank can recover the session key and decrypt the leaves.
//!
//! # Leaf format
//!
//! ```text
//! base64( iv (16 bytes) || aes-256-cbc(plaintext) )
//! ```
//!
//! CBC carries no authentication tag. A modified leaf fails padding
//! validation most of the time, but may also decrypt to different text.
//! Callers must never treat a successful decrypt as proof of integrity.

mod counterparty_key;
mod session_key;

pub use counterparty_key::{CounterpartyKey, KeyWrapError};
pub use session_key::{DecryptionError, SessionKey, IV_SIZE, SESSION_KEY_SIZE};
