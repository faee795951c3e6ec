//! Session key envelope using the counterparty's RSA public key
//!
//! The bank distributes its public key as a `.cer` file, which in practice is
//! either a PEM/DER X.509 certificate or a bare public key. All of those are
//! accepted here; only the RSA public key inside is kept.
//!
//! # Envelope format
//!
//! ```text
//! base64( rsa-pkcs1-v1.5-encrypt(session_key) )
//! ```
//!
//! The decoded envelope is always exactly the modulus size of the key.

use std::path::Path;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::rngs::OsRng;
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs8::DecodePublicKey;
use rsa::traits::PublicKeyParts;
use rsa::{Pkcs1v15Encrypt, RsaPublicKey};
use x509_cert::der::{Decode, Encode};
use x509_cert::Certificate;

use super::session_key::SessionKey;

const PEM_PREFIX: &[u8] = b"-----BEGIN";

/// Errors that can occur while loading the counterparty key or wrapping the
/// session key under it
#[derive(Debug, thiserror::Error)]
pub enum KeyWrapError {
    #[error("counterparty public key is not configured")]
    MissingPublicKey,
    #[error("failed to read counterparty public key {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed counterparty public key: {0}")]
    Malformed(String),
    #[error("RSA encryption failed: {0}")]
    Rsa(#[from] rsa::Error),
}

/// The counterparty's RSA public key
///
/// Used for one thing only: wrapping the session key so the counterparty can
/// recover it. The key is never used to verify anything.
///
/// # Examples
///
/// ```ignore
/// let key = CounterpartyKey::from_file("/etc/ssl/certs/sandbox_public.cer")?;
/// let envelope = key.wrap(&SessionKey::generate())?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterpartyKey(RsaPublicKey);

impl From<RsaPublicKey> for CounterpartyKey {
    fn from(key: RsaPublicKey) -> Self {
        CounterpartyKey(key)
    }
}

impl CounterpartyKey {
    /// Load a key from a file holding PEM or DER material
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, KeyWrapError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| KeyWrapError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_bytes(&bytes)
    }

    /// Parse PEM (detected by its `-----BEGIN` armor) or DER key material
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyWrapError> {
        if bytes.is_empty() {
            return Err(KeyWrapError::MissingPublicKey);
        }
        let start = bytes
            .iter()
            .position(|b| !b.is_ascii_whitespace())
            .unwrap_or(bytes.len());
        if bytes[start..].starts_with(PEM_PREFIX) {
            let text = std::str::from_utf8(bytes)
                .map_err(|_| KeyWrapError::Malformed("PEM is not valid UTF-8".to_string()))?;
            Self::from_pem(text)
        } else {
            Self::from_der(bytes)
        }
    }

    /// Parse a PEM block: `PUBLIC KEY`, `RSA PUBLIC KEY` or `CERTIFICATE`
    pub fn from_pem(text: &str) -> Result<Self, KeyWrapError> {
        let block = pem::parse(text).map_err(|e| KeyWrapError::Malformed(e.to_string()))?;
        match block.tag() {
            "PUBLIC KEY" => spki_der(block.contents()),
            "RSA PUBLIC KEY" => pkcs1_der(block.contents()),
            "CERTIFICATE" => certificate_der(block.contents()),
            other => Err(KeyWrapError::Malformed(format!(
                "unsupported PEM block `{}`",
                other
            ))),
        }
    }

    /// Parse DER: an X.509 certificate, an SPKI public key, or a PKCS#1 public key
    pub fn from_der(der: &[u8]) -> Result<Self, KeyWrapError> {
        certificate_der(der)
            .or_else(|_| spki_der(der))
            .or_else(|_| pkcs1_der(der))
            .map_err(|_| {
                KeyWrapError::Malformed(
                    "DER is neither a certificate nor an RSA public key".to_string(),
                )
            })
    }

    /// Size of the RSA modulus in bytes (and so of every envelope)
    pub fn modulus_size(&self) -> usize {
        self.0.size()
    }

    /// Encrypt the session key with PKCS#1 v1.5 padding and base64-encode it
    ///
    /// Padding is randomized, so two envelopes of the same key differ.
    pub fn wrap(&self, session_key: &SessionKey) -> Result<String, KeyWrapError> {
        let mut rng = OsRng;
        let encrypted = self
            .0
            .encrypt(&mut rng, Pkcs1v15Encrypt, session_key.bytes())?;
        Ok(BASE64.encode(encrypted))
    }
}

fn spki_der(der: &[u8]) -> Result<CounterpartyKey, KeyWrapError> {
    RsaPublicKey::from_public_key_der(der)
        .map(CounterpartyKey)
        .map_err(|e| KeyWrapError::Malformed(e.to_string()))
}

fn pkcs1_der(der: &[u8]) -> Result<CounterpartyKey, KeyWrapError> {
    RsaPublicKey::from_pkcs1_der(der)
        .map(CounterpartyKey)
        .map_err(|e| KeyWrapError::Malformed(e.to_string()))
}

fn certificate_der(der: &[u8]) -> Result<CounterpartyKey, KeyWrapError> {
    let certificate =
        Certificate::from_der(der).map_err(|e| KeyWrapError::Malformed(e.to_string()))?;
    let spki = certificate
        .tbs_certificate
        .subject_public_key_info
        .to_der()
        .map_err(|e| KeyWrapError::Malformed(e.to_string()))?;
    spki_der(&spki)
}
