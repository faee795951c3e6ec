//! Field-level encryption envelope
//!
//! Every leaf of a payload is encrypted individually under the session key;
//! every key stays in plaintext. Decryption is all-or-nothing: one bad leaf
//! fails the whole payload and the error names that leaf.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::crypto::{CounterpartyKey, DecryptionError, KeyWrapError, SessionKey};
use crate::payload::{Mapping, Payload};

/// A leaf that failed to decrypt, with its dotted path in the payload
#[derive(Debug, thiserror::Error)]
#[error("failed to decrypt field `{path}`: {source}")]
pub struct FieldDecryptionError {
    /// Dotted path of the failing leaf (`<root>` for a bare leaf payload)
    pub path: String,
    #[source]
    pub source: DecryptionError,
}

/// Session key material plus the counterparty key that wraps it
///
/// A codec is immutable once built. Sharing one across threads shares its
/// session key; use [`EnvelopeCodec::rekeyed`] for a fresh one.
#[derive(Debug, Clone)]
pub struct EnvelopeCodec {
    session_key: SessionKey,
    counterparty: Option<CounterpartyKey>,
}

impl EnvelopeCodec {
    /// New codec with a freshly generated session key
    pub fn new(counterparty: CounterpartyKey) -> Self {
        Self::from_session_key(SessionKey::generate(), Some(counterparty))
    }

    /// New codec that can encrypt and decrypt but has no key to wrap with
    pub fn without_counterparty() -> Self {
        Self::from_session_key(SessionKey::generate(), None)
    }

    /// Codec around an existing session key, e.g. one recovered from an
    /// envelope on the receiving side
    pub fn from_session_key(session_key: SessionKey, counterparty: Option<CounterpartyKey>) -> Self {
        Self {
            session_key,
            counterparty,
        }
    }

    /// Same counterparty, new session key
    pub fn rekeyed(&self) -> Self {
        Self::from_session_key(SessionKey::generate(), self.counterparty.clone())
    }

    pub fn session_key(&self) -> &SessionKey {
        &self.session_key
    }

    pub fn counterparty(&self) -> Option<&CounterpartyKey> {
        self.counterparty.as_ref()
    }

    /// Encrypt one leaf value: `base64(iv || ciphertext)`
    pub fn encrypt_leaf(&self, plaintext: &str) -> String {
        BASE64.encode(self.session_key.encrypt(plaintext.as_bytes()))
    }

    /// Decrypt one leaf value produced by [`EnvelopeCodec::encrypt_leaf`]
    pub fn decrypt_leaf(&self, encoded: &str) -> Result<String, DecryptionError> {
        let data = BASE64.decode(encoded.trim())?;
        let plaintext = self.session_key.decrypt(&data)?;
        Ok(String::from_utf8(plaintext)?)
    }

    /// Encrypt every leaf, keeping keys and nesting exactly as they are
    pub fn encrypt_payload(&self, tree: &Payload) -> Payload {
        match tree {
            Payload::Leaf(value) => Payload::Leaf(self.encrypt_leaf(value)),
            Payload::Mapping(mapping) => Payload::Mapping(
                mapping
                    .iter()
                    .map(|(key, child)| (key, self.encrypt_payload(child)))
                    .collect(),
            ),
            Payload::List(items) => {
                Payload::List(items.iter().map(|child| self.encrypt_payload(child)).collect())
            }
        }
    }

    /// Decrypt every leaf, failing on the first leaf that does not decrypt
    pub fn decrypt_payload(&self, tree: &Payload) -> Result<Payload, FieldDecryptionError> {
        let mut path = Vec::new();
        self.decrypt_node(tree, &mut path).inspect_err(|err| {
            tracing::debug!(path = %err.path, error = %err.source, "payload leaf failed to decrypt");
        })
    }

    fn decrypt_node(
        &self,
        node: &Payload,
        path: &mut Vec<String>,
    ) -> Result<Payload, FieldDecryptionError> {
        match node {
            Payload::Leaf(value) => self
                .decrypt_leaf(value)
                .map(Payload::Leaf)
                .map_err(|source| FieldDecryptionError {
                    path: if path.is_empty() {
                        "<root>".to_string()
                    } else {
                        path.join(".")
                    },
                    source,
                }),
            Payload::Mapping(mapping) => {
                let mut out = Mapping::new();
                for (key, child) in mapping.iter() {
                    path.push(key.to_string());
                    let decrypted = self.decrypt_node(child, path)?;
                    path.pop();
                    out.insert(key, decrypted);
                }
                Ok(Payload::Mapping(out))
            }
            Payload::List(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (index, child) in items.iter().enumerate() {
                    path.push(index.to_string());
                    out.push(self.decrypt_node(child, path)?);
                    path.pop();
                }
                Ok(Payload::List(out))
            }
        }
    }

    /// RSA-wrap the session key for the `X-Session-Key` header
    pub fn wrap_session_key(&self) -> Result<String, KeyWrapError> {
        self.counterparty
            .as_ref()
            .ok_or(KeyWrapError::MissingPublicKey)?
            .wrap(&self.session_key)
    }
}
