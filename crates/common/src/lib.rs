/**
 * Cryptographic types and operations.
 *  - Per-session AES-256-CBC key with per-leaf IVs
 *  - RSA envelope of the session key for the counterparty
 */
pub mod crypto;
/**
 * The field-by-field encryption envelope.
 * Walks a payload tree and swaps every leaf
 *  for its encrypted form (and back).
 */
pub mod codec;
/**
 * Random identifiers the counterparty expects
 *  callers to supply (e.g. `UNIQUE_ID`).
 */
pub mod ids;
/**
 * Nested key/value payloads shared by requests
 *  and responses.
 */
pub mod payload;
/**
 * Helper for setting build version information
 *  at compile time.
 */
pub mod version;

pub mod prelude {
    pub use crate::codec::{EnvelopeCodec, FieldDecryptionError};
    pub use crate::crypto::{CounterpartyKey, DecryptionError, KeyWrapError, SessionKey};
    pub use crate::ids::{unique_id, UNIQUE_ID_LEN};
    pub use crate::payload::{Mapping, Payload};
    pub use crate::version::BuildInfo;
}
