mod client;
mod error;
mod operation;
mod transport;

pub mod v2;

pub use client::{
    from_payload, to_payload, ApiClient, CLIENT_ID_HEADER, CLIENT_SECRET_HEADER,
    SESSION_KEY_HEADER,
};
pub use error::{ApiError, TransportError, UnknownOperation};
pub use operation::{endpoint, Endpoints, Operation, LIVE_BASE_URL, SANDBOX_BASE_URL};
pub use transport::{HttpTransport, Transport, WireRequest, WireResponse};

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A request with a fixed operation and response shape
pub trait ApiRequest: Serialize {
    const OPERATION: Operation;
    type Response: DeserializeOwned;
}
