/**
 * Endpoint table, transport seam and the client
 *  that runs one encrypted exchange per call.
 */
pub mod api;
/**
 * On-disk configuration and its validated,
 *  per-environment binding.
 */
pub mod config;
/**
 * Caller-supplied diagnostics sinks.
 */
pub mod diagnostics;
pub mod logging;

pub mod prelude {
    pub use crate::api::v2::*;
    pub use crate::api::{
        endpoint, ApiClient, ApiError, ApiRequest, Endpoints, HttpTransport, Operation, Transport,
        TransportError, UnknownOperation, WireRequest, WireResponse, LIVE_BASE_URL, SANDBOX_BASE_URL,
    };
    pub use crate::config::{
        BoundConfig, ClientConfig, ClientSecret, ConfigError, Environment, EnvironmentProfile,
        SessionKeyPolicy,
    };
    pub use crate::diagnostics::{
        with_sink, DiagnosticsSink, MemorySink, TraceEntry, TraceKind, TracingSink, WriterSink,
    };
    pub use common::prelude::*;
}
