use common::prelude::{EnvelopeCodec, Payload};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use super::error::{ApiError, TransportError};
use super::transport::{HttpTransport, Transport, WireRequest};
use super::{ApiRequest, Operation};
use crate::config::{BoundConfig, Environment, SessionKeyPolicy};
use crate::diagnostics::{with_sink, DiagnosticsSink, TraceEntry, TraceKind, TracingSink};

pub const CLIENT_ID_HEADER: &str = "X-IBM-Client-Id";
pub const CLIENT_SECRET_HEADER: &str = "X-IBM-Client-Secret";
pub const SESSION_KEY_HEADER: &str = "X-Session-Key";

/// Client bound to one environment
///
/// Holds one session key for its lifetime unless the config asks for a key
/// per request. Calls take `&self`, so a client can be shared across threads.
#[derive(Debug)]
pub struct ApiClient<T = HttpTransport> {
    config: BoundConfig,
    codec: EnvelopeCodec,
    transport: T,
}

impl ApiClient<HttpTransport> {
    pub fn new(config: BoundConfig) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(config.timeout, config.ca_bundle.as_deref())?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn with_transport(config: BoundConfig, transport: T) -> Self {
        let codec = EnvelopeCodec::new(config.counterparty_key.clone());
        Self {
            config,
            codec,
            transport,
        }
    }

    pub fn environment(&self) -> Environment {
        self.config.environment
    }

    pub fn endpoint(&self, operation: Operation) -> Url {
        self.config.endpoints.resolve(operation)
    }

    /// Codec holding the client's session key
    pub fn codec(&self) -> &EnvelopeCodec {
        &self.codec
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Encrypt `payload`, POST it and return the decrypted response
    pub fn execute(&self, operation: Operation, payload: &Payload) -> Result<Payload, ApiError> {
        self.execute_traced(operation, payload, &mut TracingSink)
    }

    /// [`ApiClient::execute`] with the operation given by name
    pub fn execute_named(&self, operation: &str, payload: &Payload) -> Result<Payload, ApiError> {
        self.execute(operation.parse()?, payload)
    }

    /// [`ApiClient::execute`] reporting to a caller-supplied sink
    pub fn execute_traced(
        &self,
        operation: Operation,
        payload: &Payload,
        sink: &mut dyn DiagnosticsSink,
    ) -> Result<Payload, ApiError> {
        with_sink(sink, operation.as_str(), |sink| {
            self.dispatch(operation, payload, sink)
        })
    }

    /// Send a typed request
    pub fn call<R: ApiRequest>(&self, request: &R) -> Result<R::Response, ApiError> {
        let operation = R::OPERATION;
        let conversion = |source| ApiError::Conversion { operation, source };

        let payload = to_payload(request).map_err(conversion)?;
        let response = self.execute(operation, &payload)?;
        from_payload(&response).map_err(conversion)
    }

    fn dispatch(
        &self,
        operation: Operation,
        payload: &Payload,
        sink: &mut dyn DiagnosticsSink,
    ) -> Result<Payload, ApiError> {
        let rekeyed;
        let codec = match self.config.session_key_policy {
            SessionKeyPolicy::PerClient => &self.codec,
            SessionKeyPolicy::PerRequest => {
                rekeyed = self.codec.rekeyed();
                &rekeyed
            }
        };

        let url = self.endpoint(operation);
        let session_key = codec
            .wrap_session_key()
            .map_err(|source| ApiError::KeyWrap { operation, source })?;
        let body = serde_json::to_string(&codec.encrypt_payload(payload))
            .map_err(|source| ApiError::Conversion { operation, source })?;

        tracing::info!(
            operation = %operation,
            environment = %self.config.environment,
            %url,
            "dispatching request"
        );
        tracing::debug!(operation = %operation, body = %body, "encrypted request body");
        sink.record(TraceEntry::new(
            operation.as_str(),
            TraceKind::Request,
            format!("POST {} {}", url, body),
        ));

        let request = WireRequest {
            url,
            headers: vec![
                ("Content-Type", "application/json".to_string()),
                (CLIENT_ID_HEADER, self.config.client_id.clone()),
                (
                    CLIENT_SECRET_HEADER,
                    self.config.client_secret.expose().to_string(),
                ),
                (SESSION_KEY_HEADER, session_key),
            ],
            body,
        };

        let response = self
            .transport
            .post(request)
            .map_err(|source| ApiError::Transport { operation, source })?;

        sink.record(TraceEntry::new(
            operation.as_str(),
            TraceKind::Response,
            format!("{} {}", response.status, response.body),
        ));

        if !response.status.is_success() {
            tracing::warn!(
                operation = %operation,
                status = %response.status,
                "counterparty returned non-success status"
            );
            return Err(ApiError::Transport {
                operation,
                source: TransportError::Status {
                    status: response.status,
                    body: response.body,
                },
            });
        }

        let encrypted: Payload = match serde_json::from_str(&response.body) {
            Ok(encrypted @ Payload::Mapping(_)) => encrypted,
            Ok(_) => {
                return Err(ApiError::InvalidResponse {
                    operation,
                    body: response.body,
                    source: serde::de::Error::custom("response is not a JSON object"),
                })
            }
            Err(source) => {
                return Err(ApiError::InvalidResponse {
                    operation,
                    body: response.body,
                    source,
                })
            }
        };

        let decrypted = codec
            .decrypt_payload(&encrypted)
            .map_err(|source| ApiError::Decryption { operation, source })?;

        tracing::debug!(
            operation = %operation,
            fields = decrypted.leaves().len(),
            "response decrypted"
        );
        Ok(decrypted)
    }
}

/// Convert a serializable value into a payload tree
pub fn to_payload<S: Serialize + ?Sized>(value: &S) -> Result<Payload, serde_json::Error> {
    // through text, not `serde_json::Value`, to keep field order
    serde_json::from_str(&serde_json::to_string(value)?)
}

/// Read a payload tree into a typed value
pub fn from_payload<D: DeserializeOwned>(payload: &Payload) -> Result<D, serde_json::Error> {
    serde_json::from_value(serde_json::to_value(payload)?)
}
