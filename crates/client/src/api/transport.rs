use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::{Certificate, StatusCode};
use url::Url;

use super::error::TransportError;

/// One POST as it goes over the wire
#[derive(Debug, Clone)]
pub struct WireRequest {
    pub url: Url,
    pub headers: Vec<(&'static str, String)>,
    pub body: String,
}

impl WireRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Status and full body of a response, success or not
#[derive(Debug, Clone)]
pub struct WireResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Sends a request and reads the whole response
///
/// Non-success statuses are returned as responses; only failures to
/// complete the exchange are errors.
pub trait Transport: Send + Sync {
    fn post(&self, request: WireRequest) -> Result<WireResponse, TransportError>;
}

/// Blocking HTTPS transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    timeout: Duration,
}

impl HttpTransport {
    /// `ca_bundle` (PEM) replaces the built-in roots when given
    pub fn new(timeout: Duration, ca_bundle: Option<&[u8]>) -> Result<Self, TransportError> {
        let mut builder = Client::builder().timeout(timeout).http1_only();

        if let Some(pem) = ca_bundle {
            let certificates =
                Certificate::from_pem_bundle(pem).map_err(TransportError::CaBundle)?;
            if certificates.is_empty() {
                return Err(TransportError::EmptyCaBundle);
            }
            builder = builder.tls_built_in_root_certs(false);
            for certificate in certificates {
                builder = builder.add_root_certificate(certificate);
            }
        }

        Ok(Self {
            client: builder.build()?,
            timeout,
        })
    }

    fn classify(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(self.timeout)
        } else {
            TransportError::Reqwest(err)
        }
    }
}

impl Transport for HttpTransport {
    fn post(&self, request: WireRequest) -> Result<WireResponse, TransportError> {
        let mut builder = self.client.post(request.url).body(request.body);
        for (name, value) in request.headers {
            builder = builder.header(name, value);
        }

        let response = builder.send().map_err(|e| self.classify(e))?;
        let status = response.status();
        let body = response.text().map_err(|e| self.classify(e))?;

        Ok(WireResponse { status, body })
    }
}
