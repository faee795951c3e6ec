//! Shared test utilities: a test keypair and a counterparty that speaks the envelope
#![allow(dead_code)]

use std::sync::{mpsc, Arc, Mutex, OnceLock};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, Uri};
use axum::routing::post;
use axum::Router;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::rngs::OsRng;
use reqwest::StatusCode;
use rsa::pkcs8::{EncodePublicKey, LineEnding};
use rsa::{Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey};
use url::Url;

use cib_client::api::{
    Endpoints, Transport, TransportError, WireRequest, WireResponse, CLIENT_ID_HEADER,
    CLIENT_SECRET_HEADER, SESSION_KEY_HEADER,
};
use cib_client::config::{BoundConfig, ClientSecret, Environment, SessionKeyPolicy};
use common::prelude::{CounterpartyKey, EnvelopeCodec, Payload, SessionKey};

pub const CLIENT_ID: &str = "test-client-id";
pub const CLIENT_SECRET: &str = "test-client-secret";

/// The counterparty's private key, shared by every test in the binary
pub fn private_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| RsaPrivateKey::new(&mut OsRng, 1024).unwrap())
}

pub fn counterparty_key() -> CounterpartyKey {
    CounterpartyKey::from(RsaPublicKey::from(private_key()))
}

pub fn public_key_pem() -> String {
    RsaPublicKey::from(private_key())
        .to_public_key_pem(LineEnding::LF)
        .unwrap()
}

pub fn unwrap_session_key(envelope: &str) -> Option<SessionKey> {
    let wrapped = BASE64.decode(envelope).ok()?;
    let bytes = private_key().decrypt(Pkcs1v15Encrypt, &wrapped).ok()?;
    SessionKey::from_slice(&bytes)
}

pub fn bound_config(endpoints: Endpoints, policy: SessionKeyPolicy) -> BoundConfig {
    BoundConfig {
        environment: Environment::Sandbox,
        endpoints,
        client_id: CLIENT_ID.to_string(),
        client_secret: ClientSecret::from(CLIENT_SECRET),
        counterparty_key: counterparty_key(),
        ca_bundle: None,
        timeout: Duration::from_secs(5),
        session_key_policy: policy,
    }
}

pub fn payload(fields: &[(&str, &str)]) -> Payload {
    fields.iter().copied().collect()
}

/// Builds the counterparty's answer from the decrypted request and the
/// session key the request carried
pub type Handler = Arc<dyn Fn(&Payload, &EnvelopeCodec) -> (StatusCode, String) + Send + Sync>;

/// Answer every request with `response`, encrypted under the request's key
pub fn reply_with(response: Payload) -> Handler {
    Arc::new(move |_: &Payload, codec: &EnvelopeCodec| {
        let body = serde_json::to_string(&codec.encrypt_payload(&response)).unwrap();
        (StatusCode::OK, body)
    })
}

/// Answer every request with a fixed status and raw body
pub fn reply_raw(status: StatusCode, body: &str) -> Handler {
    let body = body.to_string();
    Arc::new(move |_: &Payload, _: &EnvelopeCodec| (status, body.clone()))
}

/// One request as the counterparty saw it
#[derive(Debug, Clone)]
pub struct Exchange {
    pub path: String,
    pub content_type: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub session_key_envelope: String,
    pub session_key: Vec<u8>,
    pub raw_body: String,
    pub request: Payload,
}

/// Counterparty logic shared by the in-process transport and the HTTP bank
#[derive(Clone)]
pub struct Counterparty {
    handler: Handler,
    exchanges: Arc<Mutex<Vec<Exchange>>>,
}

impl Counterparty {
    pub fn new(handler: Handler) -> Self {
        Self {
            handler,
            exchanges: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn exchanges(&self) -> Vec<Exchange> {
        self.exchanges.lock().unwrap().clone()
    }

    fn answer(
        &self,
        path: &str,
        header: impl Fn(&str) -> Option<String>,
        body: String,
    ) -> (StatusCode, String) {
        let Some(envelope) = header(SESSION_KEY_HEADER) else {
            return (StatusCode::BAD_REQUEST, "missing session key".to_string());
        };
        let Some(session_key) = unwrap_session_key(&envelope) else {
            return (StatusCode::BAD_REQUEST, "bad session key".to_string());
        };
        let codec = EnvelopeCodec::from_session_key(session_key.clone(), None);

        let encrypted: Payload = match serde_json::from_str(&body) {
            Ok(encrypted) => encrypted,
            Err(_) => return (StatusCode::BAD_REQUEST, "body is not JSON".to_string()),
        };
        let request = match codec.decrypt_payload(&encrypted) {
            Ok(request) => request,
            Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()),
        };

        self.exchanges.lock().unwrap().push(Exchange {
            path: path.to_string(),
            content_type: header("Content-Type"),
            client_id: header(CLIENT_ID_HEADER),
            client_secret: header(CLIENT_SECRET_HEADER),
            session_key_envelope: envelope,
            session_key: session_key.bytes().to_vec(),
            raw_body: body,
            request: request.clone(),
        });

        (self.handler)(&request, &codec)
    }
}

/// Transport that hands requests straight to a [`Counterparty`]
#[derive(Clone)]
pub struct MockTransport {
    pub counterparty: Counterparty,
}

impl MockTransport {
    pub fn new(handler: Handler) -> Self {
        Self {
            counterparty: Counterparty::new(handler),
        }
    }

    pub fn exchanges(&self) -> Vec<Exchange> {
        self.counterparty.exchanges()
    }
}

impl Transport for MockTransport {
    fn post(&self, request: WireRequest) -> Result<WireResponse, TransportError> {
        let header = |name: &str| request.header(name).map(str::to_string);
        let (status, body) =
            self.counterparty
                .answer(request.url.path(), header, request.body.clone());
        Ok(WireResponse { status, body })
    }
}

/// A counterparty listening on a local port
pub struct MockBank {
    pub base_url: Url,
    pub counterparty: Counterparty,
}

impl MockBank {
    pub fn exchanges(&self) -> Vec<Exchange> {
        self.counterparty.exchanges()
    }
}

async fn bank_handler(
    State(counterparty): State<Counterparty>,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    counterparty.answer(uri.path(), header, body)
}

/// Serve a [`Counterparty`] under `/cib/` on a background runtime
pub fn spawn_bank(handler: Handler) -> MockBank {
    let counterparty = Counterparty::new(handler);
    let state = counterparty.clone();
    let (tx, rx) = mpsc::channel();

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            tx.send(listener.local_addr().unwrap()).unwrap();

            let app = Router::new()
                .route("/cib/*rest", post(bank_handler))
                .with_state(state);
            axum::serve(listener, app).await.unwrap();
        });
    });

    let addr = rx.recv().unwrap();
    MockBank {
        base_url: Url::parse(&format!("http://{}/cib/", addr)).unwrap(),
        counterparty,
    }
}
