//! End-to-end over HTTP: config on disk, a bound client and a local bank

mod common;

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use tempfile::TempDir;
use url::Url;

use cib_client::prelude::*;
use crate::common::{payload, public_key_pem, reply_raw, reply_with, spawn_bank, MockBank};

/// Write a key and a config pointing the sandbox profile at `base_url`
fn write_config(dir: &Path, base_url: &Url, extra: &str) {
    let key_path = dir.join("sandbox_public.pem");
    fs::write(&key_path, public_key_pem()).unwrap();

    let config = format!(
        r#"
environment = "sandbox"
{extra}

[sandbox]
client_id = "{id}"
client_secret = "{secret}"
public_key_path = "{key}"
base_url = "{base}"
"#,
        extra = extra,
        id = common::CLIENT_ID,
        secret = common::CLIENT_SECRET,
        key = key_path.display(),
        base = base_url,
    );
    fs::write(dir.join("config.toml"), config).unwrap();
}

fn client_for(bank: &MockBank, extra: &str) -> (ApiClient, TempDir) {
    let dir = TempDir::new().unwrap();
    write_config(dir.path(), &bank.base_url, extra);

    let config = ClientConfig::load(Some(dir.path().to_path_buf())).unwrap();
    let client = ApiClient::new(config.bind(None).unwrap()).unwrap();
    (client, dir)
}

#[test]
fn test_dealer_collection_over_http() {
    let bank = spawn_bank(reply_with(payload(&[
        ("STATUS", "SUCCESS"),
        ("REQID", "497373"),
    ])));
    let (client, _dir) = client_for(&bank, "");

    let request = payload(&[("CORPID", "DDB2023"), ("USERID", "USER1"), ("TXN_AMOUNT", "1")]);
    let response = client
        .execute(Operation::DealerCollection, &request)
        .unwrap();

    assert_eq!(response.get("STATUS").and_then(Payload::as_leaf), Some("SUCCESS"));
    assert_eq!(response.get("REQID").and_then(Payload::as_leaf), Some("497373"));

    let exchanges = bank.exchanges();
    assert_eq!(exchanges.len(), 1);
    assert_eq!(exchanges[0].path, "/cib/DealerCollection");
    assert_eq!(exchanges[0].content_type.as_deref(), Some("application/json"));
    assert_eq!(exchanges[0].client_id.as_deref(), Some(common::CLIENT_ID));
    assert_eq!(exchanges[0].client_secret.as_deref(), Some(common::CLIENT_SECRET));
    assert_eq!(exchanges[0].request, request);
}

#[test]
fn test_status_inquiry_path_over_http() {
    let bank = spawn_bank(reply_with(payload(&[("STATUS", "SUCCESS")])));
    let (client, _dir) = client_for(&bank, "");

    let response = client
        .call(&PaymentStatusInquiryRequest {
            aggr_id: "AGGR11".into(),
            corp_id: "DDB2023".into(),
            user_id: "USER1".into(),
            unique_id: "TpoknbSpoVA".into(),
            urn: "ICIC12607".into(),
        })
        .unwrap();

    assert!(response.is_success());
    assert_eq!(bank.exchanges()[0].path, "/cib/transaction/status");
    assert_eq!(
        bank.exchanges()[0]
            .request
            .get("UNIQUEID")
            .and_then(Payload::as_leaf),
        Some("TpoknbSpoVA")
    );
}

#[test]
fn test_non_success_status_over_http() {
    let bank = spawn_bank(reply_raw(StatusCode::SERVICE_UNAVAILABLE, "try later"));
    let (client, _dir) = client_for(&bank, "");

    let err = client
        .execute(Operation::DealerBalanceCheck, &payload(&[("CORPID", "DDB2023")]))
        .unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
    assert!(err.to_string().contains("try later"));
}

#[test]
fn test_per_request_policy_from_config() {
    let bank = spawn_bank(reply_with(payload(&[("Response", "SUCCESS")])));
    let (client, _dir) = client_for(&bank, r#"session_key_policy = "per_request""#);

    for _ in 0..2 {
        client
            .execute(Operation::CibRegistration, &payload(&[("URN", "123GB")]))
            .unwrap();
    }

    let exchanges = bank.exchanges();
    assert_eq!(exchanges.len(), 2);
    assert_ne!(exchanges[0].session_key, exchanges[1].session_key);
}

#[test]
fn test_timeout() {
    let bank = spawn_bank(Arc::new(|_: &Payload, _: &EnvelopeCodec| {
        std::thread::sleep(Duration::from_secs(3));
        (StatusCode::OK, "{}".to_string())
    }));
    let (client, _dir) = client_for(&bank, "timeout_secs = 1");

    let err = client
        .execute(Operation::DealerCollection, &payload(&[("CORPID", "DDB2023")]))
        .unwrap_err();

    assert!(matches!(
        err,
        ApiError::Transport {
            source: TransportError::Timeout(timeout),
            ..
        } if timeout == Duration::from_secs(1)
    ));
}

#[test]
fn test_connection_refused() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let dir = TempDir::new().unwrap();
    let base = Url::parse(&format!("http://{}/cib/", addr)).unwrap();
    write_config(dir.path(), &base, "");
    let config = ClientConfig::load(Some(dir.path().to_path_buf())).unwrap();
    let client = ApiClient::new(config.bind(None).unwrap()).unwrap();

    let err = client
        .execute(Operation::DealerCollection, &payload(&[("CORPID", "DDB2023")]))
        .unwrap_err();

    assert!(matches!(
        err,
        ApiError::Transport {
            source: TransportError::Reqwest(_),
            ..
        }
    ));
    assert_eq!(err.status(), None);
}
