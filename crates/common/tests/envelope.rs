//! The envelope as the counterparty sees it: unwrap the key, read the fields, answer

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::rngs::OsRng;
use rsa::pkcs1::EncodeRsaPublicKey;
use rsa::pkcs8::{EncodePublicKey, LineEnding};
use rsa::{Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey};

use common::prelude::*;

fn keypair() -> (RsaPrivateKey, RsaPublicKey) {
    let private = RsaPrivateKey::new(&mut OsRng, 1024).unwrap();
    let public = RsaPublicKey::from(&private);
    (private, public)
}

fn unwrap(private: &RsaPrivateKey, envelope: &str) -> SessionKey {
    let wrapped = BASE64.decode(envelope).unwrap();
    let bytes = private.decrypt(Pkcs1v15Encrypt, &wrapped).unwrap();
    SessionKey::from_slice(&bytes).unwrap()
}

#[test]
fn test_counterparty_round_trip() {
    let (private, public) = keypair();
    let pem = public.to_public_key_pem(LineEnding::LF).unwrap();
    let client = EnvelopeCodec::new(CounterpartyKey::from_bytes(pem.as_bytes()).unwrap());

    let request: Payload = serde_json::from_str(
        r#"{"CORPID": "DDB2023", "USERID": "USER1", "TXN_AMOUNT": 1}"#,
    )
    .unwrap();
    let wire = serde_json::to_string(&client.encrypt_payload(&request)).unwrap();
    let envelope = client.wrap_session_key().unwrap();

    // counterparty side
    let bank = EnvelopeCodec::from_session_key(unwrap(&private, &envelope), None);
    let received: Payload = serde_json::from_str(&wire).unwrap();
    let received = bank.decrypt_payload(&received).unwrap();
    assert_eq!(received.get("TXN_AMOUNT").and_then(Payload::as_leaf), Some("1"));
    assert_eq!(received, request);

    let answer: Payload = [("STATUS", "SUCCESS"), ("REQID", "497373")]
        .into_iter()
        .collect();
    let answer_wire = serde_json::to_string(&bank.encrypt_payload(&answer)).unwrap();

    // back on the client
    let answer_received: Payload = serde_json::from_str(&answer_wire).unwrap();
    assert_eq!(client.decrypt_payload(&answer_received).unwrap(), answer);
}

#[test]
fn test_pkcs1_and_der_keys_wrap_the_same_way() {
    let (private, public) = keypair();
    let pkcs1_pem = public.to_pkcs1_pem(LineEnding::LF).unwrap();
    let spki_der = public.to_public_key_der().unwrap();

    let from_pkcs1 = CounterpartyKey::from_bytes(pkcs1_pem.as_bytes()).unwrap();
    let from_der = CounterpartyKey::from_bytes(spki_der.as_bytes()).unwrap();
    assert_eq!(from_pkcs1, from_der);

    let session_key = SessionKey::generate();
    let envelope = from_der.wrap(&session_key).unwrap();
    assert_eq!(BASE64.decode(&envelope).unwrap().len(), from_der.modulus_size());
    assert_eq!(unwrap(&private, &envelope), session_key);
}

#[test]
fn test_other_session_key_cannot_read_fields() {
    let sender = EnvelopeCodec::without_counterparty();
    let stranger = EnvelopeCodec::without_counterparty();

    let payload: Payload = [("URN", "ICIC12607")].into_iter().collect();
    let encrypted = sender.encrypt_payload(&payload);

    match stranger.decrypt_payload(&encrypted) {
        Err(err) => assert_eq!(err.path, "URN"),
        Ok(decrypted) => assert_ne!(decrypted, payload),
    }
}
