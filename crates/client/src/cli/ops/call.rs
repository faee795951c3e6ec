use std::fs;
use std::path::PathBuf;

use clap::Args;

use cib_client::api::{ApiError, Operation, UnknownOperation};
use cib_client::diagnostics::WriterSink;
use common::prelude::{unique_id, Payload, UNIQUE_ID_LEN};

use crate::cli::op::{ContextError, OpContext};

/// Call any operation with a free-form payload
#[derive(Args, Debug, Clone)]
pub struct Call {
    /// Operation name: CIBRegistration, DealerBalanceCheck,
    /// PaymentStatusInquiry or DealerCollection
    pub operation: String,

    /// Payload field as KEY=VALUE (repeatable)
    #[arg(long = "field", value_parser = parse_field)]
    pub fields: Vec<(String, String)>,

    /// JSON file with the payload; --field values are applied on top
    #[arg(long)]
    pub payload: Option<PathBuf>,

    /// Set this field to a fresh random unique id
    #[arg(long)]
    pub unique_id: Option<String>,

    /// Append a timestamped trace of the call to this file
    #[arg(long)]
    pub trace_file: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum CallError {
    #[error(transparent)]
    UnknownOperation(#[from] UnknownOperation),
    #[error("payload file must hold a JSON object")]
    NotAnObject,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

fn parse_field(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got `{}`", s)),
    }
}

impl Call {
    fn build_payload(&self) -> Result<Payload, CallError> {
        let mut payload = match &self.payload {
            Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
            None => Payload::default(),
        };

        let Payload::Mapping(mapping) = &mut payload else {
            return Err(CallError::NotAnObject);
        };
        for (key, value) in &self.fields {
            mapping.insert(key.as_str(), value.as_str());
        }
        if let Some(field) = &self.unique_id {
            mapping.insert(field.as_str(), unique_id(UNIQUE_ID_LEN));
        }

        Ok(payload)
    }
}

impl crate::cli::op::Op for Call {
    type Error = CallError;
    type Output = String;

    fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let operation: Operation = self.operation.parse()?;
        let payload = self.build_payload()?;
        let client = ctx.client()?;

        let response = match &self.trace_file {
            Some(path) => {
                let mut sink = WriterSink::append(path)?;
                client.execute_traced(operation, &payload, &mut sink)?
            }
            None => client.execute(operation, &payload)?,
        };

        Ok(serde_json::to_string_pretty(&response)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        call: Call,
    }

    #[test]
    fn test_parse_field() {
        assert_eq!(
            parse_field("TXN_AMOUNT=1").unwrap(),
            ("TXN_AMOUNT".to_string(), "1".to_string())
        );
        assert_eq!(parse_field("URN=a=b").unwrap().1, "a=b");
        assert_eq!(parse_field("EMPTY=").unwrap().1, "");
        assert!(parse_field("=x").is_err());
        assert!(parse_field("novalue").is_err());
    }

    #[test]
    fn test_fields_override_payload_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload.json");
        fs::write(&path, r#"{"CORPID": "OLD", "USERID": "USER1", "TXN_AMOUNT": 1}"#).unwrap();

        let cli = Cli::parse_from([
            "test",
            "DealerCollection",
            "--payload",
            path.to_str().unwrap(),
            "--field",
            "CORPID=DDB2023",
            "--unique-id",
            "UNIQUE_ID",
        ]);
        let payload = cli.call.build_payload().unwrap();

        assert_eq!(payload.get("CORPID").and_then(Payload::as_leaf), Some("DDB2023"));
        assert_eq!(payload.get("TXN_AMOUNT").and_then(Payload::as_leaf), Some("1"));
        let id = payload.get("UNIQUE_ID").and_then(Payload::as_leaf).unwrap();
        assert_eq!(id.len(), UNIQUE_ID_LEN);
    }

    #[test]
    fn test_payload_file_must_be_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload.json");
        fs::write(&path, r#"["CORPID"]"#).unwrap();

        let cli = Cli::parse_from(["test", "DealerCollection", "--payload", path.to_str().unwrap()]);
        assert!(matches!(cli.call.build_payload(), Err(CallError::NotAnObject)));
    }

    #[test]
    fn test_unknown_operation_fails_before_config() {
        use crate::cli::op::Op;

        let cli = Cli::parse_from(["test", "Bogus"]);
        let ctx = OpContext::new(Some(PathBuf::from("/nonexistent")), None);
        assert!(matches!(
            cli.call.execute(&ctx),
            Err(CallError::UnknownOperation(_))
        ));
    }
}
