use std::time::Duration;

use common::prelude::{FieldDecryptionError, KeyWrapError};
use reqwest::StatusCode;

use super::Operation;

#[derive(Debug, thiserror::Error)]
#[error("unknown operation `{0}`")]
pub struct UnknownOperation(pub String);

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("HTTP status {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("invalid CA bundle: {0}")]
    CaBundle(#[source] reqwest::Error),
    #[error("CA bundle contains no certificates")]
    EmptyCaBundle,
}

/// Failure of one operation; everything but name lookup carries the operation
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    UnknownOperation(#[from] UnknownOperation),
    #[error("{operation}: {source}")]
    Transport {
        operation: Operation,
        #[source]
        source: TransportError,
    },
    #[error("{operation}: failed to wrap session key: {source}")]
    KeyWrap {
        operation: Operation,
        #[source]
        source: KeyWrapError,
    },
    #[error("{operation}: {source}")]
    Decryption {
        operation: Operation,
        #[source]
        source: FieldDecryptionError,
    },
    #[error("{operation}: response is not a JSON payload: {source}")]
    InvalidResponse {
        operation: Operation,
        body: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{operation}: payload conversion failed: {source}")]
    Conversion {
        operation: Operation,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    pub fn operation(&self) -> Option<Operation> {
        match self {
            ApiError::UnknownOperation(_) => None,
            ApiError::Transport { operation, .. }
            | ApiError::KeyWrap { operation, .. }
            | ApiError::Decryption { operation, .. }
            | ApiError::InvalidResponse { operation, .. }
            | ApiError::Conversion { operation, .. } => Some(*operation),
        }
    }

    /// HTTP status of a non-success response, if that is what failed
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Transport {
                source: TransportError::Status { status, .. },
                ..
            } => Some(*status),
            _ => None,
        }
    }
}
