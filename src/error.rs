//! Error types shared by the store, repositories and usecases
//!
//! Internal code works with `anyhow::Result`; every component boundary the
//! orchestrator or the API crosses returns `Result<T, ErrorResponse>` so the
//! caller always checks a status before proceeding.

use axum::http::StatusCode;
use serde::{Serialize, Serializer};

/// Failures raised by an [`ItemStore`](crate::store::ItemStore) backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to connect to item store: {0}")]
    Connection(String),

    #[error("item table does not exist: {0}")]
    TableMissing(String),

    #[error("batch write failed: {0}")]
    BatchWrite(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("failed to decode item {hash_key} / {range_key}: {reason}")]
    Decode {
        hash_key: String,
        range_key: String,
        reason: String,
    },
}

/// Structured error returned across component boundaries.
///
/// `status` is an HTTP-like code; the invoking surface decides how to
/// translate it (the API returns it verbatim, the CLI prints it).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{status}: {response}")]
pub struct ErrorResponse {
    pub response: String,
    #[serde(serialize_with = "serialize_status")]
    pub status: StatusCode,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            status,
        }
    }

    pub fn internal(response: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, response)
    }

    pub fn bad_request(response: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, response)
    }

    pub fn not_found(response: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, response)
    }
}

impl From<anyhow::Error> for ErrorResponse {
    fn from(err: anyhow::Error) -> Self {
        ErrorResponse::internal(format!("{:#}", err))
    }
}

fn serialize_status<S: Serializer>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u16(status.as_u16())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_serializes_numeric_status() {
        let err = ErrorResponse::bad_request("No entities selected");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["status"], 400);
        assert_eq!(json["response"], "No entities selected");
    }

    #[test]
    fn test_anyhow_maps_to_internal() {
        let err: ErrorResponse = anyhow::anyhow!("boom").context("scan failed").into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.response.contains("scan failed"));
        assert!(err.response.contains("boom"));
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Decode {
            hash_key: "STARTUP#1".into(),
            range_key: "STARTUP#METADATA".into(),
            reason: "bad industries".into(),
        };
        assert_eq!(
            err.to_string(),
            "failed to decode item STARTUP#1 / STARTUP#METADATA: bad industries"
        );
    }
}
