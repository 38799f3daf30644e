use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use cpl_ledger::LedgerError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    Ledger(#[from] LedgerError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Ledger(LedgerError::AlreadyComplianced) => StatusCode::CONFLICT,
            Self::Ledger(LedgerError::StaleNonce { .. }) => StatusCode::CONFLICT,
            Self::Ledger(LedgerError::ProofNotFound) => StatusCode::NOT_FOUND,
            Self::Ledger(LedgerError::NotProofOwner { .. }) => StatusCode::FORBIDDEN,
            Self::Ledger(LedgerError::BadSignature) => StatusCode::UNAUTHORIZED,
            Self::Ledger(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Config(_) | Self::Io(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
