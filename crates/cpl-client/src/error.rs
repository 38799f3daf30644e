use thiserror::Error;

use cpl_ledger::LedgerError;

/// Errors produced by client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A local eligibility check failed before any transaction was sent.
    #[error("not eligible: {0}")]
    NotEligible(&'static str),

    /// The local ledger rejected the operation.
    #[error("{0}")]
    Ledger(#[from] LedgerError),

    /// A remote node rejected the request.
    #[error("node rejected request ({status}): {reason}")]
    Rejected { status: u16, reason: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("session state poisoned")]
    StatePoisoned,
}

pub type ClientResult<T> = Result<T, ClientError>;
