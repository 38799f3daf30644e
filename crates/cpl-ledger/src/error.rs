use cpl_types::AccountId;

/// Errors produced by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("digest is already complianced")]
    AlreadyComplianced,

    #[error("no active compliance record for digest")]
    ProofNotFound,

    #[error("record is owned by another account ({owner})")]
    NotProofOwner { owner: AccountId },

    #[error("transaction signature does not verify")]
    BadSignature,

    #[error("stale nonce: expected {expected}, got {got}")]
    StaleNonce { expected: u64, got: u64 },

    #[error("encoding error: {0}")]
    Codec(String),

    #[error("ledger lock poisoned")]
    LockPoisoned,
}
