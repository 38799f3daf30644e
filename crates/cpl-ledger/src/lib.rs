//! Compliance proof ledger.
//!
//! This crate is the heart of CPL. It provides:
//! - Signed `create_compliance` / `revoke_compliance` transactions
//! - The in-memory [`ComplianceLedger`] with per-account nonce ordering
//! - Block minting: one block per applied transaction, numbered from 1
//! - Watch feeds that deliver a snapshot followed by live record updates

pub mod error;
pub mod registry;
pub mod tx;
pub mod watch;

pub use error::LedgerError;
pub use registry::{ComplianceLedger, DEFAULT_CHANNEL_CAPACITY};
pub use tx::{CallKind, ComplianceCall, SignedTransaction, TxReceipt};
pub use watch::{ProofFeed, ProofUpdate};
