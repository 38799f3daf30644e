//! HTTP node for the Compliance Proof Ledger.
//!
//! Hosts a [`cpl_ledger::ComplianceLedger`] behind a small REST API:
//! proof queries, nonce queries, signed transaction submission, and live
//! record watches over server-sent events.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::NodeConfig;
pub use error::{ServerError, ServerResult};
pub use router::build_router;
pub use server::{AppState, Node};
