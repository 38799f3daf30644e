//! Client for the Compliance Proof Ledger.
//!
//! Provides:
//! - [`LedgerTransport`] — uniform interface over a local ledger or a remote node
//! - [`ProofSession`] — file selection, live record tracking, and eligibility
//!   checks for `create_compliance` / `revoke_compliance`
//! - [`submit_with_status`] — sign-and-submit with verbatim status reporting

pub mod error;
pub mod http;
pub mod local;
pub mod session;
pub mod submitter;
pub mod transport;

pub use error::{ClientError, ClientResult};
pub use http::HttpTransport;
pub use local::LocalTransport;
pub use session::ProofSession;
pub use submitter::{submit_with_status, STATUS_SENDING};
pub use transport::{LedgerInfo, LedgerTransport, ProofEvents};
