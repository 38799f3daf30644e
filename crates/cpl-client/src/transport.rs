use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use cpl_ledger::{ProofUpdate, SignedTransaction, TxReceipt};
use cpl_types::{AccountId, ComplianceRecord, FileDigest};

use crate::error::ClientResult;

/// Summary of a ledger, as reported by its info endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerInfo {
    pub name: String,
    pub version: String,
    pub height: u64,
}

/// Transport interface to a compliance ledger, local or remote.
#[async_trait]
pub trait LedgerTransport: Send + Sync {
    /// Current record for a digest. Vacant when unclaimed.
    async fn query_proof(&self, digest: &FileDigest) -> ClientResult<ComplianceRecord>;

    /// Next expected nonce for an account.
    async fn account_nonce(&self, account: &AccountId) -> ClientResult<u64>;

    /// Submit a signed transaction.
    async fn submit(&self, tx: &SignedTransaction) -> ClientResult<TxReceipt>;

    /// Open a live feed of record changes for a digest. The feed starts
    /// with a snapshot of the current record.
    async fn subscribe(&self, digest: &FileDigest) -> ClientResult<ProofEvents>;

    /// Ledger summary.
    async fn info(&self) -> ClientResult<LedgerInfo>;
}

/// Owned stream of record updates for one digest.
///
/// The handle owns the background task pumping updates from the transport;
/// dropping the handle stops the pump.
pub struct ProofEvents {
    rx: mpsc::UnboundedReceiver<ProofUpdate>,
    pump: JoinHandle<()>,
}

impl ProofEvents {
    pub(crate) fn new(rx: mpsc::UnboundedReceiver<ProofUpdate>, pump: JoinHandle<()>) -> Self {
        Self { rx, pump }
    }

    /// Next update. `None` once the feed has ended.
    pub async fn recv(&mut self) -> Option<ProofUpdate> {
        self.rx.recv().await
    }

    /// Non-blocking variant of [`recv`](Self::recv).
    pub fn try_recv(&mut self) -> Option<ProofUpdate> {
        self.rx.try_recv().ok()
    }
}

impl Drop for ProofEvents {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

impl std::fmt::Debug for ProofEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProofEvents").finish_non_exhaustive()
    }
}
