use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tracing::warn;

use cpl_ledger::{ComplianceLedger, SignedTransaction, TxReceipt};
use cpl_types::{AccountId, ComplianceRecord, FileDigest};

use crate::error::ClientResult;
use crate::transport::{LedgerInfo, LedgerTransport, ProofEvents};

/// Transport over an in-process [`ComplianceLedger`].
#[derive(Clone)]
pub struct LocalTransport {
    ledger: Arc<ComplianceLedger>,
}

impl LocalTransport {
    pub fn new(ledger: Arc<ComplianceLedger>) -> Self {
        Self { ledger }
    }

    /// Handle on the underlying ledger.
    pub fn ledger(&self) -> Arc<ComplianceLedger> {
        Arc::clone(&self.ledger)
    }
}

#[async_trait]
impl LedgerTransport for LocalTransport {
    async fn query_proof(&self, digest: &FileDigest) -> ClientResult<ComplianceRecord> {
        Ok(self.ledger.proof_of(digest)?)
    }

    async fn account_nonce(&self, account: &AccountId) -> ClientResult<u64> {
        Ok(self.ledger.account_nonce(account)?)
    }

    async fn submit(&self, tx: &SignedTransaction) -> ClientResult<TxReceipt> {
        Ok(self.ledger.submit(tx)?)
    }

    async fn subscribe(&self, digest: &FileDigest) -> ClientResult<ProofEvents> {
        let mut feed = self.ledger.watch(*digest)?;
        let (tx, rx) = mpsc::unbounded_channel();
        let pump = tokio::spawn(async move {
            loop {
                match feed.recv().await {
                    Ok(update) => {
                        if tx.send(update).is_err() {
                            return;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "watch feed lagged; continuing");
                    }
                    Err(RecvError::Closed) => return,
                }
            }
        });
        Ok(ProofEvents::new(rx, pump))
    }

    async fn info(&self) -> ClientResult<LedgerInfo> {
        Ok(LedgerInfo {
            name: "local".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            height: self.ledger.height()?,
        })
    }
}
