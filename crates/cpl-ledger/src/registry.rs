use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

use cpl_types::{AccountId, ComplianceRecord, FileDigest};

use crate::error::LedgerError;
use crate::tx::{ComplianceCall, SignedTransaction, TxReceipt};
use crate::watch::{ProofFeed, ProofUpdate, UpdateRouter};

/// Default capacity of per-subscriber broadcast channels.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// In-memory compliance ledger.
///
/// Each digest maps to at most one active [`ComplianceRecord`]. Transactions
/// are signature-checked, ordered by per-account nonce, then applied. Every
/// applied transaction mints one block; blocks are numbered from 1, so an
/// active record is exactly one whose block is non-zero. Rejected
/// transactions mint nothing and leave the ledger untouched.
pub struct ComplianceLedger {
    inner: RwLock<LedgerState>,
    router: UpdateRouter,
    channel_capacity: usize,
}

#[derive(Default)]
struct LedgerState {
    proofs: HashMap<FileDigest, ComplianceRecord>,
    nonces: HashMap<AccountId, u64>,
    height: u64,
}

impl ComplianceLedger {
    pub fn new() -> Self {
        Self::with_channel_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_channel_capacity(channel_capacity: usize) -> Self {
        Self {
            inner: RwLock::new(LedgerState::default()),
            router: UpdateRouter::new(),
            channel_capacity,
        }
    }

    /// Verify, order, and apply a transaction.
    ///
    /// On success the transaction is included in a freshly minted block and
    /// watchers of the digest are notified with the post-state record.
    pub fn submit(&self, tx: &SignedTransaction) -> Result<TxReceipt, LedgerError> {
        tx.verify()?;
        let account = tx.account_id();
        let tx_hash = tx.hash_hex()?;

        let mut state = self.inner.write().map_err(|_| LedgerError::LockPoisoned)?;

        let expected = state.nonces.get(&account).copied().unwrap_or(0);
        if tx.nonce != expected {
            return Err(LedgerError::StaleNonce {
                expected,
                got: tx.nonce,
            });
        }

        let digest = tx.call.digest();
        let block = state.height + 1;
        let record_after = match tx.call {
            ComplianceCall::CreateCompliance(_) => {
                if state.proofs.contains_key(&digest) {
                    return Err(LedgerError::AlreadyComplianced);
                }
                let record = ComplianceRecord::new(account, block);
                state.proofs.insert(digest, record);
                record
            }
            ComplianceCall::RevokeCompliance(_) => {
                let current = state
                    .proofs
                    .get(&digest)
                    .copied()
                    .ok_or(LedgerError::ProofNotFound)?;
                if current.owner != account {
                    return Err(LedgerError::NotProofOwner {
                        owner: current.owner,
                    });
                }
                state.proofs.remove(&digest);
                ComplianceRecord::vacant()
            }
        };
        state.height = block;
        state.nonces.insert(account, expected + 1);

        // Routed while the registry lock is held, so watchers observe
        // updates in block order.
        self.router.route(&ProofUpdate {
            digest,
            record: record_after,
        })?;

        debug!(
            digest = %digest.short_hex(),
            call = tx.call.kind().as_str(),
            block,
            "transaction applied"
        );

        Ok(TxReceipt {
            tx_hash,
            block,
            digest,
            call: tx.call.kind(),
        })
    }

    /// Current record for a digest. Vacant when never claimed or revoked.
    pub fn proof_of(&self, digest: &FileDigest) -> Result<ComplianceRecord, LedgerError> {
        let state = self.inner.read().map_err(|_| LedgerError::LockPoisoned)?;
        Ok(state.proofs.get(digest).copied().unwrap_or_default())
    }

    /// Next expected nonce for an account. Fresh accounts start at 0.
    pub fn account_nonce(&self, account: &AccountId) -> Result<u64, LedgerError> {
        let state = self.inner.read().map_err(|_| LedgerError::LockPoisoned)?;
        Ok(state.nonces.get(account).copied().unwrap_or(0))
    }

    /// Subscribe to record changes for a digest.
    ///
    /// The feed opens with a snapshot of the current record, then carries one
    /// update per applied transaction touching the digest. Registration
    /// happens while the registry lock is held, so no update can fall between
    /// the snapshot and the first live event.
    pub fn watch(&self, digest: FileDigest) -> Result<ProofFeed, LedgerError> {
        let state = self.inner.read().map_err(|_| LedgerError::LockPoisoned)?;
        let record = state.proofs.get(&digest).copied().unwrap_or_default();
        self.router
            .subscribe(digest, self.channel_capacity, ProofUpdate { digest, record })
    }

    /// Height of the most recently minted block. Zero before any transaction.
    pub fn height(&self) -> Result<u64, LedgerError> {
        let state = self.inner.read().map_err(|_| LedgerError::LockPoisoned)?;
        Ok(state.height)
    }

    /// Number of active records.
    pub fn proof_count(&self) -> Result<usize, LedgerError> {
        let state = self.inner.read().map_err(|_| LedgerError::LockPoisoned)?;
        Ok(state.proofs.len())
    }

    /// Number of live watch subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.router.subscriber_count()
    }
}

impl Default for ComplianceLedger {
    fn default() -> Self {
        Self::new()
    }
}
