use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use cpl_types::{ComplianceRecord, FileDigest};

use crate::error::LedgerError;

/// Record change notification for a watched digest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofUpdate {
    pub digest: FileDigest,
    pub record: ComplianceRecord,
}

/// A broadcast channel receiver carrying updates for one digest.
pub type ProofFeed = broadcast::Receiver<ProofUpdate>;

/// Internal subscriber: a watched digest paired with a broadcast sender.
struct Subscriber {
    digest: FileDigest,
    sender: broadcast::Sender<ProofUpdate>,
}

/// Fan-out router that delivers updates to subscribers of the same digest.
pub(crate) struct UpdateRouter {
    subscribers: RwLock<Vec<Subscriber>>,
}

impl UpdateRouter {
    pub(crate) fn new() -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
        }
    }

    /// Register a new subscriber for a digest.
    ///
    /// The snapshot is pushed into the channel before the subscriber is
    /// registered, so the receiver always observes the current record first.
    pub(crate) fn subscribe(
        &self,
        digest: FileDigest,
        capacity: usize,
        snapshot: ProofUpdate,
    ) -> Result<ProofFeed, LedgerError> {
        let (tx, rx) = broadcast::channel(capacity);
        // rx is alive, so this send cannot fail for lack of receivers
        let _ = tx.send(snapshot);
        self.subscribers
            .write()
            .map_err(|_| LedgerError::LockPoisoned)?
            .push(Subscriber { digest, sender: tx });
        Ok(rx)
    }

    /// Route an update to all subscribers watching its digest.
    /// Subscribers whose channels are closed are pruned.
    pub(crate) fn route(&self, update: &ProofUpdate) -> Result<(), LedgerError> {
        let mut subs = self
            .subscribers
            .write()
            .map_err(|_| LedgerError::LockPoisoned)?;
        subs.retain(|sub| {
            if sub.digest == update.digest {
                // If send fails (no receivers), the subscriber is stale.
                sub.sender.send(update.clone()).is_ok()
            } else {
                // Keep other digests; only prune closed channels.
                sub.sender.receiver_count() > 0
            }
        });
        Ok(())
    }

    /// Number of active subscribers.
    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers.read().map(|subs| subs.len()).unwrap_or(0)
    }
}
