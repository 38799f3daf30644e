use serde::{Deserialize, Serialize};

use crate::account::AccountId;

/// Ownership claim for a file digest.
///
/// A record is *active* when its `block` is non-zero: the digest was claimed
/// by `owner` in the block minted at that height. The vacant record (zero
/// owner, zero block) stands in for digests that were never claimed or whose
/// claim was revoked. Blocks are numbered from 1, so an active record can
/// never be confused with a vacant one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceRecord {
    /// Account that claimed the digest.
    pub owner: AccountId,
    /// Block height at which the claim was minted. Zero means vacant.
    pub block: u64,
}

impl ComplianceRecord {
    /// Create an active record.
    pub fn new(owner: AccountId, block: u64) -> Self {
        Self { owner, block }
    }

    /// The vacant record: no owner, no block.
    pub const fn vacant() -> Self {
        Self {
            owner: AccountId::vacant(),
            block: 0,
        }
    }

    /// Returns `true` if the digest is currently claimed.
    pub fn is_active(&self) -> bool {
        self.block != 0
    }

    /// Returns `true` if the record is active and owned by `account`.
    pub fn is_owned_by(&self, account: &AccountId) -> bool {
        self.is_active() && self.owner == *account
    }
}

impl Default for ComplianceRecord {
    fn default() -> Self {
        Self::vacant()
    }
}
