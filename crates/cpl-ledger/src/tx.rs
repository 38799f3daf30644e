use serde::{Deserialize, Serialize};

use cpl_crypto::{DigestHasher, Keypair, Signature, VerifyingKey};
use cpl_types::{AccountId, FileDigest};

use crate::error::LedgerError;

/// Operation requested by a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "call", content = "digest", rename_all = "snake_case")]
pub enum ComplianceCall {
    /// Claim a digest for the signing account.
    CreateCompliance(FileDigest),
    /// Release a digest claimed by the signing account.
    RevokeCompliance(FileDigest),
}

impl ComplianceCall {
    /// The digest the call operates on.
    pub fn digest(&self) -> FileDigest {
        match self {
            Self::CreateCompliance(d) | Self::RevokeCompliance(d) => *d,
        }
    }

    /// The call kind, without its digest.
    pub fn kind(&self) -> CallKind {
        match self {
            Self::CreateCompliance(_) => CallKind::CreateCompliance,
            Self::RevokeCompliance(_) => CallKind::RevokeCompliance,
        }
    }
}

/// Discriminant of a [`ComplianceCall`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallKind {
    CreateCompliance,
    RevokeCompliance,
}

impl CallKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateCompliance => "create_compliance",
            Self::RevokeCompliance => "revoke_compliance",
        }
    }
}

impl std::fmt::Display for CallKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A call signed by the submitting account.
///
/// The signature covers the domain-separated hash of the bincode encoding of
/// `(call, signer, nonce)`, so a signature cannot be replayed for a different
/// call, account, or nonce.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub call: ComplianceCall,
    pub signer: VerifyingKey,
    pub nonce: u64,
    pub signature: Signature,
}

impl SignedTransaction {
    /// Build and sign a transaction.
    pub fn new(keypair: &Keypair, call: ComplianceCall, nonce: u64) -> Result<Self, LedgerError> {
        let signer = keypair.verifying_key();
        let payload = signing_payload(&call, &signer, nonce)?;
        let signature = keypair.sign(&payload);
        Ok(Self {
            call,
            signer,
            nonce,
            signature,
        })
    }

    /// Check the signature against the embedded signer key.
    pub fn verify(&self) -> Result<(), LedgerError> {
        let payload = signing_payload(&self.call, &self.signer, self.nonce)?;
        self.signer
            .verify(&payload, &self.signature)
            .map_err(|_| LedgerError::BadSignature)
    }

    /// Identity of the signing account.
    pub fn account_id(&self) -> AccountId {
        self.signer.account_id()
    }

    /// Hex transaction identifier: domain-separated hash of the full signed
    /// encoding.
    pub fn hash_hex(&self) -> Result<String, LedgerError> {
        let encoded = bincode::serialize(self).map_err(|e| LedgerError::Codec(e.to_string()))?;
        Ok(DigestHasher::TX_ID.hash_hex(&encoded))
    }
}

fn signing_payload(
    call: &ComplianceCall,
    signer: &VerifyingKey,
    nonce: u64,
) -> Result<Vec<u8>, LedgerError> {
    let encoded = bincode::serialize(&(call, signer, nonce))
        .map_err(|e| LedgerError::Codec(e.to_string()))?;
    Ok(DigestHasher::TX_PAYLOAD.hash(&encoded).to_vec())
}

/// Outcome of a successfully included transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    /// Hex transaction identifier.
    pub tx_hash: String,
    /// Block height the transaction was included at.
    pub block: u64,
    /// Digest the call operated on.
    pub digest: FileDigest,
    /// Which call was executed.
    pub call: CallKind,
}
