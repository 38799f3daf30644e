use std::path::Path;
use std::sync::{Arc, RwLock};

use tokio::task::JoinHandle;
use tracing::debug;

use cpl_crypto::Keypair;
use cpl_ledger::{ComplianceCall, TxReceipt};
use cpl_types::{AccountId, ComplianceRecord, FileDigest};

use crate::error::{ClientError, ClientResult};
use crate::submitter::submit_with_status;
use crate::transport::LedgerTransport;

#[derive(Debug, Default)]
struct SessionState {
    digest: Option<FileDigest>,
    record: ComplianceRecord,
    status: String,
    /// Bumped on every re-selection and on close, so a pump task spawned
    /// for an earlier selection can never write into the current one.
    generation: u64,
}

/// Stateful view over one selected file: its digest, the live proof
/// record for that digest, and the status line of the last submission.
///
/// Selecting a file tears down the previous watch before the new one is
/// established, and watch updates are applied in the background until
/// the session is re-pointed or closed.
pub struct ProofSession<T: LedgerTransport> {
    transport: T,
    keypair: Keypair,
    shared: Arc<RwLock<SessionState>>,
    watch: Option<JoinHandle<()>>,
}

impl<T: LedgerTransport> ProofSession<T> {
    pub fn new(transport: T, keypair: Keypair) -> Self {
        Self {
            transport,
            keypair,
            shared: Arc::new(RwLock::new(SessionState::default())),
            watch: None,
        }
    }

    /// Account that signs everything submitted through this session.
    pub fn account_id(&self) -> AccountId {
        self.keypair.account_id()
    }

    /// Point the session at a file on disk.
    pub async fn select_file(&mut self, path: impl AsRef<Path>) -> ClientResult<FileDigest> {
        let content = tokio::fs::read(path).await?;
        self.select_bytes(&content).await
    }

    /// Point the session at file content already in memory. The previous
    /// watch is stopped first, the state is reset to a vacant record for
    /// the new digest, and only then is the new subscription opened.
    pub async fn select_bytes(&mut self, content: &[u8]) -> ClientResult<FileDigest> {
        self.stop_watch();
        let digest = FileDigest::of_content(content);

        let generation = {
            let mut state = self.shared.write().map_err(|_| ClientError::StatePoisoned)?;
            state.generation += 1;
            state.digest = Some(digest);
            state.record = ComplianceRecord::vacant();
            state.status.clear();
            state.generation
        };

        let mut events = self.transport.subscribe(&digest).await?;
        debug!(digest = %digest.short_hex(), "session watching digest");

        let shared = Arc::clone(&self.shared);
        self.watch = Some(tokio::spawn(async move {
            while let Some(update) = events.recv().await {
                let Ok(mut state) = shared.write() else {
                    return;
                };
                if state.generation != generation {
                    return;
                }
                state.record = update.record;
            }
        }));
        Ok(digest)
    }

    /// Digest of the currently selected file, if any.
    pub fn digest(&self) -> ClientResult<Option<FileDigest>> {
        Ok(self.read_state()?.digest)
    }

    /// Latest record observed for the selected digest.
    pub fn record(&self) -> ClientResult<ComplianceRecord> {
        Ok(self.read_state()?.record)
    }

    /// Status line of the most recent submission.
    pub fn status(&self) -> ClientResult<String> {
        Ok(self.read_state()?.status.clone())
    }

    pub fn is_complianced(&self) -> ClientResult<bool> {
        Ok(self.read_state()?.record.is_active())
    }

    /// A claim can be sent when a file is selected and its digest is not
    /// already claimed by anyone.
    pub fn can_create(&self) -> ClientResult<bool> {
        let state = self.read_state()?;
        Ok(state.digest.is_some() && !state.record.is_active())
    }

    /// A revocation can be sent only by the current owner of an active
    /// record.
    pub fn can_revoke(&self) -> ClientResult<bool> {
        Ok(self.read_state()?.record.is_owned_by(&self.account_id()))
    }

    /// Claim the selected digest for this session's account.
    pub async fn create(&self) -> ClientResult<TxReceipt> {
        let digest = {
            let state = self.read_state()?;
            let digest = state
                .digest
                .ok_or(ClientError::NotEligible("no file selected"))?;
            if state.record.is_active() {
                return Err(ClientError::NotEligible("digest is already complianced"));
            }
            digest
        };
        self.submit_call(ComplianceCall::CreateCompliance(digest)).await
    }

    /// Revoke the active record for the selected digest.
    pub async fn revoke(&self) -> ClientResult<TxReceipt> {
        let digest = {
            let state = self.read_state()?;
            let digest = state
                .digest
                .ok_or(ClientError::NotEligible("no file selected"))?;
            if !state.record.is_active() {
                return Err(ClientError::NotEligible("no active record for digest"));
            }
            if state.record.owner != self.account_id() {
                return Err(ClientError::NotEligible(
                    "record is owned by another account",
                ));
            }
            digest
        };
        self.submit_call(ComplianceCall::RevokeCompliance(digest)).await
    }

    /// Tear down the watch. The last observed state stays readable, but
    /// no further updates are applied.
    pub fn close(&mut self) {
        self.stop_watch();
        if let Ok(mut state) = self.shared.write() {
            state.generation += 1;
        }
    }

    fn stop_watch(&mut self) {
        if let Some(watch) = self.watch.take() {
            watch.abort();
        }
    }

    fn read_state(&self) -> ClientResult<std::sync::RwLockReadGuard<'_, SessionState>> {
        self.shared.read().map_err(|_| ClientError::StatePoisoned)
    }

    async fn submit_call(&self, call: ComplianceCall) -> ClientResult<TxReceipt> {
        let shared = Arc::clone(&self.shared);
        let sink = move |line: String| {
            if let Ok(mut state) = shared.write() {
                state.status = line;
            }
        };
        submit_with_status(&self.transport, &self.keypair, call, sink).await
    }
}

impl<T: LedgerTransport> Drop for ProofSession<T> {
    fn drop(&mut self) {
        self.close();
    }
}
