use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::debug;

use cpl_ledger::{ProofUpdate, SignedTransaction, TxReceipt};
use cpl_types::{AccountId, ComplianceRecord, FileDigest};

use crate::error::{ClientError, ClientResult};
use crate::transport::{LedgerInfo, LedgerTransport, ProofEvents};

#[derive(Deserialize)]
struct NonceResponse {
    nonce: u64,
}

/// Transport over the HTTP API of a remote node.
pub struct HttpTransport {
    base_url: String,
    /// Bounded client for request/response calls.
    client: reqwest::Client,
    /// Connect-bounded client without a total timeout, for watch streams.
    stream_client: reqwest::Client,
}

impl HttpTransport {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        Self::with_timeout(base_url, Self::DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> ClientResult<Self> {
        let base_url = base_url.into();
        if base_url.trim().is_empty() {
            return Err(ClientError::Config("node url is empty".into()));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build http client: {e}")))?;
        let stream_client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build http client: {e}")))?;
        Ok(Self {
            base_url,
            client,
            stream_client,
        })
    }

    /// Base URL of the node this transport talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn join(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let url = self.join(path);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        map_response(resp).await
    }
}

#[async_trait]
impl LedgerTransport for HttpTransport {
    async fn query_proof(&self, digest: &FileDigest) -> ClientResult<ComplianceRecord> {
        self.get_json(&format!("/v1/proofs/{}", digest.to_hex())).await
    }

    async fn account_nonce(&self, account: &AccountId) -> ClientResult<u64> {
        let resp: NonceResponse = self
            .get_json(&format!("/v1/accounts/{}/nonce", account.to_hex()))
            .await?;
        Ok(resp.nonce)
    }

    async fn submit(&self, tx: &SignedTransaction) -> ClientResult<TxReceipt> {
        let url = self.join("/v1/transactions");
        let resp = self
            .client
            .post(&url)
            .json(tx)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        map_response(resp).await
    }

    async fn subscribe(&self, digest: &FileDigest) -> ClientResult<ProofEvents> {
        let url = self.join(&format!("/v1/proofs/{}/watch", digest.to_hex()));
        let resp = self
            .stream_client
            .get(&url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                reason: extract_error(&body),
            });
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let pump = tokio::spawn(pump_sse(resp, tx));
        Ok(ProofEvents::new(rx, pump))
    }

    async fn info(&self) -> ClientResult<LedgerInfo> {
        self.get_json("/v1/info").await
    }
}

/// Read an SSE body chunk by chunk, forwarding each `data:` line as a
/// decoded [`ProofUpdate`]. Keep-alive comments and blank lines are skipped.
async fn pump_sse(mut resp: reqwest::Response, tx: mpsc::UnboundedSender<ProofUpdate>) {
    let mut buf = String::new();
    loop {
        let chunk = match resp.chunk().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => break,
            Err(err) => {
                debug!(error = %err, "watch stream ended");
                break;
            }
        };
        buf.push_str(&String::from_utf8_lossy(&chunk));
        while let Some(pos) = buf.find('\n') {
            let line: String = buf.drain(..=pos).collect();
            let line = line.trim_end();
            let Some(data) = line.strip_prefix("data:") else {
                continue;
            };
            match serde_json::from_str::<ProofUpdate>(data.trim_start()) {
                Ok(update) => {
                    if tx.send(update).is_err() {
                        return;
                    }
                }
                Err(err) => debug!(error = %err, "skipping malformed watch event"),
            }
        }
    }
}

fn extract_error(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

fn map_reqwest_error(err: reqwest::Error) -> ClientError {
    if err.is_body() || err.is_decode() {
        return ClientError::Decode(err.to_string());
    }
    ClientError::Network(err.to_string())
}

async fn map_response<T: DeserializeOwned>(resp: reqwest::Response) -> ClientResult<T> {
    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| ClientError::Network(e.to_string()))?;
    if !status.is_success() {
        return Err(ClientError::Rejected {
            status: status.as_u16(),
            reason: extract_error(&body),
        });
    }
    serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use cpl_crypto::Keypair;
    use cpl_ledger::{ComplianceCall, ComplianceLedger};
    use cpl_node::{Node, NodeConfig};

    use super::*;

    async fn spawn_node() -> (String, Arc<ComplianceLedger>) {
        let ledger = Arc::new(ComplianceLedger::new());
        let node = Node::with_ledger(NodeConfig::default(), Arc::clone(&ledger));
        let router = node.router();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        (format!("http://{addr}"), ledger)
    }

    async fn next_update(events: &mut ProofEvents) -> ProofUpdate {
        tokio::time::timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("timed out waiting for watch update")
            .expect("watch feed closed")
    }

    #[tokio::test]
    async fn query_and_submit_roundtrip() {
        let (url, _ledger) = spawn_node().await;
        let transport = HttpTransport::new(url).unwrap();
        let kp = Keypair::generate();
        let digest = FileDigest::of_content(b"remote file");

        assert!(!transport.query_proof(&digest).await.unwrap().is_active());

        let nonce = transport.account_nonce(&kp.account_id()).await.unwrap();
        let tx =
            SignedTransaction::new(&kp, ComplianceCall::CreateCompliance(digest), nonce).unwrap();
        let receipt = transport.submit(&tx).await.unwrap();
        assert_eq!(receipt.block, 1);
        assert_eq!(receipt.digest, digest);

        let record = transport.query_proof(&digest).await.unwrap();
        assert!(record.is_owned_by(&kp.account_id()));

        let info = transport.info().await.unwrap();
        assert_eq!(info.name, "cpl-node");
        assert_eq!(info.height, 1);
    }

    #[tokio::test]
    async fn rejection_carries_status_and_reason() {
        let (url, _ledger) = spawn_node().await;
        let transport = HttpTransport::new(url).unwrap();
        let kp = Keypair::generate();
        let digest = FileDigest::of_content(b"claimed twice");

        let tx =
            SignedTransaction::new(&kp, ComplianceCall::CreateCompliance(digest), 0).unwrap();
        transport.submit(&tx).await.unwrap();

        let tx =
            SignedTransaction::new(&kp, ComplianceCall::CreateCompliance(digest), 1).unwrap();
        let err = transport.submit(&tx).await.unwrap_err();
        match err {
            ClientError::Rejected { status, reason } => {
                assert_eq!(status, 409);
                assert!(reason.contains("already complianced"));
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn subscribe_streams_snapshot_then_updates() {
        let (url, ledger) = spawn_node().await;
        let transport = HttpTransport::new(url).unwrap();
        let kp = Keypair::generate();
        let digest = FileDigest::of_content(b"streamed");

        let mut events = transport.subscribe(&digest).await.unwrap();
        let snapshot = next_update(&mut events).await;
        assert_eq!(snapshot.digest, digest);
        assert!(!snapshot.record.is_active());

        let tx =
            SignedTransaction::new(&kp, ComplianceCall::CreateCompliance(digest), 0).unwrap();
        ledger.submit(&tx).unwrap();

        let update = next_update(&mut events).await;
        assert!(update.record.is_owned_by(&kp.account_id()));

        let tx =
            SignedTransaction::new(&kp, ComplianceCall::RevokeCompliance(digest), 1).unwrap();
        ledger.submit(&tx).unwrap();

        let update = next_update(&mut events).await;
        assert!(!update.record.is_active());
    }

    #[tokio::test]
    async fn subscribe_rejects_malformed_digest() {
        let (url, _ledger) = spawn_node().await;
        let transport = HttpTransport::new(format!("{url}/")).unwrap();

        // Malformed digest goes through the same endpoint shape; exercise it
        // via a raw path to keep the transport signature type-safe.
        let resp = transport
            .stream_client
            .get(transport.join("/v1/proofs/nothex/watch"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 400);
    }

    #[tokio::test]
    async fn unreachable_node_is_a_network_error() {
        // Port 2 on loopback is assumed closed.
        let transport =
            HttpTransport::with_timeout("http://127.0.0.1:2", Duration::from_millis(300)).unwrap();
        let err = transport
            .query_proof(&FileDigest::of_content(b"x"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
    }

    #[test]
    fn empty_url_is_a_config_error() {
        assert!(matches!(
            HttpTransport::new(""),
            Err(ClientError::Config(_))
        ));
    }

    #[test]
    fn join_normalizes_slashes() {
        let transport = HttpTransport::new("http://localhost:9933/").unwrap();
        assert_eq!(
            transport.join("/v1/health"),
            "http://localhost:9933/v1/health"
        );
    }
}
