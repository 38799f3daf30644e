use std::sync::Arc;

use tokio::net::TcpListener;

use cpl_ledger::ComplianceLedger;

use crate::config::NodeConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;

/// Shared state for request handlers.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<ComplianceLedger>,
}

/// CPL node: an HTTP API in front of a [`ComplianceLedger`].
pub struct Node {
    config: NodeConfig,
    ledger: Arc<ComplianceLedger>,
}

impl Node {
    pub fn new(config: NodeConfig) -> Self {
        let ledger = Arc::new(ComplianceLedger::with_channel_capacity(
            config.channel_capacity,
        ));
        Self { config, ledger }
    }

    /// Build a node around an existing ledger.
    pub fn with_ledger(config: NodeConfig, ledger: Arc<ComplianceLedger>) -> Self {
        Self { config, ledger }
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Handle to the ledger behind the API.
    pub fn ledger(&self) -> Arc<ComplianceLedger> {
        Arc::clone(&self.ledger)
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(AppState {
            ledger: Arc::clone(&self.ledger),
        })
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!("cpl node listening on {}", self.config.bind_addr);
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
