use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::Json;
use serde_json::json;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

use cpl_ledger::{SignedTransaction, TxReceipt};
use cpl_types::{AccountId, ComplianceRecord, FileDigest};

use crate::error::ServerError;
use crate::server::AppState;

/// Health check handler.
pub async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Node info handler.
pub async fn info_handler(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ServerError> {
    Ok(Json(json!({
        "name": "cpl-node",
        "version": env!("CARGO_PKG_VERSION"),
        "height": state.ledger.height()?,
        "proofs": state.ledger.proof_count()?,
    })))
}

/// Current compliance record for a digest. Vacant when unclaimed.
pub async fn proof_handler(
    State(state): State<AppState>,
    Path(digest): Path<String>,
) -> Result<Json<ComplianceRecord>, ServerError> {
    let digest = parse_digest(&digest)?;
    Ok(Json(state.ledger.proof_of(&digest)?))
}

/// Next expected nonce for an account.
pub async fn nonce_handler(
    State(state): State<AppState>,
    Path(account): Path<String>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let account =
        AccountId::from_hex(&account).map_err(|e| ServerError::BadRequest(e.to_string()))?;
    Ok(Json(json!({ "nonce": state.ledger.account_nonce(&account)? })))
}

/// Submit a signed transaction.
pub async fn submit_handler(
    State(state): State<AppState>,
    Json(tx): Json<SignedTransaction>,
) -> Result<Json<TxReceipt>, ServerError> {
    Ok(Json(state.ledger.submit(&tx)?))
}

/// Stream record changes for a digest as server-sent events.
///
/// The first event is a snapshot of the current record; subsequent events
/// follow applied transactions touching the digest.
pub async fn watch_handler(
    State(state): State<AppState>,
    Path(digest): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, ServerError> {
    let digest = parse_digest(&digest)?;
    let feed = state.ledger.watch(digest)?;
    let stream = BroadcastStream::new(feed)
        .filter_map(|update| update.ok())
        .map(|update| Event::default().json_data(&update));
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

fn parse_digest(s: &str) -> Result<FileDigest, ServerError> {
    FileDigest::from_hex(s).map_err(|e| ServerError::BadRequest(e.to_string()))
}
