use tracing::debug;

use cpl_crypto::Keypair;
use cpl_ledger::{ComplianceCall, SignedTransaction, TxReceipt};

use crate::error::ClientResult;
use crate::transport::LedgerTransport;

/// Status line reported while a transaction is in flight.
pub const STATUS_SENDING: &str = "Sending transaction...";

/// Sign and submit a call, reporting progress through `status`.
///
/// The account nonce is fetched from the transport immediately before
/// signing. `status` receives [`STATUS_SENDING`] first, then exactly one
/// terminal line: `Included at block N` or `Transaction failed: <reason>`.
pub async fn submit_with_status<T, F>(
    transport: &T,
    keypair: &Keypair,
    call: ComplianceCall,
    mut status: F,
) -> ClientResult<TxReceipt>
where
    T: LedgerTransport + ?Sized,
    F: FnMut(String),
{
    status(STATUS_SENDING.to_string());

    let result = async {
        let nonce = transport.account_nonce(&keypair.account_id()).await?;
        let tx = SignedTransaction::new(keypair, call, nonce)?;
        transport.submit(&tx).await
    }
    .await;

    match result {
        Ok(receipt) => {
            status(format!("Included at block {}", receipt.block));
            debug!(
                tx = %receipt.tx_hash,
                block = receipt.block,
                call = %receipt.call,
                "transaction included"
            );
            Ok(receipt)
        }
        Err(err) => {
            status(format!("Transaction failed: {err}"));
            Err(err)
        }
    }
}
