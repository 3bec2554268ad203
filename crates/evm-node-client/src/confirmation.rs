//! Confirmation wait
//!
//! Polls for the receipt of a submitted transaction until it is buried under
//! the requested number of blocks, reverts, or the wait times out. A timeout
//! does not mean the transaction failed: its fate must be reconciled later.

use std::time::Duration;

use deploy_core::{BlockNumber, NodeError, TxHash};
use tokio::time::Instant;

use crate::receipt::TransactionReceipt;
use crate::{Result, RpcClient};

/// Read access needed to follow a transaction to confirmation
#[allow(async_fn_in_trait)]
pub trait ReceiptSource {
    async fn transaction_receipt(&self, tx_hash: &TxHash) -> Result<Option<TransactionReceipt>>;
    async fn block_number(&self) -> Result<BlockNumber>;
}

impl ReceiptSource for RpcClient {
    async fn transaction_receipt(&self, tx_hash: &TxHash) -> Result<Option<TransactionReceipt>> {
        RpcClient::transaction_receipt(self, tx_hash).await
    }

    async fn block_number(&self) -> Result<BlockNumber> {
        RpcClient::block_number(self).await
    }
}

/// How long and how deep to wait
#[derive(Debug, Clone)]
pub struct ConfirmationPolicy {
    /// Blocks including the inclusion block; 1 = mined
    pub confirmations: u64,
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            confirmations: 1,
            poll_interval: Duration::from_secs(2),
            timeout: Duration::from_secs(300),
        }
    }
}

/// Final state of a mined transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed(TransactionReceipt),
    Reverted(TransactionReceipt),
}

impl Confirmation {
    pub fn receipt(&self) -> &TransactionReceipt {
        match self {
            Self::Confirmed(receipt) | Self::Reverted(receipt) => receipt,
        }
    }
}

/// Suspend until `tx_hash` is confirmed or reverted.
///
/// Transient read failures are logged and polled through. Exceeding
/// `policy.timeout` yields `NodeError::ConfirmationTimeout`.
pub async fn wait_for_confirmation<S: ReceiptSource>(
    source: &S,
    tx_hash: &TxHash,
    policy: &ConfirmationPolicy,
) -> Result<Confirmation> {
    let started = Instant::now();
    let depth = policy.confirmations.max(1);

    loop {
        match source.transaction_receipt(tx_hash).await {
            Ok(Some(receipt)) if !receipt.succeeded() => {
                return Ok(Confirmation::Reverted(receipt));
            }
            Ok(Some(receipt)) => {
                if depth == 1 {
                    return Ok(Confirmation::Confirmed(receipt));
                }
                match source.block_number().await {
                    Ok(head) if head + 1 >= receipt.block_number + depth => {
                        return Ok(Confirmation::Confirmed(receipt));
                    }
                    Ok(head) => {
                        tracing::debug!(
                            tx_hash = %tx_hash,
                            have = head + 1 - receipt.block_number.min(head + 1),
                            want = depth,
                            "Waiting for confirmations"
                        );
                    }
                    Err(e) if e.is_transient() => {
                        tracing::warn!(tx_hash = %tx_hash, "Block number unavailable: {}", e);
                    }
                    Err(e) => return Err(e),
                }
            }
            Ok(None) => {
                tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
            }
            Err(e) if e.is_transient() => {
                tracing::warn!(tx_hash = %tx_hash, "Receipt lookup failed, retrying: {}", e);
            }
            Err(e) => return Err(e),
        }

        if started.elapsed() >= policy.timeout {
            return Err(NodeError::ConfirmationTimeout {
                tx_hash: tx_hash.to_string(),
                waited_secs: started.elapsed().as_secs(),
            });
        }

        tokio::time::sleep(policy.poll_interval).await;
    }
}
