//! The chain as the pipeline sees it
//!
//! [`ChainClient`] is the write-side seam: submit a transaction, wait for it,
//! read code. [`RpcChain`] implements it over JSON-RPC for a resolved profile,
//! signing locally when the profile carries a private key.

use std::time::Duration;

use alloy_primitives::{Address, Bytes};
use deploy_core::{
    BlockNumber, Error, NetworkProfile, NodeError, Result, RuntimeConfig, SignerSource, TxHash,
    DEPLOYER_PRIVATE_KEY_VAR,
};
use evm_node_client::{wait_for_confirmation, Confirmation, ConfirmationPolicy, RpcClient};
use evm_tx::{gas_with_headroom, max_fee_per_gas, LocalWallet, TransactionRequest, TxFill};

/// Operations the deployer and actuator need from a network
#[allow(async_fn_in_trait)]
pub trait ChainClient {
    /// Signing identity; `None` for read-only connections
    fn sender(&self) -> Option<Address>;

    /// Broadcast one transaction. Never retried by the implementation.
    async fn submit(&self, tx: &TransactionRequest) -> std::result::Result<TxHash, NodeError>;

    async fn await_confirmation(
        &self,
        tx_hash: &TxHash,
    ) -> std::result::Result<Confirmation, NodeError>;

    /// Deployed code at `address`; empty when nothing is deployed there
    async fn code_at(&self, address: Address) -> std::result::Result<Bytes, NodeError>;

    /// Why `tx` reverted when mined in `block`, found by replaying it on the
    /// parent state. `None` when the node gives no reason.
    async fn revert_reason(&self, tx: &TransactionRequest, block: BlockNumber) -> Option<String>;
}

/// Confirmation settings for `profile`, with run-level overrides applied
pub fn confirmation_policy(profile: &NetworkProfile, runtime: &RuntimeConfig) -> ConfirmationPolicy {
    ConfirmationPolicy {
        confirmations: runtime.confirmations.unwrap_or(profile.confirmations).max(1),
        poll_interval: Duration::from_millis(runtime.poll_interval_ms),
        timeout: Duration::from_secs(runtime.confirmation_timeout_secs),
    }
}

/// JSON-RPC backed [`ChainClient`]
pub struct RpcChain {
    client: RpcClient,
    chain_id: u64,
    sender: Option<Address>,
    wallet: Option<LocalWallet>,
    policy: ConfirmationPolicy,
}

impl RpcChain {
    /// Connect to the profile's node, check it serves the expected chain and
    /// resolve the signing account.
    pub async fn connect(profile: &NetworkProfile, policy: ConfirmationPolicy) -> Result<Self> {
        let wallet = local_wallet(profile)?;
        let client = RpcClient::new(profile.rpc_url.clone())?;

        let actual = client.chain_id().await?;
        if actual != profile.chain_id {
            return Err(Error::ChainIdMismatch {
                network: profile.name.clone(),
                expected: profile.chain_id,
                actual,
            });
        }

        let sender = match &profile.signer {
            Some(SignerSource::LocalKey(_)) => wallet.as_ref().map(LocalWallet::address),
            Some(SignerSource::Account(address)) => Some(*address),
            Some(SignerSource::NodeDefault) => {
                let accounts = client.accounts().await?;
                let first = accounts
                    .first()
                    .copied()
                    .ok_or_else(|| Error::missing(DEPLOYER_PRIVATE_KEY_VAR))?;
                Some(first)
            }
            None => None,
        };

        tracing::info!(
            network = %profile.name,
            chain_id = actual,
            confirmations = policy.confirmations,
            local_signing = wallet.is_some(),
            "Connected to {}",
            profile.rpc_url
        );

        Ok(Self {
            client,
            chain_id: actual,
            sender,
            wallet,
            policy,
        })
    }

    /// Nonce, gas and fees for `tx` as the node sees them now
    async fn fill(&self, tx: &TransactionRequest) -> std::result::Result<TxFill, NodeError> {
        let nonce = self.client.transaction_count(tx.from).await?;
        let gas_limit = gas_with_headroom(self.client.estimate_gas(tx).await?);
        let priority = self.client.max_priority_fee().await?;
        let base_fee = self.client.latest_base_fee().await?.unwrap_or_default();
        Ok(TxFill {
            chain_id: self.chain_id,
            nonce,
            gas_limit,
            max_fee_per_gas: max_fee_per_gas(base_fee, priority),
            max_priority_fee_per_gas: priority,
        })
    }
}

/// The in-process signer for `profile`, built before any network call so a
/// bad key fails the run up front.
fn local_wallet(profile: &NetworkProfile) -> Result<Option<LocalWallet>> {
    match &profile.signer {
        Some(SignerSource::LocalKey(key)) => LocalWallet::from_key(key).map(Some),
        _ => Ok(None),
    }
}

impl ChainClient for RpcChain {
    fn sender(&self) -> Option<Address> {
        self.sender
    }

    async fn submit(&self, tx: &TransactionRequest) -> std::result::Result<TxHash, NodeError> {
        let Some(wallet) = &self.wallet else {
            return self.client.send_transaction(tx).await;
        };
        let fill = self.fill(tx).await?;
        let signed = wallet
            .sign(tx, &fill)
            .map_err(|e| NodeError::Signing(e.to_string()))?;
        tracing::debug!(
            nonce = fill.nonce,
            gas_limit = fill.gas_limit,
            max_fee_per_gas = fill.max_fee_per_gas,
            tx_hash = %signed.hash,
            "Signed transaction"
        );
        self.client.send_raw_transaction(&signed.raw).await
    }

    async fn await_confirmation(
        &self,
        tx_hash: &TxHash,
    ) -> std::result::Result<Confirmation, NodeError> {
        wait_for_confirmation(&self.client, tx_hash, &self.policy).await
    }

    async fn code_at(&self, address: Address) -> std::result::Result<Bytes, NodeError> {
        self.client.code_at(address).await
    }

    async fn revert_reason(&self, tx: &TransactionRequest, block: BlockNumber) -> Option<String> {
        match self.client.call(tx, block.saturating_sub(1)).await {
            Err(NodeError::Rpc { message, .. }) => Some(message),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(error = %e, "Could not replay reverted transaction");
                None
            }
        }
    }
}
