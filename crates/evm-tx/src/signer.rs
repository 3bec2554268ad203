//! In-process transaction signing
//!
//! Remote endpoints hold no keys, so deployments to them are signed here and
//! broadcast with `eth_sendRawTransaction`. Transactions are EIP-1559 typed
//! envelopes; nonce, gas and fees come from the node as a [`TxFill`].

use std::fmt;

use alloy_consensus::{SignableTransaction, TxEip1559, TxEnvelope};
use alloy_eips::eip2718::Encodable2718;
use alloy_primitives::{Address, Bytes, TxKind, B256, U256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use deploy_core::{Error, PrivateKey, Result, DEPLOYER_PRIVATE_KEY_VAR};

use crate::request::TransactionRequest;

/// Extra gas on top of the node's estimate, in percent
pub const GAS_HEADROOM_PERCENT: u64 = 20;

/// Node-supplied fields that complete a [`TransactionRequest`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxFill {
    pub chain_id: u64,
    pub nonce: u64,
    pub gas_limit: u64,
    pub max_fee_per_gas: u128,
    pub max_priority_fee_per_gas: u128,
}

/// Gas limit with headroom applied to a node estimate
pub fn gas_with_headroom(estimate: u64) -> u64 {
    estimate.saturating_add(estimate.saturating_mul(GAS_HEADROOM_PERCENT) / 100)
}

/// Fee cap that survives the base fee doubling before inclusion
pub fn max_fee_per_gas(base_fee: u128, priority_fee: u128) -> u128 {
    base_fee.saturating_mul(2).saturating_add(priority_fee)
}

/// A signed transaction ready for `eth_sendRawTransaction`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub hash: B256,
    pub raw: Bytes,
}

/// Deployer key held in memory
#[derive(Clone)]
pub struct LocalWallet {
    signer: PrivateKeySigner,
}

impl LocalWallet {
    pub fn from_key(key: &PrivateKey) -> Result<Self> {
        let signer = PrivateKeySigner::from_bytes(key.as_bytes())
            .map_err(|e| Error::invalid(DEPLOYER_PRIVATE_KEY_VAR, e.to_string()))?;
        Ok(Self { signer })
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Sign `tx` as an EIP-1559 transaction completed by `fill`.
    ///
    /// `tx.from` must be this wallet's address.
    pub fn sign(&self, tx: &TransactionRequest, fill: &TxFill) -> Result<SignedTransaction> {
        if tx.from != self.address() {
            return Err(Error::invalid(
                "from",
                format!("{} is not the signing account {}", tx.from, self.address()),
            ));
        }

        let unsigned = TxEip1559 {
            chain_id: fill.chain_id,
            nonce: fill.nonce,
            gas_limit: fill.gas_limit,
            max_fee_per_gas: fill.max_fee_per_gas,
            max_priority_fee_per_gas: fill.max_priority_fee_per_gas,
            to: match tx.to {
                Some(to) => TxKind::Call(to),
                None => TxKind::Create,
            },
            value: tx.value.unwrap_or(U256::ZERO),
            input: tx.data.clone(),
            ..Default::default()
        };

        let signature = self
            .signer
            .sign_hash_sync(&unsigned.signature_hash())
            .map_err(|e| Error::invalid(DEPLOYER_PRIVATE_KEY_VAR, e.to_string()))?;
        let envelope = TxEnvelope::from(unsigned.into_signed(signature));

        Ok(SignedTransaction {
            hash: *envelope.tx_hash(),
            raw: Bytes::from(envelope.encoded_2718()),
        })
    }
}

impl fmt::Debug for LocalWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalWallet")
            .field("address", &self.address())
            .finish()
    }
}
