//! Transaction receipts and hex quantity decoding

use alloy_primitives::Address;
use deploy_core::{NodeError, TxHash};
use serde::{Deserialize, Deserializer};

/// Mined transaction receipt (subset of `eth_getTransactionReceipt`)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: TxHash,
    #[serde(deserialize_with = "de_quantity")]
    pub block_number: u64,
    /// 1 = success, 0 = reverted
    #[serde(default, deserialize_with = "de_opt_quantity")]
    pub status: Option<u64>,
    #[serde(default)]
    pub contract_address: Option<Address>,
    #[serde(default, deserialize_with = "de_opt_quantity")]
    pub gas_used: Option<u64>,
}

impl TransactionReceipt {
    pub fn succeeded(&self) -> bool {
        self.status == Some(1)
    }
}

fn quantity_digits(value: &str) -> Result<&str, NodeError> {
    let digits = value
        .strip_prefix("0x")
        .ok_or_else(|| NodeError::ParseError(format!("quantity without 0x prefix: {}", value)))?;
    if digits.is_empty() {
        return Err(NodeError::ParseError("empty quantity".to_string()));
    }
    Ok(digits)
}

/// Parse a JSON-RPC hex quantity such as `0x4268`
pub fn parse_quantity(value: &str) -> Result<u64, NodeError> {
    u64::from_str_radix(quantity_digits(value)?, 16)
        .map_err(|e| NodeError::ParseError(format!("invalid quantity {}: {}", value, e)))
}

/// Like [`parse_quantity`], for values that outgrow `u64` (fees in wei)
pub fn parse_wide_quantity(value: &str) -> Result<u128, NodeError> {
    u128::from_str_radix(quantity_digits(value)?, 16)
        .map_err(|e| NodeError::ParseError(format!("invalid quantity {}: {}", value, e)))
}

fn de_quantity<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_quantity(&raw).map_err(serde::de::Error::custom)
}

fn de_opt_quantity<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_quantity(&raw)
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}
