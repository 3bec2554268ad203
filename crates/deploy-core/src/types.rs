//! Core type definitions for the deployer

use std::fmt;
use std::str::FromStr;

use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// The closed set of contracts this deployer knows how to ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContractKind {
    /// Fungible token
    Token,
    /// Wrapped native asset (WETH9)
    WrappedAsset,
    /// Presale / crowdsale
    Presale,
}

impl ContractKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::WrappedAsset => "wrapped-asset",
            Self::Presale => "presale",
        }
    }

    /// Contract name as it appears in the compiled artifacts
    pub fn contract_name(&self) -> &'static str {
        match self {
            Self::Token => "KingToken",
            Self::WrappedAsset => "WETH9",
            Self::Presale => "PreSale",
        }
    }
}

impl fmt::Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transaction hash (32 bytes, 0x-prefixed hex)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(pub String);

impl TxHash {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Block height
pub type BlockNumber = u64;

/// Parse a 0x-prefixed 20-byte hex address, naming `field` on failure.
pub fn parse_address(field: &str, value: &str) -> Result<Address> {
    let value = value.trim();
    if !value.starts_with("0x") {
        return Err(Error::invalid(field, "address must start with '0x'"));
    }
    if value.len() != 42 {
        return Err(Error::invalid(
            field,
            "address must be 42 characters (0x + 40 hex chars)",
        ));
    }
    if !value[2..].chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::invalid(field, "address contains non-hex characters"));
    }
    Address::from_str(value).map_err(|e| Error::invalid(field, e.to_string()))
}

/// Like [`parse_address`], but the zero address is rejected. Used for
/// addresses of contracts that must already exist.
pub fn parse_contract_address(field: &str, value: &str) -> Result<Address> {
    let address = parse_address(field, value)?;
    if address == Address::ZERO {
        return Err(Error::invalid(field, "zero address is not a contract"));
    }
    Ok(address)
}

/// Raw secp256k1 signing key read from the environment.
///
/// Never printed and never serialized; `Debug` shows a placeholder.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey(B256);

impl PrivateKey {
    /// Parse 32 bytes of hex, with or without the `0x` prefix.
    pub fn parse(field: &str, value: &str) -> Result<Self> {
        let value = value.trim();
        let digits = value.strip_prefix("0x").unwrap_or(value);
        if digits.len() != 64 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::invalid(field, "private key must be 32 bytes of hex"));
        }
        let key = B256::from_str(digits).map_err(|_| Error::invalid(field, "malformed private key"))?;
        if key == B256::ZERO {
            return Err(Error::invalid(field, "private key must not be zero"));
        }
        Ok(Self(key))
    }

    pub fn as_bytes(&self) -> &B256 {
        &self.0
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(..)")
    }
}

/// Constants
pub mod constants {
    /// Decimal precision of the native currency (ETH and its testnets)
    pub const NATIVE_DECIMALS: u8 = 18;

    /// 100% in basis points
    pub const MAX_BASIS_POINTS: u32 = 10_000;

    /// Largest precision for which 10^decimals still fits in a uint256
    pub const MAX_DECIMALS: u8 = 77;
}
