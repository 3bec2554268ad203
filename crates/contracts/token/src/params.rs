//! Token constructor parameters
//!
//! Constructor: `(string name, string symbol, uint256 totalSupply, uint8 decimals)`.
//! `totalSupply` is given in whole tokens.

use alloy_primitives::U256;
use deploy_core::{constants::MAX_DECIMALS, ContractKind, Error, Result};
use evm_tx::{ConstructorArg, DeploymentSpec};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_DECIMALS, DEFAULT_NAME, DEFAULT_SYMBOL, DEFAULT_TOTAL_SUPPLY};

/// Operator input, unvalidated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTokenParams {
    pub name: String,
    pub symbol: String,
    /// Whole tokens, integer
    pub total_supply: String,
    pub decimals: u8,
}

impl Default for RawTokenParams {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            symbol: DEFAULT_SYMBOL.to_string(),
            total_supply: DEFAULT_TOTAL_SUPPLY.to_string(),
            decimals: DEFAULT_DECIMALS,
        }
    }
}

/// Validated token parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenParams {
    pub name: String,
    pub symbol: String,
    pub total_supply: U256,
    pub decimals: u8,
}

impl TokenParams {
    pub fn from_raw(raw: &RawTokenParams) -> Result<Self> {
        let name = raw.name.trim();
        if name.is_empty() {
            return Err(Error::invalid("name", "must not be empty"));
        }
        let symbol = raw.symbol.trim();
        if symbol.is_empty() {
            return Err(Error::invalid("symbol", "must not be empty"));
        }
        if raw.decimals > MAX_DECIMALS {
            return Err(Error::invalid(
                "decimals",
                format!("must be at most {}", MAX_DECIMALS),
            ));
        }

        let total_supply = deploy_core::parse_units(&raw.total_supply, 0)
            .map_err(|e| Error::from_units("totalSupply", e))?;
        if total_supply.is_zero() {
            return Err(Error::invalid("totalSupply", "must be greater than zero"));
        }

        let params = Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
            total_supply,
            decimals: raw.decimals,
        };
        // The contract multiplies on-chain; an overflow there would revert
        params.supply_in_smallest_units()?;
        Ok(params)
    }

    /// Validate `raw` and turn it into a deployment spec
    pub fn build(raw: &RawTokenParams) -> Result<DeploymentSpec> {
        Ok(Self::from_raw(raw)?.to_spec())
    }

    /// `totalSupply * 10^decimals`, the amount minted to the deployer
    pub fn supply_in_smallest_units(&self) -> Result<U256> {
        U256::from(10u64)
            .checked_pow(U256::from(self.decimals))
            .and_then(|scale| self.total_supply.checked_mul(scale))
            .ok_or_else(|| {
                Error::invalid(
                    "totalSupply",
                    format!(
                        "{} tokens with {} decimals overflows uint256",
                        self.total_supply, self.decimals
                    ),
                )
            })
    }

    pub fn constructor_args(&self) -> Vec<ConstructorArg> {
        vec![
            ConstructorArg::String(self.name.clone()),
            ConstructorArg::String(self.symbol.clone()),
            ConstructorArg::Uint256(self.total_supply),
            ConstructorArg::Uint8(self.decimals),
        ]
    }

    pub fn to_spec(&self) -> DeploymentSpec {
        DeploymentSpec::leaf(ContractKind::Token, self.constructor_args())
    }
}
