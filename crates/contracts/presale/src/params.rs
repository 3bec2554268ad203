//! PreSale constructor parameters
//!
//! Constructor: `(address weth, address token, address router, PresaleOption option)`
//! with `PresaleOption` laid out as
//! `(tokenDeposit, hardCap, softCap, max, min, start, end, liquidityBps)`, all `uint256`.

use alloy_primitives::{Address, U256};
use deploy_core::constants::{MAX_BASIS_POINTS, NATIVE_DECIMALS};
use deploy_core::{parse_contract_address, parse_units, ContractKind, Error, Result};
use evm_tx::{ConstructorArg, DeploymentSpec};
use serde::{Deserialize, Serialize};

use crate::calculator::required_token_deposit;
use crate::constants::fields;

/// Operator input in human units
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPresaleParams {
    /// Tokens, in whole-token units of the sale token
    pub token_deposit: String,
    /// Native currency amounts, e.g. "1.5"
    pub hard_cap: String,
    pub soft_cap: String,
    pub max_contribution: String,
    pub min_contribution: String,
    /// Unix seconds
    pub start_timestamp: u64,
    pub end_timestamp: u64,
    pub liquidity_bps: u32,
    /// Optional tokens per whole native unit, enables the deposit coverage check
    #[serde(default)]
    pub rate: Option<String>,
}

/// Scaled and validated presale economics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresaleParameters {
    pub token_deposit: U256,
    pub hard_cap: U256,
    pub soft_cap: U256,
    pub max_contribution: U256,
    pub min_contribution: U256,
    pub start_timestamp: u64,
    pub end_timestamp: u64,
    pub liquidity_bps: u32,
    /// Smallest token units per whole native unit
    pub rate: Option<U256>,
}

fn scale(field: &str, amount: &str, decimals: u8) -> Result<U256> {
    parse_units(amount, decimals).map_err(|e| Error::from_units(field, e))
}

impl PresaleParameters {
    /// Scale `raw` (native amounts with 18 decimals, token amounts with
    /// `token_decimals`) and validate the result.
    pub fn from_raw(raw: &RawPresaleParams, token_decimals: u8) -> Result<Self> {
        let params = Self {
            token_deposit: scale(fields::TOKEN_DEPOSIT, &raw.token_deposit, token_decimals)?,
            hard_cap: scale(fields::HARD_CAP, &raw.hard_cap, NATIVE_DECIMALS)?,
            soft_cap: scale(fields::SOFT_CAP, &raw.soft_cap, NATIVE_DECIMALS)?,
            max_contribution: scale(fields::MAX_CONTRIBUTION, &raw.max_contribution, NATIVE_DECIMALS)?,
            min_contribution: scale(fields::MIN_CONTRIBUTION, &raw.min_contribution, NATIVE_DECIMALS)?,
            start_timestamp: raw.start_timestamp,
            end_timestamp: raw.end_timestamp,
            liquidity_bps: raw.liquidity_bps,
            rate: raw
                .rate
                .as_deref()
                .map(|rate| scale(fields::RATE, rate, token_decimals))
                .transpose()?,
        };
        params.validate()?;

        tracing::debug!(
            hard_cap = %params.hard_cap,
            soft_cap = %params.soft_cap,
            token_deposit = %params.token_deposit,
            "Presale parameters scaled"
        );
        Ok(params)
    }

    /// Check the relationships between fields. The first violation wins and
    /// is reported against the field that has to change.
    pub fn validate(&self) -> Result<()> {
        if self.liquidity_bps > MAX_BASIS_POINTS {
            return Err(Error::invalid(
                fields::LIQUIDITY_BPS,
                format!("{} exceeds {}", self.liquidity_bps, MAX_BASIS_POINTS),
            ));
        }
        if self.hard_cap.is_zero() {
            return Err(Error::invalid(fields::HARD_CAP, "must be greater than zero"));
        }
        if self.soft_cap > self.hard_cap {
            return Err(Error::invalid(
                fields::SOFT_CAP,
                format!("{} must not exceed hardCap {}", self.soft_cap, self.hard_cap),
            ));
        }
        if self.min_contribution > self.max_contribution {
            return Err(Error::invalid(
                fields::MIN_CONTRIBUTION,
                format!(
                    "{} must not exceed maxContribution {}",
                    self.min_contribution, self.max_contribution
                ),
            ));
        }
        if self.max_contribution > self.hard_cap {
            return Err(Error::invalid(
                fields::MAX_CONTRIBUTION,
                format!(
                    "{} must not exceed hardCap {}",
                    self.max_contribution, self.hard_cap
                ),
            ));
        }
        if self.start_timestamp >= self.end_timestamp {
            return Err(Error::invalid(
                fields::END_TIMESTAMP,
                format!(
                    "{} must be after startTimestamp {}",
                    self.end_timestamp, self.start_timestamp
                ),
            ));
        }
        if self.token_deposit.is_zero() {
            return Err(Error::invalid(
                fields::TOKEN_DEPOSIT,
                "must be greater than zero",
            ));
        }
        if let Some(rate) = self.rate {
            let required = required_token_deposit(self.hard_cap, rate, self.liquidity_bps)
                .ok_or_else(|| Error::invalid(fields::RATE, "sale size overflows uint256"))?;
            if self.token_deposit < required {
                return Err(Error::invalid(
                    fields::TOKEN_DEPOSIT,
                    format!(
                        "{} does not cover the sale and liquidity share ({} required)",
                        self.token_deposit, required
                    ),
                ));
            }
        }
        Ok(())
    }

    /// The `PresaleOption` tuple in declaration order
    pub fn option_tuple(&self) -> ConstructorArg {
        ConstructorArg::Tuple(vec![
            ConstructorArg::Uint256(self.token_deposit),
            ConstructorArg::Uint256(self.hard_cap),
            ConstructorArg::Uint256(self.soft_cap),
            ConstructorArg::Uint256(self.max_contribution),
            ConstructorArg::Uint256(self.min_contribution),
            ConstructorArg::Uint256(U256::from(self.start_timestamp)),
            ConstructorArg::Uint256(U256::from(self.end_timestamp)),
            ConstructorArg::Uint256(U256::from(self.liquidity_bps)),
        ])
    }

    pub fn into_spec(self, deps: &PresaleDependencies) -> DeploymentSpec {
        let args = vec![
            ConstructorArg::Address(deps.weth),
            ConstructorArg::Address(deps.token),
            ConstructorArg::Address(deps.router),
            self.option_tuple(),
        ];
        DeploymentSpec::leaf(ContractKind::Presale, args)
            .with_dependency(fields::WETH, deps.weth)
            .with_dependency(fields::TOKEN, deps.token)
            .with_dependency(fields::ROUTER, deps.router)
    }
}

/// Contracts the presale references. They are supplied, never deployed here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresaleDependencies {
    pub weth: Address,
    pub token: Address,
    pub router: Address,
}

impl PresaleDependencies {
    pub fn parse(weth: &str, token: &str, router: &str) -> Result<Self> {
        Ok(Self {
            weth: parse_contract_address(fields::WETH, weth)?,
            token: parse_contract_address(fields::TOKEN, token)?,
            router: parse_contract_address(fields::ROUTER, router)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawPresaleParams {
        RawPresaleParams {
            token_deposit: "1000000".into(),
            hard_cap: "3".into(),
            soft_cap: "1.5".into(),
            max_contribution: "2".into(),
            min_contribution: "0.1".into(),
            start_timestamp: 1_714_880_880,
            end_timestamp: 1_714_881_880,
            liquidity_bps: 5_000,
            rate: None,
        }
    }

    fn ether(amount: &str) -> U256 {
        parse_units(amount, 18).unwrap()
    }

    fn field_of(err: Error) -> String {
        match err {
            Error::InvalidParameter { field, .. } => field,
            other => panic!("expected InvalidParameter, got {:?}", other),
        }
    }

    #[test]
    fn test_reference_sale_is_accepted_and_scaled() {
        let params = PresaleParameters::from_raw(&raw(), 18).unwrap();
        assert_eq!(params.hard_cap, U256::from(3_000_000_000_000_000_000u64));
        assert_eq!(params.soft_cap, U256::from(1_500_000_000_000_000_000u64));
        assert_eq!(params.max_contribution, ether("2"));
        assert_eq!(params.min_contribution, U256::from(100_000_000_000_000_000u64));
        assert_eq!(params.token_deposit, ether("1000000"));
        assert_eq!(params.liquidity_bps, 5_000);
    }

    #[test]
    fn test_token_deposit_uses_token_decimals() {
        let params = PresaleParameters::from_raw(&raw(), 6).unwrap();
        assert_eq!(params.token_deposit, U256::from(1_000_000_000_000u64));
        assert_eq!(params.hard_cap, ether("3"));
    }

    #[test]
    fn test_soft_cap_above_hard_cap() {
        let mut input = raw();
        input.soft_cap = "4".into();
        let err = PresaleParameters::from_raw(&input, 18).unwrap_err();
        assert!(err.is_preflight());
        assert_eq!(field_of(err), "softCap");
    }

    #[test]
    fn test_contribution_bounds() {
        let mut input = raw();
        input.min_contribution = "2.5".into();
        assert_eq!(
            field_of(PresaleParameters::from_raw(&input, 18).unwrap_err()),
            "minContribution"
        );

        let mut input = raw();
        input.max_contribution = "3.01".into();
        assert_eq!(
            field_of(PresaleParameters::from_raw(&input, 18).unwrap_err()),
            "maxContribution"
        );
    }

    #[test]
    fn test_window_must_be_ordered() {
        let mut input = raw();
        input.end_timestamp = input.start_timestamp;
        assert_eq!(
            field_of(PresaleParameters::from_raw(&input, 18).unwrap_err()),
            "endTimestamp"
        );
    }

    #[test]
    fn test_basis_points_bound() {
        let mut input = raw();
        input.liquidity_bps = 10_000;
        assert!(PresaleParameters::from_raw(&input, 18).is_ok());
        input.liquidity_bps = 10_001;
        assert_eq!(
            field_of(PresaleParameters::from_raw(&input, 18).unwrap_err()),
            "liquidityBasisPoints"
        );
    }

    #[test]
    fn test_unscalable_amount_names_field() {
        let mut input = raw();
        input.hard_cap = "3.0000000000000000001".into();
        assert_eq!(
            field_of(PresaleParameters::from_raw(&input, 18).unwrap_err()),
            "hardCap"
        );
    }

    #[test]
    fn test_rate_coverage() {
        // 3 native * 200k = 600k sold, +50% liquidity = 900k needed
        let mut input = raw();
        input.rate = Some("200000".into());
        assert!(PresaleParameters::from_raw(&input, 18).is_ok());

        input.rate = Some("300000".into());
        assert_eq!(
            field_of(PresaleParameters::from_raw(&input, 18).unwrap_err()),
            "tokenDeposit"
        );
    }

    #[test]
    fn test_spec_layout() {
        let deps = PresaleDependencies::parse(
            "0x34D712337b07F5Fa983430A3906573981f368CeA",
            "0x3B0b1e1d718059C45A02983792fBD2585c3d74cC",
            "0x7013DC9544b461dd597FaC8dCecD41A79D143327",
        )
        .unwrap();
        let spec = PresaleParameters::from_raw(&raw(), 18)
            .unwrap()
            .into_spec(&deps);

        assert_eq!(spec.kind, ContractKind::Presale);
        assert_eq!(spec.args.len(), 4);
        assert_eq!(spec.args[0], ConstructorArg::Address(deps.weth));
        assert_eq!(spec.args[2], ConstructorArg::Address(deps.router));
        assert_eq!(
            spec.args[3].sol_type(),
            "(uint256,uint256,uint256,uint256,uint256,uint256,uint256,uint256)"
        );
        let names: Vec<_> = spec.dependencies.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["weth", "token", "router"]);
        // 3 static addresses + 8 static tuple words
        assert_eq!(spec.encoded_args_hex().len(), 11 * 64);
    }

    #[test]
    fn test_zero_dependency_rejected() {
        let err = PresaleDependencies::parse(
            "0x0000000000000000000000000000000000000000",
            "0x3B0b1e1d718059C45A02983792fBD2585c3d74cC",
            "0x7013DC9544b461dd597FaC8dCecD41A79D143327",
        )
        .unwrap_err();
        assert_eq!(field_of(err), "weth");
    }
}
