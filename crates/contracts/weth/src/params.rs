//! WETH deployment and funding

use alloy_primitives::{Bytes, U256};
use deploy_core::{constants::NATIVE_DECIMALS, ContractKind, Error, Result};
use evm_tx::{encode_call, ContractCall, DeploymentSpec};

use crate::constants::DEPOSIT_SIGNATURE;

/// WETH9 takes no constructor arguments
pub struct WethParams;

impl WethParams {
    pub fn build() -> DeploymentSpec {
        DeploymentSpec::leaf(ContractKind::WrappedAsset, Vec::new())
    }
}

/// Parse a human funding amount such as "0.5" into wei.
pub fn parse_funding_amount(amount: &str) -> Result<U256> {
    deploy_core::parse_units(amount, NATIVE_DECIMALS).map_err(|e| Error::from_units("fund", e))
}

/// Calls that wrap `amount` wei into the freshly deployed contract.
/// A zero amount needs no calls.
pub fn funding_calls(amount: U256) -> Vec<ContractCall> {
    if amount.is_zero() {
        return Vec::new();
    }
    vec![ContractCall {
        description: format!(
            "{} with {} native",
            DEPOSIT_SIGNATURE,
            deploy_core::format_units(amount, NATIVE_DECIMALS)
        ),
        data: Bytes::from(encode_call(DEPOSIT_SIGNATURE, &[])),
        value: amount,
    }]
}
