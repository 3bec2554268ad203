//! Contract deployer
//!
//! Sends exactly one creation transaction per call and follows it to a
//! confirmed or failed state. A failed creation is never resubmitted here:
//! a second attempt would land at a different address.

use alloy_primitives::Address;
use deploy_core::{Error, NodeError, Result, DEPLOYER_PRIVATE_KEY_VAR};
use evm_node_client::Confirmation;
use evm_tx::{ContractArtifact, DeploymentSpec, TransactionRequest};

use crate::chain::ChainClient;
use crate::ledger::DeploymentResult;

/// Fail with `UnresolvedDependency` unless every dependency of `spec` has code.
pub async fn check_dependencies<C: ChainClient>(chain: &C, spec: &DeploymentSpec) -> Result<()> {
    for dependency in &spec.dependencies {
        let code = chain.code_at(dependency.address).await?;
        if code.is_empty() {
            return Err(Error::UnresolvedDependency {
                name: dependency.name.clone(),
                address: dependency.address.to_string(),
            });
        }
        tracing::debug!(
            name = %dependency.name,
            address = %dependency.address,
            code_size = code.len(),
            "Dependency resolved"
        );
    }
    Ok(())
}

pub struct Deployer<'a, C> {
    chain: &'a C,
}

impl<'a, C: ChainClient> Deployer<'a, C> {
    pub fn new(chain: &'a C) -> Self {
        Self { chain }
    }

    /// Deploy `spec` using `artifact`'s init code, recording progress in `result`.
    ///
    /// Dependencies are checked before anything is sent; a missing one leaves
    /// `result` untouched. Once the transaction is out, every failure moves
    /// `result` to `DeployFailed` and carries the transaction hash if known.
    pub async fn deploy(
        &self,
        spec: &DeploymentSpec,
        artifact: &ContractArtifact,
        result: &mut DeploymentResult,
    ) -> Result<Address> {
        let sender = self
            .chain
            .sender()
            .ok_or_else(|| Error::missing(DEPLOYER_PRIVATE_KEY_VAR))?;
        check_dependencies(self.chain, spec).await?;

        let unit = spec.label();
        let tx = TransactionRequest::create(sender, &artifact.bytecode, &spec.args);

        result.begin_deploy();
        tracing::info!(unit, args = spec.args.len(), "Deploying");

        let tx_hash = match self.chain.submit(&tx).await {
            Ok(hash) => hash,
            Err(e) => return Err(fail(result, unit, e.to_string(), None)),
        };
        result.record_submission(tx_hash.clone());
        tracing::info!(unit, tx_hash = %tx_hash, "Creation transaction submitted");

        let receipt = match self.chain.await_confirmation(&tx_hash).await {
            Ok(Confirmation::Confirmed(receipt)) => receipt,
            Ok(Confirmation::Reverted(receipt)) => {
                let mut reason = format!("transaction reverted in block {}", receipt.block_number);
                if let Some(detail) = self.chain.revert_reason(&tx, receipt.block_number).await {
                    reason = format!("{}: {}", reason, detail);
                }
                return Err(fail(result, unit, reason, Some(tx_hash.to_string())));
            }
            Err(e @ NodeError::ConfirmationTimeout { .. }) => {
                let reason = format!(
                    "{}; fate unknown, look the transaction up and confirm with `status` before redeploying",
                    e
                );
                return Err(fail(result, unit, reason, Some(tx_hash.to_string())));
            }
            Err(e) => return Err(fail(result, unit, e.to_string(), Some(tx_hash.to_string()))),
        };

        let address = match receipt.contract_address {
            Some(address) if address != Address::ZERO => address,
            _ => {
                return Err(fail(
                    result,
                    unit,
                    "receipt carries no contract address".to_string(),
                    Some(tx_hash.to_string()),
                ))
            }
        };

        result.mark_deployed(address, receipt.block_number);
        tracing::info!(
            unit,
            block = receipt.block_number,
            gas_used = ?receipt.gas_used,
            "{} deployed at {}",
            unit,
            address
        );
        Ok(address)
    }
}

fn fail(
    result: &mut DeploymentResult,
    unit: &str,
    reason: String,
    tx_hash: Option<String>,
) -> Error {
    result.mark_deploy_failed(reason.clone());
    Error::DeploymentFailed {
        unit: unit.to_string(),
        reason,
        tx_hash,
    }
}
