//! Post-deploy actuator
//!
//! Follow-up calls run strictly in order, each confirmed before the next is
//! sent. A failure stops the sequence; calls that already confirmed stay in
//! the log because they cannot be undone.

use alloy_primitives::Address;
use deploy_core::{ContractKind, Error, Result, DEPLOYER_PRIVATE_KEY_VAR};
use evm_node_client::Confirmation;
use evm_tx::{ContractCall, TransactionRequest};

use crate::chain::ChainClient;
use crate::ledger::{ActionRecord, ActionStatus};

pub struct Actuator<'a, C> {
    chain: &'a C,
}

impl<'a, C: ChainClient> Actuator<'a, C> {
    pub fn new(chain: &'a C) -> Self {
        Self { chain }
    }

    /// Issue `calls` against the contract at `address`, appending one record
    /// per attempted call to `log`.
    pub async fn actuate(
        &self,
        kind: ContractKind,
        address: Address,
        calls: &[ContractCall],
        log: &mut Vec<ActionRecord>,
    ) -> Result<()> {
        let sender = self
            .chain
            .sender()
            .ok_or_else(|| Error::missing(DEPLOYER_PRIVATE_KEY_VAR))?;
        let unit = kind.contract_name();

        for (index, call) in calls.iter().enumerate() {
            tracing::info!(unit, index, "Calling {}", call.description);

            let mut record = ActionRecord {
                unit,
                address,
                index,
                description: call.description.clone(),
                status: ActionStatus::Failed,
                tx_hash: None,
                error: None,
            };

            let outcome = match self
                .chain
                .submit(&TransactionRequest::call(sender, address, call))
                .await
            {
                Ok(tx_hash) => {
                    record.tx_hash = Some(tx_hash.clone());
                    match self.chain.await_confirmation(&tx_hash).await {
                        Ok(Confirmation::Confirmed(_)) => Ok(()),
                        Ok(Confirmation::Reverted(receipt)) => Err(format!(
                            "transaction {} reverted in block {}",
                            tx_hash, receipt.block_number
                        )),
                        Err(e) => Err(format!("transaction {}: {}", tx_hash, e)),
                    }
                }
                Err(e) => Err(e.to_string()),
            };

            match outcome {
                Ok(()) => {
                    record.status = ActionStatus::Confirmed;
                    log.push(record);
                }
                Err(reason) => {
                    record.error = Some(reason.clone());
                    log.push(record);
                    if index > 0 {
                        tracing::warn!(
                            unit,
                            "{} earlier call(s) on {} already confirmed and stand",
                            index,
                            address
                        );
                    }
                    return Err(Error::PostDeployActionFailed {
                        unit: unit.to_string(),
                        address: address.to_string(),
                        index,
                        reason,
                    });
                }
            }
        }
        Ok(())
    }
}
