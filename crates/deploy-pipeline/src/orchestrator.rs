//! Deployment orchestrator
//!
//! Runs one of the fixed pipelines and folds every unit's fate into a
//! [`RunReport`]:
//!
//! - token: deploy KingToken, verify
//! - token-weth: deploy KingToken, deploy WETH9, fund WETH9, verify both
//! - presale: check weth/token/router exist, deploy PreSale, verify
//!
//! Units deploy strictly in order. The first failed deployment ends the
//! deploy phase; units after it stay `NotStarted`. Verification runs for
//! every unit that reached `Deployed`, even when a later step failed.

use alloy_primitives::Address;
use deploy_core::{Error, NetworkProfile, Result};
use evm_tx::{ArtifactStore, ContractArtifact, ContractCall, DeploymentSpec};
use explorer_verify::{VerificationApi, VerificationOutcome, VerificationRequest, Verifier};
use serde::Serialize;

use crate::actuator::Actuator;
use crate::chain::ChainClient;
use crate::deployer::Deployer;
use crate::ledger::{DeploymentResult, Pipeline, RunReport};

/// One unit of a pipeline: what to deploy and what to call afterwards
#[derive(Debug, Clone)]
pub struct PlannedUnit {
    pub spec: DeploymentSpec,
    pub calls: Vec<ContractCall>,
}

impl PlannedUnit {
    pub fn new(spec: DeploymentSpec) -> Self {
        Self {
            spec,
            calls: Vec::new(),
        }
    }

    pub fn with_calls(spec: DeploymentSpec, calls: Vec<ContractCall>) -> Self {
        Self { spec, calls }
    }
}

/// Whether code exists at an address
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub network: String,
    pub chain_id: u64,
    pub address: Address,
    pub deployed: bool,
    pub code_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
}

impl StatusReport {
    pub fn exit_code(&self) -> i32 {
        if self.deployed {
            0
        } else {
            1
        }
    }
}

pub struct Orchestrator<'a, C, A> {
    profile: &'a NetworkProfile,
    chain: &'a C,
    artifacts: &'a ArtifactStore,
    verifier: Option<&'a Verifier<A>>,
}

impl<'a, C: ChainClient, A: VerificationApi> Orchestrator<'a, C, A> {
    /// `verifier` is `None` when verification is disabled or the network has
    /// no explorer.
    pub fn new(
        profile: &'a NetworkProfile,
        chain: &'a C,
        artifacts: &'a ArtifactStore,
        verifier: Option<&'a Verifier<A>>,
    ) -> Self {
        Self {
            profile,
            chain,
            artifacts,
            verifier,
        }
    }

    pub async fn run_token(&self, token: DeploymentSpec) -> RunReport {
        self.run(Pipeline::Token, vec![PlannedUnit::new(token)])
            .await
    }

    pub async fn run_token_weth(
        &self,
        token: DeploymentSpec,
        weth: DeploymentSpec,
        funding: Vec<ContractCall>,
    ) -> RunReport {
        self.run(
            Pipeline::TokenWeth,
            vec![
                PlannedUnit::new(token),
                PlannedUnit::with_calls(weth, funding),
            ],
        )
        .await
    }

    /// `presale` must carry its weth/token/router dependencies; they are
    /// checked on-chain before the creation transaction is built.
    pub async fn run_presale(&self, presale: DeploymentSpec) -> RunReport {
        self.run(Pipeline::Presale, vec![PlannedUnit::new(presale)])
            .await
    }

    /// Deploy `plan` in order, then verify what was deployed
    pub async fn run(&self, pipeline: Pipeline, plan: Vec<PlannedUnit>) -> RunReport {
        let kinds: Vec<_> = plan.iter().map(|unit| unit.spec.kind).collect();
        let mut report = RunReport::new(pipeline, &self.profile.name, self.profile.chain_id, &kinds);
        report.deployer = self.chain.sender();

        let artifacts = match self.load_artifacts(&plan) {
            Ok(artifacts) => artifacts,
            Err(e) => {
                report.record_error(&e);
                return report;
            }
        };

        if let Some(sender) = report.deployer {
            tracing::info!("Deploying contracts with the account: {}", sender);
        }

        let deployer = Deployer::new(self.chain);
        let actuator = Actuator::new(self.chain);

        for (index, unit) in plan.iter().enumerate() {
            let result = &mut report.units[index];
            match deployer.deploy(&unit.spec, &artifacts[index], result).await {
                Ok(address) => {
                    result.explorer_url = self.explorer_url(&address);
                    if !unit.calls.is_empty() {
                        if let Err(e) = actuator
                            .actuate(unit.spec.kind, address, &unit.calls, &mut report.actions)
                            .await
                        {
                            report.record_error(&e);
                        }
                    }
                }
                Err(e) => {
                    report.record_error(&e);
                    let skipped = plan.len() - index - 1;
                    if skipped > 0 {
                        tracing::warn!("{} remaining unit(s) not attempted", skipped);
                    }
                    break;
                }
            }
        }

        self.verify_deployed(&plan, &artifacts, &mut report).await;
        report
    }

    /// Verify a contract deployed by an earlier run
    pub async fn verify_existing(&self, spec: DeploymentSpec, address: Address) -> RunReport {
        let mut report = RunReport::new(
            Pipeline::Verify,
            &self.profile.name,
            self.profile.chain_id,
            &[spec.kind],
        );
        let plan = vec![PlannedUnit::new(spec)];

        let artifacts = match self.load_artifacts(&plan) {
            Ok(artifacts) => artifacts,
            Err(e) => {
                report.record_error(&e);
                return report;
            }
        };

        match self.chain.code_at(address).await {
            Ok(code) if !code.is_empty() => {
                let mut unit = DeploymentResult::existing(plan[0].spec.kind, address);
                unit.explorer_url = self.explorer_url(&address);
                report.units[0] = unit;
            }
            Ok(_) => {
                report.record_error(&Error::UnresolvedDependency {
                    name: plan[0].spec.label().to_string(),
                    address: address.to_string(),
                });
                return report;
            }
            Err(e) => {
                report.record_error(&Error::from(e));
                return report;
            }
        }

        self.verify_deployed(&plan, &artifacts, &mut report).await;
        report
    }

    /// Report whether anything is deployed at `address`.
    pub async fn check_status(&self, address: Address) -> Result<StatusReport> {
        let code = self.chain.code_at(address).await?;
        let deployed = !code.is_empty();
        tracing::info!(%address, deployed, code_size = code.len(), "Status checked");
        Ok(StatusReport {
            network: self.profile.name.clone(),
            chain_id: self.profile.chain_id,
            address,
            deployed,
            code_size: code.len(),
            explorer_url: self.explorer_url(&address),
        })
    }

    fn explorer_url(&self, address: &Address) -> Option<String> {
        self.profile
            .explorer
            .as_ref()
            .map(|explorer| explorer.address_url(address))
    }

    /// Load every artifact and match constructor arity before any transaction.
    fn load_artifacts(&self, plan: &[PlannedUnit]) -> Result<Vec<ContractArtifact>> {
        plan.iter()
            .map(|unit| {
                let artifact = self.artifacts.load(unit.spec.kind)?;
                let arity = artifact.constructor_arity();
                if arity != unit.spec.args.len() {
                    return Err(Error::Artifact {
                        contract: artifact.contract_name.clone(),
                        reason: format!(
                            "constructor takes {} arguments, {} supplied",
                            arity,
                            unit.spec.args.len()
                        ),
                    });
                }
                Ok(artifact)
            })
            .collect()
    }

    fn verification_request(
        &self,
        spec: &DeploymentSpec,
        artifact: &ContractArtifact,
        address: Address,
    ) -> Result<VerificationRequest> {
        let build_info = self.artifacts.build_info(artifact)?;
        let source = serde_json::to_string(&build_info.input).map_err(|e| Error::Artifact {
            contract: artifact.contract_name.clone(),
            reason: e.to_string(),
        })?;
        Ok(VerificationRequest {
            address,
            contract_name: artifact.fully_qualified_name(),
            compiler_version: build_info.compiler_version(),
            source,
            constructor_args: spec.encoded_args_hex(),
        })
    }

    async fn verify_deployed(
        &self,
        plan: &[PlannedUnit],
        artifacts: &[ContractArtifact],
        report: &mut RunReport,
    ) {
        let Some(verifier) = self.verifier else {
            if report.units.iter().any(DeploymentResult::is_deployed) {
                let reason = if self.profile.explorer.is_some() {
                    "verification disabled"
                } else {
                    "network has no block explorer"
                };
                report.warn(format!("Verification skipped on {}: {}", self.profile.name, reason));
            }
            return;
        };

        for (index, unit) in plan.iter().enumerate() {
            let result = &mut report.units[index];
            let Some(address) = result.address.filter(|_| result.is_deployed()) else {
                continue;
            };

            result.begin_verify();
            let outcome = match self.verification_request(&unit.spec, &artifacts[index], address) {
                Ok(request) => verifier.verify(&request).await,
                Err(e) => VerificationOutcome::Failed {
                    reason: e.to_string(),
                },
            };
            result.finish_verify(&outcome);

            if let Some(err) = outcome.to_error(&address.to_string()) {
                report.record_error(&err);
            }
        }
    }
}
