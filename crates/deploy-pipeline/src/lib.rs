//! deploy-pipeline: Deploy-then-verify pipelines
//!
//! Sequences contract creation, post-deploy calls and explorer verification
//! over the [`ChainClient`] and [`explorer_verify::VerificationApi`] seams,
//! recording each unit's lifecycle in a [`RunReport`].

pub mod actuator;
pub mod chain;
pub mod deployer;
pub mod ledger;
pub mod orchestrator;

#[cfg(test)]
mod testing;

pub use actuator::Actuator;
pub use chain::{confirmation_policy, ChainClient, RpcChain};
pub use deployer::{check_dependencies, Deployer};
pub use ledger::{
    ActionRecord, ActionStatus, ConfirmationStatus, DeploymentResult, Outcome, Pipeline,
    RunReport, UnitState, VerificationStatus,
};
pub use orchestrator::{Orchestrator, PlannedUnit, StatusReport};
