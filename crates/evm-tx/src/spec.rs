//! Deployment specifications

use alloy_primitives::Address;
use deploy_core::ContractKind;
use serde::Serialize;

use crate::abi::{encode_constructor_args, ConstructorArg};

/// A prerequisite contract this deployment references by address
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependency {
    pub name: String,
    pub address: Address,
}

/// Everything needed to create one contract instance.
///
/// Every dependency must already have code on-chain before it is deployed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentSpec {
    pub kind: ContractKind,
    pub args: Vec<ConstructorArg>,
    pub dependencies: Vec<Dependency>,
}

impl DeploymentSpec {
    /// A spec with no prerequisites
    pub fn leaf(kind: ContractKind, args: Vec<ConstructorArg>) -> Self {
        Self {
            kind,
            args,
            dependencies: Vec::new(),
        }
    }

    pub fn with_dependency(mut self, name: impl Into<String>, address: Address) -> Self {
        self.dependencies.push(Dependency {
            name: name.into(),
            address,
        });
        self
    }

    /// Artifact contract name, also used as the unit label in reports
    pub fn label(&self) -> &'static str {
        self.kind.contract_name()
    }

    /// Hex-encoded constructor arguments (no 0x), as explorers expect them
    pub fn encoded_args_hex(&self) -> String {
        hex::encode(encode_constructor_args(&self.args))
    }
}
