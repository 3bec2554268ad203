//! Error types for the deployer

use thiserror::Error;

use crate::units::UnitsError;

/// Errors that can occur while preparing, deploying or verifying contracts.
///
/// Pre-flight variants never reach the network. Post-flight variants describe
/// irreversible on-chain state and carry enough context for manual reconciliation.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid parameter `{field}`: {reason}")]
    InvalidParameter { field: String, reason: String },

    #[error("Missing configuration: {key} is not set")]
    MissingConfiguration { key: String },

    #[error("Unknown network: {name} (known: {known})")]
    UnknownNetwork { name: String, known: String },

    #[error("Artifact error for {contract}: {reason}")]
    Artifact { contract: String, reason: String },

    #[error("Dependency `{name}` has no contract code at {address}")]
    UnresolvedDependency { name: String, address: String },

    #[error("Node reports chain id {actual}, profile {network} expects {expected}")]
    ChainIdMismatch {
        network: String,
        expected: u64,
        actual: u64,
    },

    #[error("Node error: {0}")]
    Node(#[from] NodeError),

    #[error("Deployment of {unit} failed: {reason}{}", tx_suffix(.tx_hash))]
    DeploymentFailed {
        unit: String,
        reason: String,
        tx_hash: Option<String>,
    },

    #[error("Post-deploy action #{index} on {unit} at {address} failed: {reason}")]
    PostDeployActionFailed {
        unit: String,
        address: String,
        index: usize,
        reason: String,
    },

    #[error("Verification of {address} timed out after {attempts} attempts")]
    VerificationTimedOut { address: String, attempts: u32 },

    #[error("Verification of {address} failed: {reason}")]
    VerificationFailed { address: String, reason: String },
}

/// Node connection and JSON-RPC errors
#[derive(Debug, Clone, Error)]
pub enum NodeError {
    #[error("Node unreachable at {url}: {reason}")]
    Unreachable { url: String, reason: String },

    #[error("Node returned error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Could not sign transaction: {0}")]
    Signing(String),

    #[error("Transaction {tx_hash} not confirmed after {waited_secs}s")]
    ConfirmationTimeout { tx_hash: String, waited_secs: u64 },
}

impl NodeError {
    /// Failures worth polling through: the request may succeed if repeated
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unreachable { .. } | Self::ParseError(_))
    }
}

fn tx_suffix(tx_hash: &Option<String>) -> String {
    match tx_hash {
        Some(hash) => format!(" (tx {})", hash),
        None => String::new(),
    }
}

/// Result type alias for deployer operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn missing(key: impl Into<String>) -> Self {
        Self::MissingConfiguration { key: key.into() }
    }

    /// Wrap a unit-scaling failure as an `InvalidParameter` naming `field`.
    pub fn from_units(field: impl Into<String>, err: UnitsError) -> Self {
        Self::invalid(field, err.to_string())
    }

    /// Machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidParameter { .. } => "invalid_parameter",
            Self::MissingConfiguration { .. } => "missing_configuration",
            Self::UnknownNetwork { .. } => "unknown_network",
            Self::Artifact { .. } => "artifact",
            Self::UnresolvedDependency { .. } => "unresolved_dependency",
            Self::ChainIdMismatch { .. } => "chain_id_mismatch",
            Self::Node(_) => "node",
            Self::DeploymentFailed { .. } => "deployment_failed",
            Self::PostDeployActionFailed { .. } => "post_deploy_action_failed",
            Self::VerificationTimedOut { .. } => "verification_timed_out",
            Self::VerificationFailed { .. } => "verification_failed",
        }
    }

    /// True for errors raised before any transaction is built or submitted.
    /// A run aborted by one of these is safe to retry as a whole.
    pub fn is_preflight(&self) -> bool {
        matches!(
            self,
            Self::InvalidParameter { .. }
                | Self::MissingConfiguration { .. }
                | Self::UnknownNetwork { .. }
                | Self::Artifact { .. }
                | Self::UnresolvedDependency { .. }
                | Self::ChainIdMismatch { .. }
        )
    }

    /// Verification problems are warnings; everything else fails the run.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::VerificationTimedOut { .. } | Self::VerificationFailed { .. }
        )
    }
}
