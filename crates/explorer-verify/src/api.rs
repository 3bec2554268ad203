//! Explorer verification API contract

use alloy_primitives::Address;
use thiserror::Error;

/// Source metadata and arguments for one deployed contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationRequest {
    pub address: Address,
    /// `sourceName:contractName`
    pub contract_name: String,
    /// e.g. `v0.8.24+commit.e11b9ed9`
    pub compiler_version: String,
    /// Standard JSON compiler input, serialized
    pub source: String,
    /// ABI-encoded constructor arguments, hex without 0x
    pub constructor_args: String,
}

/// Response to a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Accepted; poll with this id
    Submitted(String),
    AlreadyVerified,
}

/// Status of a submitted verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStatus {
    Pending,
    Verified,
    AlreadyVerified,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// Worth retrying: network trouble, rate limits, explorer still indexing
    #[error("transient explorer error: {0}")]
    Transient(String),

    /// The explorer refused the request; retrying will not help
    #[error("explorer rejected request: {0}")]
    Rejected(String),
}

/// Submit-and-poll verification service
#[allow(async_fn_in_trait)]
pub trait VerificationApi {
    async fn submit(&self, request: &VerificationRequest) -> Result<SubmitOutcome, VerifyError>;
    async fn poll_status(&self, submission_id: &str) -> Result<PollStatus, VerifyError>;
}
