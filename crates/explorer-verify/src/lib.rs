//! explorer-verify: Publish deployed contract sources to a block explorer
//!
//! The explorer is a black box with a submit-and-poll contract
//! ([`VerificationApi`]); [`EtherscanClient`] speaks the Etherscan dialect and
//! [`Verifier`] adds bounded retries with visible backoff on top.

pub mod api;
pub mod etherscan;
pub mod verifier;

pub use api::{PollStatus, SubmitOutcome, VerificationApi, VerificationRequest, VerifyError};
pub use etherscan::EtherscanClient;
pub use verifier::{RetryPolicy, VerificationOutcome, Verifier};
