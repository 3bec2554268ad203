//! Submit-and-poll verification with bounded retries
//!
//! Verification is best-effort metadata: every path ends in a
//! [`VerificationOutcome`] instead of an error, and callers decide how loudly
//! to report it.

use std::time::Duration;

use deploy_core::{Error, NetworkProfile, Result, RetryConfig};
use serde::Serialize;

use crate::api::{PollStatus, SubmitOutcome, VerificationApi, VerificationRequest, VerifyError};
use crate::etherscan::EtherscanClient;

/// Exponential backoff with a cap
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.saturating_sub(1).min(16);
        self.initial_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

/// Terminal result of verifying one address
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum VerificationOutcome {
    Verified,
    AlreadyVerified,
    Failed { reason: String },
    TimedOut { attempts: u32 },
}

impl VerificationOutcome {
    /// Verified and AlreadyVerified are the same success
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Verified | Self::AlreadyVerified)
    }

    /// The warning to surface for an unsuccessful outcome
    pub fn to_error(&self, address: &str) -> Option<Error> {
        match self {
            Self::Verified | Self::AlreadyVerified => None,
            Self::Failed { reason } => Some(Error::VerificationFailed {
                address: address.to_string(),
                reason: reason.clone(),
            }),
            Self::TimedOut { attempts } => Some(Error::VerificationTimedOut {
                address: address.to_string(),
                attempts: *attempts,
            }),
        }
    }
}

/// Drives a [`VerificationApi`] to a terminal outcome
pub struct Verifier<A> {
    api: A,
    policy: RetryPolicy,
}

impl Verifier<EtherscanClient> {
    /// Verifier for the profile's explorer.
    ///
    /// `Ok(None)` when the network has no explorer (local nodes). An explorer
    /// without an API key is a configuration error.
    pub fn for_profile(profile: &NetworkProfile, policy: RetryPolicy) -> Result<Option<Self>> {
        let Some(explorer) = &profile.explorer else {
            return Ok(None);
        };
        let api_key = profile
            .explorer_api_key
            .clone()
            .ok_or_else(|| Error::missing(deploy_core::EXPLORER_API_KEY_VAR))?;
        let client = EtherscanClient::new(explorer.api_url.clone(), api_key, profile.chain_id)
            .map_err(|e| Error::invalid("explorer.api_url", e.to_string()))?;
        Ok(Some(Self::new(client, policy)))
    }
}

impl<A: VerificationApi> Verifier<A> {
    pub fn new(api: A, policy: RetryPolicy) -> Self {
        Self { api, policy }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Submit `request` and poll until the explorer settles.
    pub async fn verify(&self, request: &VerificationRequest) -> VerificationOutcome {
        tracing::info!(address = %request.address, contract = %request.contract_name, "Verifying");

        let submission_id = match self.submit(request).await {
            Ok(SubmitOutcome::Submitted(id)) => id,
            Ok(SubmitOutcome::AlreadyVerified) => {
                tracing::info!(address = %request.address, "Already verified");
                return VerificationOutcome::AlreadyVerified;
            }
            Err(outcome) => return outcome,
        };

        self.poll(request, &submission_id).await
    }

    async fn submit(
        &self,
        request: &VerificationRequest,
    ) -> std::result::Result<SubmitOutcome, VerificationOutcome> {
        let max = self.policy.max_attempts;
        for attempt in 1..=max {
            match self.api.submit(request).await {
                Ok(outcome) => return Ok(outcome),
                Err(VerifyError::Rejected(reason)) => {
                    return Err(VerificationOutcome::Failed { reason });
                }
                Err(VerifyError::Transient(reason)) => {
                    if attempt == max {
                        break;
                    }
                    let delay = self.policy.delay_for(attempt);
                    tracing::warn!(
                        address = %request.address,
                        "Submission attempt {}/{} failed ({}), retrying in {:?}",
                        attempt,
                        max,
                        reason,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
        Err(VerificationOutcome::TimedOut { attempts: max })
    }

    async fn poll(&self, request: &VerificationRequest, submission_id: &str) -> VerificationOutcome {
        let max = self.policy.max_attempts;
        for attempt in 1..=max {
            let delay = self.policy.delay_for(attempt);
            tokio::time::sleep(delay).await;

            match self.api.poll_status(submission_id).await {
                Ok(PollStatus::Verified) => {
                    tracing::info!(address = %request.address, "Verified");
                    return VerificationOutcome::Verified;
                }
                Ok(PollStatus::AlreadyVerified) => {
                    tracing::info!(address = %request.address, "Already verified");
                    return VerificationOutcome::AlreadyVerified;
                }
                Ok(PollStatus::Failed(reason)) => {
                    return VerificationOutcome::Failed { reason };
                }
                Ok(PollStatus::Pending) => {
                    tracing::info!(
                        address = %request.address,
                        "Verification pending (poll {}/{})",
                        attempt,
                        max
                    );
                }
                Err(VerifyError::Rejected(reason)) => {
                    return VerificationOutcome::Failed { reason };
                }
                Err(VerifyError::Transient(reason)) => {
                    tracing::warn!(
                        address = %request.address,
                        "Status poll {}/{} failed: {}",
                        attempt,
                        max,
                        reason
                    );
                }
            }
        }
        VerificationOutcome::TimedOut { attempts: max }
    }
}
