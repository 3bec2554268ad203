//! Etherscan-compatible verification client
//!
//! Talks to the multichain API; every request names its network with `chainid`.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::api::{PollStatus, SubmitOutcome, VerificationApi, VerificationRequest, VerifyError};

const EXPLORER_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
pub(crate) struct EtherscanResponse {
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub result: String,
}

/// Client for the `module=contract` verification endpoints
#[derive(Clone)]
pub struct EtherscanClient {
    http: Client,
    api_url: Url,
    api_key: String,
    chain_id: u64,
}

impl EtherscanClient {
    pub fn new(api_url: Url, api_key: String, chain_id: u64) -> Result<Self, VerifyError> {
        let http = Client::builder()
            .timeout(EXPLORER_REQUEST_TIMEOUT)
            .user_agent("presale-deployer")
            .build()
            .map_err(|e| VerifyError::Rejected(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_url,
            api_key,
            chain_id,
        })
    }

    /// API URL with the target chain selected
    pub(crate) fn endpoint(&self) -> Url {
        let mut url = self.api_url.clone();
        url.query_pairs_mut()
            .append_pair("chainid", &self.chain_id.to_string());
        url
    }

    async fn read(&self, response: reqwest::Response) -> Result<EtherscanResponse, VerifyError> {
        let status = response.status();
        if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(VerifyError::Transient(format!("HTTP {}", status)));
        }
        if !status.is_success() {
            return Err(VerifyError::Rejected(format!("HTTP {}", status)));
        }
        // Overloaded explorers occasionally answer with an HTML page
        response
            .json()
            .await
            .map_err(|e| VerifyError::Transient(format!("unreadable response: {}", e)))
    }
}

impl VerificationApi for EtherscanClient {
    async fn submit(&self, request: &VerificationRequest) -> Result<SubmitOutcome, VerifyError> {
        let address = request.address.to_string();
        let form = [
            ("apikey", self.api_key.as_str()),
            ("module", "contract"),
            ("action", "verifysourcecode"),
            ("contractaddress", address.as_str()),
            ("sourceCode", request.source.as_str()),
            ("codeformat", "solidity-standard-json-input"),
            ("contractname", request.contract_name.as_str()),
            ("compilerversion", request.compiler_version.as_str()),
            // Etherscan's field name is misspelled
            ("constructorArguements", request.constructor_args.as_str()),
        ];

        let response = self
            .http
            .post(self.endpoint())
            .form(&form)
            .send()
            .await
            .map_err(|e| VerifyError::Transient(e.to_string()))?;

        parse_submit_response(self.read(response).await?)
    }

    async fn poll_status(&self, submission_id: &str) -> Result<PollStatus, VerifyError> {
        let response = self
            .http
            .get(self.endpoint())
            .query(&[
                ("apikey", self.api_key.as_str()),
                ("module", "contract"),
                ("action", "checkverifystatus"),
                ("guid", submission_id),
            ])
            .send()
            .await
            .map_err(|e| VerifyError::Transient(e.to_string()))?;

        parse_status_response(self.read(response).await?)
    }
}

fn is_transient_message(lower: &str) -> bool {
    lower.contains("unable to locate contractcode")
        || lower.contains("rate limit")
        || lower.contains("try again later")
}

pub(crate) fn parse_submit_response(
    response: EtherscanResponse,
) -> Result<SubmitOutcome, VerifyError> {
    let lower = response.result.to_lowercase();
    if lower.contains("already verified") {
        return Ok(SubmitOutcome::AlreadyVerified);
    }
    if response.status == "1" && !response.result.is_empty() {
        return Ok(SubmitOutcome::Submitted(response.result));
    }
    if is_transient_message(&lower) {
        return Err(VerifyError::Transient(response.result));
    }
    Err(VerifyError::Rejected(format!(
        "{}: {}",
        response.message, response.result
    )))
}

pub(crate) fn parse_status_response(response: EtherscanResponse) -> Result<PollStatus, VerifyError> {
    let lower = response.result.to_lowercase();
    if lower.contains("already verified") {
        return Ok(PollStatus::AlreadyVerified);
    }
    if lower.contains("pending") || lower.contains("in queue") {
        return Ok(PollStatus::Pending);
    }
    if is_transient_message(&lower) {
        return Err(VerifyError::Transient(response.result));
    }
    if response.status == "1" {
        return Ok(PollStatus::Verified);
    }
    Ok(PollStatus::Failed(response.result))
}
