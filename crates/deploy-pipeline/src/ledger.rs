//! Run ledger
//!
//! One [`DeploymentResult`] per deployment unit plus the post-deploy action
//! log, collected into a [`RunReport`] that is the permanent record of a run.

use alloy_primitives::Address;
use deploy_core::{ContractKind, Error, TxHash};
use explorer_verify::VerificationOutcome;
use serde::Serialize;

/// Lifecycle of one deployment unit
///
/// ```text
/// NotStarted -> Deploying -> Deployed | DeployFailed
/// Deployed -> Verifying -> Verified | VerificationFailed | VerificationTimedOut
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitState {
    NotStarted,
    Deploying,
    Deployed,
    DeployFailed,
    Verifying,
    Verified,
    VerificationFailed,
    VerificationTimedOut,
}

impl UnitState {
    pub fn can_advance_to(self, next: UnitState) -> bool {
        use UnitState::*;
        matches!(
            (self, next),
            (NotStarted, Deploying)
                | (Deploying, Deployed)
                | (Deploying, DeployFailed)
                | (Deployed, Verifying)
                | (Verifying, Verified)
                | (Verifying, VerificationFailed)
                | (Verifying, VerificationTimedOut)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::DeployFailed
                | Self::Verified
                | Self::VerificationFailed
                | Self::VerificationTimedOut
        )
    }

    /// True once the contract exists on-chain, whatever happened to verification
    pub fn reached_deployed(self) -> bool {
        matches!(
            self,
            Self::Deployed
                | Self::Verifying
                | Self::Verified
                | Self::VerificationFailed
                | Self::VerificationTimedOut
        )
    }
}

/// Confirmation view of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationStatus {
    NotSubmitted,
    Pending,
    Confirmed,
    Failed,
}

/// Verification view of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    NotSubmitted,
    Submitted,
    Verified,
    VerificationFailed,
    VerificationTimedOut,
}

impl ConfirmationStatus {
    fn of(state: UnitState) -> Self {
        match state {
            UnitState::NotStarted => Self::NotSubmitted,
            UnitState::Deploying => Self::Pending,
            UnitState::DeployFailed => Self::Failed,
            _ => Self::Confirmed,
        }
    }
}

impl VerificationStatus {
    fn of(state: UnitState) -> Self {
        match state {
            UnitState::Verifying => Self::Submitted,
            UnitState::Verified => Self::Verified,
            UnitState::VerificationFailed => Self::VerificationFailed,
            UnitState::VerificationTimedOut => Self::VerificationTimedOut,
            _ => Self::NotSubmitted,
        }
    }
}

/// The record of one contract instance in a run
#[derive(Debug, Clone, Serialize)]
pub struct DeploymentResult {
    pub kind: ContractKind,
    pub contract: &'static str,
    state: UnitState,
    /// Views of `state`, refreshed on every transition
    confirmation: ConfirmationStatus,
    verification: VerificationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<TxHash>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
    /// Why deployment failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Explorer detail: "already verified", a failure reason, ...
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_note: Option<String>,
}

impl DeploymentResult {
    pub fn new(kind: ContractKind) -> Self {
        Self {
            kind,
            contract: kind.contract_name(),
            state: UnitState::NotStarted,
            confirmation: ConfirmationStatus::NotSubmitted,
            verification: VerificationStatus::NotSubmitted,
            address: None,
            tx_hash: None,
            block_number: None,
            explorer_url: None,
            error: None,
            verification_note: None,
        }
    }

    /// A contract deployed by an earlier run
    pub fn existing(kind: ContractKind, address: Address) -> Self {
        let mut unit = Self::new(kind);
        unit.set_state(UnitState::Deployed);
        unit.address = Some(address);
        unit
    }

    pub fn state(&self) -> UnitState {
        self.state
    }

    pub fn confirmation(&self) -> ConfirmationStatus {
        self.confirmation
    }

    pub fn verification(&self) -> VerificationStatus {
        self.verification
    }

    pub fn is_deployed(&self) -> bool {
        self.state.reached_deployed()
    }

    fn advance(&mut self, next: UnitState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "{}: illegal transition {:?} -> {:?}",
            self.contract,
            self.state,
            next
        );
        tracing::debug!(unit = self.contract, from = ?self.state, to = ?next, "State change");
        self.set_state(next);
    }

    fn set_state(&mut self, state: UnitState) {
        self.state = state;
        self.confirmation = ConfirmationStatus::of(state);
        self.verification = VerificationStatus::of(state);
    }

    pub fn begin_deploy(&mut self) {
        self.advance(UnitState::Deploying);
    }

    pub fn record_submission(&mut self, tx_hash: TxHash) {
        self.tx_hash = Some(tx_hash);
    }

    pub fn mark_deployed(&mut self, address: Address, block_number: u64) {
        self.address = Some(address);
        self.block_number = Some(block_number);
        self.advance(UnitState::Deployed);
    }

    pub fn mark_deploy_failed(&mut self, reason: impl Into<String>) {
        self.error = Some(reason.into());
        self.advance(UnitState::DeployFailed);
    }

    pub fn begin_verify(&mut self) {
        self.advance(UnitState::Verifying);
    }

    pub fn finish_verify(&mut self, outcome: &VerificationOutcome) {
        let (next, note) = match outcome {
            VerificationOutcome::Verified => (UnitState::Verified, None),
            VerificationOutcome::AlreadyVerified => {
                (UnitState::Verified, Some("already verified".to_string()))
            }
            VerificationOutcome::Failed { reason } => {
                (UnitState::VerificationFailed, Some(reason.clone()))
            }
            VerificationOutcome::TimedOut { attempts } => (
                UnitState::VerificationTimedOut,
                Some(format!("gave up after {} attempts", attempts)),
            ),
        };
        self.verification_note = note;
        self.advance(next);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Confirmed,
    Failed,
}

/// One post-deploy call and what became of it
#[derive(Debug, Clone, Serialize)]
pub struct ActionRecord {
    pub unit: &'static str,
    pub address: Address,
    pub index: usize,
    pub description: String,
    pub status: ActionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<TxHash>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A fatal error as it appears in the report
#[derive(Debug, Clone, Serialize)]
pub struct ReportedError {
    pub code: &'static str,
    pub message: String,
}

impl From<&Error> for ReportedError {
    fn from(err: &Error) -> Self {
        Self {
            code: err.error_code(),
            message: err.to_string(),
        }
    }
}

/// Which fixed pipeline produced a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Pipeline {
    Token,
    TokenWeth,
    Presale,
    Verify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Every unit deployed and every post-deploy action confirmed
    Success,
    /// Some on-chain effects stand but the run did not complete
    Partial,
    Failed,
}

/// Aggregate record of one run, printed as JSON when the run ends
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub pipeline: Pipeline,
    pub network: String,
    pub chain_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployer: Option<Address>,
    pub units: Vec<DeploymentResult>,
    pub actions: Vec<ActionRecord>,
    pub errors: Vec<ReportedError>,
    pub warnings: Vec<String>,
}

impl RunReport {
    pub fn new(pipeline: Pipeline, network: &str, chain_id: u64, kinds: &[ContractKind]) -> Self {
        Self {
            pipeline,
            network: network.to_string(),
            chain_id,
            deployer: None,
            units: kinds.iter().copied().map(DeploymentResult::new).collect(),
            actions: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Record a fatal error. Verification errors are downgraded to warnings.
    pub fn record_error(&mut self, err: &Error) {
        if err.is_fatal() {
            tracing::error!("{}", err);
            self.errors.push(ReportedError::from(err));
        } else {
            self.warn(err.to_string());
        }
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{}", message);
        self.warnings.push(message);
    }

    pub fn outcome(&self) -> Outcome {
        let any_deployed = self.units.iter().any(DeploymentResult::is_deployed);
        if self.errors.is_empty() && self.units.iter().all(DeploymentResult::is_deployed) {
            Outcome::Success
        } else if any_deployed {
            Outcome::Partial
        } else {
            Outcome::Failed
        }
    }

    /// 0 iff every requested unit reached `Deployed` and nothing fatal happened
    pub fn exit_code(&self) -> i32 {
        match self.outcome() {
            Outcome::Success => 0,
            Outcome::Partial | Outcome::Failed => 1,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut value = serde_json::to_value(self)?;
        if let Some(map) = value.as_object_mut() {
            map.insert("outcome".to_string(), serde_json::to_value(self.outcome())?);
            map.insert("exit_code".to_string(), self.exit_code().into());
        }
        serde_json::to_string_pretty(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_table() {
        use UnitState::*;
        assert!(NotStarted.can_advance_to(Deploying));
        assert!(Deploying.can_advance_to(DeployFailed));
        assert!(Deployed.can_advance_to(Verifying));
        assert!(Verifying.can_advance_to(VerificationTimedOut));
        assert!(!NotStarted.can_advance_to(Deployed));
        assert!(!DeployFailed.can_advance_to(Verifying));
        assert!(!Verified.can_advance_to(Verifying));
        assert!(DeployFailed.is_terminal());
        assert!(!Deployed.is_terminal());
    }

    #[test]
    fn test_views_follow_state() {
        let mut unit = DeploymentResult::new(ContractKind::Token);
        assert_eq!(unit.confirmation(), ConfirmationStatus::NotSubmitted);

        unit.begin_deploy();
        unit.record_submission(TxHash::new("0x01"));
        assert_eq!(unit.confirmation(), ConfirmationStatus::Pending);

        unit.mark_deployed(Address::repeat_byte(0x11), 7);
        assert_eq!(unit.confirmation(), ConfirmationStatus::Confirmed);
        assert_eq!(unit.verification(), VerificationStatus::NotSubmitted);

        unit.begin_verify();
        assert_eq!(unit.verification(), VerificationStatus::Submitted);

        unit.finish_verify(&VerificationOutcome::TimedOut { attempts: 3 });
        assert_eq!(unit.state(), UnitState::VerificationTimedOut);
        assert_eq!(unit.confirmation(), ConfirmationStatus::Confirmed);
        assert!(unit.is_deployed());
    }

    #[test]
    fn test_already_verified_is_verified() {
        let mut unit = DeploymentResult::existing(ContractKind::Presale, Address::repeat_byte(1));
        unit.begin_verify();
        unit.finish_verify(&VerificationOutcome::AlreadyVerified);
        assert_eq!(unit.verification(), VerificationStatus::Verified);
        assert_eq!(unit.verification_note.as_deref(), Some("already verified"));
    }

    #[test]
    fn test_exit_code() {
        let kinds = [ContractKind::Token, ContractKind::WrappedAsset];
        let mut report = RunReport::new(Pipeline::TokenWeth, "localhost", 31337, &kinds);
        assert_eq!(report.exit_code(), 1);
        assert_eq!(report.outcome(), Outcome::Failed);

        for unit in &mut report.units {
            unit.begin_deploy();
            unit.mark_deployed(Address::repeat_byte(2), 1);
        }
        assert_eq!(report.exit_code(), 0);

        report.record_error(&Error::VerificationFailed {
            address: "0x02".into(),
            reason: "bytecode mismatch".into(),
        });
        assert_eq!(report.exit_code(), 0);
        assert_eq!(report.warnings.len(), 1);

        report.record_error(&Error::PostDeployActionFailed {
            unit: "WETH9".into(),
            address: "0x02".into(),
            index: 0,
            reason: "reverted".into(),
        });
        assert_eq!(report.outcome(), Outcome::Partial);
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn test_json_record() {
        let mut report = RunReport::new(Pipeline::Token, "localhost", 31337, &[ContractKind::Token]);
        report.units[0].begin_deploy();
        report.units[0].mark_deploy_failed("execution reverted");

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["pipeline"], "token");
        assert_eq!(json["units"][0]["state"], "deploy_failed");
        assert_eq!(json["units"][0]["contract"], "KingToken");
        assert_eq!(json["units"][0]["error"], "execution reverted");
        assert_eq!(json["units"][0]["confirmation"], "failed");
        assert_eq!(json["units"][0]["verification"], "not_submitted");
        assert_eq!(json["outcome"], "failed");
        assert_eq!(json["exit_code"], 1);
        assert!(json["units"][0].get("address").is_none());
    }

    #[test]
    fn test_json_record_carries_both_statuses() {
        let mut unit = DeploymentResult::new(ContractKind::Token);
        unit.begin_deploy();
        unit.record_submission(TxHash::new("0x01"));
        let json = serde_json::to_value(&unit).unwrap();
        assert_eq!(json["confirmation"], "pending");

        unit.mark_deployed(Address::repeat_byte(0x11), 1);
        let json = serde_json::to_value(&unit).unwrap();
        assert_eq!(json["state"], "deployed");
        assert_eq!(json["confirmation"], "confirmed");
        assert_eq!(json["verification"], "not_submitted");

        unit.begin_verify();
        unit.finish_verify(&VerificationOutcome::Failed {
            reason: "bytecode mismatch".into(),
        });
        let json = serde_json::to_value(&unit).unwrap();
        assert_eq!(json["confirmation"], "confirmed");
        assert_eq!(json["verification"], "verification_failed");

        let existing = DeploymentResult::existing(ContractKind::Presale, Address::repeat_byte(1));
        let json = serde_json::to_value(&existing).unwrap();
        assert_eq!(json["confirmation"], "confirmed");
        assert_eq!(json["verification"], "not_submitted");
    }
}
