//! In-memory chain, explorer and artifact fixtures for pipeline tests

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::Mutex;

use alloy_primitives::{Address, Bytes};
use deploy_core::{BlockNumber, NodeError, TxHash};
use evm_node_client::{Confirmation, TransactionReceipt};
use evm_tx::{ArtifactStore, TransactionRequest};
use explorer_verify::{
    PollStatus, SubmitOutcome, VerificationApi, VerificationRequest, VerifyError,
};

use crate::chain::ChainClient;

/// Deterministic chain: the n-th transaction (0-based) is mined in block
/// `100 + n`; creations land at `0x1010..`, `0x1111..`, ...
pub struct MockChain {
    sender: Option<Address>,
    reverts: HashSet<usize>,
    rejects: HashSet<usize>,
    stalls: HashSet<usize>,
    submitted: Mutex<Vec<TransactionRequest>>,
    attempts: Mutex<usize>,
    outcomes: Mutex<HashMap<TxHash, Option<Confirmation>>>,
    code: Mutex<HashMap<Address, Bytes>>,
    revert_reason: Option<String>,
    replays: Mutex<Vec<(TransactionRequest, BlockNumber)>>,
}

impl MockChain {
    pub fn new() -> Self {
        Self {
            sender: Some(Address::repeat_byte(0xde)),
            reverts: HashSet::new(),
            rejects: HashSet::new(),
            stalls: HashSet::new(),
            submitted: Mutex::new(Vec::new()),
            attempts: Mutex::new(0),
            outcomes: Mutex::new(HashMap::new()),
            code: Mutex::new(HashMap::new()),
            revert_reason: None,
            replays: Mutex::new(Vec::new()),
        }
    }

    pub fn read_only() -> Self {
        Self {
            sender: None,
            ..Self::new()
        }
    }

    /// The n-th transaction is mined but reverts
    pub fn revert_submission(mut self, n: usize) -> Self {
        self.reverts.insert(n);
        self
    }

    /// The n-th submission is refused by the node
    pub fn reject_submission(mut self, n: usize) -> Self {
        self.rejects.insert(n);
        self
    }

    /// The n-th transaction never confirms
    pub fn stall_submission(mut self, n: usize) -> Self {
        self.stalls.insert(n);
        self
    }

    /// What a replay of any reverted transaction reports
    pub fn with_revert_reason(mut self, reason: &str) -> Self {
        self.revert_reason = Some(reason.to_string());
        self
    }

    /// Reverted transactions replayed, with the block they were replayed at
    pub fn replays(&self) -> Vec<(TransactionRequest, BlockNumber)> {
        self.replays.lock().unwrap().clone()
    }

    pub fn with_code(self, address: Address, code: Bytes) -> Self {
        self.code.lock().unwrap().insert(address, code);
        self
    }

    /// Transactions accepted by the node, in order
    pub fn submitted(&self) -> Vec<TransactionRequest> {
        self.submitted.lock().unwrap().clone()
    }

    /// Submissions attempted, including refused ones
    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

impl ChainClient for MockChain {
    fn sender(&self) -> Option<Address> {
        self.sender
    }

    async fn submit(&self, tx: &TransactionRequest) -> Result<TxHash, NodeError> {
        let n = {
            let mut attempts = self.attempts.lock().unwrap();
            *attempts += 1;
            *attempts - 1
        };
        if self.rejects.contains(&n) {
            return Err(NodeError::Rpc {
                code: -32000,
                message: "insufficient funds for gas * price + value".into(),
            });
        }

        let tx_hash = TxHash::new(format!("0x{:064x}", n + 1));
        let block_number = 100 + n as u64;
        let reverted = self.reverts.contains(&n);
        let contract_address = (tx.is_creation() && !reverted)
            .then(|| Address::repeat_byte(0x10 + n as u8));

        if let Some(address) = contract_address {
            self.code
                .lock()
                .unwrap()
                .insert(address, Bytes::from(vec![0x60, 0x80]));
        }

        let receipt = TransactionReceipt {
            transaction_hash: tx_hash.clone(),
            block_number,
            status: Some(if reverted { 0 } else { 1 }),
            contract_address,
            gas_used: Some(21_000),
        };
        let outcome = if self.stalls.contains(&n) {
            None
        } else if reverted {
            Some(Confirmation::Reverted(receipt))
        } else {
            Some(Confirmation::Confirmed(receipt))
        };

        self.outcomes.lock().unwrap().insert(tx_hash.clone(), outcome);
        self.submitted.lock().unwrap().push(tx.clone());
        Ok(tx_hash)
    }

    async fn await_confirmation(&self, tx_hash: &TxHash) -> Result<Confirmation, NodeError> {
        match self.outcomes.lock().unwrap().get(tx_hash).cloned().flatten() {
            Some(confirmation) => Ok(confirmation),
            None => Err(NodeError::ConfirmationTimeout {
                tx_hash: tx_hash.to_string(),
                waited_secs: 300,
            }),
        }
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, NodeError> {
        Ok(self
            .code
            .lock()
            .unwrap()
            .get(&address)
            .cloned()
            .unwrap_or_default())
    }

    async fn revert_reason(&self, tx: &TransactionRequest, block: BlockNumber) -> Option<String> {
        self.replays
            .lock()
            .unwrap()
            .push((tx.clone(), block.saturating_sub(1)));
        self.revert_reason.clone()
    }
}

#[derive(Debug, Clone, Copy)]
pub enum ExplorerMode {
    /// First submission verifies, later ones report already verified
    Verifies,
    /// Every request fails transiently
    Unreachable,
}

/// Explorer that remembers which addresses it has verified
pub struct MockExplorer {
    mode: ExplorerMode,
    verified: Mutex<HashSet<Address>>,
    requests: Mutex<Vec<VerificationRequest>>,
}

impl MockExplorer {
    pub fn new(mode: ExplorerMode) -> Self {
        Self {
            mode,
            verified: Mutex::new(HashSet::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<VerificationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl VerificationApi for MockExplorer {
    async fn submit(&self, request: &VerificationRequest) -> Result<SubmitOutcome, VerifyError> {
        self.requests.lock().unwrap().push(request.clone());
        match self.mode {
            ExplorerMode::Unreachable => Err(VerifyError::Transient("HTTP 503".into())),
            ExplorerMode::Verifies => {
                if self.verified.lock().unwrap().insert(request.address) {
                    Ok(SubmitOutcome::Submitted(format!("guid-{}", request.address)))
                } else {
                    Ok(SubmitOutcome::AlreadyVerified)
                }
            }
        }
    }

    async fn poll_status(&self, _: &str) -> Result<PollStatus, VerifyError> {
        match self.mode {
            ExplorerMode::Unreachable => Err(VerifyError::Transient("HTTP 503".into())),
            ExplorerMode::Verifies => Ok(PollStatus::Verified),
        }
    }
}

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn write_artifact(root: &Path, name: &str, inputs: &[&str]) {
    let inputs: Vec<_> = inputs
        .iter()
        .map(|ty| serde_json::json!({"name": "", "type": ty}))
        .collect();
    let artifact = serde_json::json!({
        "contractName": name,
        "sourceName": format!("contracts/{}.sol", name),
        "abi": [{"type": "constructor", "inputs": inputs}],
        "bytecode": "0x6080604052",
    });
    let dir = root.join(format!("contracts/{}.sol", name));
    write(&dir.join(format!("{}.json", name)), &artifact.to_string());
    write(
        &dir.join(format!("{}.dbg.json", name)),
        r#"{"_format": "hh-sol-dbg-1", "buildInfo": "../../build-info/f00d.json"}"#,
    );
}

/// Artifacts for all three contracts sharing one build info
pub fn fixture_store() -> (tempfile::TempDir, ArtifactStore) {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_artifact(root, "KingToken", &["string", "string", "uint256", "uint8"]);
    write_artifact(root, "WETH9", &[]);
    write_artifact(root, "PreSale", &["address", "address", "address", "tuple"]);
    write(
        &root.join("build-info/f00d.json"),
        r#"{"solcLongVersion": "0.8.24+commit.e11b9ed9", "input": {"language": "Solidity", "sources": {}}}"#,
    );
    let store = ArtifactStore::new(root);
    (dir, store)
}
