//! evm-tx: Transaction building utilities for EVM deployments
//!
//! Provides the typed constructor-argument model and its ABI encoding,
//! Hardhat artifact loading, the JSON-RPC transaction request shapes and
//! local signing of raw transactions.

pub mod abi;
pub mod artifact;
pub mod request;
pub mod signer;
pub mod spec;

pub use abi::{decode_revert_reason, encode_call, encode_constructor_args, selector, ConstructorArg};
pub use artifact::{ArtifactStore, BuildInfo, ContractArtifact};
pub use request::{ContractCall, TransactionRequest};
pub use signer::{gas_with_headroom, max_fee_per_gas, LocalWallet, SignedTransaction, TxFill};
pub use spec::{Dependency, DeploymentSpec};
