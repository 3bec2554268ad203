//! deploy-core: Shared types, errors, and configuration
//!
//! This crate provides the foundational types used across the deployer workspace:
//! the error taxonomy, contract kinds, network profiles and exact decimal scaling.

pub mod config;
pub mod errors;
pub mod types;
pub mod units;

pub use config::*;
pub use errors::*;
pub use types::*;
pub use units::{format_units, parse_units, UnitsError};

pub use alloy_primitives::{Address, Bytes, U256};
