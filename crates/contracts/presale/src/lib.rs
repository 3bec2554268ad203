//! PreSale
//!
//! Capped crowdsale in native currency. Contributions are collected between
//! `start` and `end`; afterwards `liquidityBps` of the raise is paired with
//! tokens from the deposit to seed an AMM pool through the router.
//!
//! The deployer validates the economic parameters locally before anything is
//! sent, so an inconsistent cap set never reaches the chain.

pub mod calculator;
pub mod constants;
pub mod params;

pub use calculator::{liquidity_share, required_token_deposit, sale_tokens};
pub use params::{PresaleDependencies, PresaleParameters, RawPresaleParams};
