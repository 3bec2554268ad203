//! WETH9
//!
//! Wrapped native asset. No constructor arguments; funding is a `deposit()`
//! call carrying native currency, which mints the same amount of WETH to
//! the caller.

pub mod constants;
pub mod params;

pub use params::{funding_calls, parse_funding_amount, WethParams};
