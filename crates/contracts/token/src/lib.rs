//! KingToken
//!
//! Fixed-supply fungible token. The whole supply is minted to the deployer;
//! the contract scales `totalSupply` by `10^decimals` itself.

pub mod constants;
pub mod params;

pub use params::{RawTokenParams, TokenParams};
