//! PreSale parameter names and defaults

/// Field names as they appear in the `PresaleOption` struct and in errors
pub mod fields {
    pub const TOKEN_DEPOSIT: &str = "tokenDeposit";
    pub const HARD_CAP: &str = "hardCap";
    pub const SOFT_CAP: &str = "softCap";
    pub const MAX_CONTRIBUTION: &str = "maxContribution";
    pub const MIN_CONTRIBUTION: &str = "minContribution";
    pub const START_TIMESTAMP: &str = "startTimestamp";
    pub const END_TIMESTAMP: &str = "endTimestamp";
    pub const LIQUIDITY_BPS: &str = "liquidityBasisPoints";
    pub const RATE: &str = "rate";
    pub const WETH: &str = "weth";
    pub const TOKEN: &str = "token";
    pub const ROUTER: &str = "router";
}

/// Default sale: 1M tokens, 1.5 / 3 native caps, 0.1..2 per wallet, half to liquidity
pub const DEFAULT_TOKEN_DEPOSIT: &str = "1000000";
pub const DEFAULT_HARD_CAP: &str = "3";
pub const DEFAULT_SOFT_CAP: &str = "1.5";
pub const DEFAULT_MAX_CONTRIBUTION: &str = "2";
pub const DEFAULT_MIN_CONTRIBUTION: &str = "0.1";
pub const DEFAULT_LIQUIDITY_BPS: u32 = 5_000;
