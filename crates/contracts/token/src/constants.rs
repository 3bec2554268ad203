//! KingToken defaults

/// Defaults used when the operator does not override them
pub const DEFAULT_NAME: &str = "Tether USD";
pub const DEFAULT_SYMBOL: &str = "USDT";
pub const DEFAULT_TOTAL_SUPPLY: &str = "1000000";
pub const DEFAULT_DECIMALS: u8 = 6;
