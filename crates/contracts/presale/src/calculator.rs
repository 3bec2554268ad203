//! PreSale token math
//!
//! Pure functions over smallest units. All arithmetic is checked; `None`
//! means the result does not fit in a uint256.

use alloy_primitives::U256;
use deploy_core::constants::{MAX_BASIS_POINTS, NATIVE_DECIMALS};

fn pow10(decimals: u8) -> Option<U256> {
    U256::from(10u64).checked_pow(U256::from(decimals))
}

/// Tokens sold if the hard cap is reached.
///
/// `rate` is tokens (smallest unit) per whole native unit, so
/// `hard_cap` wei buys `hard_cap * rate / 10^18` tokens.
pub fn sale_tokens(hard_cap: U256, rate: U256) -> Option<U256> {
    hard_cap
        .checked_mul(rate)?
        .checked_div(pow10(NATIVE_DECIMALS)?)
}

/// `amount * bps / 10000`, rounded down
pub fn liquidity_share(amount: U256, bps: u32) -> Option<U256> {
    amount
        .checked_mul(U256::from(bps))?
        .checked_div(U256::from(MAX_BASIS_POINTS))
}

/// Deposit needed to cover the sale plus the liquidity pairing
pub fn required_token_deposit(hard_cap: U256, rate: U256, bps: u32) -> Option<U256> {
    let sold = sale_tokens(hard_cap, rate)?;
    sold.checked_add(liquidity_share(sold, bps)?)
}
