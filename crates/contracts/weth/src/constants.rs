//! WETH9 call surface

/// Payable; mints `msg.value` to the sender
pub const DEPOSIT_SIGNATURE: &str = "deposit()";
