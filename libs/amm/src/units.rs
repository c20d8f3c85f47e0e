//! Human-readable token amounts for logs and reports

use ethers_core::types::U256;
use rust_decimal::Decimal;

/// Scale a smallest-unit amount by `decimals`.
///
/// Returns `None` when the amount does not fit Decimal's 96-bit mantissa or
/// `decimals` exceeds its maximum scale of 28.
pub fn to_decimal(amount: U256, decimals: u32) -> Option<Decimal> {
    if amount > U256::from(u128::MAX) {
        return None;
    }
    let raw = i128::try_from(amount.as_u128()).ok()?;
    Decimal::try_from_i128_with_scale(raw, decimals)
        .ok()
        .map(|value| value.normalize())
}

/// Format for display, falling back to the raw integer with a unit suffix
pub fn format_units(amount: U256, decimals: u32) -> String {
    match to_decimal(amount, decimals) {
        Some(value) => value.to_string(),
        None => format!("{} (raw)", amount),
    }
}
