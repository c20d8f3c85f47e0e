//! Uniswap V2 AMM math over U256 smallest units
//!
//! Every product is formed before the division that follows it, and every
//! step is checked. Intermediate values such as `amount_in * fee * reserve_out`
//! routinely exceed `u128` for 18-decimal tokens, which is why the whole
//! module works in U256.

use crate::bps::{BasisPoints, BPS_DENOMINATOR};
use crate::error::{MathError, Result};
use ethers_core::types::U256;

/// Constant-product pool state seen from one swap direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct V2PoolState {
    pub reserve_in: U256,
    pub reserve_out: U256,
    /// Share of the input that reaches the curve (9980 = 0.2% fee)
    pub fee_retained: BasisPoints,
}

impl V2PoolState {
    pub fn get_amount_out(&self, amount_in: U256) -> Result<U256> {
        V2Math::get_amount_out(amount_in, self.reserve_in, self.reserve_out, self.fee_retained)
    }

    pub fn get_amount_in(&self, amount_out: U256) -> Result<U256> {
        V2Math::get_amount_in(amount_out, self.reserve_in, self.reserve_out, self.fee_retained)
    }
}

/// V2 AMM math functions with exact integer rounding
pub struct V2Math;

impl V2Math {
    /// `floor(a * b / denominator)` with checked multiplication
    pub fn mul_div(a: U256, b: U256, denominator: U256, operation: &'static str) -> Result<U256> {
        if denominator.is_zero() {
            return Err(MathError::DivisionByZero { operation });
        }
        let product = a
            .checked_mul(b)
            .ok_or(MathError::ArithmeticOverflow { operation })?;
        Ok(product / denominator)
    }

    /// Pro-rata claim of `shares` out of `total_supply` on `reserve`
    pub fn proportional_share(shares: U256, reserve: U256, total_supply: U256) -> Result<U256> {
        if total_supply.is_zero() {
            return Err(MathError::ZeroTotalSupply);
        }
        Self::mul_div(shares, reserve, total_supply, "proportional share")
    }

    /// Lower an expected amount by a slippage tolerance.
    ///
    /// Computed as `amount - floor(amount * tolerance / 10000)`, so the
    /// discount is rounded down and the floor never undershoots the ratio.
    /// Tolerance must stay strictly below 100%.
    pub fn apply_tolerance(amount: U256, tolerance: BasisPoints) -> Result<U256> {
        if tolerance.is_full() {
            return Err(MathError::InvalidTolerance(tolerance.get()));
        }
        let discount = Self::mul_div(
            amount,
            tolerance.as_u256(),
            U256::from(BPS_DENOMINATOR),
            "slippage discount",
        )?;
        // discount <= amount because tolerance < 10000
        Ok(amount - discount)
    }

    /// Exact output of a constant-product swap with a proportional fee:
    /// `amount_in * fee * reserve_out / (reserve_in * 10000 + amount_in * fee)`
    pub fn get_amount_out(
        amount_in: U256,
        reserve_in: U256,
        reserve_out: U256,
        fee_retained: BasisPoints,
    ) -> Result<U256> {
        if amount_in.is_zero() {
            return Ok(U256::zero());
        }
        if reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(MathError::InsufficientLiquidity);
        }

        let overflow = MathError::ArithmeticOverflow {
            operation: "swap amount out",
        };
        let amount_in_with_fee = amount_in
            .checked_mul(fee_retained.as_u256())
            .ok_or_else(|| overflow.clone())?;
        let numerator = amount_in_with_fee
            .checked_mul(reserve_out)
            .ok_or_else(|| overflow.clone())?;
        let denominator = reserve_in
            .checked_mul(U256::from(BPS_DENOMINATOR))
            .and_then(|scaled| scaled.checked_add(amount_in_with_fee))
            .ok_or(overflow)?;

        Ok(numerator / denominator)
    }

    /// Minimum input that yields at least `amount_out` (rounded up)
    pub fn get_amount_in(
        amount_out: U256,
        reserve_in: U256,
        reserve_out: U256,
        fee_retained: BasisPoints,
    ) -> Result<U256> {
        if amount_out.is_zero() {
            return Ok(U256::zero());
        }
        if reserve_in.is_zero() || amount_out >= reserve_out {
            return Err(MathError::InsufficientLiquidity);
        }
        if fee_retained.is_zero() {
            return Err(MathError::DivisionByZero {
                operation: "swap amount in",
            });
        }

        let overflow = MathError::ArithmeticOverflow {
            operation: "swap amount in",
        };
        let numerator = reserve_in
            .checked_mul(amount_out)
            .and_then(|v| v.checked_mul(U256::from(BPS_DENOMINATOR)))
            .ok_or_else(|| overflow.clone())?;
        let denominator = (reserve_out - amount_out)
            .checked_mul(fee_retained.as_u256())
            .ok_or_else(|| overflow.clone())?;

        (numerator / denominator)
            .checked_add(U256::one())
            .ok_or(overflow)
    }
}
