//! Slippage floors for removing liquidity from a constant-product pool
//!
//! The router reverts a removal whose actual outputs fall below the minimums
//! passed to it. This module computes those minimums from the pool's current
//! reserves and share supply; it never moves assets itself.

use crate::bps::BasisPoints;
use crate::error::{MathError, Result};
use crate::v2_math::V2Math;
use ethers_core::types::U256;
use serde::Serialize;
use tracing::trace;

/// Expected and slippage-protected outputs of burning pool shares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WithdrawalMinimums {
    pub amount_a: U256,
    pub amount_b: U256,
    pub amount_a_min: U256,
    pub amount_b_min: U256,
}

pub struct WithdrawalCalculator;

impl WithdrawalCalculator {
    /// Un-tolerated pro-rata amounts: `floor(shares * reserve / total_supply)`
    pub fn proportional_amounts(
        reserve_a: U256,
        reserve_b: U256,
        share_amount: U256,
        total_supply: U256,
    ) -> Result<(U256, U256)> {
        if total_supply.is_zero() {
            return Err(MathError::ZeroTotalSupply);
        }
        let amount_a = V2Math::proportional_share(share_amount, reserve_a, total_supply)?;
        let amount_b = V2Math::proportional_share(share_amount, reserve_b, total_supply)?;
        Ok((amount_a, amount_b))
    }

    /// Minimum acceptable `(amount_a, amount_b)` for burning `share_amount`.
    ///
    /// `tolerance` must be below 10 000 bp. The caller is responsible for
    /// checking that `share_amount` does not exceed the balance it burns.
    pub fn min_amounts(
        reserve_a: U256,
        reserve_b: U256,
        share_amount: U256,
        total_supply: U256,
        tolerance: BasisPoints,
    ) -> Result<(U256, U256)> {
        let quote = Self::quote(reserve_a, reserve_b, share_amount, total_supply, tolerance)?;
        Ok((quote.amount_a_min, quote.amount_b_min))
    }

    pub fn quote(
        reserve_a: U256,
        reserve_b: U256,
        share_amount: U256,
        total_supply: U256,
        tolerance: BasisPoints,
    ) -> Result<WithdrawalMinimums> {
        let (amount_a, amount_b) =
            Self::proportional_amounts(reserve_a, reserve_b, share_amount, total_supply)?;
        let quote = WithdrawalMinimums {
            amount_a,
            amount_b,
            amount_a_min: V2Math::apply_tolerance(amount_a, tolerance)?,
            amount_b_min: V2Math::apply_tolerance(amount_b, tolerance)?,
        };

        trace!(
            shares = %share_amount,
            total_supply = %total_supply,
            amount_a_min = %quote.amount_a_min,
            amount_b_min = %quote.amount_b_min,
            "withdrawal minimums"
        );

        Ok(quote)
    }
}
