//! Swap quotes with slippage floors
//!
//! The quote mirrors what the router will compute on execution. The router
//! independently reverts when the executed output drops below
//! `amount_out_min`, so the floor is the only protection against price moves
//! between quoting and execution.

use crate::bps::BasisPoints;
use crate::error::Result;
use crate::v2_math::V2Math;
use ethers_core::types::U256;
use serde::Serialize;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SwapQuote {
    pub amount_in: U256,
    /// Theoretical constant-product output
    pub amount_out: U256,
    /// Output after the slippage tolerance is subtracted
    pub amount_out_min: U256,
}

impl SwapQuote {
    /// The pair handed to the router's exact-input swap
    pub fn router_args(&self) -> (U256, U256) {
        (self.amount_in, self.amount_out_min)
    }
}

pub struct SwapAdvisor;

impl SwapAdvisor {
    /// Quote `amount_in` against the given reserves.
    ///
    /// `amount_out_min` is `amount_out - floor(amount_out * tolerance / 10000)`.
    /// The discount rounds down, so outputs below `10000 / tolerance` units
    /// (under 200 at 50 bp) get a floor equal to `amount_out` rather than
    /// strictly below it.
    pub fn quote(
        amount_in: U256,
        reserve_in: U256,
        reserve_out: U256,
        fee_retained: BasisPoints,
        tolerance: BasisPoints,
    ) -> Result<SwapQuote> {
        let amount_out = V2Math::get_amount_out(amount_in, reserve_in, reserve_out, fee_retained)?;
        let amount_out_min = V2Math::apply_tolerance(amount_out, tolerance)?;

        trace!(
            amount_in = %amount_in,
            amount_out = %amount_out,
            amount_out_min = %amount_out_min,
            "swap quote"
        );

        Ok(SwapQuote {
            amount_in,
            amount_out,
            amount_out_min,
        })
    }
}
