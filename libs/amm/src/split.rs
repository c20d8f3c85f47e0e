//! Team / handler allocation of collected pool shares

use crate::bps::{BasisPoints, BPS_DENOMINATOR};
use crate::error::Result;
use crate::v2_math::V2Math;
use ethers_core::types::U256;
use serde::Serialize;

/// Result of splitting one pool's collected shares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShareSplit {
    pub team: U256,
    pub handler: U256,
}

impl ShareSplit {
    pub fn total(&self) -> U256 {
        // team + handler was derived from a single U256 total
        self.team + self.handler
    }
}

pub struct FeeSplitter;

impl FeeSplitter {
    /// `team = floor(total * team_bps / 10000)`, the handler takes the rest.
    ///
    /// Assigning the rounding remainder to the handler means nothing is left
    /// behind in the engine after both transfers.
    pub fn split(total_shares: U256, team_bps: BasisPoints) -> Result<ShareSplit> {
        let team = V2Math::mul_div(
            total_shares,
            team_bps.as_u256(),
            U256::from(BPS_DENOMINATOR),
            "team share",
        )?;
        Ok(ShareSplit {
            team,
            handler: total_shares - team,
        })
    }
}
