//! Basis-point ratios (1 bp = 0.01%, 10 000 bp = 100%)

use crate::error::{MathError, Result};
use ethers_core::types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Denominator every ratio in this crate is expressed against
pub const BPS_DENOMINATOR: u16 = 10_000;

/// A validated ratio in `0..=10_000` basis points.
///
/// Construction rejects anything above 100%, so arithmetic that consumes a
/// `BasisPoints` never has to re-check the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct BasisPoints(u16);

impl BasisPoints {
    pub const ZERO: Self = Self(0);
    pub const MAX: Self = Self(BPS_DENOMINATOR);

    /// Create a ratio, failing with [`MathError::InvalidBasisPoints`] above 10 000
    pub fn new(value: u16) -> Result<Self> {
        if value > BPS_DENOMINATOR {
            return Err(MathError::InvalidBasisPoints(value as u32));
        }
        Ok(Self(value))
    }

    pub const fn get(self) -> u16 {
        self.0
    }

    /// `10_000 - self`, e.g. the team ratio when `self` is the handler ratio
    pub const fn complement(self) -> Self {
        Self(BPS_DENOMINATOR - self.0)
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Whether the ratio covers the whole amount (10 000 bp)
    pub const fn is_full(self) -> bool {
        self.0 == BPS_DENOMINATOR
    }

    pub fn as_u256(self) -> U256 {
        U256::from(self.0)
    }
}

impl TryFrom<u16> for BasisPoints {
    type Error = MathError;

    fn try_from(value: u16) -> Result<Self> {
        Self::new(value)
    }
}

impl From<BasisPoints> for u16 {
    fn from(value: BasisPoints) -> Self {
        value.0
    }
}

impl fmt::Display for BasisPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}bp", self.0)
    }
}
