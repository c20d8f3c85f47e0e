//! # Cinder AMM Library - Fee Liquidation Mathematics
//!
//! ## Purpose
//!
//! Exact integer mathematics for turning collected liquidity-pool shares into a
//! burnable target asset: slippage floors for liquidity removal, the team /
//! handler split of collected shares, and constant-product swap quotes with
//! tolerance-derived minimums.
//!
//! ## Integration Points
//!
//! - **Input Sources**: pool reserves and share supply read by the fee processor
//! - **Output Destinations**: router call arguments (minimum amounts), split transfers
//! - **Precision**: U256 smallest units, multiply before divide, every step checked
//!
//! ## Architecture Role
//!
//! ```text
//! Pool State ──► [WithdrawalCalculator] ──► removeLiquidity floors
//!     │
//!     ├────────► [FeeSplitter] ───────────► team / handler transfers
//!     │
//!     └────────► [SwapAdvisor] ───────────► swapExactInput floor
//!                       │
//!                   [V2Math] checked x*y=k primitives
//! ```
//!
//! All functions are pure. Failures are limited to invalid input ranges and
//! values that leave the U256 domain, reported as [`MathError`].

pub mod bps;
pub mod error;
pub mod split;
pub mod swap;
pub mod units;
pub mod v2_math;
pub mod withdrawal;

pub use bps::{BasisPoints, BPS_DENOMINATOR};
pub use error::{MathError, Result};
pub use split::{FeeSplitter, ShareSplit};
pub use swap::{SwapAdvisor, SwapQuote};
pub use units::{format_units, to_decimal};
pub use v2_math::{V2Math, V2PoolState};
pub use withdrawal::{WithdrawalCalculator, WithdrawalMinimums};

/// Smallest-unit amount type shared across the workspace
pub use ethers_core::types::U256;
