//! Error types for fee-liquidation math

use thiserror::Error;

/// Failures raised by the pure AMM computations.
///
/// Every variant describes an invalid input range or an intermediate value
/// that left the U256 domain. None of them are retryable: a caller that sees
/// one of these inside a processing cycle must abort the whole cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MathError {
    #[error("Arithmetic overflow in {operation}")]
    ArithmeticOverflow { operation: &'static str },

    #[error("Division by zero in {operation}")]
    DivisionByZero { operation: &'static str },

    #[error("Total share supply is zero")]
    ZeroTotalSupply,

    #[error("Basis points out of range: {0} (max 10000)")]
    InvalidBasisPoints(u32),

    #[error("Slippage tolerance must be below 10000 bps, got {0}")]
    InvalidTolerance(u16),

    #[error("Insufficient liquidity: reserves must be positive and cover the requested output")]
    InsufficientLiquidity,
}

pub type Result<T> = std::result::Result<T, MathError>;
