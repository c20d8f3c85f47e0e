//! Error types for the fee engine

use crate::collaborators::CollaboratorError;
use crate::types::{AccountId, PoolId};
use cinder_amm::{MathError, U256};
use thiserror::Error;

/// Every failure the engine reports.
///
/// All variants are hard failures: a processing cycle that hits one is rolled
/// back as a unit. The per-pool threshold shortfall is not an error in lenient
/// mode and never appears here except as [`FeeEngineError::ThresholdNotMet`]
/// under strict processing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeeEngineError {
    #[error("Unauthorized: {caller:?} lacks the required role")]
    Unauthorized { caller: AccountId },

    #[error("Pool {0} is already registered")]
    DuplicatePool(PoolId),

    #[error("Pool {0} is not registered")]
    UnknownPool(PoolId),

    #[error("Registry index {index} out of range (count {count})")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("Invalid amount: no pool produced a burn this cycle")]
    InvalidAmount,

    #[error("Math error: {0}")]
    Math(#[from] MathError),

    #[error("External call failure: {0}")]
    ExternalCallFailure(#[from] CollaboratorError),

    #[error("Pool {0} does not hold the target asset")]
    TargetAssetNotInPool(PoolId),

    #[error("Pool {pool}: target floor {floor} below threshold {threshold}")]
    ThresholdNotMet {
        pool: PoolId,
        floor: U256,
        threshold: U256,
    },

    #[error("Configuration error: {message}")]
    InvalidConfig { message: String },
}

pub type Result<T> = std::result::Result<T, FeeEngineError>;
