//! External collaborator interfaces
//!
//! The engine never touches pool reserves, token balances or swap execution
//! directly. It drives them through these traits, which a chain client or the
//! in-memory [`crate::simulation::SimulatedChain`] implements. All calls are
//! synchronous and are never retried by the engine.

use crate::types::{AccountId, AssetId, PoolId};
use cinder_amm::U256;
use std::fmt;
use thiserror::Error;

/// Which collaborator rejected a call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collaborator {
    Pool,
    Router,
    Ledger,
}

impl fmt::Display for Collaborator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Collaborator::Pool => "pool",
            Collaborator::Router => "router",
            Collaborator::Ledger => "ledger",
        };
        f.write_str(name)
    }
}

/// A reverted collaborator call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{collaborator} call reverted: {reason}")]
pub struct CollaboratorError {
    pub collaborator: Collaborator,
    pub reason: String,
}

impl CollaboratorError {
    pub fn pool(reason: impl Into<String>) -> Self {
        Self {
            collaborator: Collaborator::Pool,
            reason: reason.into(),
        }
    }

    pub fn router(reason: impl Into<String>) -> Self {
        Self {
            collaborator: Collaborator::Router,
            reason: reason.into(),
        }
    }

    pub fn ledger(reason: impl Into<String>) -> Self {
        Self {
            collaborator: Collaborator::Ledger,
            reason: reason.into(),
        }
    }
}

pub type CallResult<T> = std::result::Result<T, CollaboratorError>;

/// Pool (pair) contract surface
pub trait PoolContract {
    /// The two underlying assets, in the pool's own order
    fn assets(&self, pool: PoolId) -> CallResult<(AssetId, AssetId)>;

    /// Reserves in the same order as [`PoolContract::assets`]
    fn reserves(&self, pool: PoolId) -> CallResult<(U256, U256)>;

    fn total_shares(&self, pool: PoolId) -> CallResult<U256>;

    fn share_balance_of(&self, pool: PoolId, holder: AccountId) -> CallResult<U256>;

    fn transfer_shares(
        &mut self,
        pool: PoolId,
        from: AccountId,
        to: AccountId,
        amount: U256,
    ) -> CallResult<()>;
}

/// Arguments of a router liquidity removal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveLiquidity {
    pub asset_a: AssetId,
    pub asset_b: AssetId,
    pub shares: U256,
    pub amount_a_min: U256,
    pub amount_b_min: U256,
    /// Account whose shares are burned
    pub owner: AccountId,
    pub recipient: AccountId,
    pub deadline: u64,
}

/// Arguments of a router exact-input swap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapExactInput {
    pub amount_in: U256,
    pub amount_out_min: U256,
    pub path: Vec<AssetId>,
    /// Account the input is taken from
    pub owner: AccountId,
    pub recipient: AccountId,
    pub deadline: u64,
}

/// Swap-routing contract surface
pub trait Router {
    /// Returns `(amount_a, amount_b)` in request order; reverts below the minimums
    fn remove_liquidity(&mut self, request: &RemoveLiquidity) -> CallResult<(U256, U256)>;

    /// Returns the output amount; reverts below `amount_out_min`
    fn swap_exact_input(&mut self, request: &SwapExactInput) -> CallResult<U256>;
}

/// Token balances and transfers. Burning is a transfer to the burn sink.
pub trait AssetLedger {
    fn balance_of(&self, asset: AssetId, holder: AccountId) -> CallResult<U256>;

    fn transfer(
        &mut self,
        asset: AssetId,
        from: AccountId,
        to: AccountId,
        amount: U256,
    ) -> CallResult<()>;
}

/// Host time source used for router deadlines
pub trait Clock {
    fn timestamp(&self) -> u64;
}

/// All-or-nothing scope for one processing cycle.
///
/// `begin` opens a scope; exactly one of `commit` or `rollback` closes it.
/// `rollback` must undo every collaborator effect since the matching `begin`.
pub trait Transactional {
    fn begin(&mut self);
    fn commit(&mut self);
    fn rollback(&mut self);
}

/// Everything a processing cycle needs from its host
pub trait Chain: PoolContract + Router + AssetLedger + Clock + Transactional {}

impl<T> Chain for T where T: PoolContract + Router + AssetLedger + Clock + Transactional {}
