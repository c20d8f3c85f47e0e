//! In-memory chain for exercising the engine without a node.
//!
//! Models constant-product pools with a locked minimum-liquidity deposit, a
//! router that enforces withdrawal/output floors and deadlines, a token
//! ledger, and snapshot-based [`Transactional`] scopes so rollback restores
//! every pool, balance and share exactly.

use crate::collaborators::{
    AssetLedger, CallResult, Clock, CollaboratorError, PoolContract, RemoveLiquidity, Router,
    SwapExactInput, Transactional,
};
use crate::types::{AccountId, AssetId, PoolId};
use cinder_amm::{BasisPoints, V2Math, U256};
use ethers_core::types::Address;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Shares locked to the zero address on a pool's first deposit
pub const MINIMUM_LIQUIDITY: u64 = 1_000;

const DEFAULT_FEE_RETAINED_BPS: u16 = 9_980;
const GENESIS_TIMESTAMP: u64 = 1_700_000_000;
const POOL_ADDRESS_BASE: u64 = 0xF0_0000;

#[derive(Debug, Clone)]
struct SimPool {
    asset_a: AssetId,
    asset_b: AssetId,
    reserve_a: U256,
    reserve_b: U256,
    total_shares: U256,
    shares: HashMap<AccountId, U256>,
}

impl SimPool {
    fn share_balance(&self, holder: AccountId) -> U256 {
        self.shares.get(&holder).copied().unwrap_or_default()
    }

    /// Reserves ordered as `(reserve of asset, reserve of the other)`
    fn oriented_reserves(&self, asset: AssetId) -> (U256, U256) {
        if asset == self.asset_a {
            (self.reserve_a, self.reserve_b)
        } else {
            (self.reserve_b, self.reserve_a)
        }
    }

    fn set_oriented_reserves(&mut self, asset: AssetId, reserve: U256, other: U256) {
        if asset == self.asset_a {
            self.reserve_a = reserve;
            self.reserve_b = other;
        } else {
            self.reserve_b = reserve;
            self.reserve_a = other;
        }
    }
}

#[derive(Debug, Clone, Default)]
struct ChainState {
    pools: HashMap<PoolId, SimPool>,
    pairs: HashMap<(AssetId, AssetId), PoolId>,
    balances: HashMap<(AssetId, AccountId), U256>,
    timestamp: u64,
    /// Seconds between a router call being built and landing on chain
    inclusion_delay: u64,
    router_paused: bool,
    pools_created: u64,
}

impl ChainState {
    fn pool(&self, pool: PoolId) -> CallResult<&SimPool> {
        self.pools
            .get(&pool)
            .ok_or_else(|| CollaboratorError::pool(format!("no pool at {}", pool)))
    }

    fn pool_mut(&mut self, pool: PoolId) -> CallResult<&mut SimPool> {
        self.pools
            .get_mut(&pool)
            .ok_or_else(|| CollaboratorError::pool(format!("no pool at {}", pool)))
    }

    fn pair(&self, x: AssetId, y: AssetId) -> CallResult<PoolId> {
        self.pairs
            .get(&pair_key(x, y))
            .copied()
            .ok_or_else(|| CollaboratorError::router(format!("no pool for {}/{}", x, y)))
    }

    fn balance(&self, asset: AssetId, holder: AccountId) -> U256 {
        self.balances
            .get(&(asset, holder))
            .copied()
            .unwrap_or_default()
    }

    fn credit(&mut self, asset: AssetId, holder: AccountId, amount: U256) -> CallResult<()> {
        let entry = self.balances.entry((asset, holder)).or_default();
        *entry = entry
            .checked_add(amount)
            .ok_or_else(|| CollaboratorError::ledger("balance overflow"))?;
        Ok(())
    }

    fn debit(&mut self, asset: AssetId, holder: AccountId, amount: U256) -> CallResult<()> {
        let balance = self.balance(asset, holder);
        if balance < amount {
            return Err(CollaboratorError::ledger(format!(
                "insufficient {} balance for {:?}: {} < {}",
                asset, holder, balance, amount
            )));
        }
        self.balances.insert((asset, holder), balance - amount);
        Ok(())
    }

    fn check_router(&self, deadline: u64) -> CallResult<()> {
        if self.router_paused {
            return Err(CollaboratorError::router("router paused"));
        }
        if deadline < self.timestamp.saturating_add(self.inclusion_delay) {
            return Err(CollaboratorError::router("EXPIRED"));
        }
        Ok(())
    }
}

fn pair_key(x: AssetId, y: AssetId) -> (AssetId, AssetId) {
    if x <= y {
        (x, y)
    } else {
        (y, x)
    }
}

/// Single-router chain simulation implementing every collaborator trait
#[derive(Debug, Clone)]
pub struct SimulatedChain {
    state: ChainState,
    snapshots: Vec<ChainState>,
    fee_retained: BasisPoints,
}

impl Default for SimulatedChain {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedChain {
    pub fn new() -> Self {
        Self {
            state: ChainState {
                timestamp: GENESIS_TIMESTAMP,
                ..ChainState::default()
            },
            snapshots: Vec::new(),
            fee_retained: BasisPoints::new(DEFAULT_FEE_RETAINED_BPS)
                .unwrap_or(BasisPoints::MAX),
        }
    }

    pub fn with_fee_retained(mut self, fee_retained: BasisPoints) -> Self {
        self.fee_retained = fee_retained;
        self
    }

    /// Create an empty pool for `asset_a`/`asset_b`
    pub fn create_pool(&mut self, asset_a: AssetId, asset_b: AssetId) -> CallResult<PoolId> {
        if asset_a == asset_b {
            return Err(CollaboratorError::pool("identical assets"));
        }
        let key = pair_key(asset_a, asset_b);
        if self.state.pairs.contains_key(&key) {
            return Err(CollaboratorError::pool("pool exists"));
        }

        self.state.pools_created += 1;
        let pool = PoolId(Address::from_low_u64_be(
            POOL_ADDRESS_BASE + self.state.pools_created,
        ));
        self.state.pools.insert(
            pool,
            SimPool {
                asset_a,
                asset_b,
                reserve_a: U256::zero(),
                reserve_b: U256::zero(),
                total_shares: U256::zero(),
                shares: HashMap::new(),
            },
        );
        self.state.pairs.insert(key, pool);
        debug!(%pool, %asset_a, %asset_b, "pool created");
        Ok(pool)
    }

    pub fn mint(&mut self, asset: AssetId, to: AccountId, amount: U256) -> CallResult<()> {
        self.state.credit(asset, to, amount)
    }

    /// Deposit from `provider`'s balances, returning the shares minted to it
    pub fn add_liquidity(
        &mut self,
        pool: PoolId,
        provider: AccountId,
        amount_a: U256,
        amount_b: U256,
    ) -> CallResult<U256> {
        let (asset_a, asset_b, reserve_a, reserve_b, total) = {
            let p = self.state.pool(pool)?;
            (p.asset_a, p.asset_b, p.reserve_a, p.reserve_b, p.total_shares)
        };

        let minted = if total.is_zero() {
            let product = amount_a
                .checked_mul(amount_b)
                .ok_or_else(|| CollaboratorError::pool("deposit overflow"))?;
            product
                .integer_sqrt()
                .checked_sub(U256::from(MINIMUM_LIQUIDITY))
                .ok_or_else(|| CollaboratorError::pool("INSUFFICIENT_LIQUIDITY_MINTED"))?
        } else {
            let by_a = V2Math::proportional_share(amount_a, total, reserve_a)
                .map_err(|e| CollaboratorError::pool(e.to_string()))?;
            let by_b = V2Math::proportional_share(amount_b, total, reserve_b)
                .map_err(|e| CollaboratorError::pool(e.to_string()))?;
            by_a.min(by_b)
        };
        if minted.is_zero() {
            return Err(CollaboratorError::pool("INSUFFICIENT_LIQUIDITY_MINTED"));
        }

        self.state.debit(asset_a, provider, amount_a)?;
        self.state.debit(asset_b, provider, amount_b)?;

        let p = self.state.pool_mut(pool)?;
        if total.is_zero() {
            p.shares
                .insert(Address::zero(), U256::from(MINIMUM_LIQUIDITY));
            p.total_shares = U256::from(MINIMUM_LIQUIDITY);
        }
        p.reserve_a += amount_a;
        p.reserve_b += amount_b;
        p.total_shares += minted;
        *p.shares.entry(provider).or_default() += minted;
        Ok(minted)
    }

    pub fn set_router_paused(&mut self, paused: bool) {
        self.state.router_paused = paused;
    }

    /// Router calls execute `secs` after the engine reads the clock
    pub fn set_inclusion_delay(&mut self, secs: u64) {
        self.state.inclusion_delay = secs;
    }

    /// Open transactional scopes
    pub fn depth(&self) -> usize {
        self.snapshots.len()
    }
}

impl PoolContract for SimulatedChain {
    fn assets(&self, pool: PoolId) -> CallResult<(AssetId, AssetId)> {
        let p = self.state.pool(pool)?;
        Ok((p.asset_a, p.asset_b))
    }

    fn reserves(&self, pool: PoolId) -> CallResult<(U256, U256)> {
        let p = self.state.pool(pool)?;
        Ok((p.reserve_a, p.reserve_b))
    }

    fn total_shares(&self, pool: PoolId) -> CallResult<U256> {
        Ok(self.state.pool(pool)?.total_shares)
    }

    fn share_balance_of(&self, pool: PoolId, holder: AccountId) -> CallResult<U256> {
        Ok(self.state.pool(pool)?.share_balance(holder))
    }

    fn transfer_shares(
        &mut self,
        pool: PoolId,
        from: AccountId,
        to: AccountId,
        amount: U256,
    ) -> CallResult<()> {
        let p = self.state.pool_mut(pool)?;
        let balance = p.share_balance(from);
        if balance < amount {
            return Err(CollaboratorError::pool(format!(
                "insufficient shares: {} < {}",
                balance, amount
            )));
        }
        p.shares.insert(from, balance - amount);
        *p.shares.entry(to).or_default() += amount;
        Ok(())
    }
}

impl Router for SimulatedChain {
    fn remove_liquidity(&mut self, request: &RemoveLiquidity) -> CallResult<(U256, U256)> {
        self.state.check_router(request.deadline)?;
        let pool = self.state.pair(request.asset_a, request.asset_b)?;

        let p = self.state.pool(pool)?;
        if p.share_balance(request.owner) < request.shares {
            return Err(CollaboratorError::router("insufficient shares"));
        }
        let (reserve_a, reserve_b) = p.oriented_reserves(request.asset_a);
        let to_router = |e: cinder_amm::MathError| CollaboratorError::router(e.to_string());
        let amount_a = V2Math::proportional_share(request.shares, reserve_a, p.total_shares)
            .map_err(to_router)?;
        let amount_b = V2Math::proportional_share(request.shares, reserve_b, p.total_shares)
            .map_err(to_router)?;

        if amount_a < request.amount_a_min {
            return Err(CollaboratorError::router("INSUFFICIENT_A_AMOUNT"));
        }
        if amount_b < request.amount_b_min {
            return Err(CollaboratorError::router("INSUFFICIENT_B_AMOUNT"));
        }

        let p = self.state.pool_mut(pool)?;
        let owner_shares = p.share_balance(request.owner);
        p.shares.insert(request.owner, owner_shares - request.shares);
        p.total_shares -= request.shares;
        p.set_oriented_reserves(request.asset_a, reserve_a - amount_a, reserve_b - amount_b);

        self.state.credit(request.asset_a, request.recipient, amount_a)?;
        self.state.credit(request.asset_b, request.recipient, amount_b)?;
        Ok((amount_a, amount_b))
    }

    fn swap_exact_input(&mut self, request: &SwapExactInput) -> CallResult<U256> {
        self.state.check_router(request.deadline)?;
        let (asset_in, asset_out) = match request.path.as_slice() {
            [asset_in, asset_out] => (*asset_in, *asset_out),
            _ => return Err(CollaboratorError::router("unsupported path")),
        };
        let pool = self.state.pair(asset_in, asset_out)?;

        let (reserve_in, reserve_out) = self.state.pool(pool)?.oriented_reserves(asset_in);
        let amount_out = V2Math::get_amount_out(
            request.amount_in,
            reserve_in,
            reserve_out,
            self.fee_retained,
        )
        .map_err(|e| CollaboratorError::router(e.to_string()))?;
        if amount_out < request.amount_out_min {
            warn!(
                %amount_out,
                min = %request.amount_out_min,
                "swap output below floor"
            );
            return Err(CollaboratorError::router("INSUFFICIENT_OUTPUT_AMOUNT"));
        }

        self.state.debit(asset_in, request.owner, request.amount_in)?;
        let p = self.state.pool_mut(pool)?;
        p.set_oriented_reserves(
            asset_in,
            reserve_in + request.amount_in,
            reserve_out - amount_out,
        );
        self.state.credit(asset_out, request.recipient, amount_out)?;
        Ok(amount_out)
    }
}

impl AssetLedger for SimulatedChain {
    fn balance_of(&self, asset: AssetId, holder: AccountId) -> CallResult<U256> {
        Ok(self.state.balance(asset, holder))
    }

    fn transfer(
        &mut self,
        asset: AssetId,
        from: AccountId,
        to: AccountId,
        amount: U256,
    ) -> CallResult<()> {
        self.state.debit(asset, from, amount)?;
        self.state.credit(asset, to, amount)
    }
}

impl Clock for SimulatedChain {
    fn timestamp(&self) -> u64 {
        self.state.timestamp
    }
}

impl Transactional for SimulatedChain {
    fn begin(&mut self) {
        self.snapshots.push(self.state.clone());
    }

    fn commit(&mut self) {
        self.snapshots.pop();
    }

    fn rollback(&mut self) {
        match self.snapshots.pop() {
            Some(snapshot) => self.state = snapshot,
            None => warn!("rollback without an open scope"),
        }
    }
}
