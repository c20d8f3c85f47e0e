//! # Batch Processor - Fee Liquidation Cycle
//!
//! ## Purpose
//!
//! Runs one processing cycle over every registered pool: split the engine's
//! collected shares between team and handler, withdraw the handler's shares
//! with slippage floors, swap the non-target side into the target asset and
//! send the target asset to the burn sink.
//!
//! ## Integration Points
//!
//! - **Input Sources**: registry snapshot and split configuration from [`crate::FeeEngine`]
//! - **Math**: `cinder_amm` splitter, withdrawal calculator and swap advisor
//! - **Output Destinations**: pool share transfers, router removals and swaps, burn transfers
//!
//! ## Architecture Role
//!
//! ```text
//! for pool in registry (insertion order):
//!   [Split] ──► [Withdraw] ──► [Threshold] ──► [Swap] ──► [Burn]
//!      │             │              │
//!   NoShares   NothingToWithdraw  BelowThreshold (lenient: skip, strict: abort)
//!
//! after the loop: total burned == 0 ──► InvalidAmount (cycle void)
//! ```
//!
//! The processor only produces a [`CycleReport`] or an error. Committing or
//! rolling back the collaborator effects is the caller's job, see
//! [`crate::FeeEngine::process_all_fees`].

use crate::collaborators::{AssetLedger, Chain, PoolContract, RemoveLiquidity, SwapExactInput};
use crate::engine::{EngineAccounts, RouterParams, SplitConfig};
use crate::error::{FeeEngineError, Result};
use crate::logging::LogEmoji;
use crate::types::{AssetId, PoolId};
use crate::{log_burn, log_skip};
use cinder_amm::{
    FeeSplitter, MathError, ShareSplit, SwapAdvisor, SwapQuote, WithdrawalCalculator, U256,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

/// How a cycle treats a pool whose target-asset floor misses the threshold.
///
/// The entry point historically took a bare boolean. Only `false` was ever
/// exercised and it skipped short pools, so `false` maps to [`Lenient`].
///
/// [`Lenient`]: ProcessingMode::Lenient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProcessingMode {
    /// Skip short pools, keep their withdrawn assets with the handler
    #[default]
    Lenient,
    /// Abort the whole cycle on the first short pool
    Strict,
}

impl From<bool> for ProcessingMode {
    fn from(strict: bool) -> Self {
        if strict {
            ProcessingMode::Strict
        } else {
            ProcessingMode::Lenient
        }
    }
}

/// Why a pool contributed nothing this cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// Engine held no shares of the pool
    NoShares,
    /// The whole balance went to the team, nothing left to liquidate
    NothingToWithdraw,
    BelowThreshold { target_floor: U256, threshold: U256 },
    /// Liquidation ran but left no target asset to burn
    NothingBurned,
}

/// Amounts moved for a pool that burned
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolReceipt {
    pub split: ShareSplit,
    pub target_withdrawn: U256,
    pub other_withdrawn: U256,
    pub swapped_in: U256,
    pub swapped_out: U256,
    /// Target asset sent to the burn sink, including balance held from earlier cycles
    pub burned: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PoolOutcome {
    Burned(PoolReceipt),
    Skipped(SkipReason),
}

impl PoolOutcome {
    pub fn burned_amount(&self) -> U256 {
        match self {
            PoolOutcome::Burned(receipt) => receipt.burned,
            PoolOutcome::Skipped(_) => U256::zero(),
        }
    }

    pub fn is_burned(&self) -> bool {
        matches!(self, PoolOutcome::Burned(_))
    }
}

/// Result of a committed cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub cycle: u64,
    pub mode: ProcessingMode,
    /// One entry per registered pool, in processing order
    pub outcomes: Vec<(PoolId, PoolOutcome)>,
    pub total_burned: U256,
}

impl CycleReport {
    pub fn outcome(&self, pool: PoolId) -> Option<&PoolOutcome> {
        self.outcomes
            .iter()
            .find(|(id, _)| *id == pool)
            .map(|(_, outcome)| outcome)
    }

    pub fn burned_pools(&self) -> impl Iterator<Item = PoolId> + '_ {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| outcome.is_burned())
            .map(|(pool, _)| *pool)
    }

    pub fn skipped_pools(&self) -> impl Iterator<Item = PoolId> + '_ {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| !outcome.is_burned())
            .map(|(pool, _)| *pool)
    }
}

/// Configuration snapshot a cycle runs against
#[derive(Debug, Clone, Copy)]
pub struct CycleContext {
    pub accounts: EngineAccounts,
    pub split: SplitConfig,
    pub router: RouterParams,
    pub cycle: u64,
}

/// Orientation of a pool relative to the target asset
#[derive(Debug, Clone, Copy)]
pub(crate) struct PoolSides {
    asset_a: AssetId,
    asset_b: AssetId,
    target_is_a: bool,
}

impl PoolSides {
    pub(crate) fn resolve<C: PoolContract + ?Sized>(
        chain: &C,
        pool: PoolId,
        target: AssetId,
    ) -> Result<Self> {
        let (asset_a, asset_b) = chain.assets(pool)?;
        let target_is_a = if asset_a == target {
            true
        } else if asset_b == target {
            false
        } else {
            return Err(FeeEngineError::TargetAssetNotInPool(pool));
        };
        Ok(Self {
            asset_a,
            asset_b,
            target_is_a,
        })
    }

    fn target(&self) -> AssetId {
        if self.target_is_a {
            self.asset_a
        } else {
            self.asset_b
        }
    }

    fn other(&self) -> AssetId {
        if self.target_is_a {
            self.asset_b
        } else {
            self.asset_a
        }
    }

    /// Reorder an `(a, b)` pair into `(target, other)`
    fn pick(&self, a: U256, b: U256) -> (U256, U256) {
        if self.target_is_a {
            (a, b)
        } else {
            (b, a)
        }
    }
}

/// Quote converting the handler's whole non-target balance into the target asset
pub(crate) fn quote_swap_to_target<C: PoolContract + AssetLedger + ?Sized>(
    chain: &C,
    ctx: &CycleContext,
    pool: PoolId,
    sides: &PoolSides,
) -> Result<SwapQuote> {
    let amount_in = chain.balance_of(sides.other(), ctx.accounts.fee_handler)?;
    if amount_in.is_zero() {
        return Ok(SwapQuote {
            amount_in,
            amount_out: U256::zero(),
            amount_out_min: U256::zero(),
        });
    }
    let (reserve_a, reserve_b) = chain.reserves(pool)?;
    let (reserve_out, reserve_in) = sides.pick(reserve_a, reserve_b);
    Ok(SwapAdvisor::quote(
        amount_in,
        reserve_in,
        reserve_out,
        ctx.router.fee_retained,
        ctx.split.slippage,
    )?)
}

struct Withdrawal {
    target_received: U256,
    other_received: U256,
    target_floor: U256,
}

pub struct BatchProcessor<'a> {
    ctx: &'a CycleContext,
    /// Pools whose split has started this cycle; updated before any transfer
    processed: HashSet<PoolId>,
}

impl<'a> BatchProcessor<'a> {
    pub fn new(ctx: &'a CycleContext) -> Self {
        Self {
            ctx,
            processed: HashSet::new(),
        }
    }

    /// Process `pools` in order; fails with `InvalidAmount` if nothing burned
    pub fn run<C: Chain + ?Sized>(
        mut self,
        chain: &mut C,
        pools: &[PoolId],
        mode: ProcessingMode,
    ) -> Result<CycleReport> {
        let deadline = chain
            .timestamp()
            .saturating_add(self.ctx.router.deadline_secs);
        let mut outcomes = Vec::with_capacity(pools.len());
        let mut total_burned = U256::zero();

        for &pool in pools {
            let outcome = self.process_pool(chain, pool, mode, deadline)?;
            total_burned = total_burned
                .checked_add(outcome.burned_amount())
                .ok_or(MathError::ArithmeticOverflow {
                    operation: "cycle burn total",
                })?;
            outcomes.push((pool, outcome));
        }

        if total_burned.is_zero() {
            return Err(FeeEngineError::InvalidAmount);
        }

        Ok(CycleReport {
            cycle: self.ctx.cycle,
            mode,
            outcomes,
            total_burned,
        })
    }

    fn process_pool<C: Chain + ?Sized>(
        &mut self,
        chain: &mut C,
        pool: PoolId,
        mode: ProcessingMode,
        deadline: u64,
    ) -> Result<PoolOutcome> {
        let sides = PoolSides::resolve(&*chain, pool, self.ctx.accounts.target_asset)?;

        let split = match self.split(chain, pool)? {
            Some(split) => split,
            None => {
                debug!(%pool, "no collected shares");
                return Ok(PoolOutcome::Skipped(SkipReason::NoShares));
            }
        };
        if split.handler.is_zero() {
            log_skip!("Pool {}: handler share is zero, nothing to withdraw", pool);
            return Ok(PoolOutcome::Skipped(SkipReason::NothingToWithdraw));
        }

        let withdrawal = self.withdraw(chain, pool, &sides, split.handler, deadline)?;

        let threshold = self.ctx.split.min_target_threshold;
        if withdrawal.target_floor < threshold {
            if mode == ProcessingMode::Strict {
                return Err(FeeEngineError::ThresholdNotMet {
                    pool,
                    floor: withdrawal.target_floor,
                    threshold,
                });
            }
            log_skip!(
                "Pool {}: target floor {} below threshold {}, holding for a later cycle",
                pool,
                withdrawal.target_floor,
                threshold
            );
            return Ok(PoolOutcome::Skipped(SkipReason::BelowThreshold {
                target_floor: withdrawal.target_floor,
                threshold,
            }));
        }

        let (swapped_in, swapped_out) = self.swap_to_target(chain, pool, &sides, deadline)?;
        let burned = self.burn(chain, &sides)?;
        if burned.is_zero() {
            return Ok(PoolOutcome::Skipped(SkipReason::NothingBurned));
        }

        log_burn!("Pool {}: burned {} of target asset", pool, burned);
        Ok(PoolOutcome::Burned(PoolReceipt {
            split,
            target_withdrawn: withdrawal.target_received,
            other_withdrawn: withdrawal.other_received,
            swapped_in,
            swapped_out,
            burned,
        }))
    }

    /// Move the engine's whole share balance to team wallet and handler.
    ///
    /// Returns `None` when the engine holds no shares of `pool`.
    pub(crate) fn split<C: Chain + ?Sized>(
        &mut self,
        chain: &mut C,
        pool: PoolId,
    ) -> Result<Option<ShareSplit>> {
        let accounts = &self.ctx.accounts;
        let balance = chain.share_balance_of(pool, accounts.engine)?;
        if balance.is_zero() {
            return Ok(None);
        }

        if !self.processed.insert(pool) {
            return Err(FeeEngineError::DuplicatePool(pool));
        }

        let split = FeeSplitter::split(balance, self.ctx.split.team_bps())?;
        if !split.team.is_zero() {
            chain.transfer_shares(pool, accounts.engine, accounts.team_wallet, split.team)?;
        }
        if !split.handler.is_zero() {
            chain.transfer_shares(pool, accounts.engine, accounts.fee_handler, split.handler)?;
        }

        info!(
            %pool,
            team = %split.team,
            handler = %split.handler,
            "{} shares split",
            LogEmoji::SPLIT
        );
        Ok(Some(split))
    }

    fn withdraw<C: Chain + ?Sized>(
        &self,
        chain: &mut C,
        pool: PoolId,
        sides: &PoolSides,
        shares: U256,
        deadline: u64,
    ) -> Result<Withdrawal> {
        let (reserve_a, reserve_b) = chain.reserves(pool)?;
        let total_supply = chain.total_shares(pool)?;
        let minimums = WithdrawalCalculator::quote(
            reserve_a,
            reserve_b,
            shares,
            total_supply,
            self.ctx.split.slippage,
        )?;

        let handler = self.ctx.accounts.fee_handler;
        let request = RemoveLiquidity {
            asset_a: sides.asset_a,
            asset_b: sides.asset_b,
            shares,
            amount_a_min: minimums.amount_a_min,
            amount_b_min: minimums.amount_b_min,
            owner: handler,
            recipient: handler,
            deadline,
        };
        let (amount_a, amount_b) = chain.remove_liquidity(&request)?;

        let (target_received, other_received) = sides.pick(amount_a, amount_b);
        let (target_floor, _) = sides.pick(minimums.amount_a_min, minimums.amount_b_min);
        debug!(
            %pool,
            %shares,
            target = %target_received,
            other = %other_received,
            "liquidity removed"
        );

        Ok(Withdrawal {
            target_received,
            other_received,
            target_floor,
        })
    }

    /// Returns `(amount_in, amount_out)`, both zero when no swap was needed
    fn swap_to_target<C: Chain + ?Sized>(
        &self,
        chain: &mut C,
        pool: PoolId,
        sides: &PoolSides,
        deadline: u64,
    ) -> Result<(U256, U256)> {
        let quote = quote_swap_to_target(&*chain, self.ctx, pool, sides)?;
        if quote.amount_out.is_zero() {
            debug!(%pool, amount_in = %quote.amount_in, "nothing to swap");
            return Ok((U256::zero(), U256::zero()));
        }

        let handler = self.ctx.accounts.fee_handler;
        let (amount_in, amount_out_min) = quote.router_args();
        let request = SwapExactInput {
            amount_in,
            amount_out_min,
            path: vec![sides.other(), sides.target()],
            owner: handler,
            recipient: handler,
            deadline,
        };
        let amount_out = chain.swap_exact_input(&request)?;

        info!(
            %pool,
            %amount_in,
            %amount_out,
            "{} swapped into target asset",
            LogEmoji::SWAP
        );
        Ok((amount_in, amount_out))
    }

    fn burn<C: Chain + ?Sized>(&self, chain: &mut C, sides: &PoolSides) -> Result<U256> {
        let accounts = &self.ctx.accounts;
        let balance = chain.balance_of(sides.target(), accounts.fee_handler)?;
        if !balance.is_zero() {
            chain.transfer(
                sides.target(),
                accounts.fee_handler,
                accounts.burn_sink,
                balance,
            )?;
        }
        Ok(balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::SimulatedChain;
    use ethers_core::types::Address;

    fn addr(n: u64) -> Address {
        Address::from_low_u64_be(n)
    }

    fn context() -> CycleContext {
        CycleContext {
            accounts: EngineAccounts {
                engine: addr(10),
                fee_handler: addr(11),
                team_wallet: addr(12),
                burn_sink: addr(13),
                target_asset: AssetId(addr(100)),
            },
            split: SplitConfig::new(6000, 50, U256::zero()).unwrap(),
            router: RouterParams::new(9980, 1200).unwrap(),
            cycle: 1,
        }
    }

    #[test]
    fn test_pool_split_twice_in_one_cycle_is_rejected() {
        let ctx = context();
        let provider = addr(2);
        let reserve = U256::exp10(22);
        let mut chain = SimulatedChain::new();
        chain.mint(ctx.accounts.target_asset, provider, reserve).unwrap();
        chain.mint(AssetId(addr(101)), provider, reserve).unwrap();
        let pool = chain
            .create_pool(ctx.accounts.target_asset, AssetId(addr(101)))
            .unwrap();
        chain.add_liquidity(pool, provider, reserve, reserve).unwrap();
        chain
            .transfer_shares(pool, provider, ctx.accounts.engine, U256::from(10))
            .unwrap();

        let mut processor = BatchProcessor::new(&ctx);
        let first = processor.split(&mut chain, pool).unwrap().unwrap();
        assert_eq!(first.team, U256::from(4));
        assert_eq!(first.handler, U256::from(6));

        // Shares arriving mid-cycle are left for the next cycle
        chain
            .transfer_shares(pool, provider, ctx.accounts.engine, U256::from(10))
            .unwrap();
        assert_eq!(
            processor.split(&mut chain, pool),
            Err(FeeEngineError::DuplicatePool(pool))
        );
        assert_eq!(
            chain.share_balance_of(pool, ctx.accounts.engine).unwrap(),
            U256::from(10)
        );
    }

    #[test]
    fn test_mode_from_flag() {
        assert_eq!(ProcessingMode::from(false), ProcessingMode::Lenient);
        assert_eq!(ProcessingMode::from(true), ProcessingMode::Strict);
        assert_eq!(ProcessingMode::default(), ProcessingMode::Lenient);
    }

    #[test]
    fn test_outcome_burned_amount() {
        let skipped = PoolOutcome::Skipped(SkipReason::NoShares);
        assert_eq!(skipped.burned_amount(), U256::zero());
        assert!(!skipped.is_burned());

        let burned = PoolOutcome::Burned(PoolReceipt {
            split: ShareSplit {
                team: U256::from(4),
                handler: U256::from(6),
            },
            target_withdrawn: U256::from(6),
            other_withdrawn: U256::from(6),
            swapped_in: U256::from(6),
            swapped_out: U256::from(5),
            burned: U256::from(11),
        });
        assert_eq!(burned.burned_amount(), U256::from(11));
        assert!(burned.is_burned());
    }
}
