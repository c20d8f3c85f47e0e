//! # Fee Engine - Admin Surface and Cycle Entry Points
//!
//! Owns the pool registry, split configuration and role assignments, and
//! wraps every processing cycle in a [`Transactional`] scope so a cycle either
//! commits all of its collaborator effects or none of them.
//!
//! ## Roles
//!
//! - **Admin**: registers pools, changes split ratio, slippage, threshold,
//!   team wallet, burn sink and operator, and can hand the role over
//! - **Operator**: optional; may trigger cycles and share splits alongside the admin
//!
//! [`Transactional`]: crate::collaborators::Transactional

use crate::batch::{
    quote_swap_to_target, BatchProcessor, CycleContext, CycleReport, PoolSides, ProcessingMode,
};
use crate::collaborators::{AssetLedger, Chain, PoolContract};
use crate::error::{FeeEngineError, Result};
use crate::registry::PoolRegistry;
use crate::types::{AccountId, AssetId, PoolId};
use crate::{log_admin, log_error, log_execution, log_success};
use cinder_amm::{
    format_units, BasisPoints, MathError, ShareSplit, SwapQuote, WithdrawalCalculator,
    WithdrawalMinimums, U256,
};
use cinder_config::EngineConfig;
use ethers_core::types::Address;
use serde::Serialize;

/// Decimals of the target asset, used only for log formatting
const TARGET_DECIMALS: u32 = 18;

/// Split ratio, slippage tolerance and threshold for every cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SplitConfig {
    /// Handler's portion of collected shares; the team receives the complement
    pub handler_bps: BasisPoints,
    pub slippage: BasisPoints,
    /// Minimum target-asset withdrawal floor for a pool to be liquidated
    pub min_target_threshold: U256,
}

impl SplitConfig {
    pub fn new(handler_bps: u16, slippage_bps: u16, min_target_threshold: U256) -> Result<Self> {
        let slippage = BasisPoints::new(slippage_bps)?;
        if slippage.is_full() {
            return Err(MathError::InvalidTolerance(slippage_bps).into());
        }
        Ok(Self {
            handler_bps: BasisPoints::new(handler_bps)?,
            slippage,
            min_target_threshold,
        })
    }

    pub fn team_bps(&self) -> BasisPoints {
        self.handler_bps.complement()
    }
}

/// Fixed accounts the engine moves value between
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngineAccounts {
    /// Holder of collected protocol-fee shares
    pub engine: AccountId,
    pub fee_handler: AccountId,
    pub team_wallet: AccountId,
    pub burn_sink: AccountId,
    pub target_asset: AssetId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RouterParams {
    /// Retained fraction of swap input, 9980 for a 0.2% fee
    pub fee_retained: BasisPoints,
    /// Added to the host timestamp to form router deadlines
    pub deadline_secs: u64,
}

impl RouterParams {
    pub fn new(fee_retained_bps: u16, deadline_secs: u64) -> Result<Self> {
        let fee_retained = BasisPoints::new(fee_retained_bps)?;
        if fee_retained.is_zero() {
            return Err(MathError::InvalidBasisPoints(u32::from(fee_retained_bps)).into());
        }
        Ok(Self {
            fee_retained,
            deadline_secs,
        })
    }
}

/// Counters over committed cycles only
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub cycles_completed: u64,
    pub total_burned: U256,
    pub last_report: Option<CycleReport>,
}

#[derive(Debug, Clone)]
pub struct FeeEngine {
    admin: AccountId,
    operator: Option<AccountId>,
    accounts: EngineAccounts,
    split: SplitConfig,
    router: RouterParams,
    registry: PoolRegistry,
    stats: EngineStats,
}

impl FeeEngine {
    pub fn new(
        admin: AccountId,
        accounts: EngineAccounts,
        split: SplitConfig,
        router: RouterParams,
    ) -> Result<Self> {
        if split.slippage.is_full() {
            return Err(MathError::InvalidTolerance(split.slippage.get()).into());
        }
        if accounts.engine == accounts.fee_handler {
            return Err(FeeEngineError::InvalidConfig {
                message: "engine and fee handler must be distinct accounts".to_string(),
            });
        }

        Ok(Self {
            admin,
            operator: None,
            accounts,
            split,
            router,
            registry: PoolRegistry::new(),
            stats: EngineStats::default(),
        })
    }

    /// Build an engine from a loaded [`EngineConfig`]
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| FeeEngineError::InvalidConfig {
                message: format!("{:#}", e),
            })?;

        let accounts = EngineAccounts {
            engine: config.accounts.engine,
            fee_handler: config.accounts.fee_handler,
            team_wallet: config.accounts.team_wallet,
            burn_sink: config.accounts.burn_sink,
            target_asset: AssetId(config.accounts.target_asset),
        };
        let split = SplitConfig::new(
            config.split.handler_bps,
            config.split.slippage_bps,
            config.split.min_target_threshold,
        )?;
        let router = RouterParams::new(config.router.fee_retained_bps, config.router.deadline_secs)?;

        let mut engine = Self::new(config.accounts.admin, accounts, split, router)?;
        engine.operator = config.accounts.operator;
        Ok(engine)
    }

    fn ensure_admin(&self, caller: AccountId) -> Result<()> {
        if caller == self.admin {
            Ok(())
        } else {
            Err(FeeEngineError::Unauthorized { caller })
        }
    }

    fn ensure_can_process(&self, caller: AccountId) -> Result<()> {
        if caller == self.admin || Some(caller) == self.operator {
            Ok(())
        } else {
            Err(FeeEngineError::Unauthorized { caller })
        }
    }

    fn cycle_context(&self) -> CycleContext {
        CycleContext {
            accounts: self.accounts,
            split: self.split,
            router: self.router,
            cycle: self.stats.cycles_completed + 1,
        }
    }

    // Admin surface

    pub fn register_pool(&mut self, caller: AccountId, pool: PoolId) -> Result<usize> {
        self.ensure_admin(caller)?;
        let index = self.registry.register(pool)?;
        log_admin!("Registered pool {} at index {}", pool, index);
        Ok(index)
    }

    pub fn set_split_ratio(&mut self, caller: AccountId, handler_bps: u16) -> Result<()> {
        self.ensure_admin(caller)?;
        self.split.handler_bps = BasisPoints::new(handler_bps)?;
        log_admin!(
            "Split ratio set: handler {}, team {}",
            self.split.handler_bps,
            self.split.team_bps()
        );
        Ok(())
    }

    pub fn set_slippage_tolerance(&mut self, caller: AccountId, slippage_bps: u16) -> Result<()> {
        self.ensure_admin(caller)?;
        let slippage = BasisPoints::new(slippage_bps)?;
        if slippage.is_full() {
            return Err(MathError::InvalidTolerance(slippage_bps).into());
        }
        self.split.slippage = slippage;
        log_admin!("Slippage tolerance set to {}", slippage);
        Ok(())
    }

    pub fn set_minimum_target_threshold(&mut self, caller: AccountId, amount: U256) -> Result<()> {
        self.ensure_admin(caller)?;
        self.split.min_target_threshold = amount;
        log_admin!(
            "Minimum target threshold set to {}",
            format_units(amount, TARGET_DECIMALS)
        );
        Ok(())
    }

    pub fn set_team_wallet(&mut self, caller: AccountId, wallet: AccountId) -> Result<()> {
        self.ensure_admin(caller)?;
        require_nonzero("team wallet", wallet)?;
        self.accounts.team_wallet = wallet;
        log_admin!("Team wallet set to {:?}", wallet);
        Ok(())
    }

    pub fn set_burn_sink(&mut self, caller: AccountId, sink: AccountId) -> Result<()> {
        self.ensure_admin(caller)?;
        require_nonzero("burn sink", sink)?;
        self.accounts.burn_sink = sink;
        log_admin!("Burn sink set to {:?}", sink);
        Ok(())
    }

    pub fn set_operator(&mut self, caller: AccountId, operator: AccountId) -> Result<()> {
        self.ensure_admin(caller)?;
        require_nonzero("operator", operator)?;
        self.operator = Some(operator);
        log_admin!("Operator set to {:?}", operator);
        Ok(())
    }

    pub fn clear_operator(&mut self, caller: AccountId) -> Result<()> {
        self.ensure_admin(caller)?;
        self.operator = None;
        log_admin!("Operator cleared");
        Ok(())
    }

    pub fn transfer_admin(&mut self, caller: AccountId, new_admin: AccountId) -> Result<()> {
        self.ensure_admin(caller)?;
        require_nonzero("admin", new_admin)?;
        self.admin = new_admin;
        log_admin!("Admin transferred to {:?}", new_admin);
        Ok(())
    }

    // Queries

    pub fn pool_count(&self) -> usize {
        self.registry.count()
    }

    pub fn pool_at(&self, index: usize) -> Result<PoolId> {
        self.registry.at(index)
    }

    pub fn registry(&self) -> &PoolRegistry {
        &self.registry
    }

    pub fn admin(&self) -> AccountId {
        self.admin
    }

    pub fn operator(&self) -> Option<AccountId> {
        self.operator
    }

    pub fn split_config(&self) -> SplitConfig {
        self.split
    }

    pub fn accounts(&self) -> EngineAccounts {
        self.accounts
    }

    pub fn router_params(&self) -> RouterParams {
        self.router
    }

    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    /// Withdrawal floors `(a_min, b_min)` at the current slippage tolerance
    pub fn preview_withdrawal_minimums(
        &self,
        reserve_a: U256,
        reserve_b: U256,
        share_amount: U256,
        total_supply: U256,
    ) -> Result<(U256, U256)> {
        Ok(WithdrawalCalculator::min_amounts(
            reserve_a,
            reserve_b,
            share_amount,
            total_supply,
            self.split.slippage,
        )?)
    }

    /// Withdrawal quote for `shares` against a registered pool's live state
    pub fn withdrawal_minimums_for<C: PoolContract + ?Sized>(
        &self,
        chain: &C,
        pool: PoolId,
        shares: U256,
    ) -> Result<WithdrawalMinimums> {
        self.registry.ensure_registered(pool)?;
        let (reserve_a, reserve_b) = chain.reserves(pool)?;
        let total_supply = chain.total_shares(pool)?;
        Ok(WithdrawalCalculator::quote(
            reserve_a,
            reserve_b,
            shares,
            total_supply,
            self.split.slippage,
        )?)
    }

    /// Quote for swapping the handler's non-target balance of `pool` into the target asset
    pub fn swap_quote_for<C: PoolContract + AssetLedger + ?Sized>(
        &self,
        chain: &C,
        pool: PoolId,
    ) -> Result<SwapQuote> {
        self.registry.ensure_registered(pool)?;
        let sides = PoolSides::resolve(chain, pool, self.accounts.target_asset)?;
        quote_swap_to_target(chain, &self.cycle_context(), pool, &sides)
    }

    // Cycle entry points

    /// Split one pool's collected shares without liquidating them.
    ///
    /// Returns a zero split when the engine holds no shares of `pool`.
    pub fn send_shares<C: Chain + ?Sized>(
        &self,
        chain: &mut C,
        caller: AccountId,
        pool: PoolId,
    ) -> Result<ShareSplit> {
        self.ensure_can_process(caller)?;
        self.registry.ensure_registered(pool)?;

        let ctx = self.cycle_context();
        chain.begin();
        match BatchProcessor::new(&ctx).split(chain, pool) {
            Ok(split) => {
                chain.commit();
                Ok(split.unwrap_or(ShareSplit {
                    team: U256::zero(),
                    handler: U256::zero(),
                }))
            }
            Err(err) => {
                chain.rollback();
                log_error!("Share split for pool {} reverted: {}", pool, err);
                Err(err)
            }
        }
    }

    /// Run one processing cycle over every registered pool.
    ///
    /// Any hard failure rolls back every effect of the cycle and leaves the
    /// engine's stats untouched. A cycle that burns nothing fails with
    /// [`FeeEngineError::InvalidAmount`].
    pub fn process_all_fees<C: Chain + ?Sized>(
        &mut self,
        chain: &mut C,
        caller: AccountId,
        mode: ProcessingMode,
    ) -> Result<CycleReport> {
        self.ensure_can_process(caller)?;

        let ctx = self.cycle_context();
        log_execution!(
            "Cycle {}: processing {} pools ({:?})",
            ctx.cycle,
            self.registry.count(),
            mode
        );

        chain.begin();
        let outcome = BatchProcessor::new(&ctx)
            .run(chain, self.registry.as_slice(), mode)
            .and_then(|report| {
                let total = self
                    .stats
                    .total_burned
                    .checked_add(report.total_burned)
                    .ok_or(MathError::ArithmeticOverflow {
                        operation: "lifetime burn total",
                    })?;
                Ok((report, total))
            });

        match outcome {
            Ok((report, total_burned)) => {
                chain.commit();
                self.stats.cycles_completed = ctx.cycle;
                self.stats.total_burned = total_burned;
                self.stats.last_report = Some(report.clone());
                log_success!(
                    "Cycle {} committed: burned {} across {} pools",
                    ctx.cycle,
                    format_units(report.total_burned, TARGET_DECIMALS),
                    report.burned_pools().count()
                );
                Ok(report)
            }
            Err(err) => {
                chain.rollback();
                log_error!("Cycle {} rolled back: {}", ctx.cycle, err);
                Err(err)
            }
        }
    }
}

fn require_nonzero(role: &str, account: AccountId) -> Result<()> {
    if account == Address::zero() {
        return Err(FeeEngineError::InvalidConfig {
            message: format!("{} must be a nonzero account", role),
        });
    }
    Ok(())
}
