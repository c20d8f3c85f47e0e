//! End-to-end processing cycles against the in-memory chain
//!
//! Fixture: two pools pairing the target asset with `token1` and `token2`,
//! each seeded with 10,000 tokens per side. The engine holds 10 shares of
//! pool 1 and 5 shares of pool 2; only pool 1 is registered up front.

use cinder_amm::U256;
use cinder_config::EngineConfig;
use ethers_core::types::Address;
use fee_processor::{
    AssetLedger, EngineAccounts, FeeEngine, FeeEngineError, PoolContract, PoolId, PoolOutcome,
    ProcessingMode, RouterParams, SimulatedChain, SkipReason, SplitConfig,
};
use fee_processor::{AssetId, Collaborator};

fn addr(n: u64) -> Address {
    Address::from_low_u64_be(n)
}

fn tokens(whole: u64) -> U256 {
    U256::from(whole) * U256::exp10(18)
}

fn dec(value: &str) -> U256 {
    U256::from_dec_str(value).unwrap()
}

fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("debug")
        .try_init();
}

struct Fixture {
    chain: SimulatedChain,
    engine: FeeEngine,
    admin: Address,
    accounts: EngineAccounts,
    token1: AssetId,
    token2: AssetId,
    pool1: PoolId,
    pool2: PoolId,
}

impl Fixture {
    fn new() -> Self {
        init_test_logging();

        let admin = addr(1);
        let provider = addr(2);
        let target = AssetId(addr(100));
        let token1 = AssetId(addr(101));
        let token2 = AssetId(addr(102));
        let accounts = EngineAccounts {
            engine: addr(10),
            fee_handler: addr(11),
            team_wallet: addr(12),
            burn_sink: addr(13),
            target_asset: target,
        };

        let mut chain = SimulatedChain::new();
        let reserve = tokens(10_000);
        chain.mint(target, provider, reserve * 2).unwrap();
        chain.mint(token1, provider, reserve).unwrap();
        chain.mint(token2, provider, reserve).unwrap();

        let pool1 = chain.create_pool(target, token1).unwrap();
        chain.add_liquidity(pool1, provider, reserve, reserve).unwrap();
        chain
            .transfer_shares(pool1, provider, accounts.engine, tokens(10))
            .unwrap();

        let pool2 = chain.create_pool(target, token2).unwrap();
        chain.add_liquidity(pool2, provider, reserve, reserve).unwrap();
        chain
            .transfer_shares(pool2, provider, accounts.engine, tokens(5))
            .unwrap();

        let mut engine = FeeEngine::new(
            admin,
            accounts,
            SplitConfig::new(6000, 50, U256::zero()).unwrap(),
            RouterParams::new(9980, 1200).unwrap(),
        )
        .unwrap();
        engine.register_pool(admin, pool1).unwrap();

        Self {
            chain,
            engine,
            admin,
            accounts,
            token1,
            token2,
            pool1,
            pool2,
        }
    }

    fn run(&mut self, mode: ProcessingMode) -> fee_processor::Result<fee_processor::CycleReport> {
        self.engine
            .process_all_fees(&mut self.chain, self.admin, mode)
    }

    fn burned(&self) -> U256 {
        self.chain
            .balance_of(self.accounts.target_asset, self.accounts.burn_sink)
            .unwrap()
    }

    fn shares(&self, pool: PoolId, holder: Address) -> U256 {
        self.chain.share_balance_of(pool, holder).unwrap()
    }
}

#[test]
fn send_shares_splits_four_to_team_and_six_to_handler() {
    let mut fx = Fixture::new();
    let split = fx
        .engine
        .send_shares(&mut fx.chain, fx.admin, fx.pool1)
        .unwrap();

    assert_eq!(split.team, tokens(4));
    assert_eq!(split.handler, tokens(6));
    assert_eq!(fx.shares(fx.pool1, fx.accounts.team_wallet), tokens(4));
    assert_eq!(fx.shares(fx.pool1, fx.accounts.fee_handler), tokens(6));
    assert_eq!(fx.shares(fx.pool1, fx.accounts.engine), U256::zero());
}

#[test]
fn send_shares_requires_a_registered_pool() {
    let mut fx = Fixture::new();
    assert_eq!(
        fx.engine.send_shares(&mut fx.chain, fx.admin, fx.pool2),
        Err(FeeEngineError::UnknownPool(fx.pool2))
    );
}

#[test]
fn withdrawal_minimums_for_six_shares() {
    let mut fx = Fixture::new();
    fx.engine
        .send_shares(&mut fx.chain, fx.admin, fx.pool1)
        .unwrap();

    let quote = fx
        .engine
        .withdrawal_minimums_for(&fx.chain, fx.pool1, tokens(6))
        .unwrap();
    assert_eq!(quote.amount_a_min, dec("5970000000000000000"));
    assert_eq!(quote.amount_b_min, dec("5970000000000000000"));
}

#[test]
fn swap_quote_for_handler_balance() {
    let mut fx = Fixture::new();
    fx.chain
        .mint(fx.token1, fx.accounts.fee_handler, dec("5970000000000000000"))
        .unwrap();

    let quote = fx.engine.swap_quote_for(&fx.chain, fx.pool1).unwrap();
    assert_eq!(quote.amount_in, dec("5970000000000000000"));
    assert_eq!(quote.amount_out, dec("5954512265864924083"));
    assert_eq!(quote.amount_out_min, dec("5924739704535599463"));
}

#[test]
fn cycle_pays_team_and_empties_engine() {
    let mut fx = Fixture::new();
    fx.run(ProcessingMode::Lenient).unwrap();

    assert_eq!(fx.shares(fx.pool1, fx.accounts.team_wallet), tokens(4));
    assert_eq!(fx.shares(fx.pool1, fx.accounts.engine), U256::zero());
    assert_eq!(fx.shares(fx.pool1, fx.accounts.fee_handler), U256::zero());
}

#[test]
fn single_pool_cycle_burns_exact_amount() {
    let mut fx = Fixture::new();
    let report = fx.run(ProcessingMode::Lenient).unwrap();

    let expected = dec("11984414381297257556");
    assert_eq!(report.total_burned, expected);
    assert_eq!(fx.burned(), expected);
    assert_eq!(fx.engine.pool_count(), 1);

    // Everything the handler withdrew was converted and burned
    let handler = fx.accounts.fee_handler;
    assert_eq!(fx.chain.balance_of(fx.token1, handler).unwrap(), U256::zero());
    assert_eq!(
        fx.chain.balance_of(fx.accounts.target_asset, handler).unwrap(),
        U256::zero()
    );

    match report.outcome(fx.pool1) {
        Some(PoolOutcome::Burned(receipt)) => {
            assert_eq!(receipt.split.team, tokens(4));
            assert_eq!(receipt.target_withdrawn, tokens(6));
            assert_eq!(receipt.swapped_in, tokens(6));
            assert_eq!(receipt.swapped_out, dec("5984414381297257556"));
        }
        other => panic!("unexpected outcome {:?}", other),
    }
}

#[test]
fn threshold_above_every_floor_voids_the_cycle() {
    let mut fx = Fixture::new();
    fx.engine
        .set_minimum_target_threshold(fx.admin, dec("5971000000000000000"))
        .unwrap();

    assert_eq!(
        fx.run(ProcessingMode::Lenient),
        Err(FeeEngineError::InvalidAmount)
    );

    // Split and withdrawal were rolled back with the cycle
    assert_eq!(fx.shares(fx.pool1, fx.accounts.engine), tokens(10));
    assert_eq!(fx.shares(fx.pool1, fx.accounts.team_wallet), U256::zero());
    assert_eq!(
        fx.chain
            .balance_of(fx.token1, fx.accounts.fee_handler)
            .unwrap(),
        U256::zero()
    );
    assert_eq!(fx.burned(), U256::zero());
    assert_eq!(fx.engine.stats().cycles_completed, 0);
    assert_eq!(fx.chain.depth(), 0);
}

#[test]
fn two_pool_cycle_burns_both() {
    let mut fx = Fixture::new();
    fx.engine.register_pool(fx.admin, fx.pool2).unwrap();

    let report = fx.run(ProcessingMode::Lenient).unwrap();
    assert_eq!(report.total_burned, dec("17977517977159415073"));
    assert_eq!(fx.burned(), dec("17977517977159415073"));
    assert_eq!(fx.engine.pool_count(), 2);
    assert_eq!(report.burned_pools().collect::<Vec<_>>(), vec![fx.pool1, fx.pool2]);
}

#[test]
fn short_pool_is_skipped_and_held_by_handler() {
    let mut fx = Fixture::new();
    fx.engine.register_pool(fx.admin, fx.pool2).unwrap();
    let threshold = dec("5970000000000000000");
    fx.engine
        .set_minimum_target_threshold(fx.admin, threshold)
        .unwrap();

    let report = fx.run(ProcessingMode::Lenient).unwrap();
    assert_eq!(report.total_burned, dec("11984414381297257556"));
    assert_eq!(fx.burned(), dec("11984414381297257556"));
    assert_eq!(fx.engine.pool_count(), 2);

    assert_eq!(
        report.outcome(fx.pool2),
        Some(&PoolOutcome::Skipped(SkipReason::BelowThreshold {
            target_floor: dec("2985000000000000000"),
            threshold,
        }))
    );
    assert_eq!(report.skipped_pools().collect::<Vec<_>>(), vec![fx.pool2]);

    // Pool 2 was split and withdrawn, its assets wait with the handler
    let handler = fx.accounts.fee_handler;
    assert_eq!(fx.shares(fx.pool2, fx.accounts.team_wallet), tokens(2));
    assert_eq!(fx.shares(fx.pool2, fx.accounts.engine), U256::zero());
    assert_eq!(fx.chain.balance_of(fx.token2, handler).unwrap(), tokens(3));
    assert_eq!(
        fx.chain.balance_of(fx.accounts.target_asset, handler).unwrap(),
        tokens(3)
    );
}

#[test]
fn strict_mode_aborts_on_short_pool() {
    let mut fx = Fixture::new();
    fx.engine.register_pool(fx.admin, fx.pool2).unwrap();
    let threshold = dec("5970000000000000000");
    fx.engine
        .set_minimum_target_threshold(fx.admin, threshold)
        .unwrap();

    assert_eq!(
        fx.run(ProcessingMode::Strict),
        Err(FeeEngineError::ThresholdNotMet {
            pool: fx.pool2,
            floor: dec("2985000000000000000"),
            threshold,
        })
    );

    // Pool 1 had already burned inside the cycle; all of it is undone
    assert_eq!(fx.burned(), U256::zero());
    assert_eq!(fx.shares(fx.pool1, fx.accounts.engine), tokens(10));
    assert_eq!(fx.shares(fx.pool2, fx.accounts.engine), tokens(5));
    assert_eq!(fx.engine.stats().cycles_completed, 0);
}

#[test]
fn router_revert_rolls_back_the_split() {
    let mut fx = Fixture::new();
    fx.chain.set_router_paused(true);

    match fx.run(ProcessingMode::Lenient) {
        Err(FeeEngineError::ExternalCallFailure(err)) => {
            assert_eq!(err.collaborator, Collaborator::Router);
        }
        other => panic!("expected router failure, got {:?}", other),
    }
    assert_eq!(fx.shares(fx.pool1, fx.accounts.engine), tokens(10));
    assert_eq!(fx.shares(fx.pool1, fx.accounts.team_wallet), U256::zero());
    assert_eq!(fx.chain.depth(), 0);

    fx.chain.set_router_paused(false);
    assert_eq!(
        fx.run(ProcessingMode::Lenient).unwrap().total_burned,
        dec("11984414381297257556")
    );
}

#[test]
fn pool_without_target_asset_is_a_hard_failure() {
    let mut fx = Fixture::new();
    let provider = addr(3);
    fx.chain.mint(fx.token1, provider, tokens(100)).unwrap();
    fx.chain.mint(fx.token2, provider, tokens(100)).unwrap();
    let foreign = fx.chain.create_pool(fx.token1, fx.token2).unwrap();
    fx.chain
        .add_liquidity(foreign, provider, tokens(100), tokens(100))
        .unwrap();
    fx.engine.register_pool(fx.admin, foreign).unwrap();

    assert_eq!(
        fx.run(ProcessingMode::Lenient),
        Err(FeeEngineError::TargetAssetNotInPool(foreign))
    );
    assert_eq!(fx.burned(), U256::zero());
    assert_eq!(fx.shares(fx.pool1, fx.accounts.engine), tokens(10));
}

#[test]
fn second_cycle_with_nothing_collected_is_invalid() {
    let mut fx = Fixture::new();
    fx.run(ProcessingMode::Lenient).unwrap();

    assert_eq!(
        fx.run(ProcessingMode::Lenient),
        Err(FeeEngineError::InvalidAmount)
    );
    assert_eq!(fx.engine.stats().cycles_completed, 1);
    assert_eq!(fx.burned(), dec("11984414381297257556"));
}

#[test]
fn full_team_ratio_leaves_nothing_to_burn() {
    let mut fx = Fixture::new();
    fx.engine.set_split_ratio(fx.admin, 0).unwrap();

    assert_eq!(
        fx.run(ProcessingMode::Lenient),
        Err(FeeEngineError::InvalidAmount)
    );
    assert_eq!(fx.shares(fx.pool1, fx.accounts.team_wallet), U256::zero());
}

#[test]
fn only_admin_or_operator_may_process() {
    let mut fx = Fixture::new();
    let operator = addr(7);
    let stranger = addr(8);

    assert_eq!(
        fx.engine
            .process_all_fees(&mut fx.chain, stranger, ProcessingMode::Lenient),
        Err(FeeEngineError::Unauthorized { caller: stranger })
    );
    assert_eq!(
        fx.engine.set_operator(stranger, stranger),
        Err(FeeEngineError::Unauthorized { caller: stranger })
    );

    fx.engine.set_operator(fx.admin, operator).unwrap();
    assert_eq!(
        fx.engine.set_split_ratio(operator, 5000),
        Err(FeeEngineError::Unauthorized { caller: operator })
    );
    fx.engine
        .process_all_fees(&mut fx.chain, operator, ProcessingMode::Lenient)
        .unwrap();

    fx.engine.clear_operator(fx.admin).unwrap();
    assert_eq!(
        fx.engine
            .process_all_fees(&mut fx.chain, operator, ProcessingMode::Lenient),
        Err(FeeEngineError::Unauthorized { caller: operator })
    );
}

#[test]
fn duplicate_registration_is_rejected() {
    let mut fx = Fixture::new();
    assert_eq!(
        fx.engine.register_pool(fx.admin, fx.pool1),
        Err(FeeEngineError::DuplicatePool(fx.pool1))
    );
    assert_eq!(fx.engine.pool_count(), 1);
    assert_eq!(fx.engine.pool_at(0).unwrap(), fx.pool1);
    assert_eq!(
        fx.engine.pool_at(1),
        Err(FeeEngineError::IndexOutOfRange { index: 1, count: 1 })
    );
}

#[test]
fn stats_track_committed_cycles_only() {
    let mut fx = Fixture::new();
    let report = fx.run(ProcessingMode::Lenient).unwrap();

    let stats = fx.engine.stats();
    assert_eq!(stats.cycles_completed, 1);
    assert_eq!(stats.total_burned, report.total_burned);
    assert_eq!(stats.last_report.as_ref().map(|r| r.cycle), Some(1));
}

#[test]
fn new_burn_sink_receives_later_cycles() {
    let mut fx = Fixture::new();
    let sink = addr(14);
    fx.engine.set_burn_sink(fx.admin, sink).unwrap();

    fx.run(ProcessingMode::Lenient).unwrap();
    assert_eq!(fx.burned(), U256::zero());
    assert_eq!(
        fx.chain.balance_of(fx.accounts.target_asset, sink).unwrap(),
        dec("11984414381297257556")
    );
}

#[test]
fn engine_from_loaded_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("engine.toml");
    std::fs::write(
        &path,
        r#"
[accounts]
admin = "0x0000000000000000000000000000000000000001"
operator = "0x0000000000000000000000000000000000000007"
engine = "0x000000000000000000000000000000000000000a"
fee_handler = "0x000000000000000000000000000000000000000b"
team_wallet = "0x000000000000000000000000000000000000000c"
burn_sink = "0x000000000000000000000000000000000000000d"
target_asset = "0x0000000000000000000000000000000000000064"

[split]
handler_bps = 6000
slippage_bps = 50
min_target_threshold = "5970000000000000000"
"#,
    )
    .unwrap();

    let config = cinder_config::load_config(path.to_str().unwrap()).unwrap();
    let engine = FeeEngine::from_config(&config).unwrap();
    assert_eq!(engine.admin(), addr(1));
    assert_eq!(engine.operator(), Some(addr(7)));
    assert_eq!(engine.accounts().target_asset, AssetId(addr(100)));
    assert_eq!(engine.split_config().team_bps().get(), 4000);
    assert_eq!(
        engine.split_config().min_target_threshold,
        dec("5970000000000000000")
    );
    assert_eq!(engine.router_params().deadline_secs, 1200);
}

#[test]
fn invalid_config_is_reported() {
    let config = EngineConfig::default();
    assert!(matches!(
        FeeEngine::from_config(&config),
        Err(FeeEngineError::InvalidConfig { .. })
    ));
}

#[test]
fn expired_router_deadline_rolls_back_the_cycle() {
    let mut fx = Fixture::new();
    fx.engine = FeeEngine::new(
        fx.admin,
        fx.accounts,
        SplitConfig::new(6000, 50, U256::zero()).unwrap(),
        RouterParams::new(9980, 60).unwrap(),
    )
    .unwrap();
    fx.engine.register_pool(fx.admin, fx.pool1).unwrap();

    // Lands one second after the 60s window closes
    fx.chain.set_inclusion_delay(61);
    match fx.run(ProcessingMode::Lenient) {
        Err(FeeEngineError::ExternalCallFailure(err)) => {
            assert_eq!(err.collaborator, Collaborator::Router);
            assert_eq!(err.reason, "EXPIRED");
        }
        other => panic!("expected expired deadline, got {:?}", other),
    }
    assert_eq!(fx.shares(fx.pool1, fx.accounts.engine), tokens(10));
    assert_eq!(fx.shares(fx.pool1, fx.accounts.team_wallet), U256::zero());
    assert_eq!(fx.burned(), U256::zero());
    assert_eq!(fx.engine.stats().cycles_completed, 0);

    fx.chain.set_inclusion_delay(60);
    assert_eq!(
        fx.run(ProcessingMode::Lenient).unwrap().total_burned,
        dec("11984414381297257556")
    );
}
