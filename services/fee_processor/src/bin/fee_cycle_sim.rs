//! Dry-run a processing cycle against an in-memory chain
//!
//! Usage:
//!   fee_cycle_sim --engine-shares 10 --engine-shares 5
//!   fee_cycle_sim --config config/engine.toml --engine-shares 10 --strict --json-logs
//!
//! Every pool pairs the configured target asset with a fresh asset, is seeded
//! with `--reserve` whole tokens per side, and the engine account receives the
//! given number of whole shares before the cycle runs.

use anyhow::{Context, Result};
use cinder_amm::{format_units, BasisPoints, U256};
use cinder_config::{defaults, load_config};
use clap::Parser;
use ethers_core::types::Address;
use fee_processor::{
    init_logging, AssetId, FeeEngine, PoolContract, ProcessingMode, SimulatedChain,
};
use tracing::{error, info};

const TOKEN_DECIMALS: u32 = 18;
const LIQUIDITY_PROVIDER: u64 = 0xA11CE;
const OTHER_ASSET_BASE: u64 = 0xA55E7_0000;

#[derive(Parser, Debug)]
#[command(name = "fee_cycle_sim")]
#[command(about = "Simulate a Cinder fee-processing cycle")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = defaults::DEFAULT_CONFIG_PATH)]
    config: String,

    /// Whole shares held by the engine, one value per pool
    #[arg(long = "engine-shares", required = true)]
    engine_shares: Vec<u64>,

    /// Whole tokens deposited on each side of every pool
    #[arg(long, default_value_t = 10_000)]
    reserve: u64,

    /// Abort the cycle when a pool misses the target threshold
    #[arg(long)]
    strict: bool,

    /// Log filter override (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Enable JSON logging format
    #[arg(long)]
    json_logs: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = load_config(&args.config)?;
    if let Some(level) = args.log_level.clone() {
        config.logging.level = level;
    }
    if args.json_logs {
        config.logging.json = true;
    }
    init_logging(&config.logging)?;

    info!("Starting fee cycle simulation");
    info!("Configuration: {}", args.config);

    let mut engine = FeeEngine::from_config(&config)?;
    let mut chain = SimulatedChain::new()
        .with_fee_retained(BasisPoints::new(config.router.fee_retained_bps)?);
    let admin = engine.admin();
    let accounts = engine.accounts();
    let provider = Address::from_low_u64_be(LIQUIDITY_PROVIDER);
    let reserve = whole_tokens(args.reserve)?;

    for (i, shares) in args.engine_shares.iter().enumerate() {
        let other = AssetId(Address::from_low_u64_be(OTHER_ASSET_BASE + i as u64));
        chain.mint(accounts.target_asset, provider, reserve)?;
        chain.mint(other, provider, reserve)?;

        let pool = chain.create_pool(accounts.target_asset, other)?;
        chain.add_liquidity(pool, provider, reserve, reserve)?;
        chain.transfer_shares(pool, provider, accounts.engine, whole_tokens(*shares)?)?;
        engine.register_pool(admin, pool)?;
    }

    let report = engine
        .process_all_fees(&mut chain, admin, ProcessingMode::from(args.strict))
        .map_err(|e| {
            error!("Cycle failed: {}", e);
            e
        })?;

    info!(
        "Burned {} target tokens from {} of {} pools",
        format_units(report.total_burned, TOKEN_DECIMALS),
        report.burned_pools().count(),
        report.outcomes.len()
    );
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn whole_tokens(amount: u64) -> Result<U256> {
    U256::from(amount)
        .checked_mul(U256::exp10(TOKEN_DECIMALS as usize))
        .context("token amount overflows U256")
}
