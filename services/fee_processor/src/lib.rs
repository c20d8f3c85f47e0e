//! # Fee Processor - Protocol-Fee Liquidation Engine
//!
//! ## Purpose
//!
//! Turns the liquidity-pool shares an AMM collects as protocol fees into a
//! burn of the target asset. Each cycle splits the collected shares between a
//! team wallet and the fee handler, withdraws the handler's portion with
//! slippage floors, swaps the non-target side into the target asset and sends
//! the result to the burn sink.
//!
//! ## Integration Points
//!
//! - **Collaborators**: pool, router, ledger, clock and transactional scope
//!   traits in [`collaborators`]; [`simulation::SimulatedChain`] implements
//!   all of them in memory
//! - **Math**: `cinder_amm` for withdrawal floors, splits and swap quotes
//! - **Configuration**: `cinder_config::EngineConfig` via [`FeeEngine::from_config`]
//!
//! ## Architecture Role
//!
//! ```text
//! admin/operator ──► FeeEngine ──► BatchProcessor ──► Chain (pool, router, ledger)
//!                       │                                  │
//!                   PoolRegistry                     begin / commit / rollback
//! ```
//!
//! ## Examples
//!
//! ```rust,no_run
//! use fee_processor::{FeeEngine, ProcessingMode, SimulatedChain};
//!
//! let config = cinder_config::load_config("~/.cinder/engine.toml")?;
//! let mut engine = FeeEngine::from_config(&config)?;
//! let mut chain = SimulatedChain::new();
//!
//! let admin = engine.admin();
//! let report = engine.process_all_fees(&mut chain, admin, ProcessingMode::Lenient)?;
//! println!("burned {}", report.total_burned);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod batch;
pub mod collaborators;
pub mod engine;
pub mod error;
pub mod logging;
pub mod registry;
pub mod simulation;
pub mod types;

pub use batch::{
    BatchProcessor, CycleContext, CycleReport, PoolOutcome, PoolReceipt, ProcessingMode,
    SkipReason,
};
pub use collaborators::{
    AssetLedger, CallResult, Chain, Clock, Collaborator, CollaboratorError, PoolContract,
    RemoveLiquidity, Router, SwapExactInput, Transactional,
};
pub use engine::{EngineAccounts, EngineStats, FeeEngine, RouterParams, SplitConfig};
pub use error::{FeeEngineError, Result};
pub use logging::init_logging;
pub use registry::PoolRegistry;
pub use simulation::SimulatedChain;
pub use types::{AccountId, AssetId, PoolId};
