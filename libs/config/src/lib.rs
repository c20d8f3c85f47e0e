//! # Cinder Centralized Configuration
//!
//! This crate provides configuration management and defaults for the
//! fee engine, so the engine and its tooling agree on one set of values.
//!
//! ## Features
//!
//! - **Engine Defaults**: split ratio, slippage tolerance, router fee, deadlines
//! - **Engine Configuration**: TOML files with `CINDER_` environment overrides
//! - **Validation**: ranges and required accounts checked at load time
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cinder_config::{defaults, load_config};
//!
//! let config = load_config("~/.cinder/engine.toml")?;
//! assert!(config.split.slippage_bps < 10_000);
//! let fee = defaults::router::FEE_RETAINED_BPS;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod defaults;
pub mod engine_config;
pub mod serde_u256;

// Re-export commonly used types
pub use engine_config::{
    load_config, AccountsConfig, EngineConfig, LoggingConfig, RouterSettings, SplitSettings,
};
