//! Engine Configuration Module
//!
//! Loads the fee engine's accounts, split parameters and router settings from
//! a TOML file with `CINDER_`-prefixed environment overrides, and validates
//! the result before any component sees it.

use crate::defaults::{self, ENV_PREFIX, ENV_SEPARATOR};
use anyhow::{bail, Context, Result};
use config_crate::{Config, Environment, File, FileFormat};
use ethers_core::types::{Address, U256};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Complete configuration for one fee engine instance
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Identities the engine acts for and pays out to
    pub accounts: AccountsConfig,
    /// Stakeholder split and slippage parameters
    pub split: SplitSettings,
    /// Router fee and deadline parameters
    pub router: RouterSettings,
    pub logging: LoggingConfig,
}

/// Account identities
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountsConfig {
    /// Administrator allowed to mutate configuration and the pool registry
    pub admin: Address,
    /// Optional keeper allowed to trigger processing cycles
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<Address>,
    /// Account holding the collected pool shares
    pub engine: Address,
    /// Receives the handler share and performs withdrawals and swaps
    pub fee_handler: Address,
    pub team_wallet: Address,
    /// One-way destination for the target asset
    pub burn_sink: Address,
    /// Asset every pool is liquidated into and burned
    pub target_asset: Address,
}

/// Stakeholder split configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitSettings {
    /// Handler share of collected pool shares in basis points; team gets the rest
    pub handler_bps: u16,
    /// Slippage tolerance in basis points (must be < 10000)
    pub slippage_bps: u16,
    /// Minimum target-asset floor per pool, in smallest units
    #[serde(with = "crate::serde_u256")]
    pub min_target_threshold: U256,
}

/// Router configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterSettings {
    /// Basis points of swap input counted toward the curve (9980 = 0.2% fee)
    pub fee_retained_bps: u16,
    /// Seconds added to the block timestamp for router deadlines
    pub deadline_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive
    pub level: String,
    pub json: bool,
}

impl Default for SplitSettings {
    fn default() -> Self {
        Self {
            handler_bps: defaults::split::HANDLER_BPS,
            slippage_bps: defaults::split::SLIPPAGE_BPS,
            min_target_threshold: U256::from(defaults::split::MIN_TARGET_THRESHOLD),
        }
    }
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            fee_retained_bps: defaults::router::FEE_RETAINED_BPS,
            deadline_secs: defaults::router::DEADLINE_SECS,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::logging::LEVEL.to_string(),
            json: false,
        }
    }
}

impl EngineConfig {
    /// Load configuration from an optional TOML file with environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            info!("Loading engine config: {:?}", path);
            builder = builder.add_source(File::from(path).required(true));
        }

        // Override with environment variables (CINDER_ prefix). Values stay
        // strings: typed fields parse them on deserialize, and amounts above
        // i64::MAX would otherwise be coerced to a lossy float.
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator(ENV_SEPARATOR),
        );

        let config: Self = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        debug!(?config, "engine config loaded");
        Ok(config)
    }

    /// Parse an in-memory TOML document without environment overrides
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(File::from_str(contents, FileFormat::Toml))
            .build()
            .context("Failed to parse configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration as TOML
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write configuration to {:?}", path))?;
        Ok(())
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        let accounts = &self.accounts;
        let required = [
            ("admin", accounts.admin),
            ("engine", accounts.engine),
            ("fee_handler", accounts.fee_handler),
            ("team_wallet", accounts.team_wallet),
            ("burn_sink", accounts.burn_sink),
            ("target_asset", accounts.target_asset),
        ];
        for (name, address) in required {
            if address.is_zero() {
                bail!("accounts.{} must be set to a non-zero address", name);
            }
        }
        if accounts.engine == accounts.fee_handler {
            bail!("accounts.engine and accounts.fee_handler must differ");
        }

        if self.split.handler_bps > 10_000 {
            bail!("split.handler_bps must be <= 10000 (100%)");
        }
        if self.split.slippage_bps >= 10_000 {
            bail!("split.slippage_bps must be < 10000 (100%)");
        }

        if self.router.fee_retained_bps == 0 || self.router.fee_retained_bps > 10_000 {
            bail!("router.fee_retained_bps must be between 1 and 10000");
        }
        if self.router.deadline_secs == 0 {
            bail!("router.deadline_secs must be positive");
        }

        Ok(())
    }
}

/// Convenience function: expand `~` and `$VARS` in `path`, then load
pub fn load_config(path: &str) -> Result<EngineConfig> {
    let expanded = shellexpand::full(path).context("Failed to expand config path")?;
    let path = PathBuf::from(expanded.as_ref());
    EngineConfig::load(Some(&path))
}
