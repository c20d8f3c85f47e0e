//! Standardized emoji logging for the fee engine
//!
//! Provides consistent emoji prefixes across the processing cycle so burn,
//! skip and failure lines stand out in operator logs.

use anyhow::Result;
use cinder_config::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Standard emoji set for fee engine logging
pub struct LogEmoji;

impl LogEmoji {
    // Status indicators
    pub const SUCCESS: &'static str = "✅";
    pub const ERROR: &'static str = "❌";

    // Cycle steps
    pub const EXECUTE: &'static str = "⚡";
    pub const SPLIT: &'static str = "➗";
    pub const BURN: &'static str = "🔥";
    pub const SKIP: &'static str = "⏭️";
    pub const SWAP: &'static str = "🔄";
    pub const ADMIN: &'static str = "🔧";
}

#[macro_export]
macro_rules! log_success {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::SUCCESS, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        tracing::error!("{} {}", $crate::logging::LogEmoji::ERROR, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_execution {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::EXECUTE, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_burn {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::BURN, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_skip {
    ($($arg:tt)*) => {
        tracing::warn!("{} {}", $crate::logging::LogEmoji::SKIP, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_admin {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::ADMIN, format!($($arg)*))
    };
}

/// Install the global subscriber described by `config`.
///
/// `RUST_LOG` takes precedence over `config.level` when set. Fails if a
/// global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| anyhow::anyhow!("invalid log filter {:?}: {}", config.level, e))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow::anyhow!(e))
}
