//! Engine defaults and constants
//!
//! Values that match the reference deployment of the fee engine. Every one of
//! them can be overridden through [`crate::EngineConfig`].

/// Share split defaults
pub mod split {
    /// Share of collected pool shares routed to the fee handler (60%)
    pub const HANDLER_BPS: u16 = 6_000;

    /// Slippage tolerance applied to withdrawal and swap floors (0.5%)
    pub const SLIPPAGE_BPS: u16 = 50;

    /// Minimum target-asset floor a pool must reach to be burned this cycle
    pub const MIN_TARGET_THRESHOLD: u64 = 0;
}

/// Router defaults
pub mod router {
    /// Fraction of the swap input the router counts toward the curve (0.2% fee)
    pub const FEE_RETAINED_BPS: u16 = 9_980;

    /// Validity window added to the block timestamp for router deadlines
    pub const DEADLINE_SECS: u64 = 1_200;
}

/// Logging defaults
pub mod logging {
    pub const LEVEL: &str = "info";
}

/// Prefix for environment overrides, e.g. `CINDER_SPLIT__SLIPPAGE_BPS=75`
pub const ENV_PREFIX: &str = "CINDER";

/// Separator between nested keys in environment overrides
pub const ENV_SEPARATOR: &str = "__";

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "config/engine.toml";
