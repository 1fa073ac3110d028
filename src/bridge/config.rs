//! Bridge configuration.
//!
//! # Configuration Presets
//!
//! - [`BridgeConfig::runtime()`] - Apply host mutations immediately, validate at install time
//! - [`BridgeConfig::editor()`] - Defer host mutations to the next tick, validate at install time
//! - [`BridgeConfig::lazy()`] - Apply immediately, resolve capabilities on first use
//!
//! # Example
//!
//! ```rust
//! use hostbridge::bridge::{BridgeConfig, ExecutionMode};
//!
//! let config = BridgeConfig::editor();
//! assert_eq!(config.mode, ExecutionMode::Deferred);
//!
//! let config = BridgeConfig {
//!     eager_validation: false,
//!     ..BridgeConfig::editor()
//! };
//! assert!(!config.eager_validation);
//! ```

use crate::bridge::mode::ExecutionMode;

/// Settings of one [`crate::bridge::BridgeContext`].
///
/// # Default Configuration
///
/// The default is [`BridgeConfig::runtime()`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BridgeConfig {
    /// How state-changing feature operations reach the host.
    ///
    /// Chosen once at initialization; replaces a compile-time editor/runtime switch.
    pub mode: ExecutionMode,

    /// Whether installing a feature resolves all of its capabilities at once.
    ///
    /// When enabled, installing a feature whose required member is absent fails, and absent
    /// optional members are logged. When disabled, members are resolved on first use.
    pub eager_validation: bool,
}

impl BridgeConfig {
    /// Immediate application with eager validation
    #[must_use]
    pub fn runtime() -> Self {
        BridgeConfig {
            mode: ExecutionMode::Immediate,
            eager_validation: true,
        }
    }

    /// Deferred application with eager validation
    #[must_use]
    pub fn editor() -> Self {
        BridgeConfig {
            mode: ExecutionMode::Deferred,
            eager_validation: true,
        }
    }

    /// Immediate application, capabilities resolved on first use
    #[must_use]
    pub fn lazy() -> Self {
        BridgeConfig {
            mode: ExecutionMode::Immediate,
            eager_validation: false,
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::runtime()
    }
}
