//! # Global runtime configuration.
//!
//! [`Config`] defines the supervisor's behavior: shutdown grace period,
//! orphan policy, event bus capacity, and the declared auxiliary services.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use pid1::{Config, OrphanPolicy};
//!
//! let mut cfg = Config::default();
//! cfg.grace = Duration::from_secs(5);
//! cfg.orphan_policy = OrphanPolicy::Kill;
//!
//! assert_eq!(cfg.orphan_policy, OrphanPolicy::Kill);
//! ```

use std::time::Duration;

use crate::services::ServicesConfig;

/// What happens to the primary's process group after the primary exits.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrphanPolicy {
    /// Leave remaining descendants running under the supervisor (default).
    Adopt,
    /// Send SIGTERM to the primary's process group so the cohort winds down.
    Kill,
}

impl Default for OrphanPolicy {
    /// Returns [`OrphanPolicy::Adopt`].
    fn default() -> Self {
        OrphanPolicy::Adopt
    }
}

/// Global configuration for the supervisor.
#[derive(Clone, Debug)]
pub struct Config {
    /// Time between SIGTERM and SIGKILL on the shutdown path.
    pub grace: Duration,
    /// Post-primary-exit handling of the remaining process group.
    pub orphan_policy: OrphanPolicy,
    /// Capacity of the event bus channel.
    pub bus_capacity: usize,
    /// Auxiliary services to run alongside the primary command.
    pub services: ServicesConfig,
}

impl Default for Config {
    /// Provides the stock configuration:
    /// - `grace = 2s`
    /// - `orphan_policy = Adopt`
    /// - `bus_capacity = 1024`
    /// - no services
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(2),
            orphan_policy: OrphanPolicy::default(),
            bus_capacity: 1024,
            services: ServicesConfig::default(),
        }
    }
}
