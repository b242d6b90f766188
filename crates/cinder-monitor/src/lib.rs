//! # cinder-monitor
//!
//! The expiry evaluation loop: on a fixed period, read every
//! registration, query chain state once, and decide fire/no-fire per
//! registration. The fire decision is stamped into the store *before*
//! dispatch so a crash or delivery failure can never roll the decision
//! back and refire on the same data.
//!
//! ## Modules
//!
//! - [`predicate`] — the pure firing predicate (window + debounce)
//! - [`engine`] — the cycle runner and pacing loop

pub mod engine;
pub mod predicate;

pub use engine::{CycleSummary, Monitor};
pub use predicate::should_fire;

use std::time::Duration;

/// Default wait between evaluation cycles.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(120);

/// Default one-block-early tolerance of the firing window.
pub const DEFAULT_TOLERANCE_BLOCKS: i64 = 1;

/// Default minimum block distance between two fires of one registration.
pub const DEFAULT_DEBOUNCE_BLOCKS: i64 = 5;

/// Tunables of the evaluation loop.
///
/// The tolerance and debounce values are empirical; they ship as
/// configuration rather than constants so operators can tighten them.
/// Note that exactly-once delivery across process restarts is not
/// guaranteed under adversarial timing: the predicate is level-triggered
/// on fresh data, so a restart inside the window after the debounce
/// distance has elapsed fires again.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Wait between the end of one cycle and the start of the next
    /// (min-period pacing, not fixed-rate).
    pub poll_interval: Duration,
    /// A registration may fire up to this many blocks early relative to
    /// its nominal threshold, covering thresholds skipped between polls.
    pub tolerance_blocks: i64,
    /// Suppress refiring within this many blocks of the previous fire.
    pub debounce_blocks: i64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            tolerance_blocks: DEFAULT_TOLERANCE_BLOCKS,
            debounce_blocks: DEFAULT_DEBOUNCE_BLOCKS,
        }
    }
}
