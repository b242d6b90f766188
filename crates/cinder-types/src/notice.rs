//! Notification context handed to delivery channels.

use serde::{Deserialize, Serialize};

use crate::BLOCKS_PER_DAY;

/// Ephemeral expiry context for one domain in one evaluation cycle.
/// Recomputed fresh every cycle, never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryNotice {
    /// The domain that is approaching expiry.
    pub domain: String,
    /// Blocks left until the renewal period ends.
    pub blocks_remaining: i64,
    /// Human-readable approximation, e.g. "3 days".
    pub approx_time: String,
}

impl ExpiryNotice {
    /// Build a notice for a domain with the given remaining blocks.
    pub fn new(domain: impl Into<String>, blocks_remaining: i64) -> Self {
        let days = blocks_remaining / BLOCKS_PER_DAY;
        Self {
            domain: domain.into(),
            blocks_remaining,
            approx_time: format!("{days} days"),
        }
    }
}
