//! Notification dispatcher.
//!
//! Routes a fire decision to the registration's channel, isolating
//! failures per delivery: a failed or misconfigured channel is logged
//! and dropped, and sibling deliveries in the same cycle proceed.
//! Total in-flight deliveries are bounded by a semaphore so a burst of
//! simultaneous threshold crossings cannot spawn unbounded network
//! operations.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{debug, error, warn};

use cinder_types::{ChannelKind, ExpiryNotice, Registration};

use crate::DeliveryChannel;

/// Default bound on concurrent deliveries.
pub const DEFAULT_MAX_CONCURRENT_DELIVERIES: usize = 8;

/// Builder for [`Dispatcher`].
pub struct DispatcherBuilder {
    channels: HashMap<ChannelKind, Arc<dyn DeliveryChannel>>,
    max_concurrent: usize,
}

impl DispatcherBuilder {
    /// Register a delivery channel for a kind. Kinds without a channel
    /// are logged and dropped at dispatch time.
    pub fn channel(mut self, kind: ChannelKind, channel: Arc<dyn DeliveryChannel>) -> Self {
        self.channels.insert(kind, channel);
        self
    }

    /// Bound on concurrent in-flight deliveries.
    pub fn max_concurrent(mut self, limit: usize) -> Self {
        self.max_concurrent = limit.max(1);
        self
    }

    pub fn build(self) -> Dispatcher {
        Dispatcher {
            channels: Arc::new(self.channels),
            permits: Arc::new(Semaphore::new(self.max_concurrent)),
        }
    }
}

/// Fans fire decisions out to delivery channels.
#[derive(Clone)]
pub struct Dispatcher {
    channels: Arc<HashMap<ChannelKind, Arc<dyn DeliveryChannel>>>,
    permits: Arc<Semaphore>,
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder {
            channels: HashMap::new(),
            max_concurrent: DEFAULT_MAX_CONCURRENT_DELIVERIES,
        }
    }

    /// Deliver one notice through the registration's channel.
    ///
    /// Never propagates channel errors; returns whether the delivery
    /// succeeded. Blocks while the concurrency bound is saturated.
    pub async fn dispatch(&self, reg: &Registration, notice: &ExpiryNotice) -> bool {
        let Some(channel) = self.channels.get(&reg.channel) else {
            warn!(
                channel = %reg.channel,
                domain = %notice.domain,
                "no delivery channel configured for kind; notification dropped"
            );
            return false;
        };

        let _permit = match self.permits.acquire().await {
            Ok(permit) => permit,
            Err(_) => return false,
        };

        match channel
            .deliver(&reg.target, notice, reg.threshold_blocks)
            .await
        {
            Ok(()) => {
                debug!(
                    channel = %reg.channel,
                    target = %reg.target,
                    domain = %notice.domain,
                    blocks = notice.blocks_remaining,
                    "notification delivered"
                );
                true
            }
            Err(e) => {
                error!(
                    channel = %reg.channel,
                    target = %reg.target,
                    domain = %notice.domain,
                    error = %e,
                    "notification delivery failed"
                );
                false
            }
        }
    }
}
