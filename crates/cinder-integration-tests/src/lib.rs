//! Shared fixtures for the cinder integration tests.

use std::sync::Mutex;

use async_trait::async_trait;

use cinder_notify::{DeliveryChannel, NotifyError};
use cinder_types::ExpiryNotice;

/// One recorded delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivered {
    pub target: String,
    pub domain: String,
    pub blocks_remaining: i64,
    pub approx_time: String,
    pub threshold_blocks: i64,
}

/// A delivery channel that records instead of sending.
#[derive(Default)]
pub struct RecordingChannel {
    sent: Mutex<Vec<Delivered>>,
}

impl RecordingChannel {
    pub fn sent(&self) -> Vec<Delivered> {
        self.sent.lock().expect("lock").clone()
    }
}

#[async_trait]
impl DeliveryChannel for RecordingChannel {
    async fn deliver(
        &self,
        target: &str,
        notice: &ExpiryNotice,
        threshold_blocks: i64,
    ) -> Result<(), NotifyError> {
        self.sent.lock().expect("lock").push(Delivered {
            target: target.to_string(),
            domain: notice.domain.clone(),
            blocks_remaining: notice.blocks_remaining,
            approx_time: notice.approx_time.clone(),
            threshold_blocks,
        });
        Ok(())
    }
}
