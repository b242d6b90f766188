//! In-memory chain for tests and development.
//!
//! Heights are set directly; unknown domains answer with the failure
//! sentinel, which doubles as a way to simulate per-domain query
//! failures.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use cinder_types::{Height, HEIGHT_UNKNOWN};

use crate::ChainQuery;

#[derive(Debug, Default)]
struct Inner {
    height: Height,
    expiries: HashMap<String, Height>,
}

/// A chain whose state is whatever the test says it is.
#[derive(Debug)]
pub struct StaticChain {
    inner: Mutex<Inner>,
}

impl StaticChain {
    /// Create a chain at the given tip height with no known domains.
    pub fn new(height: Height) -> Self {
        Self {
            inner: Mutex::new(Inner {
                height,
                expiries: HashMap::new(),
            }),
        }
    }

    /// Move the chain tip.
    pub fn set_height(&self, height: Height) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.height = height;
        }
    }

    /// Set a domain's expiry height.
    pub fn set_expiry(&self, domain: &str, height: Height) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.expiries.insert(domain.to_string(), height);
        }
    }

    /// Forget a domain, making its expiry query fail.
    pub fn clear_expiry(&self, domain: &str) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.expiries.remove(domain);
        }
    }
}

#[async_trait]
impl ChainQuery for StaticChain {
    async fn current_height(&self) -> Height {
        self.inner
            .lock()
            .map(|inner| inner.height)
            .unwrap_or(HEIGHT_UNKNOWN)
    }

    async fn expiry_height(&self, domain: &str) -> Height {
        self.inner
            .lock()
            .ok()
            .and_then(|inner| inner.expiries.get(domain).copied())
            .unwrap_or(HEIGHT_UNKNOWN)
    }
}
