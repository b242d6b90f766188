//! # cinder-chain
//!
//! Chain query adapter for an HSD-style node.
//!
//! The monitoring engine only ever sees two read queries, both with a
//! `-1`-on-failure sentinel contract: the current chain height and a
//! domain's expiry height. Valid heights are non-negative, so the
//! sentinel is always distinguishable. Failures are independent per
//! query; one domain's failed lookup never aborts another's.
//!
//! ## Modules
//!
//! - [`client`] — `reqwest`-backed JSON-RPC client for a real node
//! - [`stub`] — in-memory chain for tests and development

pub mod client;
pub mod stub;

pub use client::{HsdClient, HsdNetwork};
pub use stub::StaticChain;

use async_trait::async_trait;

use cinder_types::Height;

/// Error types for chain queries. Callers inside the engine never see
/// these; the [`ChainQuery`] trait folds them into the `-1` sentinel.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("node reported error: {0}")]
    Node(String),

    #[error("missing field in node response: {0}")]
    MissingField(&'static str),
}

pub type Result<T> = std::result::Result<T, ChainError>;

/// Read-only view of chain state, one call per concern.
///
/// Both calls return [`cinder_types::HEIGHT_UNKNOWN`] (`-1`) on any
/// failure — transport, protocol, or node-reported. Callers must treat
/// the sentinel as "unknown, skip what depends on it", never as a
/// literal height.
#[async_trait]
pub trait ChainQuery: Send + Sync {
    /// Current tip height of the chain.
    async fn current_height(&self) -> Height;

    /// Height at which the domain's current renewal period ends.
    async fn expiry_height(&self, domain: &str) -> Height;
}
