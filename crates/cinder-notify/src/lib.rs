//! # cinder-notify
//!
//! Delivery channels and the notification dispatcher.
//!
//! Every channel implements the same capability: deliver one expiry
//! notice to one target. Channels are best-effort per attempt — a
//! failed delivery is logged and dropped, never retried by the engine
//! (a registration that still matches the firing window on a later
//! cycle gets a fresh attempt).
//!
//! ## Modules
//!
//! - [`webhook`] — Discord-compatible webhook POST
//! - [`email`] — SMTP submission over implicit TLS
//! - [`chat`] — bot-API direct message via a linked handle
//! - [`dispatcher`] — channel routing with bounded delivery concurrency

pub mod chat;
pub mod dispatcher;
pub mod email;
pub mod webhook;

pub use chat::ChatChannel;
pub use dispatcher::Dispatcher;
pub use email::EmailChannel;
pub use webhook::WebhookChannel;

use async_trait::async_trait;

use cinder_types::ExpiryNotice;

/// Error types for delivery attempts.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("could not build message: {0}")]
    BadMessage(String),

    #[error("bot API rejected the message: {0}")]
    BotApi(String),

    #[error("handle {0:?} has no linked chat recipient")]
    UnlinkedHandle(String),
}

pub type Result<T> = std::result::Result<T, NotifyError>;

/// A pluggable notification transport.
///
/// `target` is channel-specific: a webhook URL, an email address, or a
/// chat handle. `threshold_blocks` is the firing registration's own
/// threshold, included for display.
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    async fn deliver(
        &self,
        target: &str,
        notice: &ExpiryNotice,
        threshold_blocks: i64,
    ) -> Result<()>;
}

/// Resolves chat handles to channel-specific recipient ids.
///
/// The linking flow that populates the mapping is out-of-band; this
/// trait is injected into the chat channel so tests can substitute it
/// and so the daemon can back it with its database.
#[async_trait]
pub trait HandleLinks: Send + Sync {
    async fn recipient_for(&self, handle: &str) -> Option<String>;
}
