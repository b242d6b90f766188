//! Alert registrations: one user's request to be alerted about one
//! domain at one blocks-remaining threshold.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::{ChannelKind, Height, REGISTRATION_ID_BYTES};

/// Validation failures for registration input. Surfaced to the caller;
/// never persisted.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ValidationError {
    /// Threshold must be a positive number of blocks.
    #[error("threshold must be a positive number of blocks, got {0}")]
    NonPositiveThreshold(i64),

    /// The channel target is empty.
    #[error("{0} target must not be empty")]
    EmptyTarget(ChannelKind),

    /// Webhook targets must be http(s) URLs.
    #[error("webhook target is not an http(s) URL: {0}")]
    InvalidWebhookUrl(String),

    /// Email targets must look like an address.
    #[error("invalid email address: {0}")]
    InvalidEmailAddress(String),

    /// The owner identity is empty.
    #[error("owner must not be empty")]
    EmptyOwner,
}

/// A registered expiry alert.
///
/// The registration is keyed by domain in the store; the struct itself
/// carries everything else. `id` is assigned once at creation and is
/// stable for the registration's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    /// Opaque unique identity, hex of 16 random bytes.
    pub id: String,
    /// Identity of the user who created the registration.
    pub owner: String,
    /// Which delivery channel to route through.
    pub channel: ChannelKind,
    /// Channel-specific target: URL, address, or handle.
    pub target: String,
    /// Fire when remaining blocks drop to this value.
    pub threshold_blocks: i64,
    /// Chain height at which this registration last fired. `None` means
    /// never fired. Monotonically non-decreasing once set; the sole
    /// durable anti-duplication guard.
    #[serde(default)]
    pub last_fired_height: Option<Height>,
}

impl Registration {
    /// Create a new registration with a freshly assigned identity.
    pub fn new(
        owner: impl Into<String>,
        channel: ChannelKind,
        target: impl Into<String>,
        threshold_blocks: i64,
    ) -> Self {
        Self {
            id: fresh_id(),
            owner: owner.into(),
            channel,
            target: target.into(),
            threshold_blocks,
            last_fired_height: None,
        }
    }

    /// Validate channel-specific target shape and threshold range.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.owner.is_empty() {
            return Err(ValidationError::EmptyOwner);
        }
        if self.threshold_blocks <= 0 {
            return Err(ValidationError::NonPositiveThreshold(self.threshold_blocks));
        }
        if self.target.is_empty() {
            return Err(ValidationError::EmptyTarget(self.channel));
        }
        match self.channel {
            ChannelKind::Webhook => {
                if !(self.target.starts_with("http://") || self.target.starts_with("https://")) {
                    return Err(ValidationError::InvalidWebhookUrl(self.target.clone()));
                }
            }
            ChannelKind::Email => {
                let (local, rest) = self
                    .target
                    .split_once('@')
                    .ok_or_else(|| ValidationError::InvalidEmailAddress(self.target.clone()))?;
                if local.is_empty() || rest.is_empty() || rest.contains('@') {
                    return Err(ValidationError::InvalidEmailAddress(self.target.clone()));
                }
            }
            // Any nonempty handle is acceptable; linkage is checked at
            // delivery time.
            ChannelKind::Chat => {}
        }
        Ok(())
    }
}

/// Generate a fresh registration identity.
fn fresh_id() -> String {
    let mut bytes = [0u8; REGISTRATION_ID_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_assigns_distinct_ids() {
        let a = Registration::new("nathan", ChannelKind::Email, "a@example.com", 100);
        let b = Registration::new("nathan", ChannelKind::Email, "a@example.com", 100);
        assert_eq!(a.id.len(), REGISTRATION_ID_BYTES * 2);
        assert_ne!(a.id, b.id);
        assert_eq!(a.last_fired_height, None);
    }

    #[test]
    fn test_validate_threshold() {
        let mut reg = Registration::new("nathan", ChannelKind::Email, "a@example.com", 0);
        assert!(matches!(
            reg.validate(),
            Err(ValidationError::NonPositiveThreshold(0))
        ));
        reg.threshold_blocks = 100;
        assert!(reg.validate().is_ok());
    }

    #[test]
    fn test_validate_webhook_url() {
        let reg = Registration::new("nathan", ChannelKind::Webhook, "ftp://hooks.test", 10);
        assert!(matches!(
            reg.validate(),
            Err(ValidationError::InvalidWebhookUrl(_))
        ));

        let reg = Registration::new(
            "nathan",
            ChannelKind::Webhook,
            "https://discord.com/api/webhooks/1/abc",
            10,
        );
        assert!(reg.validate().is_ok());
    }

    #[test]
    fn test_validate_email_address() {
        for bad in ["nathan", "@example.com", "nathan@", "a@b@c"] {
            let reg = Registration::new("nathan", ChannelKind::Email, bad, 10);
            assert!(reg.validate().is_err(), "{bad} should be rejected");
        }
        let reg = Registration::new("nathan", ChannelKind::Email, "nathan@example.com", 10);
        assert!(reg.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_target_and_owner() {
        let reg = Registration::new("nathan", ChannelKind::Chat, "", 10);
        assert!(matches!(
            reg.validate(),
            Err(ValidationError::EmptyTarget(ChannelKind::Chat))
        ));

        let reg = Registration::new("", ChannelKind::Chat, "nathan", 10);
        assert!(matches!(reg.validate(), Err(ValidationError::EmptyOwner)));
    }
}
