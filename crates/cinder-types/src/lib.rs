//! # cinder-types
//!
//! Shared domain types used across the cinder workspace.

pub mod channel;
pub mod notice;
pub mod registration;

pub use channel::ChannelKind;
pub use notice::ExpiryNotice;
pub use registration::{Registration, ValidationError};

/// Block height on the chain. Non-negative for real heights; see
/// [`HEIGHT_UNKNOWN`].
pub type Height = i64;

/// Sentinel returned by chain queries on any failure. Must never be
/// interpreted as a literal height.
pub const HEIGHT_UNKNOWN: Height = -1;

/// Blocks mined per day on the underlying chain (10-minute target).
pub const BLOCKS_PER_DAY: i64 = 144;

/// Registration identity length in random bytes (hex-encoded to 32 chars).
pub const REGISTRATION_ID_BYTES: usize = 16;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_is_not_a_valid_height() {
        assert!(HEIGHT_UNKNOWN < 0);
    }
}
