//! Delivery channel kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The kind of delivery channel a registration routes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    /// HTTP webhook (Discord-compatible embed payload).
    Webhook,
    /// Electronic mail via SMTP submission.
    Email,
    /// Chat direct message through a bot API, via a linked handle.
    Chat,
}

impl ChannelKind {
    /// Stable string form, used for storage and logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelKind::Webhook => "webhook",
            ChannelKind::Email => "email",
            ChannelKind::Chat => "chat",
        }
    }

    /// All known channel kinds.
    pub fn all() -> [ChannelKind; 3] {
        [ChannelKind::Webhook, ChannelKind::Email, ChannelKind::Chat]
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for parsing an unknown channel kind string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown channel kind: {0}")]
pub struct UnknownChannelKind(pub String);

impl FromStr for ChannelKind {
    type Err = UnknownChannelKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "webhook" => Ok(ChannelKind::Webhook),
            "email" => Ok(ChannelKind::Email),
            "chat" => Ok(ChannelKind::Chat),
            other => Err(UnknownChannelKind(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_str() {
        for kind in ChannelKind::all() {
            let parsed: ChannelKind = kind.as_str().parse().expect("parse");
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn test_unknown_kind() {
        assert!("carrier_pigeon".parse::<ChannelKind>().is_err());
    }

    #[test]
    fn test_serde_form_matches_as_str() {
        let json = serde_json::to_string(&ChannelKind::Webhook).expect("serialize");
        assert_eq!(json, "\"webhook\"");
    }
}
