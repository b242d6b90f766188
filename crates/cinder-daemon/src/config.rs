//! Configuration file management.
//!
//! TOML file at `$CINDER_DATA_DIR/config.toml`; every field has a
//! default so a missing file means a usable local-node setup.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use cinder_monitor::MonitorConfig;

/// Complete daemon configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// HSD node settings.
    #[serde(default)]
    pub node: NodeConfig,
    /// Evaluation loop settings.
    #[serde(default)]
    pub monitor: MonitorSection,
    /// Branding shared by all delivery channels.
    #[serde(default)]
    pub alerts: AlertsConfig,
    /// SMTP submission settings; email channel is enabled when
    /// `server` and `from_address` are set.
    #[serde(default)]
    pub smtp: SmtpConfig,
    /// Chat bot settings; chat channel is enabled when `bot_token`
    /// is set.
    #[serde(default)]
    pub chat: ChatConfig,
    /// Storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// HSD node connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Node hostname or address.
    #[serde(default = "default_node_host")]
    pub host: String,
    /// Node API key. Empty = no authentication.
    #[serde(default)]
    pub api_key: String,
    /// Network name: "main" | "testnet" | "regtest" | "simnet".
    #[serde(default = "default_network")]
    pub network: String,
}

/// Evaluation loop tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorSection {
    /// Seconds between the end of one cycle and the next.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Blocks a registration may fire early relative to its threshold.
    #[serde(default = "default_tolerance_blocks")]
    pub tolerance_blocks: i64,
    /// Minimum block distance between two fires of one registration.
    #[serde(default = "default_debounce_blocks")]
    pub debounce_blocks: i64,
    /// Bound on concurrent in-flight deliveries.
    #[serde(default = "default_max_concurrent_deliveries")]
    pub max_concurrent_deliveries: usize,
}

/// Shared channel branding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertsConfig {
    /// Name shown as the notification sender.
    #[serde(default = "default_sender_name")]
    pub sender_name: String,
    /// Public account-page URL prefix, without trailing slash.
    #[serde(default = "default_account_base")]
    pub account_base: String,
}

/// SMTP submission settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    /// Submission server hostname. Empty = email channel disabled.
    #[serde(default)]
    pub server: String,
    /// Submission port (implicit TLS).
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// Optional credentials; both must be set to authenticate.
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// From address. Empty = email channel disabled.
    #[serde(default)]
    pub from_address: String,
}

/// Chat bot settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Bot API token. Empty = chat channel disabled.
    #[serde(default)]
    pub bot_token: String,
}

/// Storage settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Data directory. Empty = platform default.
    #[serde(default)]
    pub data_dir: String,
}

// Default value functions

fn default_node_host() -> String {
    "localhost".to_string()
}

fn default_network() -> String {
    "main".to_string()
}

fn default_poll_interval_secs() -> u64 {
    120
}

fn default_tolerance_blocks() -> i64 {
    cinder_monitor::DEFAULT_TOLERANCE_BLOCKS
}

fn default_debounce_blocks() -> i64 {
    cinder_monitor::DEFAULT_DEBOUNCE_BLOCKS
}

fn default_max_concurrent_deliveries() -> usize {
    cinder_notify::dispatcher::DEFAULT_MAX_CONCURRENT_DELIVERIES
}

fn default_sender_name() -> String {
    "Cinder Alerts".to_string()
}

fn default_account_base() -> String {
    "https://alerts.example.org/account".to_string()
}

fn default_smtp_port() -> u16 {
    465
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            host: default_node_host(),
            api_key: String::new(),
            network: default_network(),
        }
    }
}

impl Default for MonitorSection {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            tolerance_blocks: default_tolerance_blocks(),
            debounce_blocks: default_debounce_blocks(),
            max_concurrent_deliveries: default_max_concurrent_deliveries(),
        }
    }
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            sender_name: default_sender_name(),
            account_base: default_account_base(),
        }
    }
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            server: String::new(),
            port: default_smtp_port(),
            username: String::new(),
            password: String::new(),
            from_address: String::new(),
        }
    }
}

impl DaemonConfig {
    /// Load configuration from the default config file location.
    ///
    /// Falls back to defaults if the file does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: DaemonConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Get the data directory path.
    pub fn data_dir(&self) -> PathBuf {
        if self.storage.data_dir.is_empty() {
            Self::default_data_dir()
        } else {
            PathBuf::from(&self.storage.data_dir)
        }
    }

    /// Evaluation loop config derived from the `[monitor]` section.
    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            poll_interval: Duration::from_secs(self.monitor.poll_interval_secs),
            tolerance_blocks: self.monitor.tolerance_blocks,
            debounce_blocks: self.monitor.debounce_blocks,
        }
    }

    /// Whether the email channel is configured.
    pub fn email_enabled(&self) -> bool {
        !self.smtp.server.is_empty() && !self.smtp.from_address.is_empty()
    }

    /// Whether the chat channel is configured.
    pub fn chat_enabled(&self) -> bool {
        !self.chat.bot_token.is_empty()
    }

    /// Get the config file path.
    fn config_path() -> PathBuf {
        if let Ok(dir) = std::env::var("CINDER_DATA_DIR") {
            return PathBuf::from(dir).join("config.toml");
        }
        Self::default_data_dir().join("config.toml")
    }

    /// Platform-specific default data directory.
    fn default_data_dir() -> PathBuf {
        if let Ok(dir) = std::env::var("CINDER_DATA_DIR") {
            return PathBuf::from(dir);
        }
        #[cfg(target_os = "macos")]
        {
            dirs_fallback("Library/Application Support/Cinder")
        }
        #[cfg(not(target_os = "macos"))]
        {
            dirs_fallback(".cinder")
        }
    }
}

/// Fallback home directory resolution.
fn dirs_fallback(subpath: &str) -> PathBuf {
    std::env::var("HOME")
        .map(|h| PathBuf::from(h).join(subpath))
        .unwrap_or_else(|_| PathBuf::from("/tmp/cinder"))
}
