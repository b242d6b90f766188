//! Chat delivery through a Telegram-style bot API.
//!
//! Registrations target a user-chosen handle; an out-of-band linking
//! flow maps handles to bot-API chat ids. An unlinked handle fails
//! locally, before any network I/O.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use cinder_types::ExpiryNotice;

use crate::{DeliveryChannel, HandleLinks, NotifyError, Result};

/// Sends expiry notices as bot direct messages.
pub struct ChatChannel {
    client: reqwest::Client,
    api_base: String,
    links: Arc<dyn HandleLinks>,
}

impl ChatChannel {
    pub fn new(bot_token: &str, links: Arc<dyn HandleLinks>) -> Result<Self> {
        Self::with_api_url("https://api.telegram.org", bot_token, links)
    }

    /// Point the channel at a non-default API host (tests).
    pub fn with_api_url(
        api_url: &str,
        bot_token: &str,
        links: Arc<dyn HandleLinks>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(NotifyError::Http)?;
        Ok(Self {
            client,
            api_base: format!("{api_url}/bot{bot_token}"),
            links,
        })
    }
}

#[async_trait]
impl DeliveryChannel for ChatChannel {
    async fn deliver(
        &self,
        target: &str,
        notice: &ExpiryNotice,
        threshold_blocks: i64,
    ) -> Result<()> {
        let recipient = self
            .links
            .recipient_for(target)
            .await
            .ok_or_else(|| NotifyError::UnlinkedHandle(target.to_string()))?;

        let url = format!("{}/sendMessage", self.api_base);
        let payload = json!({
            "chat_id": recipient,
            "text": message_text(notice, threshold_blocks),
        });

        let response = self.client.post(&url).json(&payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::UnexpectedStatus {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        // The bot API reports application-level failure in-body.
        let body: serde_json::Value = response.json().await?;
        if body.get("ok").and_then(serde_json::Value::as_bool) != Some(true) {
            return Err(NotifyError::BotApi(body.to_string()));
        }
        Ok(())
    }
}

fn message_text(notice: &ExpiryNotice, threshold_blocks: i64) -> String {
    format!(
        "{domain} is expiring in {blocks} blocks (~{time}).\n\
         Alert threshold: {threshold_blocks} blocks.",
        domain = notice.domain,
        blocks = notice.blocks_remaining,
        time = notice.approx_time,
    )
}
