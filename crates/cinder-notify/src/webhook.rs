//! Discord-compatible webhook delivery.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use cinder_types::ExpiryNotice;

use crate::{DeliveryChannel, NotifyError, Result};

/// Embed accent color (orange).
const EMBED_COLOR: u32 = 13_041_919;

/// Sends expiry notices as webhook embeds.
pub struct WebhookChannel {
    client: reqwest::Client,
    sender_name: String,
    account_base: String,
}

impl WebhookChannel {
    /// `account_base` is the public account-page URL prefix used for
    /// the "open your account" link button, without trailing slash.
    pub fn new(sender_name: impl Into<String>, account_base: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(NotifyError::Http)?;
        Ok(Self {
            client,
            sender_name: sender_name.into(),
            account_base: account_base.into(),
        })
    }
}

#[async_trait]
impl DeliveryChannel for WebhookChannel {
    async fn deliver(
        &self,
        target: &str,
        notice: &ExpiryNotice,
        threshold_blocks: i64,
    ) -> Result<()> {
        let payload = webhook_payload(&self.sender_name, &self.account_base, notice, threshold_blocks);
        let url = format!("{target}?with_components=true");
        let response = self.client.post(&url).json(&payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::UnexpectedStatus {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        Ok(())
    }
}

/// Build the webhook body: one embed plus a link button row.
fn webhook_payload(
    sender_name: &str,
    account_base: &str,
    notice: &ExpiryNotice,
    threshold_blocks: i64,
) -> Value {
    let domain = &notice.domain;
    let blocks = notice.blocks_remaining;
    let time = &notice.approx_time;
    json!({
        "username": sender_name,
        "components": [
            {
                "type": 1,
                "components": [
                    {
                        "type": 2,
                        "style": 5,
                        "url": format!("{account_base}/{domain}"),
                        "label": format!("Open your {sender_name} account")
                    }
                ]
            }
        ],
        "embeds": [
            {
                "author": { "name": sender_name },
                "title": format!("{domain} is expiring in {blocks} blocks (~{time})"),
                "color": EMBED_COLOR,
                "description": format!(
                    "You set an alert for {domain}. This domain will expire in \
                     {blocks} blocks or approximately {time}."
                ),
                "fields": [
                    { "name": "Domain", "value": domain, "inline": true },
                    { "name": "Notice Blocks", "value": threshold_blocks.to_string(), "inline": true }
                ]
            }
        ]
    })
}
