//! Email delivery via SMTP submission.
//!
//! Implicit TLS (SMTPS) with optional credentials, matching the usual
//! port-465 submission setup.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use cinder_types::ExpiryNotice;

use crate::{DeliveryChannel, NotifyError, Result};

/// Sends expiry notices as plain-text email.
pub struct EmailChannel {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    sender_name: String,
    account_base: String,
}

impl EmailChannel {
    pub fn new(
        server: &str,
        port: u16,
        credentials: Option<(String, String)>,
        from_address: &str,
        sender_name: impl Into<String>,
        account_base: impl Into<String>,
    ) -> Result<Self> {
        let sender_name = sender_name.into();
        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::relay(server).map_err(NotifyError::Smtp)?;
        builder = builder.port(port);
        if let Some((username, password)) = credentials {
            builder = builder.credentials(Credentials::new(username, password));
        }

        let from: Mailbox = format!("{sender_name} <{from_address}>")
            .parse()
            .map_err(|e| NotifyError::BadMessage(format!("from address: {e}")))?;

        Ok(Self {
            transport: builder.build(),
            from,
            sender_name,
            account_base: account_base.into(),
        })
    }
}

#[async_trait]
impl DeliveryChannel for EmailChannel {
    async fn deliver(
        &self,
        target: &str,
        notice: &ExpiryNotice,
        threshold_blocks: i64,
    ) -> Result<()> {
        let to: Mailbox = target
            .parse()
            .map_err(|e| NotifyError::BadMessage(format!("recipient address: {e}")))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject(notice))
            .body(body(
                &self.sender_name,
                &self.account_base,
                notice,
                threshold_blocks,
            ))
            .map_err(|e| NotifyError::BadMessage(e.to_string()))?;

        self.transport.send(message).await?;
        Ok(())
    }
}

fn subject(notice: &ExpiryNotice) -> String {
    format!(
        "{} is expiring in {} blocks (~{})",
        notice.domain, notice.blocks_remaining, notice.approx_time
    )
}

fn body(
    sender_name: &str,
    account_base: &str,
    notice: &ExpiryNotice,
    threshold_blocks: i64,
) -> String {
    let domain = &notice.domain;
    let blocks = notice.blocks_remaining;
    let time = &notice.approx_time;
    format!(
        "You set an alert for {domain}. This domain will expire in {blocks} blocks \
         or approximately {time}.\n\
         \n\
         Domain: {domain}\n\
         Blocks remaining: {blocks}\n\
         Time remaining: {time}\n\
         Alert threshold: {threshold_blocks} blocks\n\
         \n\
         Visit your {sender_name} account: {account_base}/{domain}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject() {
        let notice = ExpiryNotice::new("woodburn", 288);
        assert_eq!(subject(&notice), "woodburn is expiring in 288 blocks (~2 days)");
    }

    #[test]
    fn test_body_lists_threshold_and_link() {
        let notice = ExpiryNotice::new("woodburn", 288);
        let text = body("Cinder", "https://alerts.example.org/account", &notice, 300);
        assert!(text.contains("Blocks remaining: 288"));
        assert!(text.contains("Alert threshold: 300 blocks"));
        assert!(text.contains("https://alerts.example.org/account/woodburn"));
    }
}
