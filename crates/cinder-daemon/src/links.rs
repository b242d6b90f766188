//! Database-backed handle links for the chat channel.

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::Connection;
use tokio::sync::Mutex;
use tracing::error;

use cinder_db::queries::chat_links;
use cinder_notify::HandleLinks;

/// Resolves chat handles through the `chat_links` table.
pub struct DbHandleLinks {
    db: Arc<Mutex<Connection>>,
}

impl DbHandleLinks {
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl HandleLinks for DbHandleLinks {
    async fn recipient_for(&self, handle: &str) -> Option<String> {
        let conn = self.db.lock().await;
        match chat_links::recipient_for(&conn, handle) {
            Ok(recipient) => recipient,
            Err(e) => {
                error!(handle, error = %e, "chat link lookup failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolves_linked_handle() {
        let db = Arc::new(Mutex::new(cinder_db::open_memory().expect("open")));
        {
            let conn = db.lock().await;
            chat_links::link(&conn, "nathan", "123456789", 1000).expect("link");
        }

        let links = DbHandleLinks::new(db);
        assert_eq!(
            links.recipient_for("nathan").await.as_deref(),
            Some("123456789")
        );
        assert_eq!(links.recipient_for("ghost").await, None);
    }
}
