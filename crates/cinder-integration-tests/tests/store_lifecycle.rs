//! Integration test: the registration store as its external consumers
//! (HTTP handlers, the account view, the linking flow) drive it.
//!
//! 1. Create registrations for two owners across domains
//! 2. Read back the per-owner account view
//! 3. Re-register (update) with the same identity
//! 4. Delete with owner scoping and verify domain pruning
//! 5. Link a chat handle and verify unlinked chat delivery fails
//!    locally while a linked one resolves

use std::sync::Arc;

use async_trait::async_trait;

use cinder_db::queries::{chat_links, registrations};
use cinder_notify::{ChatChannel, DeliveryChannel, HandleLinks, NotifyError};
use cinder_types::{ChannelKind, ExpiryNotice, Registration};

#[test]
fn test_registration_lifecycle() {
    let conn = cinder_db::open_memory().expect("open db");

    let mut hook = Registration::new("nathan", ChannelKind::Webhook, "https://hooks.test/1", 100);
    let mail = Registration::new("nathan", ChannelKind::Email, "nathan@example.com", 500);
    let other = Registration::new("alice", ChannelKind::Email, "alice@example.com", 100);

    registrations::add(&conn, "woodburn", &hook).expect("add");
    registrations::add(&conn, "woodburn", &mail).expect("add");
    registrations::add(&conn, "nathan.woodburn", &other).expect("add");

    // Account view sees exactly the owner's rows, with domains.
    let mine = registrations::for_owner(&conn, "nathan").expect("for_owner");
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|(domain, _)| domain == "woodburn"));

    // Re-registering the same identity replaces all other fields.
    hook.threshold_blocks = 250;
    hook.target = "https://hooks.test/replacement".to_string();
    registrations::update(&conn, "woodburn", &hook).expect("update");

    let all = registrations::list_all(&conn).expect("list");
    assert_eq!(all["woodburn"].len(), 2);
    let updated = all["woodburn"]
        .iter()
        .find(|r| r.id == hook.id)
        .expect("still present");
    assert_eq!(updated.threshold_blocks, 250);
    assert_eq!(updated.target, "https://hooks.test/replacement");

    // Owner scoping: alice cannot delete nathan's registration.
    assert_eq!(registrations::delete(&conn, &hook.id, "alice").expect("delete"), 0);
    // Deleting both of nathan's rows prunes the woodburn domain.
    registrations::delete(&conn, &hook.id, "nathan").expect("delete");
    registrations::delete(&conn, &mail.id, "nathan").expect("delete");

    let all = registrations::list_all(&conn).expect("list");
    assert!(!all.contains_key("woodburn"));
    assert_eq!(all["nathan.woodburn"].len(), 1);

    // Re-adding to the pruned domain recreates it.
    registrations::add(&conn, "woodburn", &hook).expect("re-add");
    assert!(registrations::list_all(&conn).expect("list").contains_key("woodburn"));
}

#[test]
fn test_invalid_registrations_never_persist() {
    let conn = cinder_db::open_memory().expect("open db");

    let bad_url = Registration::new("nathan", ChannelKind::Webhook, "not-a-url", 100);
    let bad_threshold = Registration::new("nathan", ChannelKind::Email, "a@example.com", -5);

    assert!(registrations::add(&conn, "woodburn", &bad_url).is_err());
    assert!(registrations::add(&conn, "woodburn", &bad_threshold).is_err());
    assert!(registrations::list_all(&conn).expect("list").is_empty());
}

struct MapLinks(std::collections::HashMap<String, String>);

#[async_trait]
impl HandleLinks for MapLinks {
    async fn recipient_for(&self, handle: &str) -> Option<String> {
        self.0.get(handle).cloned()
    }
}

#[tokio::test]
async fn test_chat_linking_gate() {
    // The persisted link table round-trips through the daemon's flow.
    let conn = cinder_db::open_memory().expect("open db");
    chat_links::link(&conn, "nathan", "123456789", 1000).expect("link");
    assert_eq!(
        chat_links::recipient_for(&conn, "nathan").expect("resolve").as_deref(),
        Some("123456789")
    );

    // An unlinked handle fails before any network I/O: the API host
    // here is unroutable, so reaching the network would surface an
    // HTTP error instead of UnlinkedHandle.
    let links = Arc::new(MapLinks(std::collections::HashMap::new()));
    let channel =
        ChatChannel::with_api_url("http://127.0.0.1:1", "token", links).expect("channel");
    let err = channel
        .deliver("nathan", &ExpiryNotice::new("woodburn", 100), 100)
        .await
        .expect_err("unlinked handle must fail");
    assert!(matches!(err, NotifyError::UnlinkedHandle(_)));
}
