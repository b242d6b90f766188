//! SQL schema definitions.

/// Complete schema for the cinder v1 database.
///
/// A domain "exists" iff it has at least one registration row, so
/// deleting a domain's last registration prunes the domain for free.
/// The `(domain, channel, id)` primary key mirrors the store's update
/// contract: replacement matches on channel **and** id within a domain.
pub const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS registrations (
    domain TEXT NOT NULL,
    channel TEXT NOT NULL,
    id TEXT NOT NULL,
    owner TEXT NOT NULL,
    target TEXT NOT NULL,
    threshold_blocks INTEGER NOT NULL,
    last_fired_height INTEGER,
    created_at INTEGER NOT NULL,
    PRIMARY KEY (domain, channel, id)
);

CREATE INDEX IF NOT EXISTS idx_registrations_owner ON registrations(owner);
CREATE INDEX IF NOT EXISTS idx_registrations_id ON registrations(id);

CREATE TABLE IF NOT EXISTS chat_links (
    handle TEXT PRIMARY KEY,
    recipient TEXT NOT NULL,
    linked_at INTEGER NOT NULL
);
"#;
