//! Registration store queries.
//!
//! The store is a durable mapping domain -> ordered list of alert
//! registrations. A domain exists iff it has at least one row, so
//! emptied domains disappear from `list_all` without explicit pruning.

use std::collections::BTreeMap;

use rusqlite::Connection;

use cinder_types::{ChannelKind, Registration};

use crate::{DbError, Result};

/// Append a new registration for a domain.
///
/// Fails with a validation error (surfaced, never persisted) if the
/// channel target or threshold is malformed.
pub fn add(conn: &Connection, domain: &str, reg: &Registration) -> Result<()> {
    reg.validate()?;
    conn.execute(
        "INSERT INTO registrations
             (domain, channel, id, owner, target, threshold_blocks, last_fired_height, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        rusqlite::params![
            domain,
            reg.channel.as_str(),
            reg.id,
            reg.owner,
            reg.target,
            reg.threshold_blocks,
            reg.last_fired_height,
            unix_now() as i64,
        ],
    )?;
    Ok(())
}

/// Replace the registration matching `(channel, id)` within a domain.
///
/// If no row matches, behaves as [`add`] (upsert-by-append). Matching
/// on channel **and** id, not id alone, preserves compatibility with
/// records created before identities were unique across channels.
pub fn update(conn: &Connection, domain: &str, reg: &Registration) -> Result<()> {
    reg.validate()?;
    let changed = conn.execute(
        "UPDATE registrations
         SET owner = ?4, target = ?5, threshold_blocks = ?6, last_fired_height = ?7
         WHERE domain = ?1 AND channel = ?2 AND id = ?3",
        rusqlite::params![
            domain,
            reg.channel.as_str(),
            reg.id,
            reg.owner,
            reg.target,
            reg.threshold_blocks,
            reg.last_fired_height,
        ],
    )?;
    if changed == 0 {
        add(conn, domain, reg)?;
    }
    Ok(())
}

/// Delete registrations where both id and owner match, across all
/// domains. A wrong owner is a no-op, not an error. Returns the number
/// of rows removed.
pub fn delete(conn: &Connection, id: &str, owner: &str) -> Result<usize> {
    let removed = conn.execute(
        "DELETE FROM registrations WHERE id = ?1 AND owner = ?2",
        rusqlite::params![id, owner],
    )?;
    Ok(removed)
}

/// Full read of the store: domain -> registrations in insertion order.
/// Used once per evaluation cycle.
pub fn list_all(conn: &Connection) -> Result<BTreeMap<String, Vec<Registration>>> {
    let mut stmt = conn.prepare(
        "SELECT domain, channel, id, owner, target, threshold_blocks, last_fired_height
         FROM registrations ORDER BY rowid",
    )?;

    let mut map: BTreeMap<String, Vec<Registration>> = BTreeMap::new();
    let rows = stmt.query_map([], row_to_entry)?;
    for row in rows {
        let (domain, reg) = row?;
        let reg = decode(reg)?;
        map.entry(domain).or_default().push(reg);
    }
    Ok(map)
}

/// All registrations belonging to one owner, with their domains.
/// Full-scan filter backing the account view.
pub fn for_owner(conn: &Connection, owner: &str) -> Result<Vec<(String, Registration)>> {
    let mut stmt = conn.prepare(
        "SELECT domain, channel, id, owner, target, threshold_blocks, last_fired_height
         FROM registrations WHERE owner = ?1 ORDER BY rowid",
    )?;

    let rows = stmt
        .query_map([owner], row_to_entry)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(domain, raw)| Ok((domain, decode(raw)?)))
        .collect()
}

/// Raw row before the channel string is parsed.
struct RawRegistration {
    channel: String,
    id: String,
    owner: String,
    target: String,
    threshold_blocks: i64,
    last_fired_height: Option<i64>,
}

fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<(String, RawRegistration)> {
    Ok((
        row.get(0)?,
        RawRegistration {
            channel: row.get(1)?,
            id: row.get(2)?,
            owner: row.get(3)?,
            target: row.get(4)?,
            threshold_blocks: row.get(5)?,
            last_fired_height: row.get(6)?,
        },
    ))
}

fn decode(raw: RawRegistration) -> Result<Registration> {
    let channel: ChannelKind = raw
        .channel
        .parse()
        .map_err(|e| DbError::Corrupt(format!("{e}")))?;
    Ok(Registration {
        id: raw.id,
        owner: raw.owner,
        channel,
        target: raw.target,
        threshold_blocks: raw.threshold_blocks,
        last_fired_height: raw.last_fired_height,
    })
}

fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
