//! Chat handle link queries.
//!
//! The linking flow itself (bot command exchange) lives outside this
//! repo; it writes the handle -> recipient mapping here and the chat
//! delivery channel reads it back.

use rusqlite::Connection;

use crate::Result;

/// Link a handle to a chat recipient id. Re-linking replaces the
/// previous recipient.
pub fn link(conn: &Connection, handle: &str, recipient: &str, linked_at: u64) -> Result<()> {
    conn.execute(
        "INSERT INTO chat_links (handle, recipient, linked_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(handle) DO UPDATE SET recipient = ?2, linked_at = ?3",
        rusqlite::params![handle, recipient, linked_at as i64],
    )?;
    Ok(())
}

/// Resolve a handle to its linked recipient id, if any.
pub fn recipient_for(conn: &Connection, handle: &str) -> Result<Option<String>> {
    let mut stmt = conn.prepare("SELECT recipient FROM chat_links WHERE handle = ?1")?;
    let mut rows = stmt.query([handle])?;
    match rows.next()? {
        Some(row) => Ok(Some(row.get(0)?)),
        None => Ok(None),
    }
}

/// Remove a handle's link.
pub fn unlink(conn: &Connection, handle: &str) -> Result<()> {
    conn.execute("DELETE FROM chat_links WHERE handle = ?1", [handle])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Connection {
        crate::open_memory().expect("open test db")
    }

    #[test]
    fn test_link_and_resolve() {
        let conn = test_db();
        link(&conn, "nathan", "123456789", 1000).expect("link");

        let recipient = recipient_for(&conn, "nathan").expect("resolve");
        assert_eq!(recipient.as_deref(), Some("123456789"));

        let missing = recipient_for(&conn, "ghost").expect("resolve");
        assert_eq!(missing, None);
    }

    #[test]
    fn test_relink_replaces() {
        let conn = test_db();
        link(&conn, "nathan", "111", 1000).expect("link");
        link(&conn, "nathan", "222", 2000).expect("relink");

        let recipient = recipient_for(&conn, "nathan").expect("resolve");
        assert_eq!(recipient.as_deref(), Some("222"));
    }

    #[test]
    fn test_unlink() {
        let conn = test_db();
        link(&conn, "nathan", "111", 1000).expect("link");
        unlink(&conn, "nathan").expect("unlink");
        assert_eq!(recipient_for(&conn, "nathan").expect("resolve"), None);
    }
}
