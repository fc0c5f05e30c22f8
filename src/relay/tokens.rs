//! The access-token table written during the link flow.
//!
//! The original backend kept these in an in-process map, which lost every
//! linked account on restart. The relay stores them in SQLite instead: a row
//! is written when a public token is exchanged and deleted when the item is
//! removed, so the mapping has a bounded, durable lifetime.

use rusqlite::{Connection, params};
use time::OffsetDateTime;

use crate::Error;

/// Create the table that holds access tokens from the link flow.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn create_access_token_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS access_token (
            item_id TEXT PRIMARY KEY,
            access_token TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

/// Store the access token for `item_id`, replacing any previous token.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn store_access_token(
    connection: &Connection,
    item_id: &str,
    access_token: &str,
) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO access_token (item_id, access_token, created_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(item_id) DO UPDATE SET
             access_token = excluded.access_token,
             created_at = excluded.created_at",
        params![item_id, access_token, OffsetDateTime::now_utc()],
    )?;

    Ok(())
}

/// Delete every stored row holding `access_token`, returning how many rows
/// were removed.
///
/// Item removal is keyed by the access token because that is all the client
/// sends, matching the upstream `/item/remove` call.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn delete_access_tokens(connection: &Connection, access_token: &str) -> Result<usize, Error> {
    let deleted = connection.execute(
        "DELETE FROM access_token WHERE access_token = ?1",
        params![access_token],
    )?;

    Ok(deleted)
}

// ============================================================================
// TESTS
// ============================================================================
