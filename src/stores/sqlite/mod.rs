//! SQLite-backed implementations of the store traits.
//!
//! Everything lives in one key-value table, mimicking the platform key-value
//! store the mobile app used (which is itself backed by SQLite). The ledger
//! snapshot, the budget goal and the widget mirror each get their own fixed
//! key, so the widget slot can be read without touching the ledger snapshot.

mod ledger;
mod widget;

pub use ledger::SqliteLedgerStore;
pub use widget::SqliteWidgetMirror;

use rusqlite::{Connection, OptionalExtension, params};

/// The key holding the JSON ledger snapshot.
pub const LEDGER_KEY: &str = "@budget_data";
/// The key holding the budget goal as a decimal string. Absent when no goal
/// is set.
pub const BUDGET_GOAL_KEY: &str = "@budget_goal";
/// The key the widgets read the formatted balance from.
pub const WIDGET_BALANCE_KEY: &str = "@widget_balance";
/// The key the goal-tracking widget reads the goal from.
pub const WIDGET_GOAL_KEY: &str = "@widget_goal";
/// The key the goal-tracking widget reads the raw percentage from.
pub const WIDGET_PERCENTAGE_KEY: &str = "@widget_percentage";

/// Create the key-value table that backs the ledger store and widget mirror.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn create_kv_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS kv (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

fn set_value(connection: &Connection, key: &str, value: &str) -> Result<(), rusqlite::Error> {
    connection.execute(
        "INSERT INTO kv (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )?;

    Ok(())
}

fn get_value(connection: &Connection, key: &str) -> Result<Option<String>, rusqlite::Error> {
    connection
        .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
            row.get(0)
        })
        .optional()
}

fn delete_value(connection: &Connection, key: &str) -> Result<(), rusqlite::Error> {
    connection.execute("DELETE FROM kv WHERE key = ?1", params![key])?;

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
