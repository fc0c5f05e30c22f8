//! Implements a SQLite backed widget mirror.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{
    Error,
    stores::{
        WidgetMirror,
        sqlite::{
            WIDGET_BALANCE_KEY, WIDGET_GOAL_KEY, WIDGET_PERCENTAGE_KEY, delete_value, set_value,
        },
    },
    widget::{WidgetSnapshot, format_amount},
};

/// Publishes the widget snapshot to the SQLite key-value table.
///
/// The balance is written as a formatted two-decimal string, since that is
/// what the widget renderers display verbatim. The goal and percentage keys
/// are only present while a goal is set; clearing the goal deletes them so a
/// widget can never render a stale goal.
#[derive(Debug, Clone)]
pub struct SqliteWidgetMirror {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteWidgetMirror {
    /// Create a new mirror for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl WidgetMirror for SqliteWidgetMirror {
    /// Write the formatted balance, and the goal and raw percentage when a
    /// goal is set.
    ///
    /// # Errors
    /// Returns [Error::DatabaseLock] if the connection lock is poisoned, or
    /// [Error::SqlError] for SQL errors.
    fn publish(&mut self, snapshot: &WidgetSnapshot) -> Result<(), Error> {
        let connection = self.connection.lock().map_err(|_| Error::DatabaseLock)?;

        set_value(
            &connection,
            WIDGET_BALANCE_KEY,
            &format_amount(snapshot.balance),
        )?;

        match (snapshot.budget_goal, snapshot.percentage) {
            (Some(goal), Some(percentage)) => {
                set_value(&connection, WIDGET_GOAL_KEY, &goal.to_string())?;
                set_value(&connection, WIDGET_PERCENTAGE_KEY, &percentage.to_string())?;
            }
            _ => {
                delete_value(&connection, WIDGET_GOAL_KEY)?;
                delete_value(&connection, WIDGET_PERCENTAGE_KEY)?;
            }
        }

        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
