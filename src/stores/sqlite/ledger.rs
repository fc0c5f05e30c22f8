//! Implements a SQLite backed ledger store.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::{
    Error,
    ledger::Ledger,
    stores::{
        LedgerStore,
        sqlite::{BUDGET_GOAL_KEY, LEDGER_KEY, delete_value, get_value, set_value},
    },
};

/// Stores the ledger snapshot and budget goal in a SQLite key-value table.
///
/// The table must be set up with
/// [create_kv_table](crate::stores::sqlite::create_kv_table) before use.
#[derive(Debug, Clone)]
pub struct SqliteLedgerStore {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteLedgerStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl LedgerStore for SqliteLedgerStore {
    /// Serialize `ledger` as JSON and write it under the ledger key.
    ///
    /// The write is synchronous, so the snapshot is durable once this
    /// returns.
    ///
    /// # Errors
    /// Returns [Error::DatabaseLock] if the connection lock is poisoned, or
    /// [Error::SqlError] for SQL errors.
    fn save(&mut self, ledger: &Ledger) -> Result<(), Error> {
        let json = serde_json::to_string(ledger)?;
        let connection = self.connection.lock().map_err(|_| Error::DatabaseLock)?;

        set_value(&connection, LEDGER_KEY, &json)?;

        Ok(())
    }

    /// Read back the stored snapshot, `Ok(None)` when none has been saved.
    ///
    /// # Errors
    /// Returns [Error::SerializationError] if the stored JSON is malformed.
    /// The engine recovers that to an empty ledger rather than failing.
    fn load(&self) -> Result<Option<Ledger>, Error> {
        let connection = self.connection.lock().map_err(|_| Error::DatabaseLock)?;

        match get_value(&connection, LEDGER_KEY)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn save_budget_goal(&mut self, goal: Option<Decimal>) -> Result<(), Error> {
        let connection = self.connection.lock().map_err(|_| Error::DatabaseLock)?;

        match goal {
            Some(goal) => set_value(&connection, BUDGET_GOAL_KEY, &goal.to_string())?,
            None => delete_value(&connection, BUDGET_GOAL_KEY)?,
        }

        Ok(())
    }

    fn load_budget_goal(&self) -> Result<Option<Decimal>, Error> {
        let connection = self.connection.lock().map_err(|_| Error::DatabaseLock)?;

        match get_value(&connection, BUDGET_GOAL_KEY)? {
            Some(text) => text
                .parse()
                .map(Some)
                .map_err(|error: rust_decimal::Error| Error::SerializationError(error.to_string())),
            None => Ok(None),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod sqlite_ledger_store_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use time::macros::datetime;

    use crate::{
        Error,
        ledger::{Ledger, Transaction, TransactionId, TransactionKind},
        stores::{
            LedgerStore,
            sqlite::{LEDGER_KEY, create_kv_table, set_value},
        },
    };

    use super::SqliteLedgerStore;

    fn get_test_store() -> SqliteLedgerStore {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_kv_table(&connection).expect("Could not create kv table");

        SqliteLedgerStore::new(Arc::new(Mutex::new(connection)))
    }

    fn get_test_ledger() -> Ledger {
        Ledger {
            balance: "70.25".parse().unwrap(),
            transactions: vec![
                Transaction {
                    id: TransactionId::from_millis(1_755_000_000_124),
                    kind: TransactionKind::Expense,
                    amount: "30".parse().unwrap(),
                    description: "Groceries".to_owned(),
                    date: datetime!(2026-08-23 13:00:00 UTC),
                },
                Transaction {
                    id: TransactionId::from_millis(1_755_000_000_123),
                    kind: TransactionKind::Income,
                    amount: "100.25".parse().unwrap(),
                    description: "Paycheck".to_owned(),
                    date: datetime!(2026-08-23 12:00:00 UTC),
                },
            ],
        }
    }

    #[test]
    fn load_returns_none_before_the_first_save() {
        let store = get_test_store();

        let got = store.load().unwrap();

        assert_eq!(got, None);
    }

    #[test]
    fn save_then_load_round_trips_the_snapshot() {
        let mut store = get_test_store();
        let ledger = get_test_ledger();

        store.save(&ledger).unwrap();
        let got = store.load().unwrap();

        assert_eq!(got, Some(ledger));
    }

    #[test]
    fn save_replaces_the_previous_snapshot() {
        let mut store = get_test_store();
        store.save(&get_test_ledger()).unwrap();

        let empty = Ledger::default();
        store.save(&empty).unwrap();

        assert_eq!(store.load().unwrap(), Some(empty));
    }

    #[test]
    fn load_reports_malformed_json_as_an_error() {
        let store = get_test_store();
        {
            let connection = store.connection.lock().unwrap();
            set_value(&connection, LEDGER_KEY, "{not json").unwrap();
        }

        let got = store.load();

        assert!(
            matches!(got, Err(Error::SerializationError(_))),
            "want a serialization error, got {got:?}"
        );
    }

    #[test]
    fn budget_goal_round_trips() {
        let mut store = get_test_store();
        let goal: Decimal = "1500.50".parse().unwrap();

        store.save_budget_goal(Some(goal)).unwrap();

        assert_eq!(store.load_budget_goal().unwrap(), Some(goal));
    }

    #[test]
    fn clearing_the_budget_goal_removes_the_key() {
        let mut store = get_test_store();
        store
            .save_budget_goal(Some("1000".parse().unwrap()))
            .unwrap();

        store.save_budget_goal(None).unwrap();

        assert_eq!(store.load_budget_goal().unwrap(), None);
    }

    #[test]
    fn snapshots_survive_reopening_the_database_file() {
        let directory = tempfile::tempdir().expect("Could not create temp dir");
        let db_path = directory.path().join("ledger.sqlite");
        let ledger = get_test_ledger();

        {
            let connection = Connection::open(&db_path).expect("Could not open database");
            create_kv_table(&connection).expect("Could not create kv table");
            let mut store = SqliteLedgerStore::new(Arc::new(Mutex::new(connection)));
            store.save(&ledger).unwrap();
        }

        let connection = Connection::open(&db_path).expect("Could not reopen database");
        let store = SqliteLedgerStore::new(Arc::new(Mutex::new(connection)));

        assert_eq!(store.load().unwrap(), Some(ledger));
    }
}
