//! The transaction ledger: models for transactions, and the engine that
//! applies mutations while keeping the persisted snapshot and the widget
//! mirror in sync.

mod engine;
mod transaction;

pub use engine::{Ledger, LedgerEngine};
pub use transaction::{Transaction, TransactionId, TransactionKind};

pub(crate) use transaction::unix_time_millis;
