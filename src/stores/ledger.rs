//! Defines the ledger store trait.

use rust_decimal::Decimal;

use crate::{Error, ledger::Ledger};

/// Handles the persistence of the ledger snapshot and the budget goal.
///
/// Saves are synchronous: when a save method returns `Ok`, the data has been
/// handed to durable storage. The [engine](crate::LedgerEngine) relies on this
/// so a snapshot is never lost to an exiting process.
pub trait LedgerStore {
    /// Write the full ledger snapshot, replacing any previous one.
    fn save(&mut self, ledger: &Ledger) -> Result<(), Error>;

    /// Read back the most recently saved snapshot.
    ///
    /// Returns `Ok(None)` when no snapshot has been saved yet. Implementers
    /// should return an error for data that exists but cannot be read; the
    /// engine treats that the same as an absent snapshot.
    fn load(&self) -> Result<Option<Ledger>, Error>;

    /// Write the budget goal, or clear it when `goal` is `None`.
    fn save_budget_goal(&mut self, goal: Option<Decimal>) -> Result<(), Error>;

    /// Read back the budget goal, `Ok(None)` when no goal is set.
    fn load_budget_goal(&self) -> Result<Option<Decimal>, Error>;
}
