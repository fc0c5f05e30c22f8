//! The ledger state machine: a running balance, the ordered transaction
//! history behind it, and an optional budget goal.
//!
//! Every successful mutation runs a post-mutation hook that persists the
//! ledger snapshot and republishes the widget mirror, so the in-memory state,
//! the stored snapshot and the widget keys stay in agreement. Failures in the
//! hook are logged and swallowed: the ledger itself is the source of truth
//! and must keep working when persistence or publication misbehaves.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    ledger::transaction::{Transaction, TransactionId, TransactionKind, unix_time_millis},
    stores::{LedgerStore, WidgetMirror},
    widget::WidgetSnapshot,
};

// ============================================================================
// MODELS
// ============================================================================

/// The persisted ledger state: the running balance and the transaction
/// history, newest first.
///
/// Both fields default when missing from a stored snapshot, so snapshots
/// written by older builds still load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    /// The running balance over all transactions.
    #[serde(default)]
    pub balance: Decimal,
    /// All recorded transactions, newest first.
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl Ledger {
    /// Sum the signed amounts of all transactions.
    ///
    /// The balance must always equal this total. [`LedgerEngine::hydrate`]
    /// recomputes the balance from it rather than trusting a stored value.
    pub fn signed_total(&self) -> Decimal {
        self.transactions
            .iter()
            .map(|transaction| transaction.kind.signed(transaction.amount))
            .sum()
    }
}

// ============================================================================
// ENGINE
// ============================================================================

/// Owns the ledger and applies mutations to it.
///
/// The engine is generic over its [`LedgerStore`] and [`WidgetMirror`] so the
/// mutation logic can be tested without a database.
#[derive(Debug)]
pub struct LedgerEngine<S, M>
where
    S: LedgerStore,
    M: WidgetMirror,
{
    ledger: Ledger,
    budget_goal: Option<Decimal>,
    last_issued_millis: u64,
    store: S,
    mirror: M,
}

impl<S, M> LedgerEngine<S, M>
where
    S: LedgerStore,
    M: WidgetMirror,
{
    /// Build an engine from whatever `store` currently holds.
    ///
    /// A missing or unreadable snapshot starts the ledger empty. The balance
    /// is always recomputed from the transaction history, so a stored balance
    /// that disagrees with its own transactions is corrected rather than
    /// propagated. The identifier generator is reseeded past the largest
    /// identifier already in the history.
    ///
    /// Hydrating rewrites the snapshot and republishes the widget keys so all
    /// three surfaces agree from startup.
    pub fn hydrate(store: S, mirror: M) -> Self {
        let ledger = match store.load() {
            Ok(Some(ledger)) => ledger,
            Ok(None) => Ledger::default(),
            Err(error) => {
                tracing::error!("could not load the ledger snapshot, starting empty: {error}");
                Ledger::default()
            }
        };

        let budget_goal = match store.load_budget_goal() {
            Ok(goal) => goal,
            Err(error) => {
                tracing::error!("could not load the budget goal: {error}");
                None
            }
        };

        let mut engine = Self {
            ledger,
            budget_goal,
            last_issued_millis: 0,
            store,
            mirror,
        };

        let total = engine.ledger.signed_total();
        if engine.ledger.balance != total {
            tracing::warn!(
                "the stored balance {} does not match the transaction total {}, using the total",
                engine.ledger.balance,
                total
            );
            engine.ledger.balance = total;
        }

        engine.last_issued_millis = engine
            .ledger
            .transactions
            .iter()
            .filter_map(|transaction| transaction.id.as_millis())
            .max()
            .unwrap_or(0);

        engine.run_post_mutation_hook();

        engine
    }

    /// Record a new transaction and return it.
    ///
    /// `amount` must be positive, the transaction kind carries the sign. An
    /// empty or missing description falls back to the kind's default. The new
    /// transaction is prepended so the history stays newest first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAmount`] if `amount` is zero or negative. The
    /// ledger is left untouched.
    pub fn add_transaction(
        &mut self,
        kind: TransactionKind,
        amount: Decimal,
        description: Option<&str>,
    ) -> Result<Transaction, Error> {
        if amount <= Decimal::ZERO {
            return Err(Error::InvalidAmount(amount));
        }

        let description = match description {
            Some(text) if !text.is_empty() => text.to_owned(),
            _ => kind.default_description().to_owned(),
        };

        let transaction = Transaction {
            id: self.next_id(),
            kind,
            amount,
            description,
            date: OffsetDateTime::now_utc(),
        };

        self.ledger.balance += kind.signed(amount);
        self.ledger.transactions.insert(0, transaction.clone());

        self.run_post_mutation_hook();

        Ok(transaction)
    }

    /// Remove the transaction with `id` and reverse its effect on the
    /// balance.
    ///
    /// Returns the removed transaction, or `None` when no transaction has
    /// that identifier. A miss leaves the ledger untouched and does not run
    /// the post-mutation hook.
    pub fn delete_transaction(&mut self, id: &TransactionId) -> Option<Transaction> {
        let index = self
            .ledger
            .transactions
            .iter()
            .position(|transaction| &transaction.id == id)?;

        let transaction = self.ledger.transactions.remove(index);
        self.ledger.balance -= transaction.kind.signed(transaction.amount);

        self.run_post_mutation_hook();

        Some(transaction)
    }

    /// Set or clear the budget goal, then persist it and republish the
    /// widget keys.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAmount`] if the goal is zero or negative.
    pub fn set_budget_goal(&mut self, goal: Option<Decimal>) -> Result<(), Error> {
        if let Some(goal) = goal
            && goal <= Decimal::ZERO
        {
            return Err(Error::InvalidAmount(goal));
        }

        self.budget_goal = goal;

        if let Err(error) = self.store.save_budget_goal(goal) {
            tracing::error!("could not persist the budget goal: {error}");
        }

        self.publish_snapshot();

        Ok(())
    }

    /// The current balance.
    pub fn balance(&self) -> Decimal {
        self.ledger.balance
    }

    /// All recorded transactions, newest first.
    pub fn transactions(&self) -> &[Transaction] {
        &self.ledger.transactions
    }

    /// The budget goal, if one is set.
    pub fn budget_goal(&self) -> Option<Decimal> {
        self.budget_goal
    }

    /// The widget projection of the current state.
    pub fn snapshot(&self) -> WidgetSnapshot {
        WidgetSnapshot::new(self.ledger.balance, self.budget_goal)
    }

    /// Issue the next transaction identifier.
    ///
    /// Identifiers come from the millisecond clock but never repeat or go
    /// backwards, even when two transactions land within the same
    /// millisecond or the history already contains identifiers from the
    /// future.
    fn next_id(&mut self) -> TransactionId {
        self.last_issued_millis = unix_time_millis().max(self.last_issued_millis + 1);
        TransactionId::from_millis(self.last_issued_millis)
    }

    /// Persist the ledger snapshot and republish the widget keys.
    ///
    /// Failures are logged and swallowed so a broken store or mirror cannot
    /// block mutations.
    fn run_post_mutation_hook(&mut self) {
        if let Err(error) = self.store.save(&self.ledger) {
            tracing::error!("could not persist the ledger snapshot: {error}");
        }

        self.publish_snapshot();
    }

    fn publish_snapshot(&mut self) {
        let snapshot = WidgetSnapshot::new(self.ledger.balance, self.budget_goal);

        if let Err(error) = self.mirror.publish(&snapshot) {
            tracing::error!("could not publish the widget snapshot: {error}");
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod fakes {
    use std::sync::{Arc, Mutex};

    use rust_decimal::Decimal;

    use crate::{
        Error,
        ledger::engine::Ledger,
        stores::{LedgerStore, WidgetMirror},
        widget::WidgetSnapshot,
    };

    /// An in-memory [`LedgerStore`] that records every save.
    ///
    /// Clones share state so a test can keep a handle while the engine owns
    /// another.
    #[derive(Debug, Clone, Default)]
    pub struct RecordingStore {
        pub ledger: Arc<Mutex<Option<Ledger>>>,
        pub goal: Arc<Mutex<Option<Decimal>>>,
        pub save_count: Arc<Mutex<usize>>,
        pub fail_saves: bool,
        pub fail_loads: bool,
    }

    impl LedgerStore for RecordingStore {
        fn save(&mut self, ledger: &Ledger) -> Result<(), Error> {
            if self.fail_saves {
                return Err(Error::SerializationError("save failed".to_owned()));
            }

            *self.ledger.lock().unwrap() = Some(ledger.clone());
            *self.save_count.lock().unwrap() += 1;

            Ok(())
        }

        fn load(&self) -> Result<Option<Ledger>, Error> {
            if self.fail_loads {
                return Err(Error::SerializationError("load failed".to_owned()));
            }

            Ok(self.ledger.lock().unwrap().clone())
        }

        fn save_budget_goal(&mut self, goal: Option<Decimal>) -> Result<(), Error> {
            *self.goal.lock().unwrap() = goal;

            Ok(())
        }

        fn load_budget_goal(&self) -> Result<Option<Decimal>, Error> {
            Ok(*self.goal.lock().unwrap())
        }
    }

    /// An in-memory [`WidgetMirror`] that records every published snapshot.
    #[derive(Debug, Clone, Default)]
    pub struct RecordingMirror {
        pub published: Arc<Mutex<Vec<WidgetSnapshot>>>,
        pub fail_publishes: bool,
    }

    impl RecordingMirror {
        pub fn publish_count(&self) -> usize {
            self.published.lock().unwrap().len()
        }

        pub fn last_published(&self) -> Option<WidgetSnapshot> {
            self.published.lock().unwrap().last().cloned()
        }
    }

    impl WidgetMirror for RecordingMirror {
        fn publish(&mut self, snapshot: &WidgetSnapshot) -> Result<(), Error> {
            if self.fail_publishes {
                return Err(Error::SerializationError("publish failed".to_owned()));
            }

            self.published.lock().unwrap().push(snapshot.clone());

            Ok(())
        }
    }
}



#[cfg(test)]
mod budget_goal_tests {
    use rust_decimal::Decimal;

    use crate::{Error, TransactionKind};

    use super::{
        LedgerEngine,
        fakes::{RecordingMirror, RecordingStore},
    };

    fn amount(text: &str) -> Decimal {
        text.parse().unwrap()
    }

    #[test]
    fn setting_a_goal_persists_it_and_republishes_the_widget() {
        let store = RecordingStore::default();
        let mirror = RecordingMirror::default();
        let mut engine = LedgerEngine::hydrate(store.clone(), mirror.clone());
        engine
            .add_transaction(TransactionKind::Income, amount("250"), None)
            .unwrap();

        engine.set_budget_goal(Some(amount("1000"))).unwrap();

        assert_eq!(*store.goal.lock().unwrap(), Some(amount("1000")));

        let snapshot = mirror.last_published().expect("a snapshot should be published");
        assert_eq!(snapshot.budget_goal, Some(amount("1000")));
        assert_eq!(snapshot.percentage, Some(amount("25")));
    }

    #[test]
    fn clearing_the_goal_clears_the_stored_value() {
        let store = RecordingStore::default();
        let mut engine = LedgerEngine::hydrate(store.clone(), RecordingMirror::default());
        engine.set_budget_goal(Some(amount("500"))).unwrap();

        engine.set_budget_goal(None).unwrap();

        assert_eq!(engine.budget_goal(), None);
        assert_eq!(*store.goal.lock().unwrap(), None);
    }

    #[test]
    fn non_positive_goals_are_rejected() {
        let mut engine = LedgerEngine::hydrate(RecordingStore::default(), RecordingMirror::default());

        for text in ["0", "-100"] {
            let got = engine.set_budget_goal(Some(amount(text)));

            assert_eq!(got, Err(Error::InvalidAmount(amount(text))));
            assert_eq!(engine.budget_goal(), None);
        }
    }
}


#[cfg(test)]
mod post_mutation_hook_tests {
    use rust_decimal::Decimal;

    use crate::TransactionKind;

    use super::{
        LedgerEngine,
        fakes::{RecordingMirror, RecordingStore},
    };

    fn amount(text: &str) -> Decimal {
        text.parse().unwrap()
    }

    #[test]
    fn every_mutation_persists_and_publishes_exactly_once() {
        let store = RecordingStore::default();
        let mirror = RecordingMirror::default();
        let mut engine = LedgerEngine::hydrate(store.clone(), mirror.clone());

        // Hydrate runs the hook once on its own.
        assert_eq!(*store.save_count.lock().unwrap(), 1);
        assert_eq!(mirror.publish_count(), 1);

        let added = engine
            .add_transaction(TransactionKind::Income, amount("100"), None)
            .unwrap();
        assert_eq!(*store.save_count.lock().unwrap(), 2);
        assert_eq!(mirror.publish_count(), 2);

        engine.delete_transaction(&added.id);
        assert_eq!(*store.save_count.lock().unwrap(), 3);
        assert_eq!(mirror.publish_count(), 3);
    }

    #[test]
    fn the_persisted_snapshot_matches_the_engine_state() {
        let store = RecordingStore::default();
        let mut engine = LedgerEngine::hydrate(store.clone(), RecordingMirror::default());

        engine
            .add_transaction(TransactionKind::Expense, amount("19.99"), Some("Lunch"))
            .unwrap();

        let stored = store
            .ledger
            .lock()
            .unwrap()
            .clone()
            .expect("a snapshot should be stored");
        assert_eq!(stored.balance, engine.balance());
        assert_eq!(stored.transactions, engine.transactions());
    }

    #[test]
    fn the_published_snapshot_reflects_the_new_balance() {
        let mirror = RecordingMirror::default();
        let mut engine = LedgerEngine::hydrate(RecordingStore::default(), mirror.clone());

        engine
            .add_transaction(TransactionKind::Income, amount("1234.56"), None)
            .unwrap();

        let snapshot = mirror.last_published().expect("a snapshot should be published");
        assert_eq!(snapshot.balance, amount("1234.56"));
    }

    #[test]
    fn a_failing_store_does_not_block_the_mutation() {
        let store = RecordingStore {
            fail_saves: true,
            ..RecordingStore::default()
        };
        let mirror = RecordingMirror::default();
        let mut engine = LedgerEngine::hydrate(store, mirror.clone());

        let got = engine.add_transaction(TransactionKind::Income, amount("50"), None);

        assert!(got.is_ok(), "want the mutation to succeed, got {got:?}");
        assert_eq!(engine.balance(), amount("50"));
        assert_eq!(
            mirror.publish_count(),
            2,
            "the widget should still be published when the store fails"
        );
    }

    #[test]
    fn a_failing_mirror_does_not_block_the_mutation() {
        let store = RecordingStore::default();
        let mirror = RecordingMirror {
            fail_publishes: true,
            ..RecordingMirror::default()
        };
        let mut engine = LedgerEngine::hydrate(store.clone(), mirror);

        let got = engine.add_transaction(TransactionKind::Expense, amount("5"), None);

        assert!(got.is_ok(), "want the mutation to succeed, got {got:?}");
        assert_eq!(engine.balance(), amount("-5"));
        assert_eq!(
            *store.save_count.lock().unwrap(),
            2,
            "the snapshot should still be persisted when the mirror fails"
        );
    }
}
