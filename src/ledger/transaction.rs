//! Defines the transaction model: the two transaction kinds, the string
//! identifiers assigned to ledger entries and the wire format shared with the
//! mobile client.

use std::fmt::{Display, Formatter};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Whether a transaction adds money to the balance or removes money from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money coming in. Increases the balance.
    Income,
    /// Money going out. Decreases the balance.
    Expense,
}

impl TransactionKind {
    /// The description used when a transaction is recorded without one.
    pub fn default_description(&self) -> &'static str {
        match self {
            TransactionKind::Income => "Income",
            TransactionKind::Expense => "Expense",
        }
    }

    /// Apply this kind's sign to `amount`: positive for income, negative for
    /// expenses.
    pub fn signed(&self, amount: Decimal) -> Decimal {
        match self {
            TransactionKind::Income => amount,
            TransactionKind::Expense => -amount,
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Income => write!(f, "income"),
            TransactionKind::Expense => write!(f, "expense"),
        }
    }
}

/// The identifier assigned to a transaction when it is recorded.
///
/// Identifiers are the decimal string form of a Unix timestamp in
/// milliseconds. They are treated as opaque strings everywhere except the
/// identifier generator, which parses them to stay ahead of the largest
/// identifier it has already issued.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(String);

impl TransactionId {
    /// Create a transaction ID from an existing string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Create a transaction ID from a Unix timestamp in milliseconds.
    pub fn from_millis(millis: u64) -> Self {
        Self(millis.to_string())
    }

    /// The ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The ID parsed back into a Unix timestamp in milliseconds, or `None`
    /// for IDs that did not come from the millisecond clock.
    pub fn as_millis(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl Display for TransactionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The current Unix time in whole milliseconds.
pub(crate) fn unix_time_millis() -> u64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as u64
}

/// An entry in the ledger.
///
/// The serialized form matches the snapshot JSON stored under the ledger key:
/// the kind appears as `"type"`, amounts are JSON numbers and dates are
/// RFC 3339 strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Uniquely identifies the transaction within the ledger.
    pub id: TransactionId,
    /// Whether this entry is income or an expense.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// The amount of money that changed hands. Always positive, the sign is
    /// carried by `kind`.
    pub amount: Decimal,
    /// A short, human readable label for the transaction.
    pub description: String,
    /// When the transaction was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
}

// ============================================================================
// TESTS
// ============================================================================



#[cfg(test)]
mod transaction_tests {
    use time::macros::datetime;

    use super::{Transaction, TransactionId, TransactionKind};

    #[test]
    fn serializes_to_snapshot_wire_format() {
        let transaction = Transaction {
            id: TransactionId::from_millis(1_755_000_000_123),
            kind: TransactionKind::Income,
            amount: "100.25".parse().unwrap(),
            description: "Paycheck".to_owned(),
            date: datetime!(2026-08-23 12:34:56.789 UTC),
        };

        let got = serde_json::to_value(&transaction).unwrap();

        assert_eq!(got["id"], serde_json::json!("1755000000123"));
        assert_eq!(got["type"], serde_json::json!("income"));
        assert_eq!(got["amount"], serde_json::json!(100.25));
        assert_eq!(got["description"], serde_json::json!("Paycheck"));
        assert_eq!(got["date"], serde_json::json!("2026-08-23T12:34:56.789Z"));
    }

    #[test]
    fn deserializes_from_snapshot_wire_format() {
        let json = r#"{
            "id": "1755000000123",
            "type": "expense",
            "amount": 30.5,
            "description": "Groceries",
            "date": "2026-08-23T12:34:56.789Z"
        }"#;

        let got: Transaction = serde_json::from_str(json).unwrap();

        assert_eq!(got.id, TransactionId::from_millis(1_755_000_000_123));
        assert_eq!(got.kind, TransactionKind::Expense);
        assert_eq!(got.amount, "30.5".parse().unwrap());
        assert_eq!(got.description, "Groceries");
        assert_eq!(got.date, datetime!(2026-08-23 12:34:56.789 UTC));
    }
}
