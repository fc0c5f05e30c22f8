//! Contains traits and implementations for objects that persist the ledger
//! snapshot and publish the widget mirror.

mod ledger;
mod widget;

pub mod sqlite;

pub use ledger::LedgerStore;
pub use widget::WidgetMirror;
