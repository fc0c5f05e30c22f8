//! Defines the widget mirror trait.

use crate::{Error, widget::WidgetSnapshot};

/// Publishes the widget projection of the ledger to the shared storage slot
/// that the platform widget renderers read.
///
/// Publication is one-way: this crate only ever writes the slot, the native
/// widgets poll it on their own timer. There is no push, so a widget may lag
/// the ledger by up to one poll interval.
pub trait WidgetMirror {
    /// Write `snapshot` to the widget storage slot, replacing the previous
    /// values.
    fn publish(&mut self, snapshot: &WidgetSnapshot) -> Result<(), Error>;
}
