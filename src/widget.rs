//! The widget projection of the ledger: the values mirrored to the platform
//! key-value store for home-screen widgets to read.

use rust_decimal::{Decimal, RoundingStrategy};

/// The values a widget needs to render, derived from the ledger state.
///
/// The percentage is the raw ratio of balance to goal and may be negative or
/// exceed 100. Widgets that draw a progress bar should display
/// [`WidgetSnapshot::clamped_percentage`] instead, so overspending and
/// overshooting stay visible in the stored value without breaking the bar.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetSnapshot {
    /// The ledger's running balance.
    pub balance: Decimal,
    /// The budget goal, if one is set.
    pub budget_goal: Option<Decimal>,
    /// The balance as a percentage of the goal, unclamped. `None` when no
    /// goal is set.
    pub percentage: Option<Decimal>,
}

impl WidgetSnapshot {
    /// Project `balance` and `budget_goal` into the widget values.
    pub fn new(balance: Decimal, budget_goal: Option<Decimal>) -> Self {
        let percentage = budget_goal
            .and_then(|goal| balance.checked_div(goal))
            .map(|ratio| ratio * Decimal::ONE_HUNDRED);

        Self {
            balance,
            budget_goal,
            percentage,
        }
    }

    /// The percentage clamped to the range a progress bar can draw.
    pub fn clamped_percentage(&self) -> Option<Decimal> {
        self.percentage
            .map(|percentage| percentage.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED))
    }
}

/// Format `amount` with exactly two fraction digits.
///
/// Negative amounts get a single leading minus sign, non-negative amounts get
/// no sign. This is the format widgets read from the mirrored balance key.
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    // Rounding can leave a negative zero, which must not render with a sign.
    if rounded.is_zero() {
        return "0.00".to_owned();
    }

    format!("{rounded:.2}")
}

// ============================================================================
// TESTS
// ============================================================================
