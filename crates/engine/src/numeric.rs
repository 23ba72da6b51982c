//! Numeric helpers shared by the balance calculator and the settlement
//! optimizer.
//!
//! Balances are computed in `f64` major units (euros). Shares are never rounded
//! while aggregating; only emitted/displayed amounts go through [`round2`].

/// Currency precision floor.
///
/// Any balance or transfer whose magnitude is at most `EPSILON` is treated as
/// zero.
pub const EPSILON: f64 = 0.01;

/// Rounds to 2 decimal places, half away from zero.
#[must_use]
pub fn round2(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Returns `true` when `amount` is within [`EPSILON`] of zero.
#[must_use]
pub fn is_settled(amount: f64) -> bool {
    amount.abs() <= EPSILON
}
