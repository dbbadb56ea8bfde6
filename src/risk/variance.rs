//! Variance and risk-of-ruin estimates for a single wager.
//!
//! Two-outcome model: a win pays `stake * b`, a loss pays `-stake`. The
//! risk-of-ruin figure is the classical `(q/p)^(1/f)` approximation for a
//! bettor staking fraction `f` per bet. That approximation only frames a
//! single repeated bet at fixed size; it is NOT a multi-period ruin model
//! and should be read as a rough gauge, not an exact probability.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::models::VarianceReport;
use crate::odds;

/// Z-score for a 95% two-sided confidence band.
const Z_95: f64 = 1.96;

/// Build the variance profile for one bet.
///
/// `kelly_fraction` is the fraction of bankroll being staked; it drives
/// the risk-of-ruin exponent. Non-positive fractions report 100% ruin
/// exposure by convention (staking nothing repeatedly on a losing edge
/// never grows the bankroll).
pub fn single_bet(
    stake: Decimal,
    win_probability: f64,
    decimal_odds: f64,
    kelly_fraction: f64,
) -> VarianceReport {
    let p = odds::clamp_probability(win_probability);
    let q = 1.0 - p;
    let b = (decimal_odds - 1.0).max(0.0);
    let s = stake.to_f64().unwrap_or(0.0).max(0.0);

    let ev = p * s * b - q * s;

    // Var(X) = p*(win - ev)^2 + q*(loss - ev)^2
    let win = s * b;
    let loss = -s;
    let variance = p * (win - ev).powi(2) + q * (loss - ev).powi(2);
    let std_dev = variance.sqrt();

    let sharpe = if std_dev > 0.0 { ev / std_dev } else { 0.0 };

    let risk_of_ruin_pct = if kelly_fraction > 0.0 && p > 0.0 {
        ((q / p).powf(1.0 / kelly_fraction) * 100.0).min(100.0)
    } else {
        100.0
    };

    VarianceReport {
        expected_value: ev,
        variance,
        std_dev,
        sharpe,
        band_low: ev - Z_95 * std_dev,
        band_high: ev + Z_95 * std_dev,
        risk_of_ruin_pct,
    }
}
