//! Kelly Criterion stake sizing for fixed-odds wagers.
//!
//! With net odds `b = decimal_odds - 1`, win probability `p`, and
//! `q = 1 - p`, the full Kelly fraction is `(b*p - q) / b`.
//!
//! We apply:
//! - Fractional Kelly via the caller's `kelly_multiplier`
//! - Clamp to `[0, max_bet_percent]`
//!
//! Nothing here blocks a bet: invalid-looking edges produce a $0
//! recommendation and advisory warnings, and `validate_inputs` reports
//! every violation at once so the caller can surface them together.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use tracing::debug;

use crate::models::{BankrollConfig, KellyResult, Leg, RiskTier, StakeComparison, StakeVerdict};
use crate::odds;

/// Flat correlation discount applied to a parlay's combined probability.
/// Legs on the same slip (often the same game) are rarely independent.
pub const DEFAULT_CORRELATION_FACTOR: f64 = 0.85;

/// Parlay stakes are capped tighter than straight bets.
pub const PARLAY_STAKE_CAP: f64 = 0.03;

/// Validate sizing inputs, accumulating every violation instead of failing
/// fast. An empty vec means the inputs are valid.
pub fn validate_inputs(
    win_probability: f64,
    decimal_odds: f64,
    config: &BankrollConfig,
) -> Vec<String> {
    let mut violations = Vec::new();

    if win_probability <= 0.01 || win_probability >= 0.99 {
        violations.push(format!(
            "win probability must be within (0.01, 0.99), got {win_probability}"
        ));
    }
    if decimal_odds <= 1.0 {
        violations.push(format!(
            "decimal odds must be greater than 1, got {decimal_odds}"
        ));
    }
    if config.bankroll < Decimal::from(10) {
        violations.push(format!(
            "bankroll must be at least $10, got {}",
            config.bankroll
        ));
    }
    if config.kelly_multiplier <= 0.0 || config.kelly_multiplier > 1.0 {
        violations.push(format!(
            "kelly multiplier must be in (0, 1], got {}",
            config.kelly_multiplier
        ));
    }
    if config.max_bet_percent <= 0.0 || config.max_bet_percent > 0.25 {
        violations.push(format!(
            "max bet percent must be in (0, 0.25], got {}",
            config.max_bet_percent
        ));
    }

    violations
}

/// Calculate the Kelly-optimal stake for a single wager.
///
/// The win probability is clamped to `[0.01, 0.99]` before use. The
/// adjusted fraction is hard-capped at `max_bet_percent`, so the
/// recommended stake can never exceed that share of bankroll.
pub fn calculate(win_probability: f64, decimal_odds: f64, config: &BankrollConfig) -> KellyResult {
    let p = odds::clamp_probability(win_probability);
    let q = 1.0 - p;
    let b = decimal_odds - 1.0;

    // Degenerate odds (no profit on a win) mean there is nothing to size.
    let full_kelly = if b > 0.0 { (b * p - q) / b } else { -1.0 };

    let adjusted = (full_kelly * config.kelly_multiplier).clamp(0.0, config.max_bet_percent);

    let stake = (config.bankroll.max(Decimal::ZERO)
        * Decimal::from_f64(adjusted).unwrap_or(Decimal::ZERO))
    .round_dp(2);

    let stake_f = stake.to_f64().unwrap_or(0.0);
    let expected_value = p * stake_f * b.max(0.0) - q * stake_f;
    let edge_percent = (p * decimal_odds - 1.0) * 100.0;

    let mut warnings = Vec::new();
    if full_kelly <= 0.0 {
        warnings.push("no edge: the odds do not beat the win probability".to_string());
    }
    if full_kelly > 0.25 {
        warnings.push(format!(
            "dangerously aggressive: full Kelly is {:.1}% of bankroll",
            full_kelly * 100.0
        ));
    }
    if edge_percent < 2.0 {
        warnings.push(format!("thin edge: {edge_percent:.2}% leaves little margin for error"));
    }

    if !warnings.is_empty() {
        debug!(
            full_kelly,
            adjusted,
            edge_percent,
            warnings = warnings.len(),
            "Kelly sizing produced advisories"
        );
    }

    KellyResult {
        full_kelly_fraction: full_kelly,
        adjusted_kelly_fraction: adjusted,
        recommended_stake: stake,
        expected_value,
        edge_percent,
        risk_tier: RiskTier::from_fraction(adjusted),
        warnings,
    }
}

/// Kelly sizing for a whole parlay.
///
/// The combined probability is the product of leg probabilities times a
/// flat correlation discount (default 0.85); the combined decimal odds are
/// the product of leg decimal odds. The stake cap is tightened to 3%;
/// parlay variance punishes oversizing far harder than a straight bet.
///
/// Note the deliberate asymmetry with the simulator: the displayed
/// combined probability assumes independence, while sizing discounts it.
pub fn parlay(
    legs: &[Leg],
    config: &BankrollConfig,
    correlation_factor: Option<f64>,
) -> KellyResult {
    let correlation = correlation_factor.unwrap_or(DEFAULT_CORRELATION_FACTOR);

    let raw_combined: f64 = legs
        .iter()
        .map(|l| odds::clamp_probability(l.implied_probability))
        .product();
    let combined_p = odds::clamp_probability(raw_combined * correlation);

    let combined_odds: f64 = legs
        .iter()
        .map(|l| odds::american_to_decimal(l.american_odds))
        .product();

    let tightened = BankrollConfig {
        max_bet_percent: config.max_bet_percent.min(PARLAY_STAKE_CAP),
        ..config.clone()
    };

    debug!(
        legs = legs.len(),
        combined_p, combined_odds, correlation, "Sizing parlay"
    );

    calculate(combined_p, combined_odds, &tightened)
}

/// Compare a user's chosen stake against the Kelly recommendation.
///
/// Buckets by percent difference: under -20% under-betting, within +/-20%
/// optimal, up to +100% over-betting, beyond that significantly over. A
/// positive stake against a zero recommendation is always significantly
/// over; there is no right size for a bet that should not be placed.
pub fn compare_stake(user_stake: Decimal, recommended: Decimal) -> StakeComparison {
    if recommended <= Decimal::ZERO {
        return if user_stake <= Decimal::ZERO {
            StakeComparison {
                pct_difference: 0.0,
                verdict: StakeVerdict::Optimal,
                advice: "no stake against no recommendation, nothing to adjust",
            }
        } else {
            StakeComparison {
                pct_difference: 100.0,
                verdict: StakeVerdict::SignificantlyOver,
                advice: "the model recommends no bet here; any stake is oversized",
            }
        };
    }

    let pct = ((user_stake - recommended) / recommended)
        .to_f64()
        .unwrap_or(0.0)
        * 100.0;

    let (verdict, advice) = if pct < -20.0 {
        (
            StakeVerdict::UnderBetting,
            "under-betting: you are leaving expected growth on the table",
        )
    } else if pct <= 20.0 {
        (
            StakeVerdict::Optimal,
            "within the optimal band of the Kelly recommendation",
        )
    } else if pct <= 100.0 {
        (
            StakeVerdict::OverBetting,
            "over-betting: variance will outrun your edge at this size",
        )
    } else {
        (
            StakeVerdict::SignificantlyOver,
            "significantly over-betting: this size risks serious drawdown",
        )
    };

    StakeComparison {
        pct_difference: pct,
        verdict,
        advice,
    }
}
