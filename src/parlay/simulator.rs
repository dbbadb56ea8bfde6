//! Parlay simulation: combined probability, payout, expected value, and a
//! degenerate-level label.
//!
//! Legs are treated as independent here: the combined probability is the
//! raw product of leg implied probabilities with NO correlation discount.
//! This is what the slip itself implies, shown to the bettor as-is. The
//! parlay-Kelly sizer (`risk::kelly::parlay`) deliberately discounts the
//! same product before sizing; see DESIGN.md for the rationale.

use rand::Rng;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use tracing::debug;

use crate::models::{DegenerateLevel, Leg, LegRisk, ParlaySimulation};
use crate::odds;
use crate::parlay::highlights;

/// Build a leg from an extracted selection.
pub fn create_leg(description: &str, american_odds: i32) -> Leg {
    let implied = odds::clamp_probability(odds::american_to_implied(american_odds));
    Leg {
        description: description.to_string(),
        american_odds,
        implied_probability: implied,
        risk_level: LegRisk::from_probability(implied),
        outcome: None,
    }
}

/// Simulate a parlay slip.
///
/// When `provided_total_odds` is given (the book quoted a package price)
/// it is used directly; otherwise total odds are the product of leg
/// decimal odds, re-derived into American notation. The RNG only drives
/// commentary text; every numeric field is deterministic.
pub fn simulate<R: Rng>(
    legs: &[Leg],
    stake: Decimal,
    provided_total_odds: Option<i32>,
    rng: &mut R,
) -> ParlaySimulation {
    let raw_combined: f64 = legs
        .iter()
        .map(|l| odds::clamp_probability(l.implied_probability))
        .product();
    let combined_probability = odds::clamp_probability(raw_combined);

    let (total_decimal_odds, total_odds) = match provided_total_odds {
        Some(quoted) => (odds::american_to_decimal(quoted), quoted),
        None => {
            let product: f64 = legs
                .iter()
                .map(|l| odds::american_to_decimal(l.american_odds))
                .product();
            (product, odds::decimal_to_american(product))
        }
    };

    let potential_payout = (stake.max(Decimal::ZERO)
        * Decimal::from_f64(total_decimal_odds).unwrap_or(Decimal::ONE))
    .round_dp(2);

    let stake_f = stake.to_f64().unwrap_or(0.0).max(0.0);
    let profit = stake_f * (total_decimal_odds - 1.0);
    let expected_value =
        combined_probability * profit - (1.0 - combined_probability) * stake_f;

    let degenerate_level = DegenerateLevel::from_probability(combined_probability);

    debug!(
        legs = legs.len(),
        combined_probability,
        total_odds,
        %potential_payout,
        ?degenerate_level,
        "Simulated parlay"
    );

    ParlaySimulation {
        legs: legs.to_vec(),
        stake,
        total_odds,
        total_decimal_odds,
        potential_payout,
        combined_probability,
        expected_value,
        degenerate_level,
        highlights: highlights::generate(legs, rng),
    }
}
