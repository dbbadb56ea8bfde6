//! Weakest-leg commentary.
//!
//! Cosmetic output: the 1-3 lowest-probability legs on the slip get a
//! templated one-liner. The template choice is the only randomness in the
//! whole engine, so the RNG is injected: production passes `thread_rng()`,
//! tests pass a seeded `StdRng`. Consumers must not parse this text.

use rand::Rng;

use crate::models::{Highlight, Leg, LegRisk};

/// Most legs flagged per slip.
const MAX_HIGHLIGHTS: usize = 3;

const EXTREME_TEMPLATES: &[&str] = &[
    "{desc} ({odds}) is carrying this slip straight to the shredder",
    "{desc} at {odds} is a prayer, not a pick",
    "the book says thank you for {desc} ({odds})",
];

const HIGH_TEMPLATES: &[&str] = &[
    "{desc} ({odds}) is the leg you'll be sweating in the fourth quarter",
    "{desc} at {odds} needs everything to break right",
    "keep an eye on {desc} ({odds}), it's the soft spot here",
];

const STANDARD_TEMPLATES: &[&str] = &[
    "{desc} ({odds}) is the weakest link on an otherwise sane slip",
    "{desc} at {odds} is fine alone, shakier stacked with the rest",
];

/// Indices of the weakest legs, ascending by implied probability.
/// Ties keep slip order.
pub fn weakest_indices(legs: &[Leg]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..legs.len()).collect();
    order.sort_by(|&a, &b| {
        legs[a]
            .implied_probability
            .partial_cmp(&legs[b].implied_probability)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    order.truncate(MAX_HIGHLIGHTS.min(legs.len()));
    order
}

/// Generate commentary for the weakest legs.
pub fn generate<R: Rng>(legs: &[Leg], rng: &mut R) -> Vec<Highlight> {
    weakest_indices(legs)
        .into_iter()
        .map(|idx| {
            let leg = &legs[idx];
            let templates = match leg.risk_level {
                LegRisk::Extreme => EXTREME_TEMPLATES,
                LegRisk::High => HIGH_TEMPLATES,
                LegRisk::Medium | LegRisk::Low => STANDARD_TEMPLATES,
            };
            let template = templates[rng.gen_range(0..templates.len())];
            Highlight {
                leg_index: idx,
                text: render(template, leg),
            }
        })
        .collect()
}

fn render(template: &str, leg: &Leg) -> String {
    let odds = if leg.american_odds > 0 {
        format!("+{}", leg.american_odds)
    } else {
        leg.american_odds.to_string()
    };
    template
        .replace("{desc}", &leg.description)
        .replace("{odds}", &odds)
}
