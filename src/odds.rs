//! Odds and probability conversion primitives.
//!
//! American odds are the signed-integer notation quoted by US sportsbooks
//! (`-110`, `+150`); decimal odds are the multiplicative payout factor
//! including stake; implied probability is the probability the quote
//! implies before any margin removal.
//!
//! Every probability that leaves this module is expected to pass through
//! [`clamp_probability`] before downstream division, so overconfident
//! inputs can never produce 0 or infinity.

/// Lower clamp bound for probabilities used in downstream math.
pub const PROB_FLOOR: f64 = 0.01;
/// Upper clamp bound for probabilities used in downstream math.
pub const PROB_CEIL: f64 = 0.99;

/// Convert American odds to decimal odds.
///
/// `+150` pays 1.5x profit, so decimal = 2.5; `-110` requires risking 110
/// to win 100, so decimal = 100/110 + 1.
pub fn american_to_decimal(odds: i32) -> f64 {
    if odds > 0 {
        odds as f64 / 100.0 + 1.0
    } else if odds < 0 {
        100.0 / odds.unsigned_abs() as f64 + 1.0
    } else {
        // Zero is degenerate in American notation; treat as even money.
        2.0
    }
}

/// Convert American odds to implied probability.
///
/// `odds == 0` is mathematically degenerate (no book quotes it). By
/// convention it maps to 0.5 (a pick'em) rather than being rejected, so
/// malformed extraction output degrades to "coin flip" instead of an error.
pub fn american_to_implied(odds: i32) -> f64 {
    if odds > 0 {
        100.0 / (odds as f64 + 100.0)
    } else if odds < 0 {
        let a = odds.unsigned_abs() as f64;
        a / (a + 100.0)
    } else {
        0.5
    }
}

/// Implied probability from decimal odds: `1 / decimal`.
///
/// Decimal odds at or below 1.0 cannot occur from a real quote; fall back
/// to the clamp ceiling instead of dividing toward infinity.
pub fn implied_probability(decimal_odds: f64) -> f64 {
    if decimal_odds <= 1.0 {
        return PROB_CEIL;
    }
    1.0 / decimal_odds
}

/// Re-derive American odds from decimal odds.
///
/// `decimal >= 2` is a positive quote (`(d - 1) * 100`), below that a
/// negative one (`-100 / (d - 1)`). Degenerate `d <= 1` maps to 0, the
/// same pick'em convention as [`american_to_implied`].
pub fn decimal_to_american(decimal_odds: f64) -> i32 {
    let b = decimal_odds - 1.0;
    if b <= 0.0 {
        return 0;
    }
    if decimal_odds >= 2.0 {
        (b * 100.0).round() as i32
    } else {
        (-100.0 / b).round() as i32
    }
}

/// Clamp a probability into `[0.01, 0.99]`.
pub fn clamp_probability(p: f64) -> f64 {
    p.clamp(PROB_FLOOR, PROB_CEIL)
}

/// Standard normal CDF via the Abramowitz & Stegun rational approximation
/// (formula 7.1.26), absolute error <= 1.5e-7.
pub fn normal_cdf(x: f64) -> f64 {
    let a1 = 0.254829592;
    let a2 = -0.284496736;
    let a3 = 1.421413741;
    let a4 = -1.453152027;
    let a5 = 1.061405429;
    let p = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let z = x.abs() / std::f64::consts::SQRT_2;

    let t = 1.0 / (1.0 + p * z);
    let y = 1.0 - (((((a5 * t + a4) * t) + a3) * t + a2) * t + a1) * t * (-z * z).exp();

    0.5 * (1.0 + sign * y)
}

/// Probability that a stat finishes over the line:
/// `P = 1 - CDF((line - projected) / sigma_rem)`, clamped.
///
/// `sigma_rem <= 0` means remaining uncertainty has collapsed (for example
/// the game is effectively decided); fall back to a binary 0.99 / 0.01 on
/// which side of the line the projection sits.
pub fn calc_p_over(projected: f64, line: f64, sigma_rem: f64) -> f64 {
    if sigma_rem <= 0.0 {
        return if projected >= line { PROB_CEIL } else { PROB_FLOOR };
    }
    let z = (line - projected) / sigma_rem;
    clamp_probability(1.0 - normal_cdf(z))
}

/// Edge score in probability points: `(p_over - implied) * 100`.
pub fn calc_edge_score(p_over: f64, implied: f64) -> f64 {
    (p_over - implied) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_money_agreement() {
        // +100 and -100 are both even money: implied 0.5, decimal 2.0.
        assert!((american_to_implied(100) - 0.5).abs() < 1e-12);
        assert!((american_to_implied(-100) - 0.5).abs() < 1e-12);
        assert!((american_to_decimal(100) - 2.0).abs() < 1e-12);
        assert!((american_to_decimal(-100) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_odd_symmetry_around_pickem() {
        // implied(+150) + implied(-150) straddles 0.5 symmetrically:
        // 100/250 = 0.4 and 150/250 = 0.6.
        let plus = american_to_implied(150);
        let minus = american_to_implied(-150);
        assert!((plus - 0.4).abs() < 1e-12);
        assert!((minus - 0.6).abs() < 1e-12);
        assert!((plus + minus - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_odds_convention() {
        // Degenerate zero maps to pick'em, not an error.
        assert_eq!(american_to_implied(0), 0.5);
        assert_eq!(american_to_decimal(0), 2.0);
    }

    #[test]
    fn test_implied_matches_reciprocal_of_decimal() {
        for odds in [-250, -110, -105, 105, 140, 320] {
            let via_american = american_to_implied(odds);
            let via_decimal = implied_probability(american_to_decimal(odds));
            assert!(
                (via_american - via_decimal).abs() < 1e-12,
                "odds {odds}: {via_american} vs {via_decimal}"
            );
        }
    }

    #[test]
    fn test_decimal_to_american_round_trip() {
        // decimal 2.5 => +150; decimal 1.909090... => -110
        assert_eq!(decimal_to_american(2.5), 150);
        assert_eq!(decimal_to_american(american_to_decimal(-110)), -110);
        assert_eq!(decimal_to_american(american_to_decimal(275)), 275);
        // Degenerate input maps to the pick'em convention.
        assert_eq!(decimal_to_american(1.0), 0);
    }

    #[test]
    fn test_implied_probability_guard() {
        assert_eq!(implied_probability(0.0), PROB_CEIL);
        assert_eq!(implied_probability(1.0), PROB_CEIL);
        assert!((implied_probability(4.0) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_normal_cdf_at_zero() {
        assert!((normal_cdf(0.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_normal_cdf_monotone() {
        let mut prev = 0.0;
        let mut x = -6.0;
        while x <= 6.0 {
            let v = normal_cdf(x);
            assert!(v >= prev, "cdf must be non-decreasing at x={x}");
            prev = v;
            x += 0.05;
        }
    }

    #[test]
    fn test_normal_cdf_known_values() {
        // Phi(1.0) = 0.8413447, Phi(-1.96) = 0.0249979
        assert!((normal_cdf(1.0) - 0.8413447).abs() < 1e-6);
        assert!((normal_cdf(-1.96) - 0.0249979).abs() < 1e-6);
    }

    #[test]
    fn test_p_over_at_line_is_half() {
        let p = calc_p_over(24.0, 24.0, 3.0);
        assert!((p - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_p_over_collapsed_sigma() {
        // Uncertainty collapsed: binary fallback on projection vs line.
        assert_eq!(calc_p_over(25.0, 24.5, 0.0), PROB_CEIL);
        assert_eq!(calc_p_over(20.0, 24.5, -1.0), PROB_FLOOR);
        assert_eq!(calc_p_over(24.5, 24.5, 0.0), PROB_CEIL);
    }

    #[test]
    fn test_p_over_clamped() {
        // A projection miles above the line still caps at 0.99.
        assert_eq!(calc_p_over(100.0, 10.0, 1.0), PROB_CEIL);
        assert_eq!(calc_p_over(10.0, 100.0, 1.0), PROB_FLOOR);
    }

    #[test]
    fn test_edge_score() {
        let edge = calc_edge_score(0.58, 0.5238095238095238);
        assert!((edge - 5.619047619047619).abs() < 1e-9);
        assert!(calc_edge_score(0.40, 0.52) < 0.0);
    }

    #[test]
    fn test_clamp_probability() {
        assert_eq!(clamp_probability(0.0), PROB_FLOOR);
        assert_eq!(clamp_probability(1.0), PROB_CEIL);
        assert_eq!(clamp_probability(0.5), 0.5);
    }
}
