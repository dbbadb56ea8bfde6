//! Behavioral tilt heuristics.
//!
//! Three independent checks over streak and bankroll state: chasing losses,
//! overconfidence after a heater, and pressing while in drawdown. Each
//! carries a fixed impact score; when several fire at once the highest
//! impact wins, so the dominant signal is always the one surfaced.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::debug;

use crate::models::TiltWarning;

const IMPACT_LOSS_CHASING: u8 = 70;
const IMPACT_OVERCONFIDENCE: u8 = 55;
const IMPACT_DRAWDOWN_PRESSURE: u8 = 80;

/// Analyze a proposed stake for behavioral red flags.
///
/// Returns `None` when no heuristic fires or when the bankroll is
/// non-positive (there is no meaningful stake percentage to judge).
pub fn analyze(
    win_streak: u32,
    loss_streak: u32,
    proposed_stake: Decimal,
    bankroll: Decimal,
    peak_bankroll: Decimal,
) -> Option<TiltWarning> {
    if bankroll <= Decimal::ZERO {
        return None;
    }

    let stake_pct = (proposed_stake / bankroll).to_f64().unwrap_or(0.0);
    let mut candidates: Vec<TiltWarning> = Vec::new();

    // Chasing: escalating size after consecutive losses.
    if loss_streak >= 3 && stake_pct > 0.03 {
        candidates.push(TiltWarning {
            reason: format!(
                "{loss_streak} straight losses with a {:.1}% bankroll stake looks like chasing",
                stake_pct * 100.0
            ),
            action: "step down to your baseline unit until the streak breaks".to_string(),
            impact: IMPACT_LOSS_CHASING,
        });
    }

    // Overconfidence: oversizing on a heater.
    if win_streak >= 4 && stake_pct > 0.06 {
        candidates.push(TiltWarning {
            reason: format!(
                "{win_streak} straight wins with a {:.1}% bankroll stake suggests overconfidence",
                stake_pct * 100.0
            ),
            action: "hot streaks do not change the odds; keep your sizing flat".to_string(),
            impact: IMPACT_OVERCONFIDENCE,
        });
    }

    // Drawdown pressure: pressing while well below the high-water mark.
    if peak_bankroll > Decimal::ZERO {
        let drawdown = ((peak_bankroll - bankroll) / peak_bankroll)
            .to_f64()
            .unwrap_or(0.0);
        if drawdown > 0.20 && stake_pct > 0.04 {
            candidates.push(TiltWarning {
                reason: format!(
                    "{:.0}% below peak bankroll while staking {:.1}% per bet",
                    drawdown * 100.0,
                    stake_pct * 100.0
                ),
                action: "rebuild with smaller stakes; recovery bets deepen the hole".to_string(),
                impact: IMPACT_DRAWDOWN_PRESSURE,
            });
        }
    }

    let warning = candidates.into_iter().max_by_key(|w| w.impact);
    if let Some(ref w) = warning {
        debug!(impact = w.impact, reason = %w.reason, "Tilt heuristic fired");
    }
    warning
}
