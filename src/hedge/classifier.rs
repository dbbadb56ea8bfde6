//! Live hedge-status classifier.
//!
//! Memoryless: each call is a fresh function of the current snapshot, with
//! no previous-state input. Borderline buffers can therefore flicker
//! between adjacent bands across ticks; if a caller wants hysteresis it
//! must thread the previous status through on its own.
//!
//! Evaluation is an ordered cascade; the first matching rule wins:
//! 1. settled check (stat already over the line)
//! 2. favorable line movement / middle opportunity
//! 3. hard risk-flag overrides
//! 4. pace-adjusted OVER caution
//! 5. progress-aware buffer banding
//!
//! `None` means "classification not applicable" and is a normal outcome:
//! the game is not in a live phase, or the snapshot carries neither a
//! current value nor a projection. Callers suppress the status display.

use tracing::debug;

use crate::models::{GameStatus, HedgeStatus, LiveSnapshot, RiskFlag, Side};

/// Minimum absolute book movement before rule 2 considers a middle.
const MOVEMENT_MIN: f64 = 2.0;
/// Minimum favorable divergence of the live book line from the bet line.
const DIVERGENCE_MIN: f64 = 1.5;

/// Classify a live snapshot into a hedge action, or `None` when not
/// applicable. Applicability is the strict variant: the game must be live
/// or at halftime (scheduled and final games are suppressed).
pub fn classify(snap: &LiveSnapshot) -> Option<HedgeStatus> {
    if !matches!(snap.game_status, GameStatus::Live | GameStatus::Halftime) {
        return None;
    }
    if snap.current_value.is_none() && snap.projected_final.is_none() {
        return None;
    }

    let status = cascade(snap);
    debug!(
        side = %snap.side,
        line = snap.line,
        progress = snap.game_progress,
        status = %status,
        "Hedge snapshot classified"
    );
    Some(status)
}

fn cascade(snap: &LiveSnapshot) -> HedgeStatus {
    // Rule 1: the stat already cleared the line. An OVER is settled money;
    // an UNDER is dead and any hedge value decays by the minute.
    if let Some(current) = snap.current_value {
        if current >= snap.line {
            return match snap.side {
                Side::Over => HedgeStatus::ProfitLock,
                Side::Under => HedgeStatus::Urgent,
            };
        }
    }

    // Rule 2: the live book has moved through the bet far enough to
    // middle. Lock the profit regardless of the projection.
    if let (Some(movement), Some(book_line)) = (snap.line_movement, snap.live_book_line) {
        if movement.abs() >= MOVEMENT_MIN {
            let favorable = match snap.side {
                Side::Over => book_line - snap.line,
                Side::Under => snap.line - book_line,
            };
            if favorable >= DIVERGENCE_MIN {
                return HedgeStatus::ProfitLock;
            }
        }
    }

    // Rule 3: hard overrides. A late blowout, or a blowout with foul
    // trouble at any point, invalidates the projection entirely.
    let blowout = snap.has_flag(RiskFlag::Blowout);
    if blowout && (snap.game_progress > 60.0 || snap.has_flag(RiskFlag::FoulTrouble)) {
        return HedgeStatus::Urgent;
    }

    // Rule 4: slow-pace caution for OVERs sitting on a thin buffer.
    if snap.side == Side::Over && snap.pace_rating < 95.0 {
        if let Some(projected) = snap.projected_final {
            if projected - snap.line < 2.0 {
                if snap.confidence < 45.0 {
                    return HedgeStatus::Urgent;
                }
                if snap.confidence < 55.0 {
                    return HedgeStatus::Alert;
                }
            }
        }
    }

    // Rule 5: default banding. The buffer is the direction-adjusted margin
    // between projection and line; thresholds tighten as the game runs out
    // of clock. Falls back to the raw current value when no projection is
    // supplied (the absence guard ensured one of the two exists).
    let projection = match snap.projected_final.or(snap.current_value) {
        Some(v) => v,
        None => return HedgeStatus::Urgent, // unreachable past the guard
    };
    let buffer = match snap.side {
        Side::Over => projection - snap.line,
        Side::Under => snap.line - projection,
    };

    let (on_track, monitor, alert) = progress_bands(snap.game_progress);
    if buffer >= on_track {
        HedgeStatus::OnTrack
    } else if buffer >= monitor {
        HedgeStatus::Monitor
    } else if buffer >= alert {
        HedgeStatus::Alert
    } else {
        HedgeStatus::Urgent
    }
}

/// Buffer thresholds (on_track / monitor / alert) per game phase.
fn progress_bands(progress: f64) -> (f64, f64, f64) {
    if progress < 25.0 {
        (4.0, 1.0, -2.0)
    } else if progress < 50.0 {
        (3.0, 0.5, -1.5)
    } else if progress < 75.0 {
        (2.0, 0.0, -1.0)
    } else {
        (1.5, -0.5, -1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_over() -> LiveSnapshot {
        LiveSnapshot {
            current_value: Some(12.0),
            projected_final: Some(26.0),
            line: 24.5,
            side: Side::Over,
            game_progress: 40.0,
            pace_rating: 100.0,
            confidence: 70.0,
            risk_flags: Vec::new(),
            live_book_line: None,
            line_movement: None,
            game_status: GameStatus::Live,
        }
    }

    #[test]
    fn test_over_cleared_line_is_profit_lock() {
        // Rule 1 wins regardless of every other field.
        let mut s = base_over();
        s.current_value = Some(25.0);
        s.pace_rating = 80.0;
        s.confidence = 10.0;
        s.risk_flags = vec![RiskFlag::Blowout, RiskFlag::FoulTrouble];
        assert_eq!(classify(&s), Some(HedgeStatus::ProfitLock));
    }

    #[test]
    fn test_under_cleared_line_is_urgent() {
        let mut s = base_over();
        s.side = Side::Under;
        s.current_value = Some(24.5); // exactly at the line counts
        assert_eq!(classify(&s), Some(HedgeStatus::Urgent));
    }

    #[test]
    fn test_line_movement_middle_locks_profit() {
        // OVER 24.5, live book now 27.0 after a +2.5 move: middle window.
        let mut s = base_over();
        s.projected_final = Some(25.0);
        s.line_movement = Some(2.5);
        s.live_book_line = Some(27.0);
        assert_eq!(classify(&s), Some(HedgeStatus::ProfitLock));
    }

    #[test]
    fn test_line_movement_against_bettor_is_not_a_middle() {
        // Big move, but the book line fell below the bet line: no lock.
        let mut s = base_over();
        s.line_movement = Some(-2.5);
        s.live_book_line = Some(22.0);
        // Falls through to banding: buffer 1.5 at 40% => Monitor band.
        assert_eq!(classify(&s), Some(HedgeStatus::Monitor));
    }

    #[test]
    fn test_late_blowout_is_urgent() {
        let mut s = base_over();
        s.game_progress = 65.0;
        s.risk_flags = vec![RiskFlag::Blowout];
        assert_eq!(classify(&s), Some(HedgeStatus::Urgent));
    }

    #[test]
    fn test_early_blowout_alone_falls_through() {
        // Blowout before 60% without foul trouble does not override.
        let mut s = base_over();
        s.game_progress = 40.0;
        s.risk_flags = vec![RiskFlag::Blowout];
        // buffer = 26.0 - 24.5 = 1.5; mid band (0.5/3.0) => Monitor.
        assert_eq!(classify(&s), Some(HedgeStatus::Monitor));
    }

    #[test]
    fn test_blowout_plus_foul_trouble_any_time() {
        let mut s = base_over();
        s.game_progress = 20.0;
        s.risk_flags = vec![RiskFlag::Blowout, RiskFlag::FoulTrouble];
        assert_eq!(classify(&s), Some(HedgeStatus::Urgent));
    }

    #[test]
    fn test_slow_pace_thin_buffer_downgrades_by_confidence() {
        let mut s = base_over();
        s.pace_rating = 90.0;
        s.projected_final = Some(25.5); // buffer 1.0 < 2.0
        s.confidence = 40.0;
        assert_eq!(classify(&s), Some(HedgeStatus::Urgent));
        s.confidence = 50.0;
        assert_eq!(classify(&s), Some(HedgeStatus::Alert));
        // Confident enough: fall through to banding (buffer 1.0 at 40% => Monitor).
        s.confidence = 60.0;
        assert_eq!(classify(&s), Some(HedgeStatus::Monitor));
    }

    #[test]
    fn test_pace_rule_ignores_unders() {
        let mut s = base_over();
        s.side = Side::Under;
        s.pace_rating = 90.0;
        s.confidence = 40.0;
        s.projected_final = Some(23.0); // UNDER buffer = 24.5 - 23.0 = 1.5
        // Mid band (0.5/3.0): Monitor, not the pace downgrade.
        assert_eq!(classify(&s), Some(HedgeStatus::Monitor));
    }

    #[test]
    fn test_thresholds_tighten_with_progress() {
        // Same 1.7 buffer: Monitor early (band 1..4), OnTrack late (>=1.5).
        let mut s = base_over();
        s.projected_final = Some(26.2); // buffer 1.7
        s.game_progress = 10.0;
        assert_eq!(classify(&s), Some(HedgeStatus::Monitor));
        s.game_progress = 90.0;
        assert_eq!(classify(&s), Some(HedgeStatus::OnTrack));
    }

    #[test]
    fn test_band_floor_is_urgent() {
        let mut s = base_over();
        s.projected_final = Some(20.0); // buffer -4.5, below every band
        assert_eq!(classify(&s), Some(HedgeStatus::Urgent));
    }

    #[test]
    fn test_not_applicable_when_scheduled_or_final() {
        let mut s = base_over();
        s.game_status = GameStatus::Scheduled;
        assert_eq!(classify(&s), None);
        s.game_status = GameStatus::Final;
        assert_eq!(classify(&s), None);
        s.game_status = GameStatus::Halftime;
        assert!(classify(&s).is_some());
    }

    #[test]
    fn test_not_applicable_without_any_value() {
        let mut s = base_over();
        s.current_value = None;
        s.projected_final = None;
        assert_eq!(classify(&s), None);
    }

    #[test]
    fn test_projection_fallback_to_current_value() {
        // No projection: banding uses the raw current value.
        let mut s = base_over();
        s.projected_final = None;
        s.current_value = Some(21.0); // buffer = 21.0 - 24.5 = -3.5
        assert_eq!(classify(&s), Some(HedgeStatus::Urgent));
    }
}
