//! Core data models for the wager risk engine.
//!
//! These types are the boundary between the engine and its collaborators:
//! an extraction service produces `Leg` records, a live-feed poller produces
//! `LiveSnapshot` records, and the presentation layer consumes the derived
//! result values. Every result type is produced fresh per call and never
//! mutated.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Legs
// =============================================================================

/// Risk bucket for a single leg, derived from its implied probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegRisk {
    Low,
    Medium,
    High,
    Extreme,
}

impl LegRisk {
    /// Bucket by implied probability: >=0.6 low, >=0.4 medium,
    /// >=0.25 high, else extreme.
    pub fn from_probability(p: f64) -> Self {
        if p >= 0.6 {
            Self::Low
        } else if p >= 0.4 {
            Self::Medium
        } else if p >= 0.25 {
            Self::High
        } else {
            Self::Extreme
        }
    }
}

/// Settlement outcome, attached by a settlement collaborator after the fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegOutcome {
    Won,
    Lost,
    Push,
}

/// A single selection in a multi-leg wager. Created once at extraction time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Leg {
    pub description: String,
    pub american_odds: i32,
    pub implied_probability: f64,
    pub risk_level: LegRisk,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<LegOutcome>,
}

// =============================================================================
// Bankroll / Kelly
// =============================================================================

/// Caller-supplied bankroll settings for a single sizing calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankrollConfig {
    /// Total bankroll in dollars. Must be positive.
    pub bankroll: Decimal,
    /// Fractional-Kelly multiplier in (0, 1].
    pub kelly_multiplier: f64,
    /// Hard cap on any single bet as a fraction of bankroll, in (0, 0.25].
    pub max_bet_percent: f64,
}

/// Risk tier for an adjusted Kelly fraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Conservative,
    Moderate,
    Aggressive,
    Reckless,
}

impl RiskTier {
    /// Tier by adjusted Kelly fraction: <=0.02 conservative, <=0.04 moderate,
    /// <=0.08 aggressive, else reckless.
    pub fn from_fraction(adjusted: f64) -> Self {
        if adjusted <= 0.02 {
            Self::Conservative
        } else if adjusted <= 0.04 {
            Self::Moderate
        } else if adjusted <= 0.08 {
            Self::Aggressive
        } else {
            Self::Reckless
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conservative => write!(f, "conservative"),
            Self::Moderate => write!(f, "moderate"),
            Self::Aggressive => write!(f, "aggressive"),
            Self::Reckless => write!(f, "reckless"),
        }
    }
}

/// Result of a Kelly sizing calculation. Warnings are advisory, never
/// blocking; several can fire on the same input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KellyResult {
    pub full_kelly_fraction: f64,
    pub adjusted_kelly_fraction: f64,
    pub recommended_stake: Decimal,
    pub expected_value: f64,
    pub edge_percent: f64,
    pub risk_tier: RiskTier,
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// Two-outcome variance profile for a single bet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarianceReport {
    pub expected_value: f64,
    pub variance: f64,
    pub std_dev: f64,
    pub sharpe: f64,
    /// 95% confidence band around the expected value.
    pub band_low: f64,
    pub band_high: f64,
    /// Single-bet risk-of-ruin approximation in percent, capped at 100.
    pub risk_of_ruin_pct: f64,
}

/// Behavioral risk warning from the tilt heuristics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TiltWarning {
    pub reason: String,
    pub action: String,
    /// Severity score in [0, 100]; higher means more urgent.
    pub impact: u8,
}

/// Verdict for a user stake compared against the Kelly recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StakeVerdict {
    UnderBetting,
    Optimal,
    OverBetting,
    SignificantlyOver,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakeComparison {
    /// Percent difference of the user stake vs. the recommendation.
    pub pct_difference: f64,
    pub verdict: StakeVerdict,
    pub advice: &'static str,
}

// =============================================================================
// Parlay simulation
// =============================================================================

/// Risk-tier label for a parlay's combined win probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DegenerateLevel {
    Respectable,
    NotTerrible,
    SweatSeason,
    LotteryTicket,
    LoanNeeded,
}

impl DegenerateLevel {
    /// Fixed lookup by combined probability: >=30% respectable,
    /// >=15% not terrible, >=5% sweat season, >=2% lottery ticket,
    /// else loan needed.
    pub fn from_probability(p: f64) -> Self {
        if p >= 0.30 {
            Self::Respectable
        } else if p >= 0.15 {
            Self::NotTerrible
        } else if p >= 0.05 {
            Self::SweatSeason
        } else if p >= 0.02 {
            Self::LotteryTicket
        } else {
            Self::LoanNeeded
        }
    }
}

/// Commentary attached to one of the weakest legs. Cosmetic only; the text
/// varies by RNG, the index ordering does not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Highlight {
    pub leg_index: usize,
    pub text: String,
}

/// Derived, read-only simulation of a parlay slip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParlaySimulation {
    pub legs: Vec<Leg>,
    pub stake: Decimal,
    /// Total odds in American notation.
    pub total_odds: i32,
    pub total_decimal_odds: f64,
    pub potential_payout: Decimal,
    pub combined_probability: f64,
    pub expected_value: f64,
    pub degenerate_level: DegenerateLevel,
    pub highlights: Vec<Highlight>,
}

// =============================================================================
// Live snapshots / hedge status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Over,
    Under,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Over => write!(f, "OVER"),
            Self::Under => write!(f, "UNDER"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Scheduled,
    Live,
    Halftime,
    Final,
}

/// Qualitative flags supplied by the live feed. Only `Blowout` and
/// `FoulTrouble` drive classifier rules; the rest ride along for the
/// record shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFlag {
    Blowout,
    FoulTrouble,
    GarbageTime,
    InjuryWatch,
}

/// One refresh tick of a tracked live prop. Supplied by the live-feed
/// collaborator; never stored by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveSnapshot {
    #[serde(default)]
    pub current_value: Option<f64>,
    #[serde(default)]
    pub projected_final: Option<f64>,
    pub line: f64,
    pub side: Side,
    /// Game completion in [0, 100].
    pub game_progress: f64,
    pub pace_rating: f64,
    /// Model confidence in [0, 100].
    pub confidence: f64,
    #[serde(default)]
    pub risk_flags: Vec<RiskFlag>,
    #[serde(default)]
    pub live_book_line: Option<f64>,
    #[serde(default)]
    pub line_movement: Option<f64>,
    pub game_status: GameStatus,
}

impl LiveSnapshot {
    pub fn has_flag(&self, flag: RiskFlag) -> bool {
        self.risk_flags.contains(&flag)
    }
}

/// Discrete hedge action for a live position. Absence (a `None` from the
/// classifier) means "not applicable", not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HedgeStatus {
    ProfitLock,
    OnTrack,
    Monitor,
    Alert,
    Urgent,
}

impl fmt::Display for HedgeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProfitLock => write!(f, "profit_lock"),
            Self::OnTrack => write!(f, "on_track"),
            Self::Monitor => write!(f, "monitor"),
            Self::Alert => write!(f, "alert"),
            Self::Urgent => write!(f, "urgent"),
        }
    }
}

/// Record accepted by the accuracy-tracking sink for later calibration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HedgeRecord {
    pub timestamp: DateTime<Utc>,
    pub subject_id: String,
    pub status: HedgeStatus,
}
