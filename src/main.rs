//! Parlay Risk Engine
//!
//! Reads a bet-slip JSON file (first argument, or a built-in demo slip),
//! routes it through the extraction queue, then runs the full analysis
//! pipeline: parlay simulation, Kelly sizing, stake comparison, variance
//! profile, tilt heuristics, and live hedge classification for any
//! snapshots in the file. Output is a structured log report.

use std::sync::Arc;

use anyhow::Context;
use futures::future::BoxFuture;
use rand::thread_rng;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{error, info, warn};

use parlay_engine::config::Settings;
use parlay_engine::extract::errors::ExtractError;
use parlay_engine::extract::queue::{ExtractionQueue, SlipExtractor, SlipRequest};
use parlay_engine::hedge::classifier;
use parlay_engine::hedge::tracker::{self, MemorySink};
use parlay_engine::models::{Leg, LiveSnapshot};
use parlay_engine::parlay::simulator;
use parlay_engine::risk::{kelly, tilt, variance};

/// Slip file shape. Legs and snapshots are supplied by whatever produced
/// the file; the engine never fetches anything itself.
#[derive(Debug, Deserialize)]
struct SlipInput {
    stake: Decimal,
    #[serde(default)]
    total_odds: Option<i32>,
    legs: Vec<LegInput>,
    #[serde(default)]
    snapshots: Vec<SnapshotInput>,
    #[serde(default)]
    win_streak: u32,
    #[serde(default)]
    loss_streak: u32,
    #[serde(default)]
    peak_bankroll: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
struct LegInput {
    description: String,
    american_odds: i32,
}

#[derive(Debug, Deserialize)]
struct SnapshotInput {
    subject: String,
    #[serde(flatten)]
    snapshot: LiveSnapshot,
}

/// Extractor that parses slip JSON directly. Stands in for the remote
/// extraction service behind the same queue seam.
struct JsonSlipExtractor;

impl SlipExtractor for JsonSlipExtractor {
    fn extract(&self, request: &SlipRequest) -> BoxFuture<'_, Result<Vec<Leg>, ExtractError>> {
        let result = serde_json::from_str::<SlipInput>(&request.raw_text)
            .map(|slip| {
                slip.legs
                    .iter()
                    .map(|l| simulator::create_leg(&l.description, l.american_odds))
                    .collect()
            })
            .map_err(|e| ExtractError::Provider {
                code: "UNPARSEABLE".to_string(),
                message: e.to_string(),
            });
        Box::pin(async move { result })
    }
}

const DEMO_SLIP: &str = r#"{
    "stake": "10.00",
    "legs": [
        {"description": "LeBron over 25.5 points", "american_odds": -110},
        {"description": "Curry over 4.5 threes", "american_odds": -110},
        {"description": "Jokic over 11.5 rebounds", "american_odds": -110}
    ]
}"#;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration.
    let settings = Settings::from_env();

    // Initialize logging.
    init_logging(&settings);

    info!("=== Parlay Risk Engine ===");
    info!(
        bankroll = %settings.bankroll,
        kelly_multiplier = settings.kelly_multiplier,
        max_bet_percent = settings.max_bet_percent,
        "Configuration loaded"
    );

    // Validate settings.
    if let Err(errors) = settings.validate() {
        for e in &errors {
            error!(error = %e, "Configuration error");
        }
        anyhow::bail!("Configuration validation failed");
    }

    // Read the slip.
    let raw = match std::env::args().nth(1) {
        Some(path) => {
            info!(path = %path, "Reading slip file");
            std::fs::read_to_string(&path).with_context(|| format!("reading slip file {path}"))?
        }
        None => {
            info!("No slip file given, analyzing the built-in demo slip");
            DEMO_SLIP.to_string()
        }
    };
    let input: SlipInput = serde_json::from_str(&raw).context("parsing slip JSON")?;

    // =========================================================================
    // Extraction
    // =========================================================================
    let queue = ExtractionQueue::new(Arc::new(JsonSlipExtractor), settings.queue_config());
    let legs = queue
        .submit(SlipRequest::new(raw))
        .await
        .context("extraction task panicked")?
        .context("slip extraction failed")?;
    info!(legs = legs.len(), "Slip extracted");

    // =========================================================================
    // Simulation + sizing
    // =========================================================================
    let mut rng = thread_rng();
    let sim = simulator::simulate(&legs, input.stake, input.total_odds, &mut rng);
    info!(
        combined_probability = sim.combined_probability,
        total_odds = sim.total_odds,
        potential_payout = %sim.potential_payout,
        expected_value = sim.expected_value,
        degenerate_level = ?sim.degenerate_level,
        "Parlay simulated"
    );
    for h in &sim.highlights {
        info!(leg = h.leg_index, "{}", h.text);
    }

    let bankroll_config = settings.bankroll_config();
    let sizing = kelly::parlay(&legs, &bankroll_config, None);
    info!(
        recommended_stake = %sizing.recommended_stake,
        adjusted_fraction = sizing.adjusted_kelly_fraction,
        edge_percent = sizing.edge_percent,
        risk_tier = ?sizing.risk_tier,
        "Kelly sizing"
    );
    for w in &sizing.warnings {
        warn!(warning = %w, "Sizing advisory");
    }

    let comparison = kelly::compare_stake(input.stake, sizing.recommended_stake);
    info!(
        pct_difference = comparison.pct_difference,
        verdict = ?comparison.verdict,
        advice = comparison.advice,
        "Stake comparison"
    );

    let profile = variance::single_bet(
        sizing.recommended_stake,
        sim.combined_probability,
        sim.total_decimal_odds,
        sizing.adjusted_kelly_fraction,
    );
    info!(
        std_dev = profile.std_dev,
        band_low = profile.band_low,
        band_high = profile.band_high,
        risk_of_ruin_pct = profile.risk_of_ruin_pct,
        "Variance profile"
    );

    if let Some(tilt_warning) = tilt::analyze(
        input.win_streak,
        input.loss_streak,
        input.stake,
        settings.bankroll,
        input.peak_bankroll.unwrap_or(settings.bankroll),
    ) {
        warn!(
            reason = %tilt_warning.reason,
            action = %tilt_warning.action,
            impact = tilt_warning.impact,
            "Tilt warning"
        );
    }

    // =========================================================================
    // Live hedge statuses
    // =========================================================================
    let mut sink = MemorySink::new();
    for entry in &input.snapshots {
        match classifier::classify(&entry.snapshot) {
            Some(status) => {
                info!(subject = %entry.subject, status = %status, "Hedge status");
                tracker::observe(&mut sink, &entry.subject, status);
            }
            None => {
                info!(subject = %entry.subject, "Hedge status not applicable");
            }
        }
    }
    if !sink.records().is_empty() {
        info!(recorded = sink.records().len(), "Hedge statuses recorded");
    }

    info!("Analysis complete.");
    Ok(())
}

fn init_logging(settings: &Settings) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));

    if settings.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }
}
