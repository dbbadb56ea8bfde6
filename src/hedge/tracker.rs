//! Hedge-status accuracy tracking.
//!
//! Every emitted status can be recorded against the subject it described,
//! so classifications can later be compared with how the bet actually
//! settled. The engine only defines the sink seam; calibration analysis
//! lives with whoever owns the stored records.

use chrono::Utc;
use tracing::debug;

use crate::models::{HedgeRecord, HedgeStatus};

/// Destination for emitted hedge statuses.
pub trait StatusSink {
    fn record(&mut self, record: HedgeRecord);
}

/// Timestamp a status and push it into the sink.
pub fn observe(sink: &mut dyn StatusSink, subject_id: &str, status: HedgeStatus) {
    debug!(subject_id, status = %status, "Recording hedge status");
    sink.record(HedgeRecord {
        timestamp: Utc::now(),
        subject_id: subject_id.to_string(),
        status,
    });
}

/// In-memory sink, insertion-ordered.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Vec<HedgeRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[HedgeRecord] {
        &self.records
    }
}

impl StatusSink for MemorySink {
    fn record(&mut self, record: HedgeRecord) {
        self.records.push(record);
    }
}
