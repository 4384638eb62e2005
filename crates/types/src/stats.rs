//! Aggregated statistics for one verification run

use crate::Outcome;
use serde::Serialize;

/// Counters for one run, one field per outcome kind plus totals.
///
/// Owned by the dispatch pipeline and mutated only by its single
/// statistics consumer, so no synchronization is needed. The CLI layer
/// folds in `not_regular` after the run and derives the exit status.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStats {
    pub total: u64,
    pub ok: u64,
    pub corrupt: u64,
    pub outdated: u64,
    pub time_changed: u64,
    pub new: u64,
    pub in_progress: u64,
    pub open_failed: u64,
    pub write_failed: u64,
    pub other_failed: u64,
    /// Arguments that were not regular files; counted by the CLI layer,
    /// not part of `total`.
    pub not_regular: u64,
}

impl RunStats {
    /// Record one per-file outcome.
    pub fn record(&mut self, outcome: Outcome) {
        self.total += 1;
        match outcome {
            Outcome::Ok => self.ok += 1,
            Outcome::Corrupt => self.corrupt += 1,
            Outcome::Outdated => self.outdated += 1,
            Outcome::TimeChanged => self.time_changed += 1,
            Outcome::New => self.new += 1,
            Outcome::InProgress => self.in_progress += 1,
            Outcome::OpenFailed => self.open_failed += 1,
            Outcome::WriteFailed => self.write_failed += 1,
            Outcome::OtherFailed => self.other_failed += 1,
        }
    }

    /// Total operational errors, including non-regular arguments.
    #[must_use]
    pub fn errors(&self) -> u64 {
        self.open_failed + self.write_failed + self.other_failed + self.not_regular
    }

    /// Whether every recorded outcome was benign (no corruption, no
    /// errors, no interrupted digests).
    #[must_use]
    pub fn all_benign(&self) -> bool {
        self.ok + self.outdated + self.time_changed + self.new == self.total
    }
}
