#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Verification engine and dispatch pipeline
//!
//! Per file: read the stored attribute, compute the actual one, classify
//! the difference, and decide whether to re-tag. Across files: a bounded
//! worker pipeline that aggregates outcomes into run statistics.
//!
//! Detection boundary: a digest mismatch is only flagged as corruption
//! when the stored timestamp still matches - content that changed without
//! its timestamp changing is the anomaly bitrot detection exists for. A
//! mismatch accompanied by a timestamp change is indistinguishable from a
//! legitimate edit and classifies as outdated, which also means an
//! adversary who rewrites content and timestamp together evades
//! detection. This tool does not defend against that.

pub mod engine;
pub mod pipeline;
pub mod report;

pub use engine::Verifier;
pub use pipeline::{Pipeline, ReportSender};
pub use report::FileReport;

use rottag_attrs::Layout;

/// Read-only configuration for one verification run.
///
/// Parsed and owned by the CLI layer; the engine only consults it.
#[derive(Debug, Clone, Default)]
pub struct VerifyOptions {
    /// Remove stored attributes instead of verifying.
    pub remove: bool,
    /// Suppress all writes and removals, still reporting success.
    pub dry_run: bool,
    /// Overwrite the stored digest even on corrupt files.
    pub fix: bool,
    /// Migrate legacy entries to the combined encoding.
    pub migrate: bool,
    /// Read and write the legacy two-entry text encoding.
    pub plaintext: bool,
    /// Worker count; 0 or 1 verifies strictly in input order.
    pub jobs: usize,
}

impl VerifyOptions {
    /// Whether legacy entries should be read at all.
    #[must_use]
    pub fn legacy_compat(&self) -> bool {
        self.migrate || self.plaintext
    }

    /// The encoding writes should produce.
    #[must_use]
    pub fn layout(&self) -> Layout {
        if self.plaintext {
            Layout::Legacy
        } else {
            Layout::Combined
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_compat_modes() {
        assert!(!VerifyOptions::default().legacy_compat());
        assert!(VerifyOptions {
            migrate: true,
            ..Default::default()
        }
        .legacy_compat());
        assert!(VerifyOptions {
            plaintext: true,
            ..Default::default()
        }
        .legacy_compat());
    }

    #[test]
    fn test_layout_follows_plaintext() {
        assert_eq!(VerifyOptions::default().layout(), Layout::Combined);
        assert_eq!(
            VerifyOptions {
                plaintext: true,
                ..Default::default()
            }
            .layout(),
            Layout::Legacy
        );
    }
}
