//! Per-file verification outcomes

use serde::Serialize;

/// Classification of one file, produced exactly once per file per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Stored and actual attributes agree.
    Ok,
    /// Content changed while the timestamp did not - the defining signal
    /// of silent corruption.
    Corrupt,
    /// Timestamp and content both moved; an ordinary edit.
    Outdated,
    /// Content unchanged but the timestamp moved; re-tag without alarm.
    TimeChanged,
    /// No attribute was ever stored for this file.
    New,
    /// The file was modified while its digest was being computed.
    InProgress,
    /// Could not obtain a file handle.
    OpenFailed,
    /// Classification succeeded but persisting the attribute failed.
    WriteFailed,
    /// Any other read or stat failure.
    OtherFailed,
}

impl Outcome {
    /// Console tag used in the per-file report.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ok => "<ok>",
            Self::Corrupt => "<corrupt>",
            Self::Outdated => "<outdated>",
            Self::TimeChanged => "<timechange>",
            Self::New => "<new>",
            Self::InProgress => "<concurrent modification>",
            Self::OpenFailed => "<open failed>",
            Self::WriteFailed => "<write failed>",
            Self::OtherFailed => "<failed>",
        }
    }

    /// Operational errors, as opposed to classification results.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::OpenFailed | Self::WriteFailed | Self::OtherFailed
        )
    }
}
