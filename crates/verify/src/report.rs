//! Per-file outcome reports consumed by the CLI layer

use rottag_attrs::StoredAttr;
use rottag_hash::ActualAttr;
use rottag_types::Outcome;
use std::path::{Path, PathBuf};

/// One file's classification plus the attributes behind it.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: Outcome,
    /// Remove-mode successfully cleared this file's attributes.
    pub removed: bool,
    pub stored: Option<StoredAttr>,
    pub actual: Option<ActualAttr>,
}

impl FileReport {
    pub(crate) fn bare(path: &Path, outcome: Outcome) -> Self {
        Self {
            path: path.to_path_buf(),
            outcome,
            removed: false,
            stored: None,
            actual: None,
        }
    }

    /// Stored-vs-actual comparison for console output, available once
    /// both attributes were observed:
    ///
    /// ```text
    ///  stored: faa28bfa...5647bf76 1560177189.769244818
    ///  actual: dc9fe226...6dda90e8 1560177334.020775051
    /// ```
    #[must_use]
    pub fn comparison(&self) -> Option<String> {
        match (&self.stored, &self.actual) {
            (Some(stored), Some(actual)) => {
                Some(format!(" stored: {stored}\n actual: {actual}"))
            }
            _ => None,
        }
    }
}
