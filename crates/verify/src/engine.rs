//! Per-file verification: classification and write-back

use crate::{FileReport, VerifyOptions};
use rottag_attrs::{
    read_stored, remove_legacy, remove_stored, write_stored, AttrStore, FileHandle, StoredAttr,
    XattrStore,
};
use rottag_errors::HashError;
use rottag_hash::{read_actual, ActualAttr};
use rottag_platform::Policy;
use rottag_types::{Encoding, Outcome};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// The verification engine for one run.
///
/// Cheap to clone; workers in the dispatch pipeline each hold a clone and
/// never share per-file state.
#[derive(Clone)]
pub struct Verifier {
    store: Arc<dyn AttrStore>,
    policy: &'static dyn Policy,
    opts: VerifyOptions,
}

impl Verifier {
    /// Engine over real extended attributes on the current platform.
    #[must_use]
    pub fn new(opts: VerifyOptions) -> Self {
        Self::with_store(opts, Arc::new(XattrStore), rottag_platform::current())
    }

    /// Engine over an injected store and policy, used by tests and by
    /// callers on filesystems without xattr support.
    #[must_use]
    pub fn with_store(
        opts: VerifyOptions,
        store: Arc<dyn AttrStore>,
        policy: &'static dyn Policy,
    ) -> Self {
        Self {
            store,
            policy,
            opts,
        }
    }

    #[must_use]
    pub fn options(&self) -> &VerifyOptions {
        &self.opts
    }

    /// Verify one file, re-tagging it where the run's options call for it.
    ///
    /// Every failure is local to this file; the returned report is the
    /// only channel a problem propagates through.
    pub async fn verify_file(&self, path: &Path) -> FileReport {
        let file = match std::fs::File::open(path) {
            Ok(f) => FileHandle::new(f, path),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot open file");
                return FileReport::bare(path, Outcome::OpenFailed);
            }
        };

        // Remove-mode never computes a digest.
        if self.opts.remove {
            return match remove_stored(
                &*self.store,
                &file,
                self.opts.legacy_compat(),
                self.opts.dry_run,
            ) {
                Ok(()) => FileReport {
                    removed: true,
                    ..FileReport::bare(path, Outcome::Ok)
                },
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "cannot remove attributes");
                    FileReport::bare(path, Outcome::OtherFailed)
                }
            };
        }

        let stored = read_stored(&*self.store, &file, self.opts.legacy_compat());

        // Digest and both mtime observations go through the same handle
        // the attributes are read and written on, so a rename over the
        // path cannot split the verification across two inodes.
        let actual = read_actual(file.file(), path).await;
        self.evaluate(&file, path, stored, actual)
    }

    /// Classify one file from its stored attribute and the outcome of the
    /// content read, performing any write-back the classification calls
    /// for.
    fn evaluate(
        &self,
        file: &FileHandle,
        path: &Path,
        stored: StoredAttr,
        actual: Result<ActualAttr, HashError>,
    ) -> FileReport {
        let actual = match actual {
            Ok(actual) => actual,
            Err(HashError::ConcurrentModification { .. }) => {
                debug!(path = %path.display(), "file changed while hashing");
                return FileReport {
                    stored: Some(stored),
                    ..FileReport::bare(path, Outcome::InProgress)
                };
            }
            Err(e @ HashError::Open { .. }) => {
                warn!(path = %path.display(), error = %e, "lost access to open file");
                return FileReport {
                    stored: Some(stored),
                    ..FileReport::bare(path, Outcome::OpenFailed)
                };
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read file content");
                return FileReport {
                    stored: Some(stored),
                    ..FileReport::bare(path, Outcome::OtherFailed)
                };
            }
        };

        let tagged = stored.encoding != Encoding::None;
        let digests_match = stored.digest.as_ref() == Some(&actual.digest);
        let timestamps_match = stored
            .timestamp
            .equal_truncated(&actual.timestamp, self.policy.resolution());

        // Only tagged files can be verified or corrupt; everything else
        // is new or simply out of date.
        let mut outcome = if tagged && timestamps_match {
            if digests_match {
                if !self.opts.migrate {
                    // Nothing changed and no migration pending: no write.
                    return FileReport {
                        stored: Some(stored),
                        actual: Some(actual),
                        ..FileReport::bare(path, Outcome::Ok)
                    };
                }
                Outcome::Ok
            } else {
                warn!(path = %path.display(), "digest mismatch on unchanged timestamp");
                Outcome::Corrupt
            }
        } else if digests_match {
            Outcome::TimeChanged
        } else if stored.digest.is_none() && stored.timestamp.is_zero() {
            Outcome::New
        } else {
            Outcome::Outdated
        };

        // Re-tag when the file was never tagged, its exact timestamp
        // moved, a fix was requested, or migration still has work here.
        // A corrupt digest is deliberately left in place without --fix,
        // preserving evidence for manual inspection.
        let needs_write = stored.encoding == Encoding::None
            || stored.timestamp != actual.timestamp
            || self.opts.fix
            || (self.opts.migrate && stored.encoding != Encoding::Combined);

        if needs_write {
            if self.opts.migrate && !self.opts.dry_run && stored.legacy_present {
                // A file must never carry both encodings at once.
                if let Err(e) = remove_legacy(&*self.store, file) {
                    debug!(path = %path.display(), error = %e, "legacy cleanup incomplete");
                }
            }
            if let Err(e) = write_stored(
                &*self.store,
                file,
                &actual,
                self.opts.layout(),
                self.opts.dry_run,
                self.policy,
            ) {
                warn!(path = %path.display(), error = %e, "failed to persist attribute");
                outcome = Outcome::WriteFailed;
            }
        }

        FileReport {
            stored: Some(stored),
            actual: Some(actual),
            ..FileReport::bare(path, outcome)
        }
    }
}
