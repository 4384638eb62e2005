//! The two on-disk encodings of a digest tag and the migration removals

use crate::store::{AttrStore, FileHandle};
use rottag_errors::AttrError;
use rottag_hash::{ActualAttr, Digest, ZERO_DIGEST_HEX};
use rottag_platform::Policy;
use rottag_types::{Encoding, Timestamp};
use std::fmt;
use tracing::debug;

/// Combined entry: 32 raw digest bytes followed by the timestamp text.
pub const KEY_COMBINED: &str = "user.rottag";
/// Legacy entry holding the digest as lowercase hex text.
pub const KEY_LEGACY_DIGEST: &str = "user.rottag.b3";
/// Legacy entry holding the timestamp as dotted decimal text.
pub const KEY_LEGACY_TS: &str = "user.rottag.ts";

/// Packed size of the combined entry: 32 digest bytes plus the 20-byte
/// zero-padded `"<secs>.<nanos>"` string.
pub const COMBINED_LEN: usize = 52;

/// Which encoding a write should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Combined,
    Legacy,
}

/// The attribute previously stored for a file, as read from the store.
///
/// `legacy_present` records whether legacy entries existed even when the
/// combined entry wins, so migration can decide whether a cleanup write
/// is still needed. Invariant: `encoding == None` implies an absent
/// digest and the zero timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAttr {
    pub digest: Option<Digest>,
    pub timestamp: Timestamp,
    pub encoding: Encoding,
    pub legacy_present: bool,
}

impl StoredAttr {
    /// The state of a file that was never tagged.
    #[must_use]
    pub fn absent() -> Self {
        Self {
            digest: None,
            timestamp: Timestamp::default(),
            encoding: Encoding::None,
            legacy_present: false,
        }
    }

    /// Hex digest for report lines, all zeros when absent.
    #[must_use]
    pub fn digest_hex(&self) -> String {
        self.digest
            .as_ref()
            .map_or_else(|| ZERO_DIGEST_HEX.to_string(), Digest::to_hex)
    }
}

impl fmt::Display for StoredAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.digest_hex(), self.timestamp)
    }
}

/// Read the stored attribute for a file, best-effort.
///
/// The combined entry is always attempted; the legacy entries only under
/// `legacy_compat` (migration or plaintext mode). When both are present
/// the combined value wins, but legacy presence is still reported.
/// Malformed stored metadata never fails the read: an undecodable digest
/// is treated as absent and a malformed timestamp degrades to zero
/// components, so a damaged tag classifies as a mismatch instead of
/// crashing the run.
#[must_use]
pub fn read_stored(store: &dyn AttrStore, file: &FileHandle, legacy_compat: bool) -> StoredAttr {
    let mut attr = StoredAttr::absent();

    if legacy_compat {
        if let Ok(Some(raw)) = store.get(file, KEY_LEGACY_DIGEST) {
            attr.legacy_present = true;
            match std::str::from_utf8(&raw)
                .ok()
                .and_then(|text| Digest::from_hex(text.trim()).ok())
            {
                Some(digest) => {
                    attr.digest = Some(digest);
                    attr.encoding = Encoding::Legacy;
                }
                None => {
                    debug!(path = %file.path().display(), "undecodable legacy digest entry");
                }
            }
        }
        if let Ok(Some(raw)) = store.get(file, KEY_LEGACY_TS) {
            attr.legacy_present = true;
            attr.timestamp = Timestamp::parse_dotted(&raw);
            attr.encoding = Encoding::Legacy;
        }
    }

    // The combined entry always wins; migration still needs to know the
    // legacy entries existed.
    if let Ok(Some(raw)) = store.get(file, KEY_COMBINED) {
        if raw.len() >= 32 {
            let mut bytes = [0u8; 32];
            bytes.copy_from_slice(&raw[..32]);
            attr.digest = Some(Digest::from_bytes(bytes));
            attr.timestamp = Timestamp::parse_dotted(&raw[32..]);
            attr.encoding = Encoding::Combined;
        } else {
            debug!(
                path = %file.path().display(),
                len = raw.len(),
                "combined entry too short, ignoring"
            );
        }
    }

    attr
}

/// Pack an attribute into the combined binary form.
#[must_use]
pub fn pack_combined(actual: &ActualAttr) -> Vec<u8> {
    let mut packed = Vec::with_capacity(COMBINED_LEN);
    packed.extend_from_slice(actual.digest.as_bytes());
    packed.extend_from_slice(actual.timestamp.to_string().as_bytes());
    packed
}

fn set_key(
    store: &dyn AttrStore,
    file: &FileHandle,
    policy: &dyn Policy,
    key: &str,
    value: &[u8],
) -> Result<(), AttrError> {
    if policy.rewrite_requires_remove() {
        // Setting an existing attribute silently deletes it on this
        // platform; force a clean write. The attribute may not exist yet.
        let _ = store.remove(file, key);
    }
    store
        .set(file, key, value)
        .map_err(|e| AttrError::WriteFailed {
            key: key.to_string(),
            message: e.to_string(),
        })
}

/// Persist a freshly computed attribute in the requested layout.
///
/// Dry-run suppresses the writes but still reports success.
///
/// # Errors
/// `AttrError::WriteFailed` naming the entry that could not be written.
pub fn write_stored(
    store: &dyn AttrStore,
    file: &FileHandle,
    actual: &ActualAttr,
    layout: Layout,
    dry_run: bool,
    policy: &dyn Policy,
) -> Result<(), AttrError> {
    if dry_run {
        return Ok(());
    }
    match layout {
        Layout::Legacy => {
            set_key(
                store,
                file,
                policy,
                KEY_LEGACY_TS,
                actual.timestamp.to_string().as_bytes(),
            )?;
            set_key(
                store,
                file,
                policy,
                KEY_LEGACY_DIGEST,
                actual.digest.to_hex().as_bytes(),
            )
        }
        Layout::Combined => set_key(store, file, policy, KEY_COMBINED, &pack_combined(actual)),
    }
}

/// Remove both legacy entries. Fails if either removal fails, so a
/// half-removed legacy pair is reported rather than ignored.
///
/// # Errors
/// `AttrError::RemoveFailed` naming the first entry that failed.
pub fn remove_legacy(store: &dyn AttrStore, file: &FileHandle) -> Result<(), AttrError> {
    let ts = store.remove(file, KEY_LEGACY_TS);
    let digest = store.remove(file, KEY_LEGACY_DIGEST);
    for (key, result) in [(KEY_LEGACY_TS, ts), (KEY_LEGACY_DIGEST, digest)] {
        result.map_err(|e| AttrError::RemoveFailed {
            key: key.to_string(),
            message: e.to_string(),
        })?;
    }
    Ok(())
}

/// Remove all stored attributes for a file.
///
/// The legacy entries are only touched under `legacy_compat`; dry-run
/// suppresses the removals but still reports success.
///
/// # Errors
/// `AttrError::RemoveFailed` naming the entry that could not be removed.
pub fn remove_stored(
    store: &dyn AttrStore,
    file: &FileHandle,
    legacy_compat: bool,
    dry_run: bool,
) -> Result<(), AttrError> {
    if dry_run {
        return Ok(());
    }
    let combined = store.remove(file, KEY_COMBINED);
    if legacy_compat {
        return remove_legacy(store, file);
    }
    combined.map_err(|e| AttrError::RemoveFailed {
        key: KEY_COMBINED.to_string(),
        message: e.to_string(),
    })
}
