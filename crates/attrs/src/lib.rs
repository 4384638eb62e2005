#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Extended-attribute storage for digest tags
//!
//! This crate owns the two on-disk encodings of a file's digest tag and
//! the opaque key/value store they live in. The combined encoding packs
//! the raw digest and the timestamp text into one binary entry; the
//! legacy encoding keeps two separate text entries. Reads are
//! best-effort: malformed stored metadata degrades to "treat as
//! mismatched" instead of failing verification.

pub mod codec;
pub mod store;

pub use codec::{
    read_stored, remove_legacy, remove_stored, write_stored, Layout, StoredAttr, COMBINED_LEN,
    KEY_COMBINED, KEY_LEGACY_DIGEST, KEY_LEGACY_TS,
};
pub use store::{AttrStore, FileHandle, MemoryStore, XattrStore};
