#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! BLAKE3 content digests for bitrot detection
//!
//! This crate provides the 32-byte digest type and the concurrent-
//! modification-safe reader that pairs a file's digest with the
//! modification time the digest actually reflects.

use blake3::Hasher;
use rottag_errors::HashError;
use rottag_types::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// Size of chunks for streaming digest computation
const CHUNK_SIZE: usize = 64 * 1024; // 64KB

/// Hex rendering of an absent digest in per-file reports.
pub const ZERO_DIGEST_HEX: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

/// A BLAKE3 digest of file content
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Digest {
    bytes: [u8; 32],
}

impl Digest {
    /// Create a digest from raw bytes
    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    /// Get the raw bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// Convert to lowercase hex
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Parse from hex text
    ///
    /// # Errors
    /// Returns an error if the input is not exactly 64 hex characters.
    pub fn from_hex(s: &str) -> Result<Self, HashError> {
        let bytes = hex::decode(s).map_err(|e| HashError::InvalidDigest {
            message: format!("invalid hex: {e}"),
        })?;

        if bytes.len() != 32 {
            return Err(HashError::InvalidDigest {
                message: format!("digest must be 32 bytes, got {}", bytes.len()),
            });
        }

        let mut array = [0u8; 32];
        array.copy_from_slice(&bytes);
        Ok(Self::from_bytes(array))
    }

    /// Digest of a byte slice
    #[must_use]
    pub fn from_data(data: &[u8]) -> Self {
        let hash = blake3::hash(data);
        Self::from_bytes(*hash.as_bytes())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Digest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// A freshly computed digest together with the modification time it
/// reflects. Always fully populated on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActualAttr {
    pub digest: Digest,
    pub timestamp: Timestamp,
}

impl fmt::Display for ActualAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.digest, self.timestamp)
    }
}

/// Read a file's current modification time.
async fn mtime(file: &File, path: &Path) -> Result<Timestamp, HashError> {
    let meta = file
        .metadata()
        .await
        .map_err(|e| HashError::from_io_read(&e, path))?;
    let modified = meta
        .modified()
        .map_err(|e| HashError::from_io_read(&e, path))?;
    Ok(Timestamp::from(modified))
}

/// Reject a digest whose input was mutated while it was being hashed.
fn ensure_unmodified(
    first: Timestamp,
    second: Timestamp,
    path: &Path,
) -> Result<(), HashError> {
    if first == second {
        Ok(())
    } else {
        Err(HashError::ConcurrentModification {
            path: path.display().to_string(),
        })
    }
}

/// Compute a file's digest while detecting concurrent mutation.
///
/// Operates on an already-open handle so the digest, both modification
/// times, and whatever else the caller does with the same handle all
/// observe one inode; a rename over the path after the open cannot swap
/// the file out from underneath the verification. `path` is only used
/// in error messages.
///
/// The modification time is recorded before hashing and re-read after the
/// digest is finalized; if it moved, the digest does not correspond to any
/// single coherent state and the read fails. On success the returned
/// timestamp is the first observation, the state the digest reflects.
///
/// # Errors
/// `HashError::Open` if the handle cannot be duplicated,
/// `HashError::ConcurrentModification` if the file changed mid-hash, and
/// `HashError::Read` for any other I/O failure.
pub async fn read_actual(file: &std::fs::File, path: &Path) -> Result<ActualAttr, HashError> {
    let clone = file.try_clone().map_err(|e| HashError::Open {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let mut file = File::from_std(clone);
    file.rewind()
        .await
        .map_err(|e| HashError::from_io_read(&e, path))?;

    let first = mtime(&file, path).await?;

    let mut hasher = Hasher::new();
    let mut buffer = vec![0; CHUNK_SIZE];
    loop {
        let n = file
            .read(&mut buffer)
            .await
            .map_err(|e| HashError::from_io_read(&e, path))?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    let second = mtime(&file, path).await?;
    ensure_unmodified(first, second, path)?;

    Ok(ActualAttr {
        digest: Digest::from_bytes(*hasher.finalize().as_bytes()),
        timestamp: first,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_digest_basics() {
        let data = b"hello world";
        let digest = Digest::from_data(data);

        // Known BLAKE3 hash of "hello world"
        let expected = "d74981efa70a0c880b8d8c1985d075dbcbf679b99a5f9914e5aaf96b831a9e24";
        assert_eq!(digest.to_hex(), expected);
    }

    #[test]
    fn test_digest_hex_roundtrip() {
        let digest = Digest::from_data(b"test");
        let parsed = Digest::from_hex(&digest.to_hex()).unwrap();
        assert_eq!(digest, parsed);
    }

    #[test]
    fn test_digest_rejects_bad_hex() {
        assert!(Digest::from_hex("zz").is_err());
        assert!(Digest::from_hex("abcd").is_err());
    }

    #[test]
    fn test_digest_serialization() {
        let digest = Digest::from_data(b"test");
        let json = serde_json::to_string(&digest).unwrap();
        let deserialized: Digest = serde_json::from_str(&json).unwrap();
        assert_eq!(digest, deserialized);
    }

    #[test]
    fn test_zero_digest_hex_is_64_zeros() {
        assert_eq!(ZERO_DIGEST_HEX.len(), 64);
        assert!(ZERO_DIGEST_HEX.chars().all(|c| c == '0'));
    }

    #[test]
    fn test_unmodified_check() {
        let path = Path::new("f");
        let a = Timestamp::new(100, 5);
        assert!(ensure_unmodified(a, a, path).is_ok());

        // Any movement counts, even below truncation resolution; the
        // digest was computed over a moving target either way.
        let b = Timestamp::new(100, 6);
        let err = ensure_unmodified(a, b, path).unwrap_err();
        assert!(matches!(err, HashError::ConcurrentModification { .. }));
    }

    #[tokio::test]
    async fn test_read_actual_matches_content_digest() {
        let mut temp = NamedTempFile::new().unwrap();
        let data = b"stable file content";
        temp.write_all(data).unwrap();
        temp.flush().unwrap();

        let file = std::fs::File::open(temp.path()).unwrap();
        let actual = read_actual(&file, temp.path()).await.unwrap();
        assert_eq!(actual.digest, Digest::from_data(data));
        assert!(!actual.timestamp.is_zero());
    }

    #[tokio::test]
    async fn test_read_actual_is_bound_to_the_handle_not_the_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, b"first").unwrap();
        let file = std::fs::File::open(&path).unwrap();

        // Replace the path; the handle still refers to the original
        // inode, so the digest and mtime must come from it.
        std::fs::remove_file(&path).unwrap();
        std::fs::write(&path, b"second").unwrap();

        let actual = read_actual(&file, &path).await.unwrap();
        assert_eq!(actual.digest, Digest::from_data(b"first"));
    }

    #[tokio::test]
    async fn test_read_actual_rewinds_the_handle() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"content").unwrap();
        temp.flush().unwrap();

        let file = std::fs::File::open(temp.path()).unwrap();
        let first = read_actual(&file, temp.path()).await.unwrap();
        let second = read_actual(&file, temp.path()).await.unwrap();
        assert_eq!(first.digest, second.digest);
        assert_eq!(first.digest, Digest::from_data(b"content"));
    }
}
