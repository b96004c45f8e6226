use md5::{Digest, Md5};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::HashError;

/// Bytes read from each sampled region of a large file.
pub const SAMPLE_SIZE: u64 = 1024 * 1024; // 1MB

/// Files up to this size are hashed in full.
pub const FULL_HASH_LIMIT: u64 = SAMPLE_SIZE * 3;

/// 128-bit content fingerprint, persisted as 32 lowercase hex characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; 16]);

impl Fingerprint {
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid fingerprint '{input}': {source}")]
pub struct ParseFingerprintError {
    input: String,
    #[source]
    source: hex::FromHexError,
}

impl FromStr for Fingerprint {
    type Err = ParseFingerprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 16];
        hex::decode_to_slice(s, &mut bytes).map_err(|source| ParseFingerprintError {
            input: s.to_string(),
            source,
        })?;
        Ok(Self(bytes))
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// A file found during a walk. Only lives for the duration of a scan or index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    pub path: PathBuf,
    pub size: u64,
}

/// Fingerprint a file by content.
///
/// Files no larger than [`FULL_HASH_LIMIT`] are digested whole. Larger files
/// contribute three [`SAMPLE_SIZE`] windows (head, the window starting at
/// `size / 2`, tail) followed by the decimal file size.
pub fn fingerprint_file(path: &Path) -> Result<Fingerprint, HashError> {
    digest_file(path).map_err(|source| HashError {
        path: path.to_path_buf(),
        source,
    })
}

fn digest_file(path: &Path) -> io::Result<Fingerprint> {
    let mut file = File::open(path)?;
    let size = file.metadata()?.len();
    let mut hasher = Md5::new();

    if size <= FULL_HASH_LIMIT {
        io::copy(&mut file, &mut hasher)?;
    } else {
        for offset in [0, size / 2, size - SAMPLE_SIZE] {
            file.seek(SeekFrom::Start(offset))?;
            io::copy(&mut (&mut file).take(SAMPLE_SIZE), &mut hasher)?;
        }
        hasher.update(size.to_string().as_bytes());
    }

    Ok(Fingerprint(hasher.finalize().into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn sampled_digest(data: &[u8]) -> String {
        let size = data.len();
        let sample = SAMPLE_SIZE as usize;
        let mut hasher = Md5::new();
        hasher.update(&data[..sample]);
        hasher.update(&data[size / 2..size / 2 + sample]);
        hasher.update(&data[size - sample..]);
        hasher.update(size.to_string().as_bytes());
        hex::encode(hasher.finalize())
    }

    fn patterned(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn test_small_file_is_md5_of_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("x.txt");
        fs::write(&path, "hello").unwrap();

        let fp = fingerprint_file(&path).unwrap();
        assert_eq!(fp.to_string(), "5d41402abc4b2a76b9719d911017c592");
    }

    #[test]
    fn test_zero_byte_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty");
        fs::write(&path, b"").unwrap();

        let fp = fingerprint_file(&path).unwrap();
        assert_eq!(fp.to_string(), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn test_same_bytes_same_fingerprint_regardless_of_name() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.bin");
        let b = dir.path().join("nested_copy_with_other_name.dat");
        fs::write(&a, patterned(4096)).unwrap();
        fs::write(&b, patterned(4096)).unwrap();

        assert_eq!(fingerprint_file(&a).unwrap(), fingerprint_file(&b).unwrap());
    }

    #[test]
    fn test_single_byte_change_changes_small_fingerprint() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.bin");
        let b = dir.path().join("b.bin");
        let data = patterned(10_000);
        let mut edited = data.clone();
        edited[5_000] ^= 0xFF;
        fs::write(&a, &data).unwrap();
        fs::write(&b, &edited).unwrap();

        assert_ne!(fingerprint_file(&a).unwrap(), fingerprint_file(&b).unwrap());
    }

    #[test]
    fn test_file_at_limit_is_hashed_whole() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("limit.bin");
        let data = patterned(FULL_HASH_LIMIT as usize);
        fs::write(&path, &data).unwrap();

        let expected = hex::encode(Md5::digest(&data));
        assert_eq!(fingerprint_file(&path).unwrap().to_string(), expected);
    }

    #[test]
    fn test_large_file_uses_sampled_layout() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("large.bin");
        let data = patterned(FULL_HASH_LIMIT as usize + 12_345);
        fs::write(&path, &data).unwrap();

        assert_eq!(fingerprint_file(&path).unwrap().to_string(), sampled_digest(&data));
    }

    #[test]
    fn test_large_file_ignores_bytes_outside_samples() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.bin");
        let b = dir.path().join("b.bin");
        let data = patterned(4 * SAMPLE_SIZE as usize);
        let mut edited = data.clone();
        // Between the head window and the middle window.
        edited[SAMPLE_SIZE as usize + 10] ^= 0xFF;
        fs::write(&a, &data).unwrap();
        fs::write(&b, &edited).unwrap();

        assert_eq!(fingerprint_file(&a).unwrap(), fingerprint_file(&b).unwrap());

        let mut head_edit = data.clone();
        head_edit[0] ^= 0xFF;
        fs::write(&b, &head_edit).unwrap();
        assert_ne!(fingerprint_file(&a).unwrap(), fingerprint_file(&b).unwrap());
    }

    #[test]
    fn test_missing_file_is_hash_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.bin");

        let err = fingerprint_file(&path).unwrap_err();
        assert_eq!(err.path, path);
        assert_eq!(err.source.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_parse_round_trips_display() {
        let fp: Fingerprint = "5d41402abc4b2a76b9719d911017c592".parse().unwrap();
        assert_eq!(fp.to_string(), "5d41402abc4b2a76b9719d911017c592");
        assert!("not-hex".parse::<Fingerprint>().is_err());
        assert!("5d41".parse::<Fingerprint>().is_err());
    }
}
