//! Content fingerprinting for change detection.
//!
//! The fingerprint is a 64-bit xxh64 digest computed over sequential
//! 64 KiB chunks. It is deterministic for identical byte content and
//! cheap enough to run over every candidate file; it is **not** a
//! security primitive and collision resistance is not required.

use std::fmt;
use std::io::Read;
use std::num::ParseIntError;
use std::path::Path;
use std::str::FromStr;

use xxhash_rust::xxh64::Xxh64;

/// Read granularity for streaming fingerprint computation.
const CHUNK_SIZE: usize = 64 * 1024;

/// A 64-bit content fingerprint.
///
/// Rendered as 16 lowercase hex digits, which is the form stored in
/// object metadata under the `fingerprint` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Digests a byte stream, reading fixed-size chunks until exhaustion.
    ///
    /// # Errors
    ///
    /// Propagates any I/O error from the reader.
    pub fn from_reader<R: Read>(reader: &mut R) -> std::io::Result<Self> {
        let mut hasher = Xxh64::new(0);
        let mut buffer = vec![0u8; CHUNK_SIZE];
        loop {
            let n = reader.read(&mut buffer)?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }
        Ok(Self(hasher.digest()))
    }

    /// Digests a local file.
    ///
    /// # Errors
    ///
    /// Propagates any I/O error opening or reading the file.
    pub fn of_file(path: &Path) -> std::io::Result<Self> {
        let mut file = std::fs::File::open(path)?;
        Self::from_reader(&mut file)
    }
}

/// Digests a local file on a blocking thread.
///
/// # Errors
///
/// Propagates any I/O error opening or reading the file.
pub async fn compute(path: &Path) -> std::io::Result<Fingerprint> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || Fingerprint::of_file(&path))
        .await
        .map_err(std::io::Error::other)?
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl FromStr for Fingerprint {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        u64::from_str_radix(s, 16).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_content_hashes_identically() {
        let a = Fingerprint::from_reader(&mut &b"hello world"[..]).unwrap();
        let b = Fingerprint::from_reader(&mut &b"hello world"[..]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_content_hashes_differently() {
        let a = Fingerprint::from_reader(&mut &b"hello"[..]).unwrap();
        let b = Fingerprint::from_reader(&mut &b"world"[..]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn content_spanning_multiple_chunks_is_stable() {
        // Larger than one 64 KiB chunk so the loop runs more than once.
        let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        let a = Fingerprint::from_reader(&mut data.as_slice()).unwrap();
        let b = Fingerprint::from_reader(&mut data.as_slice()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn hex_display_round_trips() {
        let fp = Fingerprint::from_reader(&mut &b"round trip"[..]).unwrap();
        let text = fp.to_string();
        assert_eq!(text.len(), 16);
        assert_eq!(text.parse::<Fingerprint>().unwrap(), fp);
    }

    #[test]
    fn file_and_reader_agree() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        std::fs::write(&path, b"some file content").unwrap();

        let from_file = Fingerprint::of_file(&path).unwrap();
        let from_reader = Fingerprint::from_reader(&mut &b"some file content"[..]).unwrap();
        assert_eq!(from_file, from_reader);
    }

    #[test]
    fn rejects_non_hex_input() {
        assert!("not-a-fingerprint".parse::<Fingerprint>().is_err());
    }
}
