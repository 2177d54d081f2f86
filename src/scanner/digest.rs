//! Content fingerprinting with SHA-256.
//!
//! Digests are used purely as equality keys: two files with equal digests
//! are byte-identical duplicates. An unreadable file is a per-file failure,
//! recorded as an error finding by the orchestrator, never a fatal error.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use thiserror::Error;

/// Read buffer size for streaming digests.
const READ_BUF_SIZE: usize = 64 * 1024;

/// Errors that can occur while fingerprinting a file.
#[derive(Debug, Error)]
pub enum DigestError {
    /// The file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Compute the SHA-256 digest of a file's raw bytes as lowercase hex.
///
/// # Errors
///
/// Returns [`DigestError::Read`] if the file cannot be opened or read.
pub fn digest_file(path: &Path) -> Result<String, DigestError> {
    let file = File::open(path).map_err(|e| DigestError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buf = [0u8; READ_BUF_SIZE];
    loop {
        let n = reader.read(&mut buf).map_err(|e| DigestError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(to_hex(&hasher.finalize()))
}

fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        // Writing to a String cannot fail.
        let _ = write!(out, "{b:02x}");
    }
    out
}
