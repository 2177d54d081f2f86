//! Scanner module for image discovery, decoding, and fingerprinting.
//!
//! This module provides functionality for:
//! - Eager directory walking with an image extension allow-list
//! - Grayscale decoding behind the [`ImageDecoder`] trait
//! - SHA-256 content digests for exact-duplicate detection
//! - 64-bit average hashes for perceptual similarity
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and image file discovery
//! - [`decoder`]: Grayscale image decoding (fit-inside and force-fit)
//! - [`digest`]: Content fingerprinting
//! - [`perceptual`]: Average-hash computation and Hamming distance

pub mod decoder;
pub mod digest;
pub mod perceptual;
pub mod walker;

use std::path::PathBuf;
use std::time::SystemTime;

use serde::Serialize;

// Re-export main types
pub use decoder::{GrayBuffer, ImageCrateDecoder, ImageDecoder};
pub use digest::digest_file;
pub use perceptual::PerceptualHash;
pub use walker::{discover, DiscoveredFile};

/// File extensions treated as scannable images (lowercase).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "tiff", "tif"];

/// Reference to a discovered image file.
///
/// Derived by the walker from directory metadata and never mutated
/// afterwards; every later stage identifies the file by this reference.
#[derive(Debug, Clone, Serialize)]
pub struct ImageFileRef {
    /// Absolute path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Last modification time
    pub modified: SystemTime,
}

impl ImageFileRef {
    /// Create a new `ImageFileRef`.
    #[must_use]
    pub fn new(path: PathBuf, size: u64, modified: SystemTime) -> Self {
        Self {
            path,
            size,
            modified,
        }
    }

    /// The file name component, lossily converted for display.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Check whether a path carries one of the scannable image extensions.
///
/// Matching is case-insensitive; files without an extension never match.
#[must_use]
pub fn has_image_extension(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Errors that abort the whole scan.
///
/// Only the top-level walk can fail fatally; everything downstream is
/// recorded per file and the scan continues.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// The scan root was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The scan root exists but is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An I/O error occurred while reading the scan root.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_image_file_ref_new() {
        let entry = ImageFileRef::new(PathBuf::from("/photos/a.jpg"), 1024, SystemTime::now());

        assert_eq!(entry.path, PathBuf::from("/photos/a.jpg"));
        assert_eq!(entry.size, 1024);
        assert_eq!(entry.file_name(), "a.jpg");
    }

    #[test]
    fn test_extension_allow_list() {
        assert!(has_image_extension(Path::new("a.jpg")));
        assert!(has_image_extension(Path::new("a.JPEG")));
        assert!(has_image_extension(Path::new("b.Png")));
        assert!(has_image_extension(Path::new("c.tif")));
        assert!(has_image_extension(Path::new("c.TIFF")));
        assert!(has_image_extension(Path::new("d.gif")));

        assert!(!has_image_extension(Path::new("e.bmp")));
        assert!(!has_image_extension(Path::new("notes.txt")));
        assert!(!has_image_extension(Path::new("no_extension")));
    }

    #[test]
    fn test_scan_error_display() {
        let err = ScanError::NotFound(PathBuf::from("/missing"));
        assert_eq!(err.to_string(), "Path not found: /missing");

        let err = ScanError::NotADirectory(PathBuf::from("/file.txt"));
        assert_eq!(err.to_string(), "Not a directory: /file.txt");
    }
}
