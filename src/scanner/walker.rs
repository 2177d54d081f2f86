//! Directory walker for eager image file discovery.
//!
//! The walker produces a complete `Vec<DiscoveredFile>` up front rather
//! than a lazy stream: similarity grouping needs the full file set before
//! any pair comparison can run, so there is nothing to gain from streaming.
//!
//! Failure policy mirrors the rest of the engine: a missing or unreadable
//! root is fatal, a subdirectory that cannot be listed during a recursive
//! walk is logged and skipped, and a matched file that cannot be stat'd is
//! reported with the error attached so it surfaces as an error finding.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::{has_image_extension, ImageFileRef, ScanError};

/// A file matched by the walker's extension allow-list.
///
/// A file whose metadata cannot be read is still reported, with the stat
/// error attached; the orchestrator turns it into an error finding rather
/// than letting the file silently vanish from the results.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    /// File reference; carries placeholder size and mtime when
    /// `stat_error` is set.
    pub file: ImageFileRef,
    /// The stat failure for this entry, if any.
    pub stat_error: Option<String>,
}

impl DiscoveredFile {
    /// A file whose metadata was read successfully.
    #[must_use]
    pub fn new(file: ImageFileRef) -> Self {
        Self {
            file,
            stat_error: None,
        }
    }

    /// A file whose metadata could not be read.
    #[must_use]
    pub fn stat_failed(path: PathBuf, message: String) -> Self {
        Self {
            file: ImageFileRef::new(path, 0, std::time::UNIX_EPOCH),
            stat_error: Some(message),
        }
    }
}

/// Discover image files under `root`.
///
/// When `recurse` is false only the root directory's direct children are
/// considered. Files are matched against the extension allow-list
/// ([`super::IMAGE_EXTENSIONS`]) case-insensitively.
///
/// # Errors
///
/// Returns [`ScanError`] if the root does not exist, is not a directory,
/// or cannot be read at all. Errors below the root are logged and the
/// affected entries skipped.
pub fn discover(root: &Path, recurse: bool) -> Result<Vec<DiscoveredFile>, ScanError> {
    let meta = std::fs::metadata(root).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ScanError::NotFound(root.to_path_buf()),
        _ => ScanError::Io {
            path: root.to_path_buf(),
            source: e,
        },
    })?;
    if !meta.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let max_depth = if recurse { usize::MAX } else { 1 };
    let mut files = Vec::new();

    for entry in WalkDir::new(root).max_depth(max_depth).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                // Local recovery: skip the unreadable subtree, keep walking.
                log::warn!("Skipping unreadable entry during walk: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() || !has_image_extension(entry.path()) {
            continue;
        }

        match entry.metadata() {
            Ok(meta) => {
                let modified = meta.modified().unwrap_or(std::time::UNIX_EPOCH);
                files.push(DiscoveredFile::new(ImageFileRef::new(
                    entry.path().to_path_buf(),
                    meta.len(),
                    modified,
                )));
            }
            Err(e) => {
                log::warn!("Failed to stat {}: {}", entry.path().display(), e);
                files.push(DiscoveredFile::stat_failed(
                    entry.path().to_path_buf(),
                    e.to_string(),
                ));
            }
        }
    }

    log::debug!(
        "Discovered {} image files under {} (recurse: {})",
        files.len(),
        root.display(),
        recurse
    );
    Ok(files)
}
