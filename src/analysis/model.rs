//! Result data model for the analysis engine.
//!
//! Everything here is immutable once built and `Serialize`, so the caller
//! (CLI, IPC layer, whatever hosts the engine) can emit JSON without
//! re-modeling the types.

use std::path::PathBuf;
use std::time::SystemTime;

use serde::Serialize;

use crate::scanner::ImageFileRef;

/// Default blur threshold: files scoring strictly above this are flagged.
pub const DEFAULT_BLUR_THRESHOLD: f64 = 15.0;

/// Default similarity threshold (percent): pairs at or above are grouped.
pub const DEFAULT_SIMILARITY_THRESHOLD: u8 = 70;

/// Immutable input describing one scan invocation.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    /// Root directory to scan
    pub root: PathBuf,
    /// Whether to recurse into subdirectories
    pub recurse: bool,
}

impl ScanRequest {
    /// Create a new scan request.
    #[must_use]
    pub fn new(root: PathBuf, recurse: bool) -> Self {
        Self { root, recurse }
    }
}

/// Detection thresholds, set once before a scan and read-only during it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Thresholds {
    /// Blur score threshold (conceptually 0-100+); strictly-greater flags
    pub blur: f64,
    /// Similarity percentage threshold (0-100); meets-or-exceeds groups
    pub similarity: u8,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            blur: DEFAULT_BLUR_THRESHOLD,
            similarity: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

/// A file flagged as blurry.
#[derive(Debug, Clone, Serialize)]
pub struct BlurFinding {
    /// Invocation-scoped id, `blur_N`
    pub id: String,
    /// The flagged file
    pub file: ImageFileRef,
    /// Blur score rounded to an integer (0-100, higher = blurrier)
    pub score: u8,
}

/// A file that failed decode, digest, or stat and was excluded from all
/// other result sets.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorFinding {
    /// Invocation-scoped id, `error_N`
    pub id: String,
    /// The failed file
    pub file: ImageFileRef,
    /// Human-readable failure description
    pub message: String,
}

/// Whether a group holds byte-identical or merely similar files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    /// Byte-identical content (equal digests), similarity fixed at 100
    Duplicate,
    /// Perceptually similar pair, similarity computed from hash distance
    Similar,
}

/// One file's entry inside a group.
#[derive(Debug, Clone, Serialize)]
pub struct GroupEntry {
    /// Absolute path
    pub path: PathBuf,
    /// File name for display
    pub file_name: String,
    /// Size in bytes
    pub size: u64,
    /// Last modification time
    pub modified: SystemTime,
}

impl From<&ImageFileRef> for GroupEntry {
    fn from(file: &ImageFileRef) -> Self {
        Self {
            path: file.path.clone(),
            file_name: file.file_name(),
            size: file.size,
            modified: file.modified,
        }
    }
}

/// A cluster of duplicate or similar files.
///
/// Duplicate groups hold two or more files sharing a content digest;
/// similar groups hold exactly two files whose perceptual hashes qualified.
#[derive(Debug, Clone, Serialize)]
pub struct FileGroup {
    /// Group type tag
    #[serde(rename = "type")]
    pub kind: GroupKind,
    /// Similarity percentage (100 for duplicates)
    pub similarity: u8,
    /// Member files
    pub files: Vec<GroupEntry>,
}

impl FileGroup {
    /// Build an exact-duplicate group; similarity is fixed at 100.
    #[must_use]
    pub fn duplicate(files: Vec<GroupEntry>) -> Self {
        Self {
            kind: GroupKind::Duplicate,
            similarity: 100,
            files,
        }
    }

    /// Build a similar-pair group from two entries.
    #[must_use]
    pub fn similar(a: GroupEntry, b: GroupEntry, similarity: u8) -> Self {
        Self {
            kind: GroupKind::Similar,
            similarity,
            files: vec![a, b],
        }
    }

    /// Whether the group references the given path.
    #[must_use]
    pub fn contains(&self, path: &std::path::Path) -> bool {
        self.files.iter().any(|f| f.path == path)
    }
}

/// Aggregate outcome of one scan. Ownership transfers to the caller.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisResult {
    /// Files flagged as blurry
    pub blur_findings: Vec<BlurFinding>,
    /// Duplicate and similar groups
    pub groups: Vec<FileGroup>,
    /// Files that failed analysis
    pub error_findings: Vec<ErrorFinding>,
}

impl AnalysisResult {
    /// True when nothing was flagged and nothing failed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.blur_findings.is_empty() && self.groups.is_empty() && self.error_findings.is_empty()
    }

    /// True when no finding of any kind was produced.
    #[must_use]
    pub fn has_findings(&self) -> bool {
        !self.blur_findings.is_empty() || !self.groups.is_empty()
    }
}

/// Transient per-file progress notification; not retained after delivery.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressEvent {
    /// Completed file count so far (1-based)
    pub current: usize,
    /// Total files in this scan
    pub total: usize,
    /// File name just processed
    pub filename: String,
    /// Completion percentage, 0-100
    pub percentage: f64,
}

impl ProgressEvent {
    /// Build an event for the `current`-th completed file of `total`.
    #[must_use]
    pub fn new(current: usize, total: usize, filename: String) -> Self {
        let percentage = if total == 0 {
            100.0
        } else {
            (current as f64 / total as f64) * 100.0
        };
        Self {
            current,
            total,
            filename,
            percentage,
        }
    }
}
