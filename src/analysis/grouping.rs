//! Duplicate partitioning and perceptual similarity grouping.
//!
//! Duplicate grouping partitions files by content digest: digest equality
//! is transitive, so every file lands in at most one group. Similarity
//! grouping is pairwise over perceptual hashes and deliberately is not a
//! partition: a file can appear in several similar pairs, but never paired
//! with a file that already shares its duplicate group.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::analysis::model::{FileGroup, GroupEntry};
use crate::scanner::{ImageFileRef, PerceptualHash};

/// Hamming distance at or below which two hashes count as fully similar.
const FULL_SIMILARITY_DISTANCE: u32 = 3;

/// Hamming distance at or above which similarity bottoms out at zero.
const ZERO_SIMILARITY_DISTANCE: u32 = 15;

/// Convert a 64-bit-hash Hamming distance to a similarity percentage.
///
/// Calibrated for near-duplicate detection: distances up to 3 read as
/// 100%, 15 and beyond as 0%, with linear interpolation in between. The
/// constants are empirical tuning, not a universal law; this function is
/// the single place to replace them.
#[must_use]
pub fn similarity_from_distance(distance: u32) -> u8 {
    if distance <= FULL_SIMILARITY_DISTANCE {
        100
    } else if distance >= ZERO_SIMILARITY_DISTANCE {
        0
    } else {
        let span = f64::from(ZERO_SIMILARITY_DISTANCE - FULL_SIMILARITY_DISTANCE);
        let steps = f64::from(distance - FULL_SIMILARITY_DISTANCE);
        (100.0 - steps * (100.0 / span)).round() as u8
    }
}

/// Files partitioned into exact-duplicate groups by content digest.
#[derive(Debug, Default)]
pub struct DuplicatePartition {
    /// Duplicate groups (2+ members each), in first-seen digest order
    pub groups: Vec<FileGroup>,
    /// Path -> index into `groups`, for co-membership queries
    membership: HashMap<PathBuf, usize>,
}

impl DuplicatePartition {
    /// Partition files by digest, keeping only digests shared by 2+ files.
    ///
    /// Group member order and group order both follow the input order, so
    /// results are deterministic for a given discovery sequence.
    #[must_use]
    pub fn from_digests(entries: &[(ImageFileRef, String)]) -> Self {
        let mut by_digest: HashMap<&str, Vec<&ImageFileRef>> = HashMap::new();
        let mut digest_order: Vec<&str> = Vec::new();

        for (file, digest) in entries {
            let bucket = by_digest.entry(digest.as_str()).or_default();
            if bucket.is_empty() {
                digest_order.push(digest.as_str());
            }
            bucket.push(file);
        }

        let mut partition = Self::default();
        for digest in digest_order {
            let bucket = &by_digest[digest];
            if bucket.len() < 2 {
                continue;
            }

            let index = partition.groups.len();
            for file in bucket {
                partition.membership.insert(file.path.clone(), index);
            }
            partition.groups.push(FileGroup::duplicate(
                bucket.iter().map(|f| GroupEntry::from(*f)).collect(),
            ));
            log::debug!(
                "Duplicate group {} with {} files (digest {})",
                index,
                bucket.len(),
                &digest[..digest.len().min(12)]
            );
        }

        partition
    }

    /// Whether two paths already belong to the same duplicate group.
    #[must_use]
    pub fn same_group(&self, a: &Path, b: &Path) -> bool {
        match (self.membership.get(a), self.membership.get(b)) {
            (Some(ga), Some(gb)) => ga == gb,
            _ => false,
        }
    }
}

/// Compare all unordered pairs of perceptual hashes and emit similar-pair
/// groups.
///
/// A pair qualifies when its similarity meets or exceeds `threshold` and
/// the two files are not already members of the same duplicate group. Each
/// unordered pair is processed at most once.
///
/// O(n^2) comparisons; acceptable at folder scale (low thousands). Bucket
/// by hash prefix before resorting to anything cleverer if this ever shows
/// up in profiles.
#[must_use]
pub fn group_similar(
    hashes: &[(ImageFileRef, PerceptualHash)],
    duplicates: &DuplicatePartition,
    threshold: u8,
) -> Vec<FileGroup> {
    let mut groups = Vec::new();
    let mut seen_pairs: HashSet<(&Path, &Path)> = HashSet::new();

    for i in 0..hashes.len() {
        for j in i + 1..hashes.len() {
            let (file_a, hash_a) = &hashes[i];
            let (file_b, hash_b) = &hashes[j];

            // A path listed twice in the input is still one file; never
            // pair it with itself.
            if file_a.path == file_b.path {
                continue;
            }

            // Canonical key so repeated paths in the input cannot emit the
            // same unordered pair twice.
            let key = if file_a.path <= file_b.path {
                (file_a.path.as_path(), file_b.path.as_path())
            } else {
                (file_b.path.as_path(), file_a.path.as_path())
            };
            if !seen_pairs.insert(key) {
                continue;
            }

            if duplicates.same_group(&file_a.path, &file_b.path) {
                continue;
            }

            let similarity = similarity_from_distance(hash_a.distance(hash_b));
            if similarity >= threshold {
                groups.push(FileGroup::similar(
                    GroupEntry::from(file_a),
                    GroupEntry::from(file_b),
                    similarity,
                ));
            }
        }
    }

    groups
}
