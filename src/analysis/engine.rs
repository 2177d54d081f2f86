//! Scan orchestration: walk, per-file analysis, grouping, assembly.
//!
//! # Pipeline
//!
//! 1. **Walking** - eager discovery of image files (the only fatally
//!    failing step).
//! 2. **AnalyzingFiles** - per file: decode + blur score, content digest,
//!    perceptual hash. Any failure, including a stat failure carried over
//!    from the walk, turns the file into an error finding and excludes it
//!    from every later stage; the scan continues. A progress event fires
//!    after each file, success or not.
//! 3. **GroupingSimilarity** - digest partition into duplicate groups,
//!    then the pairwise similarity scan over the surviving files.
//! 4. **Done** - results assembled into an [`AnalysisResult`].
//!
//! Per-file analysis runs on a bounded rayon pool; progress `current`
//! values come from an atomic completion counter, and findings are
//! id-stamped sequentially in discovery order afterwards, so output is
//! deterministic regardless of worker interleaving.
//!
//! Cancellation is a shared flag checked before each per-file step and
//! before grouping; a cancelled scan returns [`EngineError::Interrupted`]
//! rather than a partial result, since the result invariants only hold for
//! a completed scan.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use crate::analysis::blur;
use crate::analysis::grouping::{group_similar, DuplicatePartition};
use crate::analysis::model::{
    AnalysisResult, BlurFinding, ErrorFinding, ProgressEvent, ScanRequest, Thresholds,
};
use crate::progress::ProgressCallback;
use crate::scanner::perceptual::THUMB_SIZE;
use crate::scanner::{
    digest_file, discover, DiscoveredFile, ImageCrateDecoder, ImageDecoder, ImageFileRef,
    PerceptualHash, ScanError,
};

/// Scan pipeline phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    /// No scan in flight
    Idle,
    /// Discovering image files under the root
    Walking,
    /// Per-file decode, blur scoring, and fingerprinting
    AnalyzingFiles,
    /// Duplicate partitioning and pairwise similarity comparison
    GroupingSimilarity,
    /// Result assembled
    Done,
}

impl std::fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Walking => "walking",
            Self::AnalyzingFiles => "analyzing",
            Self::GroupingSimilarity => "grouping",
            Self::Done => "done",
        };
        write!(f, "{name}")
    }
}

/// Errors that abort a scan entirely.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    /// The walker failed; no partial result exists.
    #[error(transparent)]
    Walk(#[from] ScanError),

    /// The scan was cancelled before completing.
    #[error("Scan interrupted before completion")]
    Interrupted,
}

/// Invocation-scoped finding id sequence.
///
/// Owned by a single `run_scan` call so concurrent scans can never collide
/// on ids.
#[derive(Debug, Default)]
struct FindingIds {
    blur: usize,
    error: usize,
}

impl FindingIds {
    fn next_blur(&mut self) -> String {
        let id = format!("blur_{}", self.blur);
        self.blur += 1;
        id
    }

    fn next_error(&mut self) -> String {
        let id = format!("error_{}", self.error);
        self.error += 1;
        id
    }
}

/// Per-file analysis outcome, collected in discovery order.
enum FileOutcome {
    /// All three measurements succeeded
    Analyzed {
        score: f64,
        digest: String,
        hash: PerceptualHash,
    },
    /// Some step failed; the file becomes an error finding
    Failed { message: String },
    /// Cancellation hit before this file was processed
    Skipped,
}

/// The image-scanning analysis engine.
///
/// Configure thresholds, an optional progress callback, and an optional
/// cancellation flag, then call [`ScanEngine::run_scan`] per request. The
/// engine is immutable during a scan and can be reused across scans.
pub struct ScanEngine {
    thresholds: Thresholds,
    decoder: Arc<dyn ImageDecoder>,
    progress: Option<Arc<dyn ProgressCallback>>,
    cancel_flag: Option<Arc<AtomicBool>>,
    io_threads: usize,
}

impl std::fmt::Debug for ScanEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanEngine")
            .field("thresholds", &self.thresholds)
            .field("progress", &self.progress.as_ref().map(|_| "<callback>"))
            .field("cancel_flag", &self.cancel_flag)
            .field("io_threads", &self.io_threads)
            .finish_non_exhaustive()
    }
}

impl Default for ScanEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanEngine {
    /// Default number of worker threads for per-file analysis.
    /// Kept low to prevent disk thrashing on spinning media.
    pub const DEFAULT_IO_THREADS: usize = 4;

    /// Create an engine with default thresholds and the `image`-crate
    /// decoder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            thresholds: Thresholds::default(),
            decoder: Arc::new(ImageCrateDecoder),
            progress: None,
            cancel_flag: None,
            io_threads: Self::DEFAULT_IO_THREADS,
        }
    }

    /// Replace the decoder, e.g. with a test double.
    #[must_use]
    pub fn with_decoder(mut self, decoder: Arc<dyn ImageDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Set the cancellation flag; the engine checks it before each
    /// per-file step and before grouping.
    #[must_use]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel_flag = Some(flag);
        self
    }

    /// Set the worker thread count for per-file analysis.
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Configure detection thresholds; read-only once a scan starts.
    pub fn set_thresholds(&mut self, thresholds: Thresholds) {
        self.thresholds = thresholds;
    }

    /// Current detection thresholds.
    #[must_use]
    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    fn phase_start(&self, phase: ScanPhase, total: usize) {
        log::debug!("Phase {phase}: starting ({total} items)");
        if let Some(ref callback) = self.progress {
            callback.on_phase_start(phase, total);
        }
    }

    fn phase_end(&self, phase: ScanPhase) {
        if let Some(ref callback) = self.progress {
            callback.on_phase_end(phase);
        }
    }

    /// Run a full scan for `request`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Walk`] if the root cannot be listed (the
    /// only fatal failure) and [`EngineError::Interrupted`] if the
    /// cancellation flag was raised mid-scan. All per-file failures are
    /// recorded in the result's error findings instead.
    pub fn run_scan(&self, request: &ScanRequest) -> Result<AnalysisResult, EngineError> {
        log::info!(
            "Scanning {} (recurse: {}, blur > {}, similarity >= {}%)",
            request.root.display(),
            request.recurse,
            self.thresholds.blur,
            self.thresholds.similarity
        );

        self.phase_start(ScanPhase::Walking, 0);
        let files = discover(&request.root, request.recurse)?;
        self.phase_end(ScanPhase::Walking);

        let outcomes = self.analyze_files(&files);
        if self.is_cancelled() {
            return Err(EngineError::Interrupted);
        }

        let mut ids = FindingIds::default();
        let mut result = AnalysisResult::default();
        let mut digests: Vec<(ImageFileRef, String)> = Vec::new();
        let mut hashes: Vec<(ImageFileRef, PerceptualHash)> = Vec::new();

        for (discovered, outcome) in files.into_iter().zip(outcomes) {
            let file = discovered.file;
            match outcome {
                FileOutcome::Analyzed {
                    score,
                    digest,
                    hash,
                } => {
                    if score > self.thresholds.blur {
                        result.blur_findings.push(BlurFinding {
                            id: ids.next_blur(),
                            file: file.clone(),
                            score: score.round() as u8,
                        });
                    }
                    digests.push((file.clone(), digest));
                    hashes.push((file, hash));
                }
                FileOutcome::Failed { message } => {
                    log::warn!("Analysis failed for {}: {}", file.path.display(), message);
                    result.error_findings.push(ErrorFinding {
                        id: ids.next_error(),
                        file,
                        message,
                    });
                }
                // Unreachable when not cancelled; the cancellation check
                // above turns any skip into Interrupted.
                FileOutcome::Skipped => return Err(EngineError::Interrupted),
            }
        }

        if self.is_cancelled() {
            return Err(EngineError::Interrupted);
        }

        self.phase_start(ScanPhase::GroupingSimilarity, hashes.len());
        let partition = DuplicatePartition::from_digests(&digests);
        let similars = group_similar(&hashes, &partition, self.thresholds.similarity);
        result.groups = partition.groups;
        result.groups.extend(similars);
        self.phase_end(ScanPhase::GroupingSimilarity);

        log::info!(
            "Phase {}: {} blurry, {} groups, {} errors",
            ScanPhase::Done,
            result.blur_findings.len(),
            result.groups.len(),
            result.error_findings.len()
        );
        Ok(result)
    }

    /// Run per-file analysis on a bounded worker pool, preserving
    /// discovery order in the returned outcomes.
    fn analyze_files(&self, files: &[DiscoveredFile]) -> Vec<FileOutcome> {
        let total = files.len();
        self.phase_start(ScanPhase::AnalyzingFiles, total);

        let completed = AtomicUsize::new(0);
        let run = || {
            files
                .par_iter()
                .map(|discovered| {
                    if self.is_cancelled() {
                        return FileOutcome::Skipped;
                    }

                    let outcome = self.outcome_for(discovered);

                    // Progress is ordered by completion, not submission.
                    let current = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    if let Some(ref callback) = self.progress {
                        callback.on_file(&ProgressEvent::new(
                            current,
                            total,
                            discovered.file.file_name(),
                        ));
                    }
                    outcome
                })
                .collect()
        };

        let outcomes = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.io_threads)
            .build()
        {
            Ok(pool) => pool.install(run),
            Err(e) => {
                log::warn!("Failed to create analysis thread pool, using global pool: {e}");
                run()
            }
        };

        self.phase_end(ScanPhase::AnalyzingFiles);
        outcomes
    }

    /// Outcome for one walked entry. A file the walker could not stat is
    /// a failure without any further I/O.
    fn outcome_for(&self, discovered: &DiscoveredFile) -> FileOutcome {
        if let Some(ref message) = discovered.stat_error {
            return FileOutcome::Failed {
                message: message.clone(),
            };
        }

        match self.analyze_one(&discovered.file) {
            Ok((score, digest, hash)) => FileOutcome::Analyzed {
                score,
                digest,
                hash,
            },
            Err(message) => FileOutcome::Failed { message },
        }
    }

    /// Decode, score, and fingerprint one file. The first failing step
    /// wins; its message becomes the error finding.
    fn analyze_one(&self, file: &ImageFileRef) -> Result<(f64, String, PerceptualHash), String> {
        let gray = self
            .decoder
            .grayscale_fit(&file.path, blur::MAX_ANALYSIS_DIM, blur::MAX_ANALYSIS_DIM)
            .map_err(|e| e.to_string())?;
        let score = blur::score(&gray.pixels, gray.width, gray.height);

        let digest = digest_file(&file.path).map_err(|e| e.to_string())?;

        let thumb = self
            .decoder
            .grayscale_exact(&file.path, THUMB_SIZE, THUMB_SIZE)
            .map_err(|e| e.to_string())?;
        let hash = PerceptualHash::average_hash(&thumb);

        log::trace!(
            "{}: blur {:.1}, digest {}, hash {}",
            file.path.display(),
            score,
            &digest[..12],
            hash.to_bit_string()
        );
        Ok((score, digest, hash))
    }
}
