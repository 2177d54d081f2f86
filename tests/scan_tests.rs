//! End-to-end scan tests over real temp directories.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use lumascan::analysis::{
    EngineError, GroupKind, ProgressEvent, ScanEngine, ScanRequest, Thresholds,
};
use lumascan::progress::ProgressCallback;
use lumascan::scanner::decoder::{DecodeError, GrayBuffer, ImageDecoder};
use tempfile::tempdir;

/// Save a uniform gray image; scores maximally blurry (no edges at all).
fn save_uniform(path: &Path, size: u32) {
    let img = image::GrayImage::from_fn(size, size, |_, _| image::Luma([128u8]));
    img.save(path).unwrap();
}

/// Save a high-contrast checkerboard; scores sharp.
fn save_checkerboard(path: &Path, size: u32) {
    let img = image::GrayImage::from_fn(size, size, |x, y| {
        if (x / 8 + y / 8) % 2 == 0 {
            image::Luma([255u8])
        } else {
            image::Luma([0u8])
        }
    });
    img.save(path).unwrap();
}

#[test]
fn test_end_to_end_scenario() {
    let dir = tempdir().unwrap();
    let blurry = dir.path().join("blurry.png");
    let dup_a = dir.path().join("dup_a.png");
    let dup_b = dir.path().join("dup_b.png");
    let corrupt = dir.path().join("corrupt.jpg");

    save_uniform(&blurry, 64);
    save_checkerboard(&dup_a, 64);
    fs::copy(&dup_a, &dup_b).unwrap();
    fs::write(&corrupt, b"this is not an image").unwrap();

    let engine = ScanEngine::new();
    let result = engine
        .run_scan(&ScanRequest::new(dir.path().to_path_buf(), false))
        .unwrap();

    // Exactly one blurry file: the uniform image.
    assert_eq!(result.blur_findings.len(), 1);
    assert_eq!(result.blur_findings[0].file.path, blurry);
    assert!(result.blur_findings[0].score > 15);
    assert_eq!(result.blur_findings[0].id, "blur_0");

    // Exactly one group: the byte-identical pair. Its members would also
    // qualify as perceptually similar, so this doubles as the exclusion
    // check.
    assert_eq!(result.groups.len(), 1);
    assert_eq!(result.groups[0].kind, GroupKind::Duplicate);
    assert_eq!(result.groups[0].similarity, 100);
    assert_eq!(result.groups[0].files.len(), 2);
    assert!(result.groups[0].contains(&dup_a));
    assert!(result.groups[0].contains(&dup_b));

    // Exactly one error: the corrupt file, absent everywhere else.
    assert_eq!(result.error_findings.len(), 1);
    assert_eq!(result.error_findings[0].file.path, corrupt);
    assert_eq!(result.error_findings[0].id, "error_0");
    assert!(result.blur_findings.iter().all(|f| f.file.path != corrupt));
    assert!(result.groups.iter().all(|g| !g.contains(&corrupt)));
}

#[test]
fn test_empty_folder_returns_empty_result() {
    let dir = tempdir().unwrap();

    let engine = ScanEngine::new();
    let result = engine
        .run_scan(&ScanRequest::new(dir.path().to_path_buf(), true))
        .unwrap();

    assert!(result.blur_findings.is_empty());
    assert!(result.groups.is_empty());
    assert!(result.error_findings.is_empty());
}

#[test]
fn test_non_image_files_are_ignored() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("readme.txt"), b"text").unwrap();
    fs::write(dir.path().join("data.bin"), b"\x00\x01\x02").unwrap();

    let engine = ScanEngine::new();
    let result = engine
        .run_scan(&ScanRequest::new(dir.path().to_path_buf(), false))
        .unwrap();

    assert!(result.is_clean());
}

#[test]
fn test_missing_root_fails_fatally() {
    let engine = ScanEngine::new();
    let err = engine
        .run_scan(&ScanRequest::new(PathBuf::from("/no/such/root"), true))
        .unwrap_err();

    assert!(matches!(err, EngineError::Walk(_)));
}

#[test]
fn test_recursion_flag_controls_depth() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("nested");
    fs::create_dir(&nested).unwrap();
    save_uniform(&dir.path().join("top.png"), 32);
    save_uniform(&nested.join("deep.png"), 32);

    let engine = ScanEngine::new();

    let flat = engine
        .run_scan(&ScanRequest::new(dir.path().to_path_buf(), false))
        .unwrap();
    assert_eq!(flat.blur_findings.len(), 1);

    let deep = engine
        .run_scan(&ScanRequest::new(dir.path().to_path_buf(), true))
        .unwrap();
    assert_eq!(deep.blur_findings.len(), 2);
}

#[test]
fn test_pre_cancelled_scan_is_interrupted() {
    let dir = tempdir().unwrap();
    save_uniform(&dir.path().join("one.png"), 32);

    let flag = Arc::new(AtomicBool::new(true));
    let engine = ScanEngine::new().with_cancel_flag(flag);

    let err = engine
        .run_scan(&ScanRequest::new(dir.path().to_path_buf(), false))
        .unwrap_err();
    assert!(matches!(err, EngineError::Interrupted));
}

/// Progress collector recording every event delivered.
#[derive(Default)]
struct CollectingProgress {
    events: Mutex<Vec<ProgressEvent>>,
}

impl ProgressCallback for CollectingProgress {
    fn on_file(&self, event: &ProgressEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

#[test]
fn test_progress_event_per_file_including_failures() {
    let dir = tempdir().unwrap();
    save_uniform(&dir.path().join("a.png"), 32);
    save_checkerboard(&dir.path().join("b.png"), 32);
    fs::write(dir.path().join("broken.jpg"), b"garbage").unwrap();

    let progress = Arc::new(CollectingProgress::default());
    let engine = ScanEngine::new().with_progress(Arc::clone(&progress) as Arc<dyn ProgressCallback>);

    engine
        .run_scan(&ScanRequest::new(dir.path().to_path_buf(), false))
        .unwrap();

    let events = progress.events.lock().unwrap();
    assert_eq!(events.len(), 3);

    // Completion-ordered: current values are unique and cover 1..=total.
    let mut currents: Vec<usize> = events.iter().map(|e| e.current).collect();
    currents.sort_unstable();
    assert_eq!(currents, vec![1, 2, 3]);
    assert!(events.iter().all(|e| e.total == 3));
    assert!(events
        .iter()
        .any(|e| (e.percentage - 100.0).abs() < f64::EPSILON));
}

/// Decoder double mapping file names to synthetic grayscale buffers, used
/// to engineer exact hash distances that real codecs make awkward.
struct StubDecoder {
    thumbs: HashMap<String, Vec<u8>>,
}

impl StubDecoder {
    fn new(thumbs: HashMap<String, Vec<u8>>) -> Self {
        Self { thumbs }
    }

    fn name_of(path: &Path) -> String {
        path.file_name().unwrap().to_string_lossy().into_owned()
    }
}

impl ImageDecoder for StubDecoder {
    fn grayscale_fit(
        &self,
        _path: &Path,
        _max_width: u32,
        _max_height: u32,
    ) -> Result<GrayBuffer, DecodeError> {
        // Sharp enough to never trip the blur threshold.
        let pixels: Vec<u8> = (0..16 * 16)
            .map(|i| if (i % 16 + i / 16) % 2 == 0 { 255 } else { 0 })
            .collect();
        Ok(GrayBuffer::new(pixels, 16, 16))
    }

    fn grayscale_exact(
        &self,
        path: &Path,
        width: u32,
        height: u32,
    ) -> Result<GrayBuffer, DecodeError> {
        let pixels = self.thumbs[&Self::name_of(path)].clone();
        assert_eq!(pixels.len(), (width * height) as usize);
        Ok(GrayBuffer::new(pixels, width, height))
    }
}

/// Thumbnail whose average hash has exactly the given bright positions.
fn thumb_with_bright(positions: &[usize]) -> Vec<u8> {
    let mut pixels = vec![0u8; 64];
    for &p in positions {
        pixels[p] = 255;
    }
    pixels
}

#[test]
fn test_raising_similarity_threshold_reduces_groups() {
    let dir = tempdir().unwrap();
    // Distinct bytes so no duplicate group interferes.
    fs::write(dir.path().join("a.jpg"), b"file a").unwrap();
    fs::write(dir.path().join("b.jpg"), b"file b").unwrap();
    fs::write(dir.path().join("c.jpg"), b"file c").unwrap();

    // A and B differ in 5 bit positions: distance 5 -> similarity 83.
    // C is far from both.
    let a: Vec<usize> = (0..32).collect();
    let b: Vec<usize> = (0..27).collect();
    let c: Vec<usize> = (40..64).collect();
    let thumbs = HashMap::from([
        ("a.jpg".to_string(), thumb_with_bright(&a)),
        ("b.jpg".to_string(), thumb_with_bright(&b)),
        ("c.jpg".to_string(), thumb_with_bright(&c)),
    ]);

    let run_with = |similarity: u8| {
        let mut engine =
            ScanEngine::new().with_decoder(Arc::new(StubDecoder::new(thumbs.clone())));
        engine.set_thresholds(Thresholds {
            blur: 15.0,
            similarity,
        });
        engine
            .run_scan(&ScanRequest::new(dir.path().to_path_buf(), false))
            .unwrap()
    };

    let at_70 = run_with(70);
    assert_eq!(at_70.groups.len(), 1);
    assert_eq!(at_70.groups[0].kind, GroupKind::Similar);
    assert_eq!(at_70.groups[0].similarity, 83);

    let at_95 = run_with(95);
    assert!(at_95.groups.is_empty());
}

#[test]
fn test_json_serialization_of_result() {
    let dir = tempdir().unwrap();
    save_uniform(&dir.path().join("soft.png"), 32);

    let engine = ScanEngine::new();
    let result = engine
        .run_scan(&ScanRequest::new(dir.path().to_path_buf(), false))
        .unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert!(json["blur_findings"].is_array());
    assert!(json["groups"].is_array());
    assert!(json["error_findings"].is_array());
    assert_eq!(json["blur_findings"][0]["id"], "blur_0");
}
