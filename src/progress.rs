//! Progress reporting: the callback seam plus an indicatif renderer.
//!
//! The engine only knows [`ProgressCallback`]; the CLI front-end installs
//! [`ConsoleProgress`] to draw a bar, and embedders can install anything
//! else (or nothing).

use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressStyle};

use crate::analysis::engine::ScanPhase;
use crate::analysis::model::ProgressEvent;

/// Receives progress updates during a scan.
///
/// Implementations must be thread-safe: per-file events are delivered from
/// worker threads in completion order.
pub trait ProgressCallback: Send + Sync {
    /// Called when a scan phase starts. `total` is the number of items the
    /// phase will process (0 when unknown, e.g. while walking).
    fn on_phase_start(&self, _phase: ScanPhase, _total: usize) {}

    /// Called after each file is processed, successfully or not.
    fn on_file(&self, event: &ProgressEvent);

    /// Called when a scan phase completes.
    fn on_phase_end(&self, _phase: ScanPhase) {}
}

/// Terminal progress bar for the analysis phase.
pub struct ConsoleProgress {
    bar: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl ConsoleProgress {
    /// Create a console progress reporter.
    ///
    /// When `quiet` is true nothing is drawn; the callback still accepts
    /// events so the engine needs no special casing.
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            bar: Mutex::new(None),
            quiet,
        }
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }
}

impl ProgressCallback for ConsoleProgress {
    fn on_phase_start(&self, phase: ScanPhase, total: usize) {
        if self.quiet || phase != ScanPhase::AnalyzingFiles {
            return;
        }

        let pb = ProgressBar::new(total as u64);
        pb.set_style(Self::bar_style());
        pb.set_message("Analyzing images");
        *self.bar.lock().unwrap() = Some(pb);
    }

    fn on_file(&self, event: &ProgressEvent) {
        if self.quiet {
            return;
        }

        if let Some(ref pb) = *self.bar.lock().unwrap() {
            pb.set_position(event.current as u64);
            pb.set_message(truncate_name(&event.filename, 30));
        }
    }

    fn on_phase_end(&self, phase: ScanPhase) {
        if self.quiet || phase != ScanPhase::AnalyzingFiles {
            return;
        }

        if let Some(pb) = self.bar.lock().unwrap().take() {
            pb.finish_with_message("Analysis complete");
        }
    }
}

/// Truncate a file name to at most `max_len` characters for display,
/// keeping the tail. Counts characters, not bytes, so multibyte names
/// never split mid-character.
fn truncate_name(name: &str, max_len: usize) -> String {
    let char_count = name.chars().count();
    if char_count <= max_len {
        return name.to_string();
    }

    let keep = max_len.saturating_sub(3);
    let tail: String = name.chars().skip(char_count - keep).collect();
    format!("...{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_name_short_passthrough() {
        assert_eq!(truncate_name("photo.jpg", 30), "photo.jpg");
    }

    #[test]
    fn test_truncate_name_long() {
        let long = "a_very_long_image_file_name_that_keeps_going.jpg";
        let out = truncate_name(long, 20);
        assert!(out.starts_with("..."));
        assert_eq!(out.len(), 20);
    }

    #[test]
    fn test_truncate_name_multibyte() {
        let long = "é".repeat(40);
        let out = truncate_name(&long, 30);

        assert!(out.starts_with("..."));
        assert_eq!(out.chars().count(), 30);
        assert!(out.chars().skip(3).all(|c| c == 'é'));
    }

    #[test]
    fn test_quiet_progress_accepts_events() {
        let progress = ConsoleProgress::new(true);
        progress.on_phase_start(ScanPhase::AnalyzingFiles, 10);
        progress.on_file(&ProgressEvent::new(1, 10, "a.jpg".to_string()));
        progress.on_phase_end(ScanPhase::AnalyzingFiles);
        assert!(progress.bar.lock().unwrap().is_none());
    }
}
