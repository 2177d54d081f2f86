//! Blur scoring via a Laplacian-variance / edge-density hybrid.
//!
//! The score is a 0-100 heuristic where higher means blurrier: sharp images
//! have high Laplacian variance and many strong edges, which drive both
//! partial scores toward 0. The threshold comparison downstream is
//! "score > threshold => flagged as blurry".
//!
//! Numerical safety is layered rather than nested: per-pixel values are
//! sanitized before accumulation, runaway accumulators restart the whole
//! accumulation, and the final score is picked from an ordered pipeline of
//! candidate estimators ending in a fixed default. A malformed image must
//! never abort a scan or produce an unbounded number.

/// Score returned when no meaningful estimate can be produced.
pub const DEFAULT_SCORE: f64 = 50.0;

/// Images are expected to be downscaled to fit inside this bound before
/// scoring; it caps convolution cost and guards the accumulated sums.
pub const MAX_ANALYSIS_DIM: u32 = 200;

/// Absolute Laplacian response above which a pixel counts as an edge.
const EDGE_RESPONSE_THRESHOLD: f64 = 30.0;

/// Running sums over the Laplacian responses of an image's interior.
///
/// Non-finite inputs are coerced to zero before accumulation; if the sums
/// themselves ever become non-finite the whole accumulation restarts from
/// zero, edge count included.
#[derive(Debug, Default, Clone, Copy)]
struct LaplacianAccum {
    sum: f64,
    sum_sq: f64,
    sum_abs: f64,
    edges: u64,
    count: u64,
}

impl LaplacianAccum {
    fn push(&mut self, value: f64) {
        let v = if value.is_finite() { value } else { 0.0 };

        self.sum += v;
        self.sum_sq += v * v;
        self.sum_abs += v.abs();
        if v.abs() > EDGE_RESPONSE_THRESHOLD {
            self.edges += 1;
        }
        self.count += 1;

        if !self.sum.is_finite() || !self.sum_sq.is_finite() || !self.sum_abs.is_finite() {
            // Full restart mid-image, not an abort.
            *self = Self::default();
        }
    }
}

/// Compute the blur score of a grayscale buffer.
///
/// Pure function of its input: identical pixel data always yields an
/// identical score, and the result is always within `[0, 100]`. Images too
/// small to have interior pixels (or with an inconsistent buffer length)
/// resolve to [`DEFAULT_SCORE`].
#[must_use]
pub fn score(pixels: &[u8], width: u32, height: u32) -> f64 {
    let (w, h) = (width as usize, height as usize);
    if w < 3 || h < 3 || pixels.len() != w * h {
        return DEFAULT_SCORE;
    }

    let mut accum = LaplacianAccum::default();

    // Discrete Laplacian [[0,-1,0],[-1,4,-1],[0,-1,0]] over the interior,
    // excluding the 1-pixel border.
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let center = f64::from(pixels[y * w + x]);
            let up = f64::from(pixels[(y - 1) * w + x]);
            let down = f64::from(pixels[(y + 1) * w + x]);
            let left = f64::from(pixels[y * w + x - 1]);
            let right = f64::from(pixels[y * w + x + 1]);

            accum.push(4.0 * center - up - down - left - right);
        }
    }

    if accum.count == 0 {
        return DEFAULT_SCORE;
    }

    let n = accum.count as f64;
    let mean = accum.sum / n;
    let avg_abs = accum.sum_abs / n;
    let edge_density = accum.edges as f64 / n;

    // Variance = E[x^2] - mean^2; a negative or non-finite value is a
    // floating-point edge case, fall back to the mean absolute response.
    let variance = accum.sum_sq / n - mean * mean;
    let variance = if variance.is_finite() && variance >= 0.0 {
        variance
    } else {
        avg_abs
    };

    let laplacian_score = (100.0 - variance / 2.0).clamp(0.0, 100.0);
    let edge_score = (100.0 - edge_density * 1000.0).clamp(0.0, 100.0);

    // Ordered estimator pipeline: hybrid, then edge-only, then the fixed
    // default. The first finite candidate wins.
    let candidates = [
        0.7 * laplacian_score + 0.3 * edge_score,
        edge_score,
        DEFAULT_SCORE,
    ];
    candidates
        .into_iter()
        .find(|c| c.is_finite())
        .unwrap_or(DEFAULT_SCORE)
        .clamp(0.0, 100.0)
}
