//! Perceptual image hashing for similarity detection.
//!
//! Implements the average hash: an image is force-fit to an 8x8 grayscale
//! thumbnail and each pixel contributes one bit, set when the pixel is
//! brighter than the thumbnail's mean intensity. Images with similar visual
//! structure produce hashes with small Hamming distance regardless of minor
//! recompression, resizing, or color shifts.
//!
//! The bit layout (and the fixed 64-bit length that follows from the 8x8
//! thumbnail) is part of the engine's contract: the calibrated
//! distance-to-similarity curve in [`crate::analysis::grouping`] assumes it.

use super::GrayBuffer;

/// Thumbnail edge length for average hashing.
pub const THUMB_SIZE: u32 = 8;

/// Number of bits in a standard average hash.
pub const HASH_BITS: usize = (THUMB_SIZE * THUMB_SIZE) as usize;

/// Fixed-length binary fingerprint of an image's coarse structure.
///
/// Bits are packed most-significant-bit first; the bit count is always a
/// multiple of 8 (64 for the standard 8x8 thumbnail).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PerceptualHash {
    bits: Vec<u8>,
}

impl PerceptualHash {
    /// Compute the average hash of a grayscale thumbnail.
    ///
    /// One bit per sample: `1` if the pixel is strictly brighter than the
    /// mean intensity, else `0`. Callers normally pass the decoder's
    /// force-fit [`THUMB_SIZE`] x [`THUMB_SIZE`] buffer.
    #[must_use]
    pub fn average_hash(thumb: &GrayBuffer) -> Self {
        let samples = &thumb.pixels;
        if samples.is_empty() {
            return Self { bits: Vec::new() };
        }

        let sum: u64 = samples.iter().map(|&p| u64::from(p)).sum();
        let mean = sum as f64 / samples.len() as f64;

        let mut bits = vec![0u8; samples.len().div_ceil(8)];
        for (i, &p) in samples.iter().enumerate() {
            if f64::from(p) > mean {
                bits[i / 8] |= 0x80 >> (i % 8);
            }
        }

        Self { bits }
    }

    /// Build a hash from packed bytes. Intended for tests and callers that
    /// persist hashes externally.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bits: bytes.to_vec(),
        }
    }

    /// Number of bits in this hash.
    #[must_use]
    pub fn len_bits(&self) -> usize {
        self.bits.len() * 8
    }

    /// Packed hash bytes, most-significant-bit first.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }

    /// Hamming distance: the count of differing bit positions.
    ///
    /// # Panics
    ///
    /// Panics if the hashes have different lengths. A length mismatch means
    /// two different hash configurations were mixed in one comparison; that
    /// is a caller bug, not bad input data, so it fails loudly instead of
    /// being silently recovered.
    #[must_use]
    pub fn distance(&self, other: &Self) -> u32 {
        assert_eq!(
            self.len_bits(),
            other.len_bits(),
            "Hamming distance requires equal-length hashes ({} vs {} bits)",
            self.len_bits(),
            other.len_bits()
        );

        self.bits
            .iter()
            .zip(&other.bits)
            .map(|(a, b)| (a ^ b).count_ones())
            .sum()
    }

    /// Render the hash as a '0'/'1' string, useful for logs and debugging.
    #[must_use]
    pub fn to_bit_string(&self) -> String {
        let mut out = String::with_capacity(self.len_bits());
        for byte in &self.bits {
            for shift in (0..8).rev() {
                out.push(if (byte >> shift) & 1 == 1 { '1' } else { '0' });
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(pixels: Vec<u8>, w: u32, h: u32) -> GrayBuffer {
        GrayBuffer::new(pixels, w, h)
    }

    #[test]
    fn test_uniform_thumbnail_hashes_to_zero() {
        // No pixel is strictly brighter than the mean, so every bit is 0.
        let hash = PerceptualHash::average_hash(&buffer(vec![128u8; 64], 8, 8));
        assert_eq!(hash.len_bits(), HASH_BITS);
        assert!(hash.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_half_bright_thumbnail_sets_bright_bits() {
        let mut pixels = vec![0u8; 64];
        for p in pixels.iter_mut().take(32) {
            *p = 255;
        }
        let hash = PerceptualHash::average_hash(&buffer(pixels, 8, 8));

        let bit_string = hash.to_bit_string();
        assert_eq!(&bit_string[..32], "1".repeat(32));
        assert_eq!(&bit_string[32..], "0".repeat(32));
    }

    #[test]
    fn test_distance_symmetric_and_zero_on_self() {
        let a = PerceptualHash::from_bytes(&[0b1010_1010; 8]);
        let b = PerceptualHash::from_bytes(&[0b1010_1011; 8]);

        assert_eq!(a.distance(&a), 0);
        assert_eq!(a.distance(&b), b.distance(&a));
        assert_eq!(a.distance(&b), 8);
    }

    #[test]
    #[should_panic(expected = "equal-length hashes")]
    fn test_distance_length_contract() {
        let a = PerceptualHash::from_bytes(&[0u8; 8]);
        let b = PerceptualHash::from_bytes(&[0u8; 4]);
        let _ = a.distance(&b);
    }

    #[test]
    fn test_similar_structure_small_distance() {
        // Left-bright vs left-bright with one flipped sample.
        let mut left_bright = vec![0u8; 64];
        for row in 0..8 {
            for col in 0..4 {
                left_bright[row * 8 + col] = 200;
            }
        }
        let mut nudged = left_bright.clone();
        nudged[0] = 0;

        let a = PerceptualHash::average_hash(&buffer(left_bright, 8, 8));
        let b = PerceptualHash::average_hash(&buffer(nudged, 8, 8));
        assert!(a.distance(&b) <= 2);
    }

    #[test]
    fn test_bit_string_round_trip_length() {
        let hash = PerceptualHash::from_bytes(&[0xF0, 0x0F]);
        assert_eq!(hash.to_bit_string(), "1111000000001111");
    }
}
