//! Grayscale image decoding behind a trait seam.
//!
//! The engine never talks to a codec library directly; it asks an
//! [`ImageDecoder`] for grayscale samples at a requested size. Two variants
//! are needed: fit-inside (aspect preserved, used before blur scoring) and
//! force-fit (exact dimensions, used for the 8x8 average-hash thumbnail).
//! Production code uses [`ImageCrateDecoder`]; tests can supply their own
//! implementation to feed synthetic pixel data.

use std::path::Path;

use image::imageops::FilterType;
use thiserror::Error;

/// Decoded grayscale samples, row-major, one byte per pixel.
#[derive(Debug, Clone)]
pub struct GrayBuffer {
    /// Pixel intensities, `width * height` bytes
    pub pixels: Vec<u8>,
    /// Buffer width in pixels
    pub width: u32,
    /// Buffer height in pixels
    pub height: u32,
}

impl GrayBuffer {
    /// Wrap raw grayscale samples.
    ///
    /// # Panics
    ///
    /// Debug assertion fails if `pixels.len() != width * height`.
    #[must_use]
    pub fn new(pixels: Vec<u8>, width: u32, height: u32) -> Self {
        debug_assert_eq!(pixels.len(), (width as usize) * (height as usize));
        Self {
            pixels,
            width,
            height,
        }
    }
}

/// Errors that can occur while decoding an image file.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Failed to open or decode the image.
    #[error("Failed to decode image {0}: {1}")]
    Decode(String, #[source] image::ImageError),
}

/// Decodes image files to grayscale sample buffers.
///
/// This is the engine's only seam to the codec library; both operations
/// fail per file, never fatally.
pub trait ImageDecoder: Send + Sync {
    /// Decode to grayscale, scaled down to fit inside `max_width` x
    /// `max_height` with aspect ratio preserved. Images already inside the
    /// bounds are not upscaled.
    fn grayscale_fit(
        &self,
        path: &Path,
        max_width: u32,
        max_height: u32,
    ) -> Result<GrayBuffer, DecodeError>;

    /// Decode to grayscale at exactly `width` x `height`, ignoring aspect
    /// ratio.
    fn grayscale_exact(&self, path: &Path, width: u32, height: u32)
        -> Result<GrayBuffer, DecodeError>;
}

/// Default [`ImageDecoder`] backed by the `image` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageCrateDecoder;

impl ImageCrateDecoder {
    fn open(path: &Path) -> Result<image::DynamicImage, DecodeError> {
        image::open(path).map_err(|e| DecodeError::Decode(path.display().to_string(), e))
    }
}

impl ImageDecoder for ImageCrateDecoder {
    fn grayscale_fit(
        &self,
        path: &Path,
        max_width: u32,
        max_height: u32,
    ) -> Result<GrayBuffer, DecodeError> {
        let img = Self::open(path)?;
        let (w, h) = (img.width(), img.height());

        // resize() would upscale small images; keep them as-is.
        let img = if w > max_width || h > max_height {
            img.resize(max_width, max_height, FilterType::Triangle)
        } else {
            img
        };

        let gray = img.to_luma8();
        let (width, height) = gray.dimensions();
        Ok(GrayBuffer::new(gray.into_raw(), width, height))
    }

    fn grayscale_exact(
        &self,
        path: &Path,
        width: u32,
        height: u32,
    ) -> Result<GrayBuffer, DecodeError> {
        let img = Self::open(path)?;
        let gray = img
            .resize_exact(width, height, FilterType::Triangle)
            .to_luma8();
        Ok(GrayBuffer::new(gray.into_raw(), width, height))
    }
}
