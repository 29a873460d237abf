//! Image intake: raw upload bytes to an [`ImageRecord`].
//!
//! Intake only checks well-formedness: the bytes must decode and the
//! dimensions and file size must be within bounds. Whether the picture is
//! a mammogram is decided later by the validator.

pub mod dicom;
pub mod raster;
pub mod tags;

use crate::error::{Result, ScreeningError};
use crate::types::{ImageFormat, ImageRecord, PipelineConfig, SizeBounds};
use log::debug;

pub use dicom::{decode_dicom, dicom_magic_offset};
pub use raster::decode_raster;

/// Decodes and bounds-checks uploads
#[derive(Debug, Clone)]
pub struct Intake {
    bounds: SizeBounds,
    min_file_bytes: usize,
    max_file_bytes: usize,
}

impl Intake {
    /// Creates an intake stage using the bounds of `config`
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            bounds: config.size_bounds,
            min_file_bytes: config.min_file_bytes,
            max_file_bytes: config.max_file_bytes,
        }
    }

    /// Decodes `bytes` into an immutable [`ImageRecord`]
    ///
    /// DICOM is detected by its magic code; anything else goes through the
    /// raster decoders.
    ///
    /// # Errors
    ///
    /// - [`ScreeningError::UnreadableImage`] if the bytes are empty, shorter
    ///   than the configured byte floor, or cannot be decoded
    /// - [`ScreeningError::ImageTooLarge`] if the file or either dimension
    ///   exceeds the maximum
    /// - [`ScreeningError::ImageTooSmall`] if either dimension is below the
    ///   minimum
    pub fn ingest(&self, bytes: &[u8], filename: &str) -> Result<ImageRecord> {
        if bytes.is_empty() {
            return Err(ScreeningError::UnreadableImage("upload is empty".to_string()));
        }
        if bytes.len() > self.max_file_bytes {
            return Err(ScreeningError::ImageTooLarge(format!(
                "file is {:.1} MB, limit is {:.1} MB",
                bytes.len() as f64 / (1024.0 * 1024.0),
                self.max_file_bytes as f64 / (1024.0 * 1024.0)
            )));
        }
        if bytes.len() < self.min_file_bytes {
            return Err(ScreeningError::UnreadableImage(format!(
                "file is {} bytes, too short for an image (minimum {} bytes)",
                bytes.len(),
                self.min_file_bytes
            )));
        }

        let record = match dicom_magic_offset(bytes) {
            Some(offset) => {
                let (pixels, summary) = decode_dicom(bytes, offset, &self.bounds)?;
                ImageRecord::new(pixels, filename, ImageFormat::Dicom, Some(summary))
            }
            None => {
                let (pixels, format) = decode_raster(bytes, &self.bounds)?;
                ImageRecord::new(pixels, filename, format, None)
            }
        };

        debug!(
            "Ingested {}: {} {}x{} ({} channel(s), {} byte(s)/sample)",
            filename,
            record.metadata().format,
            record.width(),
            record.height(),
            record.channels(),
            record.byte_depth()
        );

        Ok(record)
    }
}

/// Decodes `bytes` with the bounds of `config`
///
/// Convenience wrapper around [`Intake::ingest`].
pub fn ingest(bytes: &[u8], filename: &str, config: &PipelineConfig) -> Result<ImageRecord> {
    Intake::new(config).ingest(bytes, filename)
}

/// Checks pixel dimensions against `bounds`
pub(crate) fn check_dimensions(width: u32, height: u32, bounds: &SizeBounds) -> Result<()> {
    if width == 0 || height == 0 || bounds.is_too_small(width, height) {
        return Err(ScreeningError::ImageTooSmall(format!(
            "{}x{} is below the minimum of {}x{}",
            width, height, bounds.min_width, bounds.min_height
        )));
    }
    if bounds.is_too_large(width, height) {
        return Err(ScreeningError::ImageTooLarge(format!(
            "{}x{} exceeds the maximum of {}x{}",
            width, height, bounds.max_width, bounds.max_height
        )));
    }
    Ok(())
}
