use crate::types::ImageFormat;
use chrono::{DateTime, Utc};
use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// Decoded upload produced by intake
///
/// Fields are private so the record cannot change after intake. The pixel
/// buffer is owned by the record and dropped with it when the pipeline run
/// ends; only [`ImageMetadata`] outlives the run.
#[derive(Debug, Clone)]
pub struct ImageRecord {
    pixels: DynamicImage,
    metadata: ImageMetadata,
}

impl ImageRecord {
    /// Wraps a decoded image
    ///
    /// Width, height, channel count and byte depth are read from the buffer
    /// itself so they are always consistent with it.
    pub(crate) fn new(
        pixels: DynamicImage,
        filename: &str,
        format: ImageFormat,
        dicom: Option<DicomSummary>,
    ) -> Self {
        let color = pixels.color();
        let channels = color.channel_count();
        let metadata = ImageMetadata {
            filename: filename.to_string(),
            format,
            width: pixels.width(),
            height: pixels.height(),
            channels,
            byte_depth: color.bytes_per_pixel() / channels.max(1),
            ingested_at: Utc::now(),
            dicom,
        };
        Self { pixels, metadata }
    }

    /// Decoded pixel buffer
    pub fn pixels(&self) -> &DynamicImage {
        &self.pixels
    }

    /// Pixel-free description of the record
    pub fn metadata(&self) -> &ImageMetadata {
        &self.metadata
    }

    pub fn width(&self) -> u32 {
        self.metadata.width
    }

    pub fn height(&self) -> u32 {
        self.metadata.height
    }

    pub fn channels(&self) -> u8 {
        self.metadata.channels
    }

    pub fn byte_depth(&self) -> u8 {
        self.metadata.byte_depth
    }

    pub fn filename(&self) -> &str {
        &self.metadata.filename
    }

    pub fn ingested_at(&self) -> DateTime<Utc> {
        self.metadata.ingested_at
    }
}

/// Everything about an ingested image except its pixels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMetadata {
    /// Filename as supplied by the uploader
    pub filename: String,

    /// Container format the bytes were decoded from
    pub format: ImageFormat,

    pub width: u32,
    pub height: u32,

    /// Samples per pixel (1 for grayscale, 3 for RGB, 4 with alpha)
    pub channels: u8,

    /// Bytes per sample (1 or 2)
    pub byte_depth: u8,

    /// When intake finished decoding
    pub ingested_at: DateTime<Utc>,

    /// Acquisition fields when the upload was DICOM
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dicom: Option<DicomSummary>,
}

/// Acquisition attributes kept from a DICOM upload
///
/// Only device and view fields are read; patient and institution tags are
/// never extracted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DicomSummary {
    pub modality: Option<String>,
    pub image_laterality: Option<String>,
    pub view_position: Option<String>,
    pub manufacturer: Option<String>,
    pub photometric_interpretation: Option<String>,
    pub number_of_frames: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_dimensions_match_buffer() {
        let img = DynamicImage::new_luma16(120, 80);
        let record = ImageRecord::new(img, "scan.png", ImageFormat::Png, None);

        assert_eq!(record.width(), 120);
        assert_eq!(record.height(), 80);
        assert_eq!(record.channels(), 1);
        assert_eq!(record.byte_depth(), 2);
        assert_eq!(record.filename(), "scan.png");
        assert_eq!(record.pixels().width(), record.width());
    }

    #[test]
    fn test_rgb_record() {
        let img = DynamicImage::new_rgb8(64, 64);
        let record = ImageRecord::new(img, "scan.jpg", ImageFormat::Jpeg, None);

        assert_eq!(record.channels(), 3);
        assert_eq!(record.byte_depth(), 1);
        assert_eq!(record.metadata().format, ImageFormat::Jpeg);
    }

    #[test]
    fn test_metadata_serializes_without_pixels() {
        let img = DynamicImage::new_luma8(64, 64);
        let record = ImageRecord::new(img, "scan.png", ImageFormat::Png, None);

        let json = serde_json::to_value(record.metadata()).unwrap();
        assert_eq!(json["filename"], "scan.png");
        assert_eq!(json["width"], 64);
        assert!(json.get("dicom").is_none());
        assert!(json.get("pixels").is_none());
    }
}
