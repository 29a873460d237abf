//! Native DICOM pixel decoding.
//!
//! Supports uncompressed pixel data only: 1 sample (MONOCHROME1/2) or
//! 3 samples (RGB), 8 or 16 bits allocated. Multi-frame objects yield their
//! first frame. Encapsulated (compressed) pixel data is refused as unreadable.

use crate::error::{Result, ScreeningError};
use crate::types::{DicomSummary, SizeBounds};
use dicom_object::InMemDicomObject;
use image::{DynamicImage, GrayImage, ImageBuffer, Luma, RgbImage};

use super::check_dimensions;
use super::tags::{
    get_int_value, get_string_value, get_u16_value, BITS_ALLOCATED, BITS_STORED, COLUMNS,
    IMAGE_LATERALITY, MANUFACTURER, MODALITY, NUMBER_OF_FRAMES, PHOTOMETRIC_INTERPRETATION,
    PIXEL_DATA, PLANAR_CONFIGURATION, ROWS, SAMPLES_PER_PIXEL, VIEW_POSITION,
};

const PREAMBLE_LEN: usize = 128;
const MAGIC: &[u8; 4] = b"DICM";

/// Returns the offset of the `DICM` magic code if `bytes` look like a DICOM file
///
/// DICOM files typically have a 128-byte preamble followed by `DICM`; some
/// writers omit the preamble and start directly with the magic code.
pub fn dicom_magic_offset(bytes: &[u8]) -> Option<usize> {
    if bytes.len() >= PREAMBLE_LEN + MAGIC.len()
        && &bytes[PREAMBLE_LEN..PREAMBLE_LEN + MAGIC.len()] == MAGIC
    {
        Some(PREAMBLE_LEN)
    } else if bytes.starts_with(MAGIC) {
        Some(0)
    } else {
        None
    }
}

/// Decodes the first frame of a DICOM file
///
/// `offset` is the position of the `DICM` magic code as returned by
/// [`dicom_magic_offset`].
pub fn decode_dicom(
    bytes: &[u8],
    offset: usize,
    bounds: &SizeBounds,
) -> Result<(DynamicImage, DicomSummary)> {
    let obj = dicom_object::from_reader(&bytes[offset..])?;
    let dcm: &InMemDicomObject = &obj;

    let rows = require_u16(dcm, ROWS, "Rows")?;
    let columns = require_u16(dcm, COLUMNS, "Columns")?;
    let (width, height) = (u32::from(columns), u32::from(rows));
    check_dimensions(width, height, bounds)?;

    let summary = DicomSummary {
        modality: get_string_value(dcm, MODALITY),
        image_laterality: get_string_value(dcm, IMAGE_LATERALITY),
        view_position: get_string_value(dcm, VIEW_POSITION),
        manufacturer: get_string_value(dcm, MANUFACTURER),
        photometric_interpretation: get_string_value(dcm, PHOTOMETRIC_INTERPRETATION),
        number_of_frames: get_int_value(dcm, NUMBER_OF_FRAMES).unwrap_or(1),
    };

    let layout = PixelLayout::from_dicom(dcm, width, height)?;
    let pixel_data = dcm
        .element(PIXEL_DATA)
        .map_err(|_| ScreeningError::UnreadableImage("DICOM has no PixelData".to_string()))?
        .to_bytes()
        .map_err(|_| {
            ScreeningError::UnreadableImage(
                "compressed DICOM pixel data is not supported".to_string(),
            )
        })?;

    let frame_len = layout.frame_len();
    if pixel_data.len() < frame_len {
        return Err(ScreeningError::UnreadableImage(format!(
            "DICOM PixelData holds {} bytes, expected at least {}",
            pixel_data.len(),
            frame_len
        )));
    }

    let monochrome1 = summary.photometric_interpretation.as_deref() == Some("MONOCHROME1");
    let mut img = layout.build(&pixel_data[..frame_len])?;
    if monochrome1 {
        img.invert();
    }

    Ok((img, summary))
}

fn require_u16(dcm: &InMemDicomObject, tag: dicom_core::Tag, name: &str) -> Result<u16> {
    get_u16_value(dcm, tag)
        .ok_or_else(|| ScreeningError::UnreadableImage(format!("DICOM is missing {}", name)))
}

/// Pixel module attributes needed to interpret one frame
#[derive(Debug, Clone, Copy)]
struct PixelLayout {
    width: u32,
    height: u32,
    samples_per_pixel: u16,
    bits_allocated: u16,
    bits_stored: u16,
    planar: bool,
}

impl PixelLayout {
    fn from_dicom(dcm: &InMemDicomObject, width: u32, height: u32) -> Result<Self> {
        let samples_per_pixel = get_u16_value(dcm, SAMPLES_PER_PIXEL).unwrap_or(1);
        let bits_allocated = get_u16_value(dcm, BITS_ALLOCATED).unwrap_or(16);
        let bits_stored = get_u16_value(dcm, BITS_STORED)
            .unwrap_or(bits_allocated)
            .clamp(1, bits_allocated.max(1));
        let planar = get_u16_value(dcm, PLANAR_CONFIGURATION).unwrap_or(0) == 1;

        match (samples_per_pixel, bits_allocated) {
            (1, 8) | (1, 16) | (3, 8) => Ok(Self {
                width,
                height,
                samples_per_pixel,
                bits_allocated,
                bits_stored,
                planar,
            }),
            _ => Err(ScreeningError::UnreadableImage(format!(
                "unsupported DICOM pixel layout: {} samples, {} bits allocated",
                samples_per_pixel, bits_allocated
            ))),
        }
    }

    fn frame_len(&self) -> usize {
        self.width as usize
            * self.height as usize
            * self.samples_per_pixel as usize
            * (self.bits_allocated as usize / 8)
    }

    fn build(&self, frame: &[u8]) -> Result<DynamicImage> {
        let inconsistent =
            || ScreeningError::UnreadableImage("DICOM pixel buffer size mismatch".to_string());

        match (self.samples_per_pixel, self.bits_allocated) {
            (1, 8) => GrayImage::from_raw(self.width, self.height, frame.to_vec())
                .map(DynamicImage::ImageLuma8)
                .ok_or_else(inconsistent),
            (1, 16) => {
                // Stretch e.g. 12-bit values to the full 16-bit range
                let shift = 16 - self.bits_stored.min(16);
                let samples: Vec<u16> = frame
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]) << shift)
                    .collect();
                ImageBuffer::<Luma<u16>, Vec<u16>>::from_raw(self.width, self.height, samples)
                    .map(DynamicImage::ImageLuma16)
                    .ok_or_else(inconsistent)
            }
            (3, 8) => {
                let interleaved = if self.planar {
                    interleave_planes(frame, (self.width * self.height) as usize)
                } else {
                    frame.to_vec()
                };
                RgbImage::from_raw(self.width, self.height, interleaved)
                    .map(DynamicImage::ImageRgb8)
                    .ok_or_else(inconsistent)
            }
            _ => Err(inconsistent()),
        }
    }
}

/// Converts RRR..GGG..BBB.. into RGBRGB..
fn interleave_planes(frame: &[u8], pixel_count: usize) -> Vec<u8> {
    let (r, rest) = frame.split_at(pixel_count);
    let (g, b) = rest.split_at(pixel_count);
    r.iter()
        .zip(g)
        .zip(b)
        .flat_map(|((&r, &g), &b)| [r, g, b])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{encode_dicom, DicomFixture};

    #[test]
    fn test_magic_offset_with_preamble() {
        let mut bytes = vec![0u8; 128];
        bytes.extend_from_slice(b"DICM");
        bytes.extend_from_slice(b"additional data");
        assert_eq!(dicom_magic_offset(&bytes), Some(128));
    }

    #[test]
    fn test_magic_offset_without_preamble() {
        assert_eq!(dicom_magic_offset(b"DICM\x02\x00"), Some(0));
    }

    #[test]
    fn test_magic_offset_not_dicom() {
        assert_eq!(dicom_magic_offset(b"This is not a DICOM file"), None);

        let mut bytes = vec![0u8; 128];
        bytes.extend_from_slice(b"NOTM");
        assert_eq!(dicom_magic_offset(&bytes), None);
    }

    #[test]
    fn test_decode_monochrome2_8bit() {
        let bytes = encode_dicom(&DicomFixture::mono8(96, 128));
        let offset = dicom_magic_offset(&bytes).unwrap();
        let (img, summary) = decode_dicom(&bytes, offset, &SizeBounds::default()).unwrap();

        assert_eq!((img.width(), img.height()), (96, 128));
        assert!(matches!(img, DynamicImage::ImageLuma8(_)));
        assert_eq!(summary.modality.as_deref(), Some("MG"));
        assert_eq!(summary.image_laterality.as_deref(), Some("L"));
        assert_eq!(summary.view_position.as_deref(), Some("CC"));
        assert_eq!(summary.number_of_frames, 1);
    }

    #[test]
    fn test_decode_12bit_is_stretched() {
        let fixture = DicomFixture::mono16(64, 64, 12, 4095);
        let bytes = encode_dicom(&fixture);
        let offset = dicom_magic_offset(&bytes).unwrap();
        let (img, _) = decode_dicom(&bytes, offset, &SizeBounds::default()).unwrap();

        let luma = img.as_luma16().unwrap();
        assert_eq!(luma.get_pixel(0, 0).0[0], 4095 << 4);
    }

    #[test]
    fn test_decode_monochrome1_inverted() {
        let mut fixture = DicomFixture::mono8(64, 64);
        fixture.photometric = "MONOCHROME1";
        fixture.fill = 10;
        let bytes = encode_dicom(&fixture);
        let offset = dicom_magic_offset(&bytes).unwrap();
        let (img, _) = decode_dicom(&bytes, offset, &SizeBounds::default()).unwrap();

        assert_eq!(img.as_luma8().unwrap().get_pixel(5, 5).0[0], 245);
    }

    #[test]
    fn test_decode_rejects_small_dimensions() {
        let bytes = encode_dicom(&DicomFixture::mono8(32, 32));
        let offset = dicom_magic_offset(&bytes).unwrap();
        let result = decode_dicom(&bytes, offset, &SizeBounds::default());
        assert!(matches!(result, Err(ScreeningError::ImageTooSmall(_))));
    }

    #[test]
    fn test_decode_short_pixel_data() {
        let mut fixture = DicomFixture::mono8(64, 64);
        fixture.truncate_pixels = true;
        let bytes = encode_dicom(&fixture);
        let offset = dicom_magic_offset(&bytes).unwrap();
        let result = decode_dicom(&bytes, offset, &SizeBounds::default());
        assert!(matches!(result, Err(ScreeningError::UnreadableImage(_))));
    }

    #[test]
    fn test_decode_garbage_after_magic() {
        let mut bytes = vec![0u8; 128];
        bytes.extend_from_slice(b"DICM");
        bytes.extend_from_slice(&[0xAB; 64]);
        let result = decode_dicom(&bytes, 128, &SizeBounds::default());
        assert!(matches!(result, Err(ScreeningError::UnreadableImage(_))));
    }

    #[test]
    fn test_interleave_planes() {
        let planar = [1, 2, 10, 20, 100, 200];
        assert_eq!(interleave_planes(&planar, 2), vec![1, 10, 100, 2, 20, 200]);
    }
}
