//! Raster decoding (PNG, JPEG, BMP, TIFF) through the `image` crate.

use crate::error::{Result, ScreeningError};
use crate::types::{ImageFormat, SizeBounds};
use image::{DynamicImage, ImageReader};
use std::io::Cursor;

use super::check_dimensions;

/// Decodes raster bytes after checking the header dimensions
///
/// Dimensions are read from the header before the pixel buffer is
/// allocated, so oversized uploads are refused without decoding them.
///
/// # Errors
///
/// Returns [`ScreeningError::UnreadableImage`] if the format is not
/// recognized or the data is corrupt, and [`ScreeningError::ImageTooLarge`]
/// / [`ScreeningError::ImageTooSmall`] if the dimensions are out of bounds.
pub fn decode_raster(bytes: &[u8], bounds: &SizeBounds) -> Result<(DynamicImage, ImageFormat)> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ScreeningError::UnreadableImage(format!("{}", e)))?;
    let format = reader
        .format()
        .ok_or_else(|| ScreeningError::UnreadableImage("unrecognized image format".to_string()))?;

    let (width, height) = reader.into_dimensions()?;
    check_dimensions(width, height, bounds)?;

    let img = image::load_from_memory_with_format(bytes, format)?;
    Ok((img, format.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{encode_jpeg, encode_png};

    #[test]
    fn test_png_decodes() {
        let bytes = encode_png(100, 80);
        let (img, format) = decode_raster(&bytes, &SizeBounds::default()).unwrap();
        assert_eq!(format, ImageFormat::Png);
        assert_eq!((img.width(), img.height()), (100, 80));
    }

    #[test]
    fn test_jpeg_decodes() {
        let bytes = encode_jpeg(96, 96);
        let (img, format) = decode_raster(&bytes, &SizeBounds::default()).unwrap();
        assert_eq!(format, ImageFormat::Jpeg);
        assert_eq!(img.width(), 96);
    }

    #[test]
    fn test_corrupt_bytes() {
        let result = decode_raster(&[0xFF, 0xFE, 0x00, 0x01], &SizeBounds::default());
        assert!(matches!(result, Err(ScreeningError::UnreadableImage(_))));
    }

    #[test]
    fn test_truncated_png() {
        let bytes = encode_png(100, 100);
        let result = decode_raster(&bytes[..bytes.len() / 2], &SizeBounds::default());
        assert!(matches!(result, Err(ScreeningError::UnreadableImage(_))));
    }

    #[test]
    fn test_bounds_checked_before_decode() {
        let bytes = encode_png(100, 100);
        let result = decode_raster(&bytes, &SizeBounds::square(16, 64));
        assert!(matches!(result, Err(ScreeningError::ImageTooLarge(_))));
    }
}
