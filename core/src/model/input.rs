use image::imageops::FilterType;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// Normalized image tensor sent to score models
///
/// Layout is NHWC with a batch of one and three channels, values scaled to
/// [0, 1]. Grayscale and 16-bit sources are converted, so every model sees
/// the same shape regardless of the upload format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInput {
    /// `[1, height, width, 3]`
    pub shape: [usize; 4],

    /// Row-major samples, `height * width * 3` values
    pub data: Vec<f32>,
}

impl ModelInput {
    /// Resizes `image` to `size`×`size` and normalizes it
    pub fn from_image(image: &DynamicImage, size: u32) -> Self {
        let rgb = image
            .resize_exact(size, size, FilterType::Triangle)
            .to_rgb32f();
        let side = size as usize;
        Self {
            shape: [1, side, side, 3],
            data: rgb.into_raw(),
        }
    }

    /// Number of scalar values the shape describes
    pub fn element_count(&self) -> usize {
        self.shape.iter().product()
    }

    /// Mean of all samples; cheap summary used in debug logging
    pub fn mean(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.data.iter().sum::<f32>() / self.data.len() as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageBuffer, Luma};

    #[test]
    fn test_shape_and_length() {
        let img = DynamicImage::new_rgb8(300, 200);
        let input = ModelInput::from_image(&img, 224);

        assert_eq!(input.shape, [1, 224, 224, 3]);
        assert_eq!(input.data.len(), input.element_count());
    }

    #[test]
    fn test_grayscale_is_expanded_and_normalized() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(64, 64, Luma([255])));
        let input = ModelInput::from_image(&img, 32);

        assert_eq!(input.data.len(), 32 * 32 * 3);
        assert!(input.data.iter().all(|&v| (v - 1.0).abs() < 1e-6));
    }

    #[test]
    fn test_sixteen_bit_range() {
        let img = DynamicImage::ImageLuma16(ImageBuffer::<Luma<u16>, Vec<u16>>::from_pixel(
            64,
            64,
            Luma([32768]),
        ));
        let input = ModelInput::from_image(&img, 16);

        assert!((input.mean() - 0.5).abs() < 0.01);
        assert!(input.data.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }
}
