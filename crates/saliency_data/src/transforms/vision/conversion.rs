use crate::transforms::Transform;
use anyhow::{ensure, Context, Result};
use image::DynamicImage;
use tch::{Kind, Tensor};

// ============================================================================
// ToTensor
// ============================================================================

/// Converts an 8-bit image to a channel-first f32 tensor in [0.0, 1.0].
///
/// | Input Format  | Output Shape |
/// |---------------|--------------|
/// | Grayscale (L) | `[1, H, W]`  |
/// | RGB           | `[3, H, W]`  |
/// | Other         | `[3, H, W]`  |
///
/// Anything that is not L8 or RGB8 is converted to RGB first; run
/// `EnsureLuma` beforehand to get a single channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToTensor;

impl Transform<DynamicImage, Tensor> for ToTensor {
    fn apply(&self, img: DynamicImage) -> Result<Tensor> {
        let (width, height) = (img.width() as i64, img.height() as i64);
        ensure!(
            width > 0 && height > 0,
            "Image dimensions must be positive (got {}x{})",
            width,
            height
        );

        // Pixel buffers are interleaved HWC
        let tensor = match img {
            DynamicImage::ImageLuma8(gray) => {
                Tensor::from_slice(gray.as_raw()).reshape([1, height, width])
            }
            DynamicImage::ImageRgb8(rgb) => Tensor::from_slice(rgb.as_raw())
                .reshape([height, width, 3])
                .permute([2, 0, 1]),
            other => Tensor::from_slice(other.to_rgb8().as_raw())
                .reshape([height, width, 3])
                .permute([2, 0, 1]),
        };

        tensor
            .to_kind(Kind::Float)
            .f_div_scalar(255.0)
            .context("Failed to scale tensor values")
    }
}
