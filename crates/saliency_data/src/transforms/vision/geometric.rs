use crate::dataloader::worker_gen_range;
use crate::transforms::Transform;
use anyhow::{anyhow, ensure, Result};
use image::{imageops::FilterType, DynamicImage, GrayImage, ImageBuffer, Luma, RgbImage};

// ============================================================================
// EnsureRGB / EnsureLuma
// ============================================================================

/// Ensures that the image is 3-channel 8-bit RGB. Alpha is discarded.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnsureRGB;

impl Transform<DynamicImage, DynamicImage> for EnsureRGB {
    fn apply(&self, img: DynamicImage) -> Result<DynamicImage> {
        Ok(match img {
            DynamicImage::ImageRgb8(_) => img,
            _ => DynamicImage::ImageRgb8(img.to_rgb8()),
        })
    }
}

/// Ensures that the image is single-channel 8-bit luma.
///
/// Colour images are converted with the ITU-R 601-2 weights in 16-bit fixed
/// point, `L = (R * 19595 + G * 38470 + B * 7471 + 0x8000) >> 16`.
/// 8-bit grey images keep their values (alpha dropped). 16-bit grey values
/// are clipped at 255, not rescaled.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnsureLuma;

impl EnsureLuma {
    #[inline]
    fn luma601(r: u8, g: u8, b: u8) -> u8 {
        ((r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000) >> 16) as u8
    }
}

impl Transform<DynamicImage, DynamicImage> for EnsureLuma {
    fn apply(&self, img: DynamicImage) -> Result<DynamicImage> {
        let luma = match img {
            DynamicImage::ImageLuma8(_) => return Ok(img),
            DynamicImage::ImageLumaA8(_) => img.to_luma8(),
            DynamicImage::ImageLuma16(_) | DynamicImage::ImageLumaA16(_) => {
                let wide = img.to_luma16();
                let (width, height) = wide.dimensions();
                let pixels = wide.pixels().map(|p| p[0].min(255) as u8).collect::<Vec<u8>>();
                GrayImage::from_raw(width, height, pixels)
                    .ok_or_else(|| anyhow!("Luma buffer does not match {}x{}", width, height))?
            }
            other => {
                let rgb = other.to_rgb8();
                let (width, height) = rgb.dimensions();
                let pixels = rgb
                    .pixels()
                    .map(|p| Self::luma601(p[0], p[1], p[2]))
                    .collect::<Vec<u8>>();
                GrayImage::from_raw(width, height, pixels)
                    .ok_or_else(|| anyhow!("Luma buffer does not match {}x{}", width, height))?
            }
        };
        Ok(DynamicImage::ImageLuma8(luma))
    }
}

// ============================================================================
// Resize
// ============================================================================

/// Resizes an image to exactly `width x height`, ignoring the aspect ratio.
///
/// # Filter Types
/// - `Nearest`: Nearest neighbour, fastest
/// - `Triangle`: Bilinear filter (antialiased when shrinking)
/// - `CatmullRom`: Bicubic sharpening
/// - `Gaussian`: Blurring/smoothing
/// - `Lanczos3`: Lanczos with window 3, highest quality re-sampling but slowest.
///
/// # Examples
/// ``` ignore
/// let resize = Resize::square(352)?; // bilinear, 352x352
/// let resized = resize.apply(img)?;
/// ```
#[derive(Debug, Clone)]
pub struct Resize {
    width: u32,
    height: u32,
    filter: FilterType,
}

impl Resize {
    pub fn new(width: u32, height: u32, filter: FilterType) -> Result<Self> {
        ensure!(
            width > 0 && height > 0,
            "Image dimensions must be positive after resizing (got {}x{})",
            width,
            height
        );
        Ok(Self {
            width,
            height,
            filter,
        })
    }

    /// Bilinear resize to `size x size`.
    pub fn square(size: u32) -> Result<Self> {
        Self::new(size, size, FilterType::Triangle)
    }
}

impl Transform<DynamicImage, DynamicImage> for Resize {
    fn apply(&self, img: DynamicImage) -> Result<DynamicImage> {
        if img.width() == self.width && img.height() == self.height {
            return Ok(img);
        }
        Ok(img.resize_exact(self.width, self.height, self.filter))
    }
}

// ============================================================================
// RandomRotation
// ============================================================================

/// Rotates the image about its centre by an angle drawn uniformly from
/// `[-degrees, degrees]`.
///
/// Positive angles rotate counter-clockwise. The canvas keeps its size, each
/// output pixel takes its nearest source pixel, and pixels that map outside
/// the source are filled with zero.
///
/// The angle comes from the worker RNG, so rotations are reproducible under a
/// seeded `DataLoader`.
#[derive(Debug, Clone)]
pub struct RandomRotation {
    degrees: f64,
}

impl RandomRotation {
    pub fn new(degrees: f64) -> Result<Self> {
        ensure!(
            degrees.is_finite() && degrees >= 0.0,
            "Rotation range must be a non-negative number of degrees (got {})",
            degrees
        );
        Ok(Self { degrees })
    }

    /// Rotates by exactly `angle` degrees.
    pub fn rotate(img: DynamicImage, angle: f64) -> Result<DynamicImage> {
        if angle == 0.0 {
            return Ok(img);
        }
        Ok(match img {
            DynamicImage::ImageLuma8(gray) => {
                let (w, h) = gray.dimensions();
                let raw = rotate_nearest(gray.as_raw(), w, h, 1, angle);
                DynamicImage::ImageLuma8(
                    ImageBuffer::<Luma<u8>, _>::from_raw(w, h, raw)
                        .ok_or_else(|| anyhow!("Rotated buffer does not match {}x{}", w, h))?,
                )
            }
            other => {
                let rgb = other.to_rgb8();
                let (w, h) = rgb.dimensions();
                let raw = rotate_nearest(rgb.as_raw(), w, h, 3, angle);
                DynamicImage::ImageRgb8(
                    RgbImage::from_raw(w, h, raw)
                        .ok_or_else(|| anyhow!("Rotated buffer does not match {}x{}", w, h))?,
                )
            }
        })
    }
}

impl Transform<DynamicImage, DynamicImage> for RandomRotation {
    fn apply(&self, img: DynamicImage) -> Result<DynamicImage> {
        let angle = worker_gen_range(-self.degrees, self.degrees);
        Self::rotate(img, angle)
    }
}

/// Inverse-maps every output pixel centre into the source and copies the
/// nearest pixel; out-of-bounds pixels stay zero.
fn rotate_nearest(src: &[u8], width: u32, height: u32, channels: usize, angle: f64) -> Vec<u8> {
    let (w, h) = (width as usize, height as usize);
    let mut dst = vec![0u8; src.len()];
    let (sin, cos) = angle.to_radians().sin_cos();
    let cx = width as f64 / 2.0;
    let cy = height as f64 / 2.0;

    for y in 0..h {
        let dy = y as f64 + 0.5 - cy;
        for x in 0..w {
            let dx = x as f64 + 0.5 - cx;
            let sx = (cos * dx - sin * dy + cx).floor();
            let sy = (sin * dx + cos * dy + cy).floor();
            if sx < 0.0 || sy < 0.0 || sx >= width as f64 || sy >= height as f64 {
                continue;
            }
            let src_idx = (sy as usize * w + sx as usize) * channels;
            let dst_idx = (y * w + x) * channels;
            dst[dst_idx..dst_idx + channels].copy_from_slice(&src[src_idx..src_idx + channels]);
        }
    }
    dst
}
