use crate::transforms::Transform;
use anyhow::{Context, Result};
use image::{DynamicImage, ImageReader};
use std::path::{Path, PathBuf};

// ============================================================================
// LoadImage
// ============================================================================

/// Decodes an image file from disk.
///
/// The format is sniffed from the file contents (falling back to the
/// extension), so a PNG saved under a `.jpg` name still decodes. The file is
/// opened for the duration of the call only.
///
/// # Input/Output
/// - **Input**: `PathBuf` - File path to image
/// - **Output**: `DynamicImage` - in whatever colour type the file stores
///
/// # Example
/// ```ignore
/// let rgb = LoadImage.then(EnsureRGB).apply(path)?;
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadImage;

impl Transform<PathBuf, DynamicImage> for LoadImage {
    fn apply(&self, path: PathBuf) -> Result<DynamicImage> {
        ImageReader::open(&path)
            .with_context(|| format!("Failed to open image: {}", path.display()))?
            .with_guessed_format()
            .with_context(|| format!("Failed to read image header: {}", path.display()))?
            .decode()
            .with_context(|| format!("Failed to decode image: {}", path.display()))
    }
}

/// Reads `(width, height)` from the image header without decoding pixels.
pub fn read_dimensions(path: &Path) -> Result<(u32, u32)> {
    ImageReader::open(path)
        .with_context(|| format!("Failed to open image: {}", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("Failed to read image header: {}", path.display()))?
        .into_dimensions()
        .with_context(|| format!("Failed to read image dimensions: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb, RgbImage};
    use tempfile::{tempdir, NamedTempFile};

    fn create_test_image() -> Result<NamedTempFile> {
        let mut test_img = RgbImage::new(4, 3);
        test_img.put_pixel(0, 0, Rgb([255, 0, 0]));
        test_img.put_pixel(1, 1, Rgb([0, 255, 0]));
        test_img.put_pixel(3, 2, Rgb([0, 0, 255]));

        let temp_file = NamedTempFile::with_suffix(".png")?;
        test_img.save(temp_file.path())?;
        Ok(temp_file)
    }

    #[test]
    fn test_load_image() -> Result<()> {
        let temp_file = create_test_image()?;
        let loaded_image = LoadImage.apply(temp_file.path().to_path_buf())?;

        assert_eq!(loaded_image.dimensions(), (4, 3));
        let rgb = loaded_image.to_rgb8();
        assert_eq!(rgb.get_pixel(0, 0), &Rgb([255, 0, 0]));
        assert_eq!(rgb.get_pixel(1, 1), &Rgb([0, 255, 0]));
        assert_eq!(rgb.get_pixel(3, 2), &Rgb([0, 0, 255]));
        Ok(())
    }

    #[test]
    fn test_read_dimensions_is_width_then_height() -> Result<()> {
        let temp_file = create_test_image()?;
        assert_eq!(read_dimensions(temp_file.path())?, (4, 3));
        Ok(())
    }

    #[test]
    fn test_error_handling() -> Result<()> {
        let dir = tempdir()?;
        assert!(LoadImage.apply(dir.path().join("nonexistent.jpg")).is_err());

        let corrupt = dir.path().join("corrupt.png");
        std::fs::write(&corrupt, b"definitely not a png")?;
        assert!(LoadImage.apply(corrupt.clone()).is_err());
        assert!(read_dimensions(&corrupt).is_err());
        Ok(())
    }
}
