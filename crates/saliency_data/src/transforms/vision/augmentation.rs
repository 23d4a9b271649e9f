use crate::dataloader::worker_gen_bool;
use crate::transforms::Transform;
use anyhow::{ensure, Result};
use image::DynamicImage;

// ============================================================================
// RandomHorizontalFlip
// ============================================================================

/// Mirrors the image left-to-right with probability `p`.
///
/// # Example
/// ```ignore
/// let flip = RandomHorizontalFlip::new(0.5)?; // 50% flip chance
/// let augmented = flip.apply(image)?;
/// ```
#[derive(Debug, Clone)]
pub struct RandomHorizontalFlip {
    p: f64,
}

impl RandomHorizontalFlip {
    pub fn new(p: f64) -> Result<Self> {
        ensure!(
            (0.0..=1.0).contains(&p),
            "Probability must be in [0.0, 1.0] range (got {})",
            p
        );
        Ok(Self { p })
    }
}

impl Transform<DynamicImage, DynamicImage> for RandomHorizontalFlip {
    fn apply(&self, img: DynamicImage) -> Result<DynamicImage> {
        // p = 0 and p = 1 never touch the RNG
        let flip = if self.p <= 0.0 {
            false
        } else if self.p >= 1.0 {
            true
        } else {
            worker_gen_bool(self.p)
        };
        Ok(if flip { img.fliph() } else { img })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataloader::{init_worker_rng, reset_worker_rng};
    use image::{Rgb, RgbImage};

    /// 2x1 image: left = red, right = blue
    fn red_blue() -> DynamicImage {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        img.put_pixel(1, 0, Rgb([0, 0, 255]));
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_always_and_never_flip() -> Result<()> {
        let flipped = RandomHorizontalFlip::new(1.0)?.apply(red_blue())?;
        assert_eq!(flipped.as_bytes(), &[0, 0, 255, 255, 0, 0]);

        let unchanged = RandomHorizontalFlip::new(0.0)?.apply(red_blue())?;
        assert_eq!(unchanged.as_bytes(), red_blue().as_bytes());

        assert!(RandomHorizontalFlip::new(1.5).is_err());
        Ok(())
    }

    #[test]
    fn test_half_probability_flips_some() -> Result<()> {
        init_worker_rng(0, 0, 42);
        let flip = RandomHorizontalFlip::new(0.5)?;
        let mut flipped = 0;
        for _ in 0..200 {
            if flip.apply(red_blue())?.as_bytes()[0] == 0 {
                flipped += 1;
            }
        }
        reset_worker_rng();
        assert!((50..150).contains(&flipped), "flipped {} of 200", flipped);
        Ok(())
    }
}
