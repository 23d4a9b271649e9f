use crate::transforms::Transform;
use anyhow::{ensure, Context, Result};
use tch::Tensor;

/// Per-channel mean of the ImageNet training set (RGB).
pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
/// Per-channel standard deviation of the ImageNet training set (RGB).
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

// ============================================================================
// Normalize
// ============================================================================

/// Normalizes a `[C, H, W]` tensor channel-wise:
///
/// ```text
/// output[c, h, w] = (input[c, h, w] - mean[c]) / std[c]
/// ```
///
/// # Example
/// ```ignore
/// let norm = Normalize::imagenet();
/// let normalized = norm.apply(tensor)?;
/// ```
#[derive(Debug, Clone)]
pub struct Normalize {
    mean: Vec<f32>,
    std: Vec<f32>,
}

impl Normalize {
    pub fn new(mean: &[f32], std: &[f32]) -> Result<Self> {
        ensure!(!mean.is_empty(), "Normalization mean cannot be empty");
        ensure!(
            mean.len() == std.len(),
            "Mean has {} channels but std has {}",
            mean.len(),
            std.len()
        );
        ensure!(
            std.iter().all(|&s| s != 0.0),
            "Normalization std must be non-zero (got {:?})",
            std
        );
        Ok(Self {
            mean: mean.to_vec(),
            std: std.to_vec(),
        })
    }

    pub fn imagenet() -> Self {
        Self {
            mean: IMAGENET_MEAN.to_vec(),
            std: IMAGENET_STD.to_vec(),
        }
    }
}

impl Transform<Tensor, Tensor> for Normalize {
    fn apply(&self, tensor: Tensor) -> Result<Tensor> {
        let (num_channels, _height, _width) = tensor
            .size3()
            .context("Input must be 3D tensor [C, H, W]")?;

        ensure!(
            num_channels as usize == self.mean.len(),
            "Channel count mismatch: input has {} channels but normalization expects {}",
            num_channels,
            self.mean.len()
        );

        let mean = Tensor::from_slice(&self.mean)
            .view([num_channels, 1, 1])
            .to_kind(tensor.kind());
        let std = Tensor::from_slice(&self.std)
            .view([num_channels, 1, 1])
            .to_kind(tensor.kind());

        Ok((tensor - mean) / std)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::{Device, Kind};

    #[test]
    fn test_imagenet_constants_per_channel() -> Result<()> {
        let tensor = Tensor::full([3, 4, 4], 0.5, (Kind::Float, Device::Cpu));
        let normalized = Normalize::imagenet().apply(tensor)?;

        for c in 0..3 {
            let expected = (0.5 - IMAGENET_MEAN[c]) / IMAGENET_STD[c];
            let got = normalized.double_value(&[c as i64, 2, 3]);
            assert!((got - expected as f64).abs() < 1e-5, "channel {}: {} vs {}", c, got, expected);
        }
        Ok(())
    }

    #[test]
    fn test_rejects_bad_shapes() -> Result<()> {
        let norm = Normalize::imagenet();
        let gray = Tensor::zeros([1, 4, 4], (Kind::Float, Device::Cpu));
        assert!(norm.apply(gray).is_err());

        let batched = Tensor::zeros([1, 3, 4, 4], (Kind::Float, Device::Cpu));
        assert!(norm.apply(batched).is_err());

        assert!(Normalize::new(&[0.5, 0.5], &[0.5]).is_err());
        assert!(Normalize::new(&[0.5], &[0.0]).is_err());
        Ok(())
    }
}
