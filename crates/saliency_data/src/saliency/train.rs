use crate::dataset::Dataset;
use crate::sample::Sample;
use crate::transforms::vision::{
    EnsureLuma, EnsureRGB, LoadImage, Normalize, RandomHorizontalFlip, RandomRotation, Resize,
    ToTensor,
};
use crate::transforms::{BoxedTransform, Transform};
use anyhow::{ensure, Context, Result};
use std::path::{Path, PathBuf};
use tch::Tensor;

use super::pairing::{scan_triplets, TripletPaths};

/// Maximum rotation, in degrees, applied when augmentation is on.
pub const ROTATION_DEGREES: f64 = 15.0;
/// Probability of a horizontal flip when augmentation is on.
pub const FLIP_PROBABILITY: f64 = 0.5;

/// Training set of `(image, ground truth, transition map)` triplets.
///
/// Construction lists three flat directories, sorts each list, pairs them by
/// position and drops triplets whose image and ground truth differ in size.
/// Nothing is decoded up front; every [`get`](Self::get) decodes and
/// transforms its three files again.
///
/// | Stream     | Decoded as | Pipeline                                            |
/// |------------|------------|-----------------------------------------------------|
/// | image      | RGB        | [rotate ±15° → flip] → resize → tensor → ImageNet   |
/// | gt, trans  | luma (L)   | resize → tensor                                     |
///
/// The bracketed steps run only with `aug = true`, and only on the image.
/// Ground truth and transition maps never see the random draw.
pub struct SaliencyDataset {
    paths: TripletPaths,
    train_size: u32,
    aug: bool,
    image_pipeline: BoxedTransform<PathBuf, Tensor>,
    mask_pipeline: BoxedTransform<PathBuf, Tensor>,
}

impl SaliencyDataset {
    pub fn new(
        image_root: impl AsRef<Path>,
        gt_root: impl AsRef<Path>,
        trans_root: impl AsRef<Path>,
        train_size: u32,
        aug: bool,
    ) -> Result<Self> {
        let paths = scan_triplets(image_root.as_ref(), gt_root.as_ref(), trans_root.as_ref())
            .context("Failed to build saliency training set")?;

        let image_pipeline = if aug {
            LoadImage
                .then(EnsureRGB)
                .then(RandomRotation::new(ROTATION_DEGREES)?)
                .then(RandomHorizontalFlip::new(FLIP_PROBABILITY)?)
                .then(Resize::square(train_size)?)
                .then(ToTensor)
                .then(Normalize::imagenet())
                .boxed()
        } else {
            LoadImage
                .then(EnsureRGB)
                .then(Resize::square(train_size)?)
                .then(ToTensor)
                .then(Normalize::imagenet())
                .boxed()
        };

        let mask_pipeline = LoadImage
            .then(EnsureLuma)
            .then(Resize::square(train_size)?)
            .then(ToTensor)
            .boxed();

        log::debug!(
            "Saliency dataset: {} triplets, train_size={}, aug={}",
            paths.len(),
            train_size,
            aug
        );

        Ok(Self {
            paths,
            train_size,
            aug,
            image_pipeline,
            mask_pipeline,
        })
    }

    /// Decodes and transforms triplet `index`.
    ///
    /// Returns `(image [3, S, S], gt [1, S, S], trans [1, S, S])`.
    pub fn get(&self, index: usize) -> Result<(Tensor, Tensor, Tensor)> {
        ensure!(
            index < self.len(),
            "Index {} out of range for dataset of {} samples",
            index,
            self.len()
        );

        let image_path = &self.paths.images[index];
        let gt_path = &self.paths.gts[index];
        let trans_path = &self.paths.trans[index];

        let image = self
            .image_pipeline
            .apply(image_path.clone())
            .with_context(|| format!("Failed to load image {}", image_path.display()))?;
        let gt = self
            .mask_pipeline
            .apply(gt_path.clone())
            .with_context(|| format!("Failed to load ground truth {}", gt_path.display()))?;
        let trans = self
            .mask_pipeline
            .apply(trans_path.clone())
            .with_context(|| format!("Failed to load transition map {}", trans_path.display()))?;

        Ok((image, gt, trans))
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn image_paths(&self) -> &[PathBuf] {
        &self.paths.images
    }

    pub fn gt_paths(&self) -> &[PathBuf] {
        &self.paths.gts
    }

    pub fn trans_paths(&self) -> &[PathBuf] {
        &self.paths.trans
    }

    pub fn train_size(&self) -> u32 {
        self.train_size
    }

    pub fn is_augmented(&self) -> bool {
        self.aug
    }
}

impl Dataset for SaliencyDataset {
    fn len(&self) -> usize {
        SaliencyDataset::len(self)
    }

    fn get_sample(&self, index: usize) -> Result<Sample> {
        let (image, gt, trans) = self.get(index)?;
        Ok(Sample::triplet(image, gt, trans))
    }
}

impl std::fmt::Debug for SaliencyDataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaliencyDataset")
            .field("len", &self.len())
            .field("train_size", &self.train_size)
            .field("aug", &self.aug)
            .finish()
    }
}
