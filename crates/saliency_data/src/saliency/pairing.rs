//! Pairs image / ground-truth / transition files across three directories.
//!
//! Files are matched by position after each listing is sorted on its own;
//! names are never compared. Callers must name files so the three sorted
//! orders line up.

use crate::readers::{ImageDirSource, IMAGE_SUFFIXES};
use crate::transforms::vision::read_dimensions;
use anyhow::{ensure, Context, Result};
use std::path::{Path, PathBuf};

/// Three parallel, equally long path lists; index `i` is one sample.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripletPaths {
    pub images: Vec<PathBuf>,
    pub gts: Vec<PathBuf>,
    pub trans: Vec<PathBuf>,
}

impl TripletPaths {
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Lists the three directories, sorts each, checks they have the same
/// length and drops triplets whose image and ground truth differ in size.
pub fn scan_triplets(image_root: &Path, gt_root: &Path, trans_root: &Path) -> Result<TripletPaths> {
    let images = ImageDirSource::new(image_root, IMAGE_SUFFIXES).sorted_paths()?;
    let gts = ImageDirSource::new(gt_root, IMAGE_SUFFIXES).sorted_paths()?;
    let trans = ImageDirSource::new(trans_root, IMAGE_SUFFIXES).sorted_paths()?;

    filter_matching_sizes(TripletPaths { images, gts, trans })
}

/// Keeps triplet `i` iff `images[i]` and `gts[i]` have equal (width, height).
///
/// Only headers are read. Transition maps are never inspected. Survivors keep
/// their relative order.
pub fn filter_matching_sizes(paths: TripletPaths) -> Result<TripletPaths> {
    let TripletPaths { images, gts, trans } = paths;
    ensure!(
        images.len() == gts.len() && gts.len() == trans.len(),
        "Image, ground-truth and transition directories must hold the same number of files \
        (got {} images, {} ground truths, {} transition maps)",
        images.len(),
        gts.len(),
        trans.len()
    );

    let mut kept = TripletPaths::default();
    for ((image, gt), tr) in images.into_iter().zip(gts).zip(trans) {
        let image_size = read_dimensions(&image)
            .with_context(|| format!("Failed to size image {}", image.display()))?;
        let gt_size = read_dimensions(&gt)
            .with_context(|| format!("Failed to size ground truth {}", gt.display()))?;

        if image_size == gt_size {
            kept.images.push(image);
            kept.gts.push(gt);
            kept.trans.push(tr);
        } else {
            log::debug!(
                "Dropping {}: image is {:?} but ground truth {} is {:?}",
                image.display(),
                image_size,
                gt.display(),
                gt_size
            );
        }
    }
    Ok(kept)
}
