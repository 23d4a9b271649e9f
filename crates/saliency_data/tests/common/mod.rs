#![allow(dead_code)]

use saliency_data::{dataloader::worker_gen_range, dataloader::WORKER_ID, Dataset, Sample};

use anyhow::{bail, ensure, Result};
use image::{GrayImage, Luma, Rgb, RgbImage};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tch::Tensor;
use tempfile::TempDir;

// ============================================================================
// On-disk fixtures
// ============================================================================

pub fn write_rgb(path: &Path, width: u32, height: u32, fill: [u8; 3]) -> Result<()> {
    RgbImage::from_pixel(width, height, Rgb(fill)).save(path)?;
    Ok(())
}

pub fn write_luma(path: &Path, width: u32, height: u32, value: u8) -> Result<()> {
    GrayImage::from_pixel(width, height, Luma([value])).save(path)?;
    Ok(())
}

/// Three sibling directories `image/`, `gt/` and `trans/` in a temp dir.
pub struct TripletDirs {
    _tmp: TempDir,
    pub image_root: PathBuf,
    pub gt_root: PathBuf,
    pub trans_root: PathBuf,
}

impl TripletDirs {
    pub fn new() -> Result<Self> {
        let tmp = tempfile::tempdir()?;
        let image_root = tmp.path().join("image");
        let gt_root = tmp.path().join("gt");
        let trans_root = tmp.path().join("trans");
        for dir in [&image_root, &gt_root, &trans_root] {
            fs::create_dir(dir)?;
        }
        Ok(Self {
            _tmp: tmp,
            image_root,
            gt_root,
            trans_root,
        })
    }

    /// Writes one triplet under the same stem: `<stem>.jpg` image,
    /// `<stem>.png` ground truth (all 255) and `<stem>.png` transition map (all 0).
    pub fn add(&self, stem: &str, image_size: (u32, u32), gt_size: (u32, u32)) -> Result<()> {
        write_rgb(
            &self.image_root.join(format!("{}.jpg", stem)),
            image_size.0,
            image_size.1,
            [200, 120, 40],
        )?;
        write_luma(&self.gt_root.join(format!("{}.png", stem)), gt_size.0, gt_size.1, 255)?;
        write_luma(&self.trans_root.join(format!("{}.png", stem)), 7, 5, 0)?;
        Ok(())
    }
}

// ============================================================================
// In-memory datasets for DataLoader tests
// ============================================================================

/// Yields `{"index": [i], "worker": [worker_id], "draw": [u]}` where `u` is
/// one draw from the worker RNG.
#[derive(Clone, Default)]
pub struct IndexDataset {
    pub size: usize,
    /// Index whose load fails.
    pub fail_at: Option<usize>,
    /// Sleep per sample.
    pub delay: Duration,
    /// Number of samples loaded so far.
    pub loaded: Arc<AtomicUsize>,
}

impl IndexDataset {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            ..Default::default()
        }
    }
}

impl Dataset for IndexDataset {
    fn len(&self) -> usize {
        self.size
    }

    fn get_sample(&self, index: usize) -> Result<Sample> {
        ensure!(index < self.size, "index {} out of range", index);
        if self.fail_at == Some(index) {
            bail!("Simulated decode failure at index {}", index);
        }
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        self.loaded.fetch_add(1, Ordering::SeqCst);

        let worker = WORKER_ID.with(|id| *id.borrow()) as i64;
        let draw = worker_gen_range(0.0, 1.0);
        Ok(Sample::from_single("index", Tensor::from_slice(&[index as i64]))
            .with_feature("worker", Tensor::from_slice(&[worker]))
            .with_feature("draw", Tensor::from_slice(&[draw])))
    }
}

/// Flattens the `"index"` feature of every batch, in yield order.
pub fn collect_indices<I>(batches: I) -> Result<Vec<i64>>
where
    I: Iterator<Item = Result<saliency_data::MiniBatch>>,
{
    let mut indices = Vec::new();
    for batch in batches {
        let batch = batch?;
        let values: Vec<i64> = batch.get("index")?.view([-1]).try_into()?;
        indices.extend(values);
    }
    Ok(indices)
}

/// Flattens the `"draw"` feature of every batch, in yield order.
pub fn collect_draws<I>(batches: I) -> Result<Vec<f64>>
where
    I: Iterator<Item = Result<saliency_data::MiniBatch>>,
{
    let mut draws = Vec::new();
    for batch in batches {
        let batch = batch?;
        let values: Vec<f64> = batch.get("draw")?.view([-1]).try_into()?;
        draws.extend(values);
    }
    Ok(draws)
}
