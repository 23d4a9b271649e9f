//! Serializable arguments for [`get_loader`](super::get_loader).

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

fn default_shuffle() -> bool {
    true
}

fn default_num_workers() -> usize {
    12
}

fn default_pin_memory() -> bool {
    true
}

/// Everything needed to build a training loader.
///
/// Only the three roots, `batch_size` and `train_size` are required; the rest
/// default to `aug = false`, `shuffle = true`, `num_workers = 12`,
/// `pin_memory = true` and no fixed seed.
///
/// ```json
/// {
///   "image_root": "data/DUTS-TR/image",
///   "gt_root": "data/DUTS-TR/gt",
///   "trans_root": "data/DUTS-TR/trans",
///   "batch_size": 8,
///   "train_size": 352,
///   "aug": true
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoaderOptions {
    pub image_root: PathBuf,
    pub gt_root: PathBuf,
    pub trans_root: PathBuf,
    pub batch_size: usize,
    pub train_size: u32,
    #[serde(default)]
    pub aug: bool,
    #[serde(default = "default_shuffle")]
    pub shuffle: bool,
    #[serde(default = "default_num_workers")]
    pub num_workers: usize,
    #[serde(default = "default_pin_memory")]
    pub pin_memory: bool,
    /// Fixes shuffle order and augmentation draws across runs.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl LoaderOptions {
    pub fn new(
        image_root: impl Into<PathBuf>,
        gt_root: impl Into<PathBuf>,
        trans_root: impl Into<PathBuf>,
        batch_size: usize,
        train_size: u32,
    ) -> Self {
        Self {
            image_root: image_root.into(),
            gt_root: gt_root.into(),
            trans_root: trans_root.into(),
            batch_size,
            train_size,
            aug: false,
            shuffle: default_shuffle(),
            num_workers: default_num_workers(),
            pin_memory: default_pin_memory(),
            seed: None,
        }
    }

    /// Reads options from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open loader options: {}", path.display()))?;
        let options: Self = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse loader options: {}", path.display()))?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.batch_size > 0, "batch_size must be > 0");
        ensure!(self.train_size > 0, "train_size must be > 0");
        Ok(())
    }
}
