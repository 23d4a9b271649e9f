use crate::dataloader::{DataLoader, DataLoaderConfig};
use anyhow::{Context, Result};
use std::path::Path;

use super::options::LoaderOptions;
use super::train::SaliencyDataset;

/// Builds a [`SaliencyDataset`] and wraps it in a batching [`DataLoader`].
///
/// Batches hold `"image"` `[B, 3, S, S]`, `"gt"` `[B, 1, S, S]` and
/// `"trans"` `[B, 1, S, S]`. The usual call passes `aug = false`,
/// `shuffle = true`, `num_workers = 12`, `pin_memory = true`; see
/// [`LoaderOptions`] for those defaults in one place.
///
/// Shuffling an empty dataset is an error.
#[allow(clippy::too_many_arguments)]
pub fn get_loader(
    image_root: impl AsRef<Path>,
    gt_root: impl AsRef<Path>,
    trans_root: impl AsRef<Path>,
    batch_size: usize,
    train_size: u32,
    aug: bool,
    shuffle: bool,
    num_workers: usize,
    pin_memory: bool,
) -> Result<DataLoader<SaliencyDataset>> {
    let config = DataLoaderConfig::builder()
        .batch_size(batch_size)
        .shuffle(shuffle)
        .num_workers(num_workers)
        .pin_memory(pin_memory)
        .build();
    build(image_root.as_ref(), gt_root.as_ref(), trans_root.as_ref(), train_size, aug, config)
}

/// [`get_loader`] driven by a [`LoaderOptions`] value.
pub fn get_loader_from_options(options: &LoaderOptions) -> Result<DataLoader<SaliencyDataset>> {
    options.validate()?;
    let mut builder = DataLoaderConfig::builder()
        .batch_size(options.batch_size)
        .shuffle(options.shuffle)
        .num_workers(options.num_workers)
        .pin_memory(options.pin_memory);
    if let Some(seed) = options.seed {
        builder = builder.seed(seed);
    }
    build(
        &options.image_root,
        &options.gt_root,
        &options.trans_root,
        options.train_size,
        options.aug,
        builder.build(),
    )
}

fn build(
    image_root: &Path,
    gt_root: &Path,
    trans_root: &Path,
    train_size: u32,
    aug: bool,
    config: DataLoaderConfig,
) -> Result<DataLoader<SaliencyDataset>> {
    let dataset = SaliencyDataset::new(image_root, gt_root, trans_root, train_size, aug)?;
    log::info!("Length of dataset: {}", dataset.len());

    DataLoader::new(dataset, config).context("Failed to create saliency data loader")
}
