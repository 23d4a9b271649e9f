//! src/dataloader/loader.rs
//!
//! DataLoader constructors.
//!
//! The DataLoader creates its sampler from `config.shuffle`:
//! - If `config.shuffle = false`, a SequentialSampler.
//! - If `config.shuffle = true`, a RandomSampler seeded with `config.seed`
//!   (or a random seed when none is given), reshuffled every epoch.
//!
//! The sampler is wrapped in a `BatchSampler` using `batch_size` and `drop_last`.

use crate::collator::{Collator, StackCollator};
use crate::dataset::Dataset;
use crate::sampler::{BatchSampler, RandomSampler, Sampler, SequentialSampler};
use anyhow::{anyhow, Context, Result};
use rand::Rng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::config::DataLoaderConfig;

/// Coordinates a [`Dataset`], a batch sampler and a [`Collator`] to produce
/// [`MiniBatch`](crate::minibatch::MiniBatch)es.
///
/// # Thread safety:
/// - The dataset is held in an `Arc` and shared read-only with workers.
/// - Each call to [`iter`](DataLoader::iter) starts a new epoch; with
///   `num_workers > 0` it spawns a fresh worker pool that lives as long as
///   the returned iterator.
///
/// # Type parameters:
/// - `D`: Dataset type
/// - `C`: Collator type (defaults to StackCollator)
pub struct DataLoader<D, C = StackCollator> {
    pub(crate) dataset: Arc<D>,
    pub(crate) collator: C,
    pub(crate) config: DataLoaderConfig,
    pub(crate) batch_sampler: Box<dyn Sampler<Item = Vec<usize>>>,
    pub(crate) current_epoch: AtomicUsize,
    pub(crate) runtime_seed: u64,
    pub(crate) pin_memory: bool,
}

impl<D> DataLoader<D, StackCollator>
where
    D: Dataset + 'static,
{
    /// Creates a new DataLoader with the default StackCollator.
    ///
    /// # Example
    /// ```ignore
    /// let config = DataLoaderConfig::builder()
    ///     .batch_size(8)
    ///     .shuffle(true)
    ///     .seed(42)
    ///     .build();
    /// let dataloader = DataLoader::new(dataset, config)?;
    /// ```
    pub fn new(dataset: D, config: DataLoaderConfig) -> Result<Self> {
        Self::new_with_collator(dataset, config, StackCollator)
    }
}

impl<D, C> DataLoader<D, C>
where
    D: Dataset + 'static,
    C: Collator + Clone + Send + Sync + 'static,
{
    /// Creates a new DataLoader with a custom collator.
    ///
    /// # Errors
    /// - `batch_size` is 0
    /// - `prefetch_factor` is 0 when using workers
    /// - `shuffle = true` on an empty dataset
    pub fn new_with_collator(
        dataset: D,
        mut config: DataLoaderConfig,
        collator: C,
    ) -> Result<Self> {
        let batch_size = config.batch_size.unwrap_or(1);
        let drop_last = config.drop_last.unwrap_or(false);
        let shuffle = config.shuffle.unwrap_or(false);
        config.batch_size = Some(batch_size);
        config.drop_last = Some(drop_last);
        config.shuffle = Some(shuffle);

        if batch_size == 0 {
            return Err(anyhow!("Batch size must be greater than 0"));
        }

        if config.prefetch_factor == 0 && config.num_workers > 0 {
            return Err(anyhow!(
                "Prefetch factor must be > 0 when using {} workers",
                config.num_workers
            ));
        }

        let runtime_seed = config.seed.unwrap_or_else(|| rand::rng().random());

        let sampler: Box<dyn Sampler<Item = usize>> = if shuffle {
            Box::new(
                RandomSampler::new(dataset.len(), runtime_seed)
                    .context("Failed to create shuffling sampler")?,
            )
        } else {
            Box::new(SequentialSampler::new(dataset.len()))
        };

        let batch_sampler = BatchSampler::new(sampler, batch_size, drop_last)
            .context("Failed to wrap sampler with BatchSampler")?;

        let pin_memory = if config.pin_memory && !tch::Cuda::is_available() {
            log::warn!("pin_memory requested but CUDA is unavailable; batches stay in pageable memory");
            false
        } else {
            config.pin_memory
        };

        Ok(Self {
            dataset: Arc::new(dataset),
            collator,
            config,
            batch_sampler: Box::new(batch_sampler),
            current_epoch: AtomicUsize::new(0),
            runtime_seed,
            pin_memory,
        })
    }

    /// The wrapped dataset.
    pub fn dataset(&self) -> &D {
        &self.dataset
    }

    /// The effective configuration (defaults filled in).
    pub fn config(&self) -> &DataLoaderConfig {
        &self.config
    }

    /// Number of batches produced per epoch.
    pub fn len(&self) -> usize {
        let samples = self.dataset.len();
        let batch_size = self.config.batch_size.unwrap_or(1);
        if self.config.drop_last.unwrap_or(false) {
            samples / batch_size
        } else {
            samples.div_ceil(batch_size)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of epochs started so far (calls to `iter`).
    pub fn epochs_started(&self) -> usize {
        self.current_epoch.load(Ordering::SeqCst)
    }
}

impl<D: Dataset, C> std::fmt::Debug for DataLoader<D, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataLoader")
            .field("dataset_len", &self.dataset.len())
            .field("config", &self.config)
            .field("runtime_seed", &self.runtime_seed)
            .finish()
    }
}
