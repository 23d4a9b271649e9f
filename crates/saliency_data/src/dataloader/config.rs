//! src/dataloader/config.rs
//!
//! Configuration for DataLoader behaviour
//!
//! Example:
//! ```ignore
//! let config = DataLoaderConfig::builder()
//!     .batch_size(8)
//!     .shuffle(true)
//!     .num_workers(12)
//!     .pin_memory(true)
//!     .build();
//! ```
//!
//! # Performance considerations:
//! - `num_workers`: More workers decode images in parallel but hold more batches in memory
//! - `prefetch_factor`: Batches in flight per worker

use std::time::Duration;

/// Configuration for DataLoader
#[derive(Debug, Clone)]
pub struct DataLoaderConfig {
    /// Number of samples per batch (defaults to 1 if not specified)
    pub batch_size: Option<usize>,
    /// Number of parallel workers (0 = load on the calling thread)
    pub num_workers: usize,
    /// Whether to drop the last incomplete batch (defaults to false if not specified)
    pub drop_last: Option<bool>,
    /// Whether to reshuffle sample order every epoch
    pub shuffle: Option<bool>,
    /// Random seed for reproducible shuffling and transforms
    pub seed: Option<u64>,
    /// Number of batches in flight per worker (must be >0 when using workers)
    pub prefetch_factor: usize,
    /// Maximum time to wait for a batch from workers. Default: 30s
    pub timeout: Duration,
    /// Copy finished batches into page-locked memory for faster host-to-GPU transfer.
    /// Ignored when CUDA is unavailable.
    pub pin_memory: bool,
}

impl Default for DataLoaderConfig {
    fn default() -> Self {
        Self {
            batch_size: None,
            num_workers: 0,
            drop_last: None,
            shuffle: None,
            seed: None,
            prefetch_factor: 2,
            timeout: Duration::from_secs(30),
            pin_memory: false,
        }
    }
}

impl DataLoaderConfig {
    pub fn builder() -> DataLoaderConfigBuilder {
        DataLoaderConfigBuilder::default()
    }
}

/// Builder for DataLoaderConfig with method chaining
#[derive(Default)]
pub struct DataLoaderConfigBuilder {
    config: DataLoaderConfig,
}

impl DataLoaderConfigBuilder {
    /// Set the batch size (must be > 0)
    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.batch_size = Some(size);
        self
    }

    /// Set the number of workers
    pub fn num_workers(mut self, workers: usize) -> Self {
        self.config.num_workers = workers;
        self
    }

    /// Set whether to drop_last
    pub fn drop_last(mut self, drop: bool) -> Self {
        self.config.drop_last = Some(drop);
        self
    }

    /// Set whether to shuffle dataset every epoch
    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.config.shuffle = Some(shuffle);
        self
    }

    /// Set the random seed for reproducible data loading.
    ///
    /// When set, this seed controls both the shuffle order and the
    /// random augmentation drawn inside workers.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Set the number of batches kept in flight per worker.
    pub fn prefetch_factor(mut self, factor: usize) -> Self {
        self.config.prefetch_factor = factor;
        self
    }

    /// Set the timeout for receiving a batch from workers.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Request pinned host memory for produced batches.
    pub fn pin_memory(mut self, pin: bool) -> Self {
        self.config.pin_memory = pin;
        self
    }

    /// Build the final configuration.
    pub fn build(self) -> DataLoaderConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides_defaults() {
        let config = DataLoaderConfig::builder()
            .batch_size(4)
            .num_workers(12)
            .shuffle(true)
            .pin_memory(true)
            .build();

        assert_eq!(config.batch_size, Some(4));
        assert_eq!(config.num_workers, 12);
        assert_eq!(config.shuffle, Some(true));
        assert!(config.pin_memory);
        assert_eq!(config.drop_last, None);
        assert_eq!(config.prefetch_factor, 2);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }
}
