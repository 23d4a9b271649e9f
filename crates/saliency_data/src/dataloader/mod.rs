//! src/dataloader/mod.rs
//!
//! This module implements the `DataLoader`.
//!
//! The `DataLoader` coordinates a `Dataset`, a batch sampler and a `Collator`
//! to load, transform and batch samples for a training loop, optionally on a
//! pool of worker threads.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌─────────┐
//!                    │ Dataset │ (len + get_sample(index))
//!                    └────┬────┘
//!                         │ decodes + transforms one sample
//!                         ↓
//!                    ┌─────────┐
//!                    │ Sampler │ (sequential or seeded shuffle, batched)
//!                    └────┬────┘
//!                         │ provides batches of indices
//!                         ↓
//!                  ┌──────────────┐
//!                  │  DataLoader  │ ←───── Config (batch_size, workers, etc.)
//!                  └──────┬───────┘
//!                         ↓
//!                   [Worker Threads] (optional parallelism)
//!                         ↓
//!                    ┌──────────┐
//!                    │ Collator │ (stacks samples into a batch)
//!                    └────┬─────┘
//!                         ↓
//!                   ┌───────────┐
//!                   │ MiniBatch │ (ready for model)
//!                   └───────────┘
//! ```
//!
//! # Module Structure
//!
//! ```text
//! src/dataloader/
//! ├── mod.rs             # Public API exports + module-level docs
//! ├── config.rs          # DataLoaderConfig and builder
//! ├── loader.rs          # DataLoader struct and constructors
//! ├── iterator.rs        # DataLoaderIter (main-thread and worker-pool variants)
//! ├── workers/
//! │   ├── mod.rs
//! │   ├── pool.rs        # Generic `WorkerPool<Task, Output>`
//! │   └── indexed.rs     # Batch tasks and per-batch processing
//! └── common/
//!     ├── mod.rs
//!     └── thread.rs      # Thread-local worker ID and RNG
//! ```
//!
//! # Example Usage
//!
//! ```ignore
//! let config = DataLoaderConfig::builder()
//!     .batch_size(8)
//!     .shuffle(true)
//!     .num_workers(4)
//!     .build();
//!
//! let dataloader = DataLoader::new(dataset, config)?;
//!
//! for batch in dataloader.iter()? {
//!     let batch: MiniBatch = batch?;
//!     let images = batch.get("image")?; // [B, 3, H, W]
//! }
//! ```
//!
//! ## Memory Usage
//! - Single-threaded: O(batch_size)
//! - Multi-threaded: O(num_workers x prefetch_factor x batch_size)

mod common;
mod config;
mod iterator;
mod loader;
mod workers;

pub use config::{DataLoaderConfig, DataLoaderConfigBuilder};
pub use iterator::DataLoaderIter;
pub use loader::DataLoader;

pub use common::thread::{
    init_worker_rng, reset_worker_rng, worker_gen_bool, worker_gen_range, WORKER_ID, WORKER_RNG,
};
