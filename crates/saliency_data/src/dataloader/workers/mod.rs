//! Worker management for parallel data loading.
//!
//! - `pool`: Generic worker pool with per-worker task channels
//! - `indexed`: Task types and batch processing for index-addressable datasets

pub(crate) mod indexed;
pub(crate) mod pool;

/// How often idle workers re-check the shutdown flag (milliseconds)
pub(crate) const WORKER_POLL_MS: u64 = 100;
