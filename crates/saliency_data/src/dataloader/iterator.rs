//! src/dataloader/iterator.rs
//!
//! Iterator implementations for DataLoader.
//!
//! - `Single`: batches are loaded on the calling thread.
//! - `Multi`: a fresh worker pool loads batches in parallel for one epoch.
//!   Batches are assigned round-robin, at most `prefetch_factor` per worker
//!   are in flight, and results are yielded in sampler order.

use crate::collator::Collator;
use crate::dataset::Dataset;
use crate::minibatch::MiniBatch;
use anyhow::{anyhow, Context, Result};
use crossbeam_channel::RecvTimeoutError;
use std::collections::BTreeMap;
use std::sync::atomic::Ordering;
use std::time::Duration;

use super::common::thread::{init_worker_rng, reset_worker_rng};
use super::loader::DataLoader;
use super::workers::indexed::{process_batch, spawn_epoch_workers, BatchOutput, BatchTask};
use super::workers::pool::WorkerPool;

/// Iterator over the batches of one epoch.
///
/// Created by calling `dataloader.iter()`.
pub struct DataLoaderIter<'a, D, C> {
    epoch: usize,
    inner: IteratorImpl<'a, D, C>,
}

enum IteratorImpl<'a, D, C> {
    Single {
        dataset: &'a D,
        collator: &'a C,
        batch_indices: Box<dyn Iterator<Item = Vec<usize>> + Send + 'a>,
        pin_memory: bool,
        epoch: usize,
        runtime_seed: u64,
        rng_initialized: bool,
    },
    Multi {
        pool: WorkerPool<BatchTask, BatchOutput>,
        batch_indices: Box<dyn Iterator<Item = Vec<usize>> + Send + 'a>,
        max_in_flight: usize,
        timeout: Duration,
        next_to_send: usize,
        next_to_yield: usize,
        exhausted: bool,
        reorder: BTreeMap<usize, Result<MiniBatch>>,
    },
}

impl<D, C> DataLoader<D, C>
where
    D: Dataset + 'static,
    C: Collator + Clone + Send + Sync + 'static,
{
    /// Starts a new epoch and returns an iterator over its batches.
    ///
    /// With `shuffle = true` every epoch gets a fresh permutation; random
    /// transforms are reseeded per epoch either way.
    pub fn iter(&self) -> Result<DataLoaderIter<'_, D, C>> {
        let epoch = self.current_epoch.fetch_add(1, Ordering::SeqCst);
        let sampler_epoch = if self.config.shuffle.unwrap_or(false) {
            epoch
        } else {
            0
        };
        let batch_indices = self.batch_sampler.iter(sampler_epoch);

        let inner = if self.config.num_workers > 0 {
            let pool = spawn_epoch_workers(
                self.dataset.clone(),
                self.collator.clone(),
                self.config.num_workers,
                self.config.prefetch_factor,
                self.pin_memory,
                epoch,
                self.runtime_seed,
            )
            .with_context(|| format!("Failed to start workers for epoch {}", epoch))?;

            IteratorImpl::Multi {
                max_in_flight: self.config.num_workers * self.config.prefetch_factor,
                pool,
                batch_indices,
                timeout: self.config.timeout,
                next_to_send: 0,
                next_to_yield: 0,
                exhausted: false,
                reorder: BTreeMap::new(),
            }
        } else {
            IteratorImpl::Single {
                dataset: self.dataset.as_ref(),
                collator: &self.collator,
                batch_indices,
                pin_memory: self.pin_memory,
                epoch,
                runtime_seed: self.runtime_seed,
                rng_initialized: false,
            }
        };

        Ok(DataLoaderIter { epoch, inner })
    }
}

impl<D, C> DataLoaderIter<'_, D, C> {
    /// The epoch this iterator belongs to (0-based).
    pub fn epoch(&self) -> usize {
        self.epoch
    }
}

/// The main-thread path seeds the caller's `WORKER_RNG`; clear it so draws
/// made outside the loader go back to the thread RNG.
impl<D, C> Drop for DataLoaderIter<'_, D, C> {
    fn drop(&mut self) {
        if let IteratorImpl::Single {
            rng_initialized: true,
            ..
        } = self.inner
        {
            reset_worker_rng();
        }
    }
}

impl<D, C> Iterator for DataLoaderIter<'_, D, C>
where
    D: Dataset,
    C: Collator,
{
    type Item = Result<MiniBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            IteratorImpl::Single {
                dataset,
                collator,
                batch_indices,
                pin_memory,
                epoch,
                runtime_seed,
                rng_initialized,
            } => {
                if !*rng_initialized {
                    init_worker_rng(0, *epoch, *runtime_seed);
                    *rng_initialized = true;
                }

                let indices = batch_indices.next()?;
                Some(
                    process_batch(*dataset, &indices, *collator, *pin_memory).with_context(|| {
                        format!("Failed to load batch of {} samples", indices.len())
                    }),
                )
            }

            IteratorImpl::Multi {
                pool,
                batch_indices,
                max_in_flight,
                timeout,
                next_to_send,
                next_to_yield,
                exhausted,
                reorder,
            } => loop {
                // Keep the pipeline full, one window of batches at most
                while !*exhausted && *next_to_send - *next_to_yield < *max_in_flight {
                    match batch_indices.next() {
                        Some(indices) => {
                            let worker_id = *next_to_send % pool.num_workers();
                            let task = BatchTask {
                                batch_index: *next_to_send,
                                indices,
                            };
                            if let Err(e) = pool.send_to(worker_id, task) {
                                *exhausted = true;
                                return Some(Err(e.context(format!(
                                    "Failed to send batch {} to worker {}",
                                    *next_to_send, worker_id
                                ))));
                            }
                            *next_to_send += 1;
                        }
                        None => *exhausted = true,
                    }
                }

                if let Some(result) = reorder.remove(&*next_to_yield) {
                    *next_to_yield += 1;
                    return Some(result);
                }

                if *next_to_yield == *next_to_send {
                    return None;
                }

                match pool.output().recv_timeout(*timeout) {
                    Ok((batch_index, result)) => {
                        reorder.insert(batch_index, result);
                    }
                    Err(RecvTimeoutError::Timeout) => {
                        return Some(Err(anyhow!(
                            "Worker timeout after {:?} waiting for batch {} \
                            - possible deadlock or slow data loading",
                            timeout,
                            next_to_yield
                        )));
                    }
                    Err(RecvTimeoutError::Disconnected) => {
                        *exhausted = true;
                        *next_to_send = *next_to_yield;
                        return Some(Err(anyhow!(
                            "Worker channel disconnected - workers may have crashed"
                        )));
                    }
                }
            },
        }
    }
}
