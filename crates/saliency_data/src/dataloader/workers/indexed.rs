//! src/dataloader/workers/indexed.rs
//!
//! Worker implementation for index-addressable datasets.
//!
//! Workers share the dataset via `Arc`, receive batches of indices, fetch and
//! transform each sample on demand, and collate the results into a `MiniBatch`.
//! Every result is tagged with its batch position so the iterator can restore
//! sampler order.

use crate::collator::Collator;
use crate::dataset::Dataset;
use crate::minibatch::MiniBatch;
use crate::sample::Sample;
use anyhow::{Context, Result};
use crossbeam_channel::RecvTimeoutError;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use super::pool::WorkerPool;
use super::WORKER_POLL_MS;
use crate::dataloader::common::thread::{init_worker_rng, WORKER_ID};

/// A batch of dataset indices together with its position in the epoch.
#[derive(Debug)]
pub(crate) struct BatchTask {
    pub(crate) batch_index: usize,
    pub(crate) indices: Vec<usize>,
}

/// A collated batch (or the error that prevented it) tagged with its position.
pub(crate) type BatchOutput = (usize, Result<MiniBatch>);

/// Spawns a fresh pool of workers for one epoch.
///
/// Each worker seeds its RNG once from `(worker_id, epoch, base_seed)`; because
/// batches are assigned round-robin, the same seed yields the same augmentation.
pub(crate) fn spawn_epoch_workers<D, C>(
    dataset: Arc<D>,
    collator: C,
    num_workers: usize,
    prefetch_factor: usize,
    pin_memory: bool,
    epoch: usize,
    base_seed: u64,
) -> Result<WorkerPool<BatchTask, BatchOutput>>
where
    D: Dataset + 'static,
    C: Collator + Clone + Send + Sync + 'static,
{
    WorkerPool::new(
        num_workers,
        prefetch_factor,
        move |task_rx, output_tx, shutdown| {
            let worker_id = WORKER_ID.with(|id| *id.borrow());
            init_worker_rng(worker_id, epoch, base_seed);

            while !shutdown.load(Ordering::Relaxed) {
                match task_rx.recv_timeout(Duration::from_millis(WORKER_POLL_MS)) {
                    Ok(BatchTask {
                        batch_index,
                        indices,
                    }) => {
                        let result = process_batch(dataset.as_ref(), &indices, &collator, pin_memory)
                            .with_context(|| {
                                format!(
                                    "Worker {} failed to process batch {} ({} indices)",
                                    worker_id,
                                    batch_index,
                                    indices.len()
                                )
                            });
                        if output_tx.send((batch_index, result)).is_err() {
                            break;
                        }
                    }
                    Err(RecvTimeoutError::Timeout) => continue,
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        },
    )
    .context("Failed to create worker pool")
}

/// Fetches the samples for `indices`, collates them and optionally pins the batch.
///
/// Shared by the main-thread path and the workers.
pub(crate) fn process_batch<D, C>(
    dataset: &D,
    indices: &[usize],
    collator: &C,
    pin_memory: bool,
) -> Result<MiniBatch>
where
    D: Dataset + ?Sized,
    C: Collator,
{
    let samples = indices
        .iter()
        .map(|&index| {
            dataset.get_sample(index).with_context(|| {
                format!(
                    "Failed to load sample at index {} (dataset size: {})",
                    index,
                    dataset.len()
                )
            })
        })
        .collect::<Result<Vec<Sample>>>()?;

    let batch = collator
        .collate(&samples)
        .with_context(|| format!("Failed to collate batch of {} samples", samples.len()))?;

    Ok(if pin_memory { batch.pin_memory() } else { batch })
}
