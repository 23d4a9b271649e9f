//! Worker pool implementation for parallel data loading.
//!
//! A fixed set of named threads, each fed by its own bounded task channel,
//! all writing into one shared output channel. Tasks are routed to a specific
//! worker so the worker-to-batch assignment is fixed for a given epoch.
//!
//! # Key features
//! - Bounded channels prevent memory bloat
//! - Graceful shutdown on drop
//! - Thread-local worker IDs for debugging and RNG seeding

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crate::dataloader::common::thread::WORKER_ID;

/// Thread pool for parallel data loading.
///
/// - Task channels: Main thread -> Worker `i` (one per worker)
/// - Output channel: Workers -> Main thread
/// - Shutdown flag: Enables graceful termination
pub(crate) struct WorkerPool<Task, Output> {
    workers: Vec<thread::JoinHandle<()>>,
    task_txs: Vec<Sender<Task>>,
    output_rx: Receiver<Output>,
    shutdown: Arc<AtomicBool>,
}

impl<Task, Output> WorkerPool<Task, Output>
where
    Task: Send + 'static,
    Output: Send + 'static,
{
    /// Spawns `num_workers` threads running `worker_fn`.
    ///
    /// Each task channel holds `buffer_size` tasks; the output channel holds
    /// `buffer_size * num_workers` results.
    pub(crate) fn new<F>(num_workers: usize, buffer_size: usize, worker_fn: F) -> Result<Self>
    where
        F: Fn(Receiver<Task>, Sender<Output>, Arc<AtomicBool>) + Send + Sync + 'static,
    {
        if num_workers == 0 {
            return Err(anyhow!(
                "Cannot create WorkerPool with 0 workers. \
                Either set num_workers > 0 or use single-threaded mode."
            ));
        }

        if buffer_size == 0 {
            return Err(anyhow!(
                "Cannot create WorkerPool with buffer_size 0. \
                Buffer size must be > 0 to prevent deadlocks."
            ));
        }

        let mut task_txs = Vec::with_capacity(num_workers);
        let mut task_rxs = Vec::with_capacity(num_workers);
        for _ in 0..num_workers {
            let (tx, rx) = bounded(buffer_size);
            task_txs.push(tx);
            task_rxs.push(rx);
        }
        let (output_tx, output_rx) = bounded(buffer_size * num_workers);

        let shutdown = Arc::new(AtomicBool::new(false));
        let worker_fn = Arc::new(worker_fn);
        let mut workers = Vec::with_capacity(num_workers);

        for (worker_id, task_rx) in task_rxs.into_iter().enumerate() {
            let output_tx = output_tx.clone();
            let shutdown_clone = shutdown.clone();
            let worker_fn_clone = worker_fn.clone();

            let handle = thread::Builder::new()
                .name(format!("dataloader-worker-{}", worker_id))
                .spawn(move || {
                    WORKER_ID.with(|id| *id.borrow_mut() = worker_id);
                    worker_fn_clone(task_rx, output_tx, shutdown_clone);
                })
                .with_context(|| format!("Failed to spawn worker thread {}", worker_id))?;

            workers.push(handle);
        }

        log::debug!("Started {} dataloader workers", num_workers);

        Ok(Self {
            workers,
            task_txs,
            output_rx,
            shutdown,
        })
    }

    pub(crate) fn num_workers(&self) -> usize {
        self.task_txs.len()
    }

    /// Queues a task on a specific worker, blocking while its channel is full.
    pub(crate) fn send_to(&self, worker_id: usize, task: Task) -> Result<()> {
        self.task_txs
            .get(worker_id)
            .ok_or_else(|| anyhow!("No worker with id {}", worker_id))?
            .send(task)
            .map_err(|_| anyhow!("Worker {} channel closed", worker_id))
    }

    pub(crate) fn output(&self) -> &Receiver<Output> {
        &self.output_rx
    }
}

impl<Task, Output> Drop for WorkerPool<Task, Output> {
    fn drop(&mut self) {
        // Signal shutdown to all workers
        self.shutdown.store(true, Ordering::Relaxed);

        // Drop all task senders to close channels
        self.task_txs.clear();

        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}
