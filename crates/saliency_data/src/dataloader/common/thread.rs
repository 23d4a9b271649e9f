//! Thread-local worker identity and RNG.
//!
//! Random transforms (rotation, flip) draw from `WORKER_RNG` so that a seeded
//! `DataLoader` reproduces the same augmentation for the same epoch.

use rand::rngs::StdRng;
use rand::Rng as _;
use rand::SeedableRng;
use std::cell::RefCell;

thread_local! {
    /// Thread-local worker ID.
    ///
    /// Each worker thread is assigned a unique ID (0 to num_workers-1) when spawned.
    /// The main thread keeps ID 0 when iterating without workers.
    pub static WORKER_ID: RefCell<usize> = const { RefCell::new(0) };

    /// Thread-local RNG for deterministic randomness in workers
    pub static WORKER_RNG: RefCell<Option<StdRng>> = const { RefCell::new(None) };
}

/// Initialize worker's RNG based on worker_id, epoch, and base seed.
/// Seed formula: base_seed + (epoch << 32) + worker_id
pub fn init_worker_rng(worker_id: usize, epoch: usize, base_seed: u64) {
    WORKER_RNG.with(|rng| {
        let seed = base_seed
            .wrapping_add((epoch as u64) << 32)
            .wrapping_add(worker_id as u64);
        *rng.borrow_mut() = Some(StdRng::seed_from_u64(seed));
    })
}

/// Clears the thread's seeded RNG so later draws fall back to the thread RNG.
pub fn reset_worker_rng() {
    WORKER_RNG.with(|rng| *rng.borrow_mut() = None);
}

/// Get a random bool from worker RNG, or the thread RNG if not in worker context.
pub fn worker_gen_bool(p: f64) -> bool {
    WORKER_RNG.with(|rng| {
        let mut rng_ref = rng.borrow_mut();
        match rng_ref.as_mut() {
            Some(rng) => rng.random_bool(p),
            None => rand::rng().random_bool(p),
        }
    })
}

/// Draws uniformly from `[low, high]` using the worker RNG when one is set.
pub fn worker_gen_range(low: f64, high: f64) -> f64 {
    if low >= high {
        return low;
    }
    WORKER_RNG.with(|rng| {
        let mut rng_ref = rng.borrow_mut();
        match rng_ref.as_mut() {
            Some(rng) => rng.random_range(low..=high),
            None => rand::rng().random_range(low..=high),
        }
    })
}
