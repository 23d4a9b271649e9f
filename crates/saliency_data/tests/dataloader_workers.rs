//! Worker lifecycle and concurrency tests for DataLoader.
//!
//! Tests cover:
//! - Ordered output with several workers
//! - Fresh workers per epoch and early-drop cleanup
//! - Error and timeout handling
//! - Backpressure (prefetch bound)
//! - Determinism of shuffling and random draws across runs

mod common;
use common::{collect_draws, collect_indices, IndexDataset};
use saliency_data::dataloader::{DataLoader, DataLoaderConfig};

use anyhow::{bail, Result};
use std::collections::HashSet;
use std::sync::atomic::Ordering;
use std::time::Duration;

// ============================================================================
// 1. Ordering and lifecycle
// ============================================================================

#[test]
fn test_workers_yield_batches_in_sampler_order() -> Result<()> {
    let dataset = IndexDataset {
        delay: Duration::from_millis(2),
        ..IndexDataset::new(64)
    };
    let config = DataLoaderConfig::builder()
        .batch_size(3)
        .num_workers(4)
        .prefetch_factor(2)
        .build();
    let loader = DataLoader::new(dataset, config)?;

    assert_eq!(collect_indices(loader.iter()?)?, (0..64).collect::<Vec<_>>());
    Ok(())
}

#[test]
fn test_batches_are_spread_round_robin() -> Result<()> {
    let config = DataLoaderConfig::builder()
        .batch_size(2)
        .num_workers(3)
        .build();
    let loader = DataLoader::new(IndexDataset::new(18), config)?;

    for (batch_index, batch) in loader.iter()?.enumerate() {
        let workers: Vec<i64> = batch?.get("worker")?.view([-1]).try_into()?;
        assert!(workers.iter().all(|&w| w == (batch_index % 3) as i64));
    }
    Ok(())
}

#[test]
fn test_fresh_workers_stop_after_early_drop() -> Result<()> {
    let dataset = IndexDataset {
        delay: Duration::from_millis(10),
        ..IndexDataset::new(100)
    };
    let loaded = dataset.loaded.clone();

    let config = DataLoaderConfig::builder()
        .batch_size(1)
        .num_workers(2)
        .prefetch_factor(1)
        .build();
    let loader = DataLoader::new(dataset, config)?;

    let mut iter = loader.iter()?;
    let _first = iter.next().unwrap()?;
    drop(iter);

    std::thread::sleep(Duration::from_millis(200));
    let total = loaded.load(Ordering::SeqCst);
    assert!(total < 10, "workers kept loading after drop: {} samples", total);

    // A new epoch spawns new workers and runs to completion
    assert_eq!(loader.iter()?.count(), 100);
    Ok(())
}

// ============================================================================
// 2. Failures
// ============================================================================

#[test]
fn test_worker_error_surfaces_in_order() -> Result<()> {
    let dataset = IndexDataset {
        fail_at: Some(9),
        ..IndexDataset::new(16)
    };
    let config = DataLoaderConfig::builder()
        .batch_size(4)
        .num_workers(2)
        .build();
    let loader = DataLoader::new(dataset, config)?;

    let results: Vec<_> = loader.iter()?.collect();
    assert_eq!(results.len(), 4);
    assert!(results[0].is_ok() && results[1].is_ok() && results[3].is_ok());

    let Err(err) = &results[2] else {
        bail!("batch 2 holds index 9 and should fail");
    };
    let chain = format!("{:#}", err);
    assert!(chain.contains("batch 2"), "unexpected error: {}", chain);
    assert!(chain.contains("index 9"), "unexpected error: {}", chain);
    Ok(())
}

#[test]
fn test_slow_worker_times_out() -> Result<()> {
    let dataset = IndexDataset {
        delay: Duration::from_millis(500),
        ..IndexDataset::new(2)
    };
    let config = DataLoaderConfig::builder()
        .batch_size(1)
        .num_workers(1)
        .timeout(Duration::from_millis(50))
        .build();
    let loader = DataLoader::new(dataset, config)?;

    let mut iter = loader.iter()?;
    match iter.next() {
        Some(Err(err)) => assert!(err.to_string().contains("timeout"), "unexpected error: {}", err),
        _ => bail!("expected a timeout error"),
    }
    Ok(())
}

// ============================================================================
// 3. Backpressure
// ============================================================================

#[test]
fn test_prefetch_bounds_work_ahead() -> Result<()> {
    let dataset = IndexDataset::new(100);
    let loaded = dataset.loaded.clone();

    let num_workers = 2;
    let prefetch_factor = 2;
    let batch_size = 5;
    let config = DataLoaderConfig::builder()
        .batch_size(batch_size)
        .num_workers(num_workers)
        .prefetch_factor(prefetch_factor)
        .build();
    let loader = DataLoader::new(dataset, config)?;

    let mut iter = loader.iter()?;
    let _first = iter.next().unwrap()?;
    std::thread::sleep(Duration::from_millis(200));

    // At most one window of batches beyond the one consumed
    let bound = (num_workers * prefetch_factor + 1) * batch_size;
    let total = loaded.load(Ordering::SeqCst);
    assert!(total <= bound, "loaded {} samples, bound is {}", total, bound);
    Ok(())
}

// ============================================================================
// 4. Determinism
// ============================================================================

#[test]
fn test_seeded_runs_match_with_workers() -> Result<()> {
    let run = |num_workers| -> Result<(Vec<i64>, Vec<f64>)> {
        let config = DataLoaderConfig::builder()
            .batch_size(4)
            .shuffle(true)
            .seed(1337)
            .num_workers(num_workers)
            .build();
        let loader = DataLoader::new(IndexDataset::new(40), config)?;
        let mut indices = Vec::new();
        let mut draws = Vec::new();
        for batch in loader.iter()? {
            let batch = batch?;
            let batch_indices: Vec<i64> = batch.get("index")?.view([-1]).try_into()?;
            let batch_draws: Vec<f64> = batch.get("draw")?.view([-1]).try_into()?;
            indices.extend(batch_indices);
            draws.extend(batch_draws);
        }
        Ok((indices, draws))
    };

    let (order_a, draws_a) = run(3)?;
    let (order_b, draws_b) = run(3)?;
    assert_eq!(order_a, order_b);
    assert_eq!(draws_a, draws_b);
    assert_eq!(order_a.iter().collect::<HashSet<_>>().len(), 40);

    // Sampling order does not depend on the worker count
    let (order_c, _) = run(2)?;
    assert_eq!(order_a, order_c);
    Ok(())
}

#[test]
fn test_single_worker_matches_main_thread() -> Result<()> {
    let run = |num_workers| -> Result<Vec<f64>> {
        let config = DataLoaderConfig::builder()
            .batch_size(3)
            .seed(99)
            .num_workers(num_workers)
            .build();
        let loader = DataLoader::new(IndexDataset::new(9), config)?;
        let draws = collect_draws(loader.iter()?);
        draws
    };

    assert_eq!(run(0)?, run(1)?);
    Ok(())
}
