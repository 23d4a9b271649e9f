use anyhow::{ensure, Result};
use rand::seq::SliceRandom;
use rand::{rngs::StdRng, SeedableRng};

/// A `Sampler` decides the order in which dataset indices are visited.
///
/// `iter(epoch)` returns the sequence for that epoch. Shuffling samplers
/// combine `epoch` with their base seed so every epoch gets a new order while
/// staying reproducible for a fixed seed.
///
/// Implementations must be `Send + Sync` so a `DataLoader` holding one can be
/// shared across threads.
pub trait Sampler: Send + Sync {
    type Item: Send + Sync;

    fn iter(&self, epoch: usize) -> Box<dyn Iterator<Item = Self::Item> + Send + '_>;
}

/// Lets a boxed sampler be wrapped by [`BatchSampler`] without knowing its concrete type.
impl<S: Sampler + ?Sized> Sampler for Box<S> {
    type Item = S::Item;

    fn iter(&self, epoch: usize) -> Box<dyn Iterator<Item = Self::Item> + Send + '_> {
        (**self).iter(epoch)
    }
}

/// ============================================================================
/// Yields indices in order `(0, 1, ..., dataset_size - 1)` every epoch.
///
/// # Examples
/// ```ignore
/// let sampler = SequentialSampler::new(5);
/// let indices: Vec<_> = sampler.iter(0).collect();
/// assert_eq!(indices, vec![0, 1, 2, 3, 4]);
/// ```
#[derive(Debug, Clone)]
pub struct SequentialSampler {
    dataset_size: usize,
}

impl SequentialSampler {
    pub fn new(dataset_size: usize) -> Self {
        Self { dataset_size }
    }
}

impl Sampler for SequentialSampler {
    type Item = usize;

    fn iter(&self, _epoch: usize) -> Box<dyn Iterator<Item = usize> + Send + '_> {
        Box::new(0..self.dataset_size)
    }
}

/// ============================================================================
/// Random permutation of `0..dataset_size`, reshuffled every epoch.
///
/// # Arguments:
/// - `dataset_size`: Total number of samples in a dataset.
/// - `base_seed`: Base RNG seed.
///
/// # Seed derivation
/// Epoch `e` draws from an RNG seeded with `base_seed + e`, so the order
/// changes every epoch and the same `base_seed` reproduces the same run.
///
/// An empty dataset is rejected: there is nothing to shuffle.
///
/// # Example usage
/// ```ignore
/// let sampler = RandomSampler::new(1000, 42)?;
/// let epoch0: Vec<_> = sampler.iter(0).collect();
/// ```
#[derive(Debug, Clone)]
pub struct RandomSampler {
    dataset_size: usize,
    base_seed: u64,
}

impl RandomSampler {
    pub fn new(dataset_size: usize, base_seed: u64) -> Result<Self> {
        ensure!(
            dataset_size > 0,
            "Cannot shuffle an empty dataset (dataset_size=0)"
        );

        Ok(Self {
            dataset_size,
            base_seed,
        })
    }

    #[inline]
    fn derive_rng_for_epoch(&self, epoch: usize) -> StdRng {
        StdRng::seed_from_u64(self.base_seed.wrapping_add(epoch as u64))
    }
}

impl Sampler for RandomSampler {
    type Item = usize;

    fn iter(&self, epoch: usize) -> Box<dyn Iterator<Item = usize> + Send + '_> {
        let mut rng = self.derive_rng_for_epoch(epoch);
        let mut indices: Vec<_> = (0..self.dataset_size).collect();
        indices.shuffle(&mut rng);
        Box::new(indices.into_iter())
    }
}

/// ============================================================================
/// Groups the items of an inner [`Sampler`] into batches of `batch_size`.
///
/// The final batch may be smaller unless `drop_last` is set, in which case
/// it is discarded.
///
/// # Example
/// ```ignore
/// let batch_sampler = BatchSampler::new(SequentialSampler::new(10), 4, false)?;
/// let batches: Vec<_> = batch_sampler.iter(0).collect();
/// // [[0, 1, 2, 3], [4, 5, 6, 7], [8, 9]]
/// ```
#[derive(Debug, Clone)]
pub struct BatchSampler<S> {
    sampler: S,
    batch_size: usize,
    drop_last: bool,
}

impl<S: Sampler> BatchSampler<S> {
    pub fn new(sampler: S, batch_size: usize, drop_last: bool) -> Result<Self> {
        ensure!(
            batch_size > 0,
            "batch_size must be > 0, but got batch_size={}",
            batch_size
        );
        Ok(Self {
            sampler,
            batch_size,
            drop_last,
        })
    }
}

impl<S: Sampler> Sampler for BatchSampler<S> {
    type Item = Vec<S::Item>;

    fn iter(&self, epoch: usize) -> Box<dyn Iterator<Item = Self::Item> + Send + '_> {
        let mut sampler_iter = self.sampler.iter(epoch);
        let batch_size = self.batch_size;
        let drop_last = self.drop_last;

        Box::new(std::iter::from_fn(move || {
            let mini_batch: Vec<_> = sampler_iter.by_ref().take(batch_size).collect();
            if mini_batch.len() == batch_size || (!drop_last && !mini_batch.is_empty()) {
                Some(mini_batch)
            } else {
                None
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const TEST_SEED: u64 = 42;
    const TEST_DATASET_SIZE: usize = 100;

    mod sequential_sampler_tests {
        use super::*;

        #[test]
        fn yields_sequential_indices() {
            let sampler = SequentialSampler::new(100);
            let indices: Vec<usize> = sampler.iter(0).collect();
            assert_eq!(indices, (0..100).collect::<Vec<_>>());
            assert_eq!(sampler.iter(7).collect::<Vec<_>>(), indices);
        }

        #[test]
        fn handles_empty_dataset() {
            let sampler = SequentialSampler::new(0);
            assert_eq!(sampler.iter(0).count(), 0);
        }
    }

    mod random_sampler_tests {
        use super::*;

        #[test]
        fn validates_parameters() {
            assert!(RandomSampler::new(10, TEST_SEED).is_ok());

            // Empty dataset: nothing to sample from
            assert!(RandomSampler::new(0, TEST_SEED).is_err());
        }

        #[test]
        fn is_a_permutation() {
            let sampler = RandomSampler::new(TEST_DATASET_SIZE, TEST_SEED).unwrap();
            let samples: Vec<_> = sampler.iter(0).collect();
            assert_eq!(samples.len(), TEST_DATASET_SIZE);
            assert_eq!(HashSet::<_>::from_iter(samples).len(), TEST_DATASET_SIZE);
        }

        #[test]
        fn produces_deterministic_results() {
            let sampler = RandomSampler::new(TEST_DATASET_SIZE, TEST_SEED).unwrap();
            let epoch1 = sampler.iter(1).collect::<Vec<_>>();
            assert_eq!(epoch1, sampler.iter(1).collect::<Vec<_>>());
            assert_ne!(epoch1, sampler.iter(2).collect::<Vec<_>>());
        }
    }

    mod batch_sampler_tests {
        use super::*;

        #[test]
        fn test_batches_full() {
            let batch_sampler = BatchSampler::new(SequentialSampler::new(10), 2, false).unwrap();
            let mini_batches: Vec<_> = batch_sampler.iter(0).collect();
            assert_eq!(
                mini_batches,
                vec![vec![0, 1], vec![2, 3], vec![4, 5], vec![6, 7], vec![8, 9]]
            );
        }

        #[test]
        fn test_batches_keep_partial_tail() {
            let batch_sampler = BatchSampler::new(SequentialSampler::new(10), 4, false).unwrap();
            let mini_batches: Vec<_> = batch_sampler.iter(0).collect();
            assert_eq!(mini_batches, vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7], vec![8, 9]]);
        }

        #[test]
        fn test_batches_drop_last() {
            let batch_sampler = BatchSampler::new(SequentialSampler::new(10), 3, true).unwrap();
            let mini_batches: Vec<_> = batch_sampler.iter(0).collect();
            assert_eq!(
                mini_batches,
                vec![vec![0, 1, 2], vec![3, 4, 5], vec![6, 7, 8]]
            );
        }

        #[test]
        fn test_rejects_zero_batch_size() {
            assert!(BatchSampler::new(SequentialSampler::new(10), 0, false).is_err());
        }

        #[test]
        fn test_wraps_boxed_sampler() -> Result<()> {
            let inner: Box<dyn Sampler<Item = usize>> =
                Box::new(RandomSampler::new(9, TEST_SEED)?);
            let batch_sampler = BatchSampler::new(inner, 4, false)?;

            let batches: Vec<_> = batch_sampler.iter(3).collect();
            assert_eq!(batches.iter().map(Vec::len).collect::<Vec<_>>(), vec![4, 4, 1]);

            let seen: HashSet<usize> = batches.into_iter().flatten().collect();
            assert_eq!(seen, (0..9).collect());
            Ok(())
        }
    }
}
