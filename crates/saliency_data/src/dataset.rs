use crate::sample::Sample;
use anyhow::Result;
use std::sync::Arc;

/// A `Dataset` provides random access to data samples by index.
///
/// Samples are produced on demand: `get_sample` decodes and transforms the
/// item every time it is called, so a dataset holds only its index (file
/// lists, parameters) and never the decoded data.
///
/// Implementations must be `Send + Sync` because the `DataLoader` shares one
/// instance across its worker threads and calls `get_sample` concurrently.
pub trait Dataset: Send + Sync {
    /// Returns total number of samples.
    fn len(&self) -> usize;

    /// Loads the sample at `index`.
    ///
    /// Out-of-range indices and unreadable inputs are errors.
    fn get_sample(&self, index: usize) -> Result<Sample>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<D: Dataset + ?Sized> Dataset for Arc<D> {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn get_sample(&self, index: usize) -> Result<Sample> {
        (**self).get_sample(index)
    }
}

/// A source of raw items (e.g. file paths) that a dataset is built from.
///
/// Sources stream lazily; collecting and ordering the items is left to the caller.
pub trait DataSource<T>: Send + Sync {
    fn stream(&self) -> Result<Box<dyn Iterator<Item = Result<T>> + Send>>;
}
