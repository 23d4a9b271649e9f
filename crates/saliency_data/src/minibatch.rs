use crate::collator::Collator;
use crate::sample::Sample;
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use tch::{Device, Tensor};

/// A batch of samples stacked along dim 0.
///
/// For the saliency dataset with batch size `B` and train size `S`:
/// - `"image"` -> shape `[B, 3, S, S]`
/// - `"gt"` -> shape `[B, 1, S, S]`
/// - `"trans"` -> shape `[B, 1, S, S]`
#[derive(Debug)]
pub struct MiniBatch {
    pub tensors: HashMap<String, Tensor>,
}

impl MiniBatch {
    /// Constructs a `MiniBatch` by applying the given [`Collator`] to a
    /// list of individual [`Sample`]s.
    pub fn collate(samples: Vec<Sample>, collator: impl Collator) -> Result<Self> {
        collator.collate(&samples)
    }

    /// Returns the number of samples in the batch.
    pub fn batch_size(&self) -> Result<i64> {
        self.tensors
            .values()
            .next()
            .map(|t| t.size()[0])
            .ok_or(anyhow!("Empty mini-batch"))
    }

    pub fn get(&self, feature: &str) -> Result<&Tensor> {
        self.tensors
            .get(feature)
            .ok_or_else(|| anyhow!("Feature '{}' not found in mini-batch", feature))
    }

    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.tensors.keys().map(String::as_str)
    }

    /// Transfers all tensors to the target device (CPU/GPU)
    pub fn to_device(&self, device: Device) -> Self {
        Self {
            tensors: self
                .tensors
                .iter()
                .map(|(feature_name, tensor)| (feature_name.clone(), tensor.to_device(device)))
                .collect(),
        }
    }

    /// Copies every tensor into page-locked host memory.
    ///
    /// Without CUDA there is no pinned allocator, so the batch is returned
    /// unchanged.
    pub fn pin_memory(self) -> Self {
        if !tch::Cuda::is_available() {
            return self;
        }
        Self {
            tensors: self
                .tensors
                .into_iter()
                .map(|(feature_name, tensor)| {
                    let pinned = tensor.pin_memory(Device::Cuda(0));
                    (feature_name, pinned)
                })
                .collect(),
        }
    }
}
