use crate::minibatch::MiniBatch;
use crate::sample::Sample;
use anyhow::{anyhow, bail, Result};
use std::collections::{HashMap, HashSet};
use tch::Tensor;

/// A `Collator` defines how to combine multiple [`Sample`]s into a [`MiniBatch`].
pub trait Collator {
    fn collate(&self, samples: &[Sample]) -> Result<MiniBatch>;
}

/// Stacks tensors with identical shapes along a new batch dimension (dim 0).
///
/// Every sample must carry the same feature names, and each feature must have
/// the same shape across the batch; otherwise an error is returned.
#[derive(Debug, Clone, Copy, Default)]
pub struct StackCollator;

impl Collator for StackCollator {
    fn collate(&self, samples: &[Sample]) -> Result<MiniBatch> {
        let Some(first) = samples.first() else {
            bail!("Cannot collate empty sample list");
        };

        // Validate feature keys
        let first_keys: HashSet<&String> = first.features.keys().collect();
        for (i, sample) in samples.iter().enumerate().skip(1) {
            let missing_keys: Vec<&String> = first_keys
                .iter()
                .filter(|&&k| !sample.features.contains_key(k))
                .cloned()
                .collect();

            let extra_keys: Vec<&String> = sample
                .features
                .keys()
                .filter(|k| !first_keys.contains(k))
                .collect();

            if !missing_keys.is_empty() || !extra_keys.is_empty() {
                bail!(
                    "Sample #{} has mismatch feature keys:\n -Missing: {:?}\n -Extra: {:?}",
                    i,
                    missing_keys,
                    extra_keys
                )
            }
        }

        let mut tensors = HashMap::with_capacity(first_keys.len());
        for key in first_keys {
            let tensors_to_stack = samples
                .iter()
                .map(|s| {
                    s.features
                        .get(key)
                        .ok_or_else(|| anyhow!("Feature '{}' disappeared during collation", key))
                })
                .collect::<Result<Vec<&Tensor>>>()?;

            let reference_shape = tensors_to_stack[0].size();
            for (i, tensor) in tensors_to_stack.iter().enumerate() {
                if tensor.size() != reference_shape {
                    bail!(
                        "Shape mismatch in sample {} for feature '{}': expected {:?}, got {:?}",
                        i,
                        key,
                        reference_shape,
                        tensor.size()
                    );
                }
            }

            tensors.insert(key.clone(), Tensor::stack(&tensors_to_stack, 0));
        }
        Ok(MiniBatch { tensors })
    }
}
