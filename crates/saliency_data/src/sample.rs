use anyhow::{anyhow, Result};
use std::collections::HashMap;
use tch::Tensor;

/// Feature holding the normalized RGB image, shape `[3, S, S]`.
pub const IMAGE: &str = "image";
/// Feature holding the binary ground-truth mask, shape `[1, S, S]`.
pub const GT: &str = "gt";
/// Feature holding the transition (boundary) map, shape `[1, S, S]`.
pub const TRANS: &str = "trans";

/// A single training example: feature name -> tensor.
///
/// The saliency dataset produces `{"image": [3, S, S], "gt": [1, S, S], "trans": [1, S, S]}`,
/// but any feature set works as long as every sample in a batch agrees on
/// names and shapes.
#[derive(Debug)]
pub struct Sample {
    pub features: HashMap<String, Tensor>,
}

/// Creates a shallow clone of the `Sample`; tensor storage is shared.
impl Clone for Sample {
    fn clone(&self) -> Self {
        let features = self
            .features
            .iter()
            .map(|(k, v)| (k.clone(), v.shallow_clone()))
            .collect();
        Self { features }
    }
}

impl Sample {
    pub fn new(features: HashMap<String, Tensor>) -> Self {
        Self { features }
    }

    /// Creates a `Sample` from a single `(feature_name, tensor)` pair.
    ///
    /// Chain with [`with_feature`](Self::with_feature) to add more features.
    pub fn from_single(name: impl Into<String>, tensor: Tensor) -> Self {
        Self {
            features: HashMap::from([(name.into(), tensor)]),
        }
    }

    /// Builds the `(image, gt, trans)` triplet sample.
    pub fn triplet(image: Tensor, gt: Tensor, trans: Tensor) -> Self {
        Self::from_single(IMAGE, image)
            .with_feature(GT, gt)
            .with_feature(TRANS, trans)
    }

    /// Adds or overwrites a feature in the `Sample`.
    pub fn with_feature(mut self, name: impl Into<String>, tensor: Tensor) -> Self {
        self.features.insert(name.into(), tensor);
        self
    }

    pub fn get(&self, feature: &str) -> Result<&Tensor> {
        self.features
            .get(feature)
            .ok_or_else(|| anyhow!("Feature {} not found", feature))
    }

    /// Returns an iterator over all feature names in this `Sample`.
    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.features.keys().map(String::as_str)
    }
}
