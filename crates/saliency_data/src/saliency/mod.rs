//! Salient-object segmentation data.
//!
//! - `pairing`: lists and pairs the image / ground-truth / transition directories
//! - `train`: [`SaliencyDataset`], the per-item decode + transform
//! - `factory`: [`get_loader`], dataset wrapped in a batching `DataLoader`
//! - `options`: [`LoaderOptions`], the same arguments from JSON
//! - `inference`: [`InferenceLoader`], sequential images for prediction

pub mod factory;
pub mod inference;
pub mod options;
pub mod pairing;
pub mod train;

pub use factory::{get_loader, get_loader_from_options};
pub use inference::{output_name, InferenceLoader, InferenceSample};
pub use options::LoaderOptions;
pub use pairing::{filter_matching_sizes, scan_triplets, TripletPaths};
pub use train::SaliencyDataset;
