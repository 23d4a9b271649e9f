pub mod collator;
pub mod dataloader;
pub mod dataset;
pub mod logging;
pub mod minibatch;
pub mod readers;
pub mod saliency;
pub mod sample;
pub mod sampler;
pub mod transforms;

pub use collator::{Collator, StackCollator};
pub use dataloader::{DataLoader, DataLoaderConfig};
pub use dataset::Dataset;
pub use minibatch::MiniBatch;
pub use saliency::{
    get_loader, get_loader_from_options, InferenceLoader, InferenceSample, LoaderOptions,
    SaliencyDataset,
};
pub use sample::Sample;
