pub mod image_dir;

pub use image_dir::{ImageDirSource, IMAGE_SUFFIXES};
