pub mod core;
pub mod vision;

pub use core::{BoxedTransform, Chain, Transform};
