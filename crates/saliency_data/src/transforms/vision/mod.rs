//! src/transforms/vision/mod.rs
//!
//! Vision transforms for image preprocessing and augmentation.
//!
//! ```text
//! transforms/vision/
//! ├── io.rs            → Image decoding and header-only dimension reads
//! ├── geometric.rs     → Colour-type coercion, resize, rotation
//! ├── augmentation.rs  → Random horizontal flip
//! ├── conversion.rs    → Image → tensor
//! └── photometric.rs   → Channel normalization
//! ```
//!
//! # Quick Start
//!
//! ```ignore
//! use crate::transforms::Transform;
//! use crate::transforms::vision::{LoadImage, EnsureRGB, Resize, ToTensor, Normalize};
//!
//! let pipeline = LoadImage
//!     .then(EnsureRGB)
//!     .then(Resize::square(352)?)
//!     .then(ToTensor)
//!     .then(Normalize::imagenet());
//! ```

pub mod augmentation;
pub mod conversion;
pub mod geometric;
pub mod io;
pub mod photometric;

pub use augmentation::RandomHorizontalFlip;
pub use conversion::ToTensor;
pub use geometric::{EnsureLuma, EnsureRGB, RandomRotation, Resize};
pub use io::{read_dimensions, LoadImage};
pub use photometric::{Normalize, IMAGENET_MEAN, IMAGENET_STD};
