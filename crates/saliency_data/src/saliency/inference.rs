use crate::readers::{ImageDirSource, IMAGE_SUFFIXES};
use crate::transforms::vision::{EnsureLuma, EnsureRGB, LoadImage, Normalize, Resize, ToTensor};
use crate::transforms::{BoxedTransform, Transform};
use anyhow::{anyhow, Context, Result};
use image::DynamicImage;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tch::Tensor;

/// One image prepared for inference.
#[derive(Debug)]
pub struct InferenceSample {
    pub path: PathBuf,
    /// `[1, 3, S, S]`, ImageNet-normalized.
    pub image: Tensor,
    /// First dimension of the decoded image, before resizing (its width).
    pub width: u32,
    /// Second dimension of the decoded image, before resizing (its height).
    pub height: u32,
    /// File name for the prediction, with `.jpg` rewritten to `.png`.
    pub name: String,
}

/// Serves the images of one directory, in sorted order, for prediction.
///
/// Three ways to walk the list:
/// - [`load_data`](Self::load_data): the next image under an internal cursor
/// - [`load`](Self::load): any image by index, cursor untouched
/// - [`iter`](Self::iter): every image once, as an iterator
pub struct InferenceLoader {
    images: Vec<PathBuf>,
    test_size: u32,
    pipeline: BoxedTransform<DynamicImage, Tensor>,
    cursor: usize,
}

impl InferenceLoader {
    pub fn new(image_root: impl AsRef<Path>, test_size: u32) -> Result<Self> {
        let images = ImageDirSource::new(image_root.as_ref(), IMAGE_SUFFIXES)
            .sorted_paths()
            .context("Failed to list inference images")?;
        let pipeline = Resize::square(test_size)?
            .then(ToTensor)
            .then(Normalize::imagenet())
            .boxed();

        Ok(Self {
            images,
            test_size,
            pipeline,
            cursor: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Index of the image the next `load_data` call returns.
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn test_size(&self) -> u32 {
        self.test_size
    }

    pub fn image_paths(&self) -> &[PathBuf] {
        &self.images
    }

    /// Loads image `index` without moving the cursor.
    pub fn load(&self, index: usize) -> Result<InferenceSample> {
        let path = self.images.get(index).ok_or_else(|| {
            anyhow!(
                "Index {} out of range for {} inference images",
                index,
                self.images.len()
            )
        })?;

        let decoded = LoadImage.then(EnsureRGB).apply(path.clone())?;
        let (width, height) = (decoded.width(), decoded.height());
        let image = self
            .pipeline
            .apply(decoded)
            .with_context(|| format!("Failed to transform {}", path.display()))?
            .unsqueeze(0);

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| anyhow!("No file name in {}", path.display()))?;

        log::debug!("Loaded {} ({}x{})", path.display(), width, height);
        Ok(InferenceSample {
            path: path.clone(),
            image,
            width,
            height,
            name: output_name(&file_name),
        })
    }

    /// Loads the image under the cursor and advances it.
    ///
    /// Returns `(image [1, 3, S, S], width, height, name)`. Once every image
    /// has been served further calls fail and the cursor stays put.
    pub fn load_data(&mut self) -> Result<(Tensor, u32, u32, String)> {
        let sample = self.load(self.cursor)?;
        self.cursor += 1;
        Ok((sample.image, sample.width, sample.height, sample.name))
    }

    /// Loads the ground truth stored at `<name>.jpg`, or at `<name>.png` when
    /// there is no `.jpg`, as single-channel luma at its original size.
    pub fn load_gt(&self, name: impl AsRef<Path>) -> Result<DynamicImage> {
        let jpg = with_suffix(name.as_ref(), ".jpg");
        let path = if jpg.exists() {
            jpg
        } else {
            let png = with_suffix(name.as_ref(), ".png");
            if !png.exists() {
                return Err(anyhow!(
                    "Ground truth not found: neither {} nor {} exists",
                    jpg.display(),
                    png.display()
                ));
            }
            png
        };

        LoadImage
            .then(EnsureLuma)
            .apply(path.clone())
            .with_context(|| format!("Failed to load ground truth {}", path.display()))
    }

    /// Walks every image once, in sorted order, independently of the cursor.
    pub fn iter(&self) -> impl Iterator<Item = Result<InferenceSample>> + '_ {
        (0..self.images.len()).map(move |index| self.load(index))
    }
}

impl std::fmt::Debug for InferenceLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceLoader")
            .field("len", &self.images.len())
            .field("test_size", &self.test_size)
            .field("cursor", &self.cursor)
            .finish()
    }
}

/// `foo.jpg` -> `foo.png`; the text before the first `.jpg` is kept.
/// Names not ending in `.jpg` are returned unchanged.
pub fn output_name(file_name: &str) -> String {
    if !file_name.ends_with(".jpg") {
        return file_name.to_string();
    }
    let stem = file_name.split(".jpg").next().unwrap_or_default();
    format!("{}.png", stem)
}

fn with_suffix(name: &Path, suffix: &str) -> PathBuf {
    let mut os: OsString = name.as_os_str().to_owned();
    os.push(suffix);
    PathBuf::from(os)
}
