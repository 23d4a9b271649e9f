use crate::dataset::DataSource;
use anyhow::{anyhow, bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Suffixes accepted by the saliency loaders.
pub const IMAGE_SUFFIXES: &[&str] = &[".jpg", ".png"];

/// Streams image file paths from one flat directory.
///
/// A path is kept when it is a regular file and its file name ends with one of
/// `suffixes`, compared exactly (`a.JPG` does not match `.jpg`). Subdirectories
/// are not visited, and a directory named `x.png` is skipped. This source
/// yields paths, not decoded images, so nothing is read besides the listing.
///
/// # Example
/// ```ignore
/// let source = ImageDirSource::new("./data/DUTS-TR/image", IMAGE_SUFFIXES);
/// let paths = source.sorted_paths()?;
/// ```
#[derive(Debug, Clone)]
pub struct ImageDirSource {
    dir_path: PathBuf,
    suffixes: Vec<String>,
}

impl ImageDirSource {
    /// Creates a new image directory source.
    ///
    /// # Arguments
    /// - `dir_path`: Directory to scan.
    /// - `suffixes`: File-name suffixes to include (e.g. `[".jpg", ".png"]`). Case-sensitive.
    pub fn new(dir_path: impl Into<PathBuf>, suffixes: &[&str]) -> Self {
        Self {
            dir_path: dir_path.into(),
            suffixes: suffixes.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn dir_path(&self) -> &Path {
        &self.dir_path
    }

    /// Collects every matching path and sorts them by their byte representation.
    ///
    /// Sorting is what pairs files across parallel directories, so the order
    /// must be total and independent of the filesystem's listing order.
    pub fn sorted_paths(&self) -> Result<Vec<PathBuf>> {
        let mut paths = self
            .stream()?
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("Failed to list {}", self.dir_path.display()))?;
        paths.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
        log::debug!("Found {} images in {}", paths.len(), self.dir_path.display());
        Ok(paths)
    }
}

fn has_suffix(path: &Path, suffixes: &[String]) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy())
        .is_some_and(|name| suffixes.iter().any(|s| name.ends_with(s.as_str())))
}

/// Returns an iterator over matching image file paths, in listing order.
impl DataSource<PathBuf> for ImageDirSource {
    fn stream(&self) -> Result<Box<dyn Iterator<Item = Result<PathBuf>> + Send>> {
        // Early validation: ensure the directory exists and is indeed a directory.
        let dir_metadata = fs::metadata(&self.dir_path)
            .with_context(|| format!("Failed to access directory: {}", self.dir_path.display()))?;
        if !dir_metadata.is_dir() {
            bail!("Path is not a directory: {}", self.dir_path.display());
        }

        let suffixes = self.suffixes.clone();
        let entries = fs::read_dir(&self.dir_path)
            .with_context(|| format!("Failed to read directory: {}", self.dir_path.display()))?;

        let iter = entries.filter_map(move |entry| {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => return Some(Err(anyhow!("Failed to read directory entry: {}", e))),
            };
            if !has_suffix(&path, &suffixes) {
                return None;
            }
            // Follows symlinks, so a link to a regular file counts as a file.
            match path.metadata() {
                Ok(metadata) if metadata.is_file() => Some(Ok(path)),
                Ok(_) => None,
                Err(e) => Some(Err(e).with_context(|| {
                    format!("Failed to get metadata for: {}", path.display())
                })),
            }
        });
        Ok(Box::new(iter))
    }
}
