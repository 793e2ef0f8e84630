//! Source and destination directory layouts.
//!
//! Source (VisDrone):
//!
//! ```text
//! <src>/images/<subset>/*.jpg
//! <src>/annotations/<subset>/*.txt
//! ```
//!
//! Destination, one directory per bucket:
//!
//! ```text
//! <dst>/server/{images,labels}/
//! <dst>/client<k>/{images,labels}/
//! ```

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use crate::error::FedsplitError;
use crate::split::Bucket;

pub const IMAGE_EXTENSION: &str = "jpg";
pub const LABEL_EXTENSION: &str = "txt";

/// A top-level dataset split.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Subset {
    /// Distributed across the clients.
    Train,
    /// Kept whole on the server.
    Val,
}

impl Subset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Subset::Train => "train",
            Subset::Val => "val",
        }
    }
}

impl fmt::Display for Subset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved image and annotation directories of one source subset.
#[derive(Clone, Debug)]
pub struct SourceLayout {
    pub subset: Subset,
    pub images_dir: PathBuf,
    pub annotations_dir: PathBuf,
}

impl SourceLayout {
    /// Resolves `src/images/<subset>` and `src/annotations/<subset>`.
    ///
    /// Both must exist and be directories.
    pub fn discover(src: &Path, subset: Subset) -> Result<Self, FedsplitError> {
        let images_dir = src.join("images").join(subset.as_str());
        let annotations_dir = src.join("annotations").join(subset.as_str());

        if !images_dir.is_dir() {
            return Err(FedsplitError::SourceLayoutInvalid {
                path: images_dir,
                message: "missing image directory".to_string(),
            });
        }

        if !annotations_dir.is_dir() {
            return Err(FedsplitError::SourceLayoutInvalid {
                path: annotations_dir,
                message: "missing annotation directory".to_string(),
            });
        }

        Ok(Self {
            subset,
            images_dir,
            annotations_dir,
        })
    }

    /// Image file names of this subset, sorted.
    ///
    /// Fails with [`FedsplitError::NoImagesFound`] if there are none.
    pub fn image_files(&self) -> Result<Vec<String>, FedsplitError> {
        let files = collect_images(&self.images_dir)?;
        if files.is_empty() {
            return Err(FedsplitError::NoImagesFound {
                subset: self.subset.to_string(),
                path: self.images_dir.clone(),
            });
        }
        Ok(files)
    }

    pub fn image_path(&self, image: &str) -> PathBuf {
        self.images_dir.join(image)
    }

    /// The annotation file paired with `image` by stem.
    pub fn annotation_path(&self, image: &str) -> PathBuf {
        self.annotations_dir.join(label_name_for(image))
    }
}

/// Lists `*.jpg` files directly inside `dir`, sorted by name.
///
/// The extension is matched case-insensitively; subdirectories are not
/// searched. Two images that would share a label file (`a.jpg` and `a.JPG`)
/// are rejected.
pub fn collect_images(dir: &Path) -> Result<Vec<String>, FedsplitError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
        let entry = entry.map_err(|source| FedsplitError::DirectoryTraversal {
            path: dir.to_path_buf(),
            message: source.to_string(),
        })?;

        if !entry.file_type().is_file() || !has_extension(entry.path(), IMAGE_EXTENSION) {
            continue;
        }

        if let Some(name) = entry.file_name().to_str() {
            files.push(name.to_string());
        } else {
            log::warn!(
                "skipping image with non UTF-8 name: {}",
                entry.path().display()
            );
        }
    }

    files.sort();

    let mut labels: HashMap<String, &str> = HashMap::with_capacity(files.len());
    for image in &files {
        if let Some(previous) = labels.insert(label_name_for(image), image) {
            return Err(FedsplitError::SourceLayoutInvalid {
                path: dir.to_path_buf(),
                message: format!("{previous} and {image} map to the same label file"),
            });
        }
    }

    Ok(files)
}

fn has_extension(path: &Path, wanted: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(wanted))
        .unwrap_or(false)
}

/// `X.jpg` -> `X.txt`.
pub fn label_name_for(image: &str) -> String {
    Path::new(image)
        .with_extension(LABEL_EXTENSION)
        .to_string_lossy()
        .into_owned()
}

/// Destination directories of one bucket.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BucketDirs {
    pub images: PathBuf,
    pub labels: PathBuf,
}

impl BucketDirs {
    pub fn new(dst: &Path, bucket: Bucket) -> Self {
        let root = dst.join(bucket.name());
        Self {
            images: root.join("images"),
            labels: root.join("labels"),
        }
    }
}

/// Creates the destination tree for the server and `nclients` clients.
///
/// Existing directories are left as they are.
pub fn create_layout(dst: &Path, nclients: usize) -> Result<(), FedsplitError> {
    for bucket in Bucket::all(nclients) {
        let dirs = BucketDirs::new(dst, bucket);
        fs::create_dir_all(&dirs.images).map_err(FedsplitError::Io)?;
        fs::create_dir_all(&dirs.labels).map_err(FedsplitError::Io)?;
    }
    Ok(())
}
