#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

pub const VISDRONE_YAML: &str = include_str!("../fixtures/VisDrone.yaml");

pub fn bmp_bytes(width: u32, height: u32) -> Vec<u8> {
    let row_stride = (width * 3).div_ceil(4) * 4;
    let pixel_array_size = row_stride * height;
    let file_size = 54 + pixel_array_size;

    let mut bytes = Vec::with_capacity(file_size as usize);
    bytes.extend_from_slice(b"BM");
    bytes.extend_from_slice(&file_size.to_le_bytes());
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    bytes.extend_from_slice(&54u32.to_le_bytes());

    bytes.extend_from_slice(&40u32.to_le_bytes());
    bytes.extend_from_slice(&(width as i32).to_le_bytes());
    bytes.extend_from_slice(&(height as i32).to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&24u16.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&pixel_array_size.to_le_bytes());
    bytes.extend_from_slice(&2835u32.to_le_bytes());
    bytes.extend_from_slice(&2835u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());

    bytes.resize(file_size as usize, 0);
    bytes
}

/// Writes a BMP payload under a `.jpg` name; header sniffing still reports
/// the real dimensions.
pub fn write_image(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, bmp_bytes(width, height)).expect("write image file");
}

/// Builder for a VisDrone-style source tree inside a temp directory.
pub struct SourceTree {
    pub root: PathBuf,
}

impl SourceTree {
    pub fn new(root: &Path) -> Self {
        for subset in ["train", "val"] {
            fs::create_dir_all(root.join("images").join(subset)).expect("create images dir");
            fs::create_dir_all(root.join("annotations").join(subset))
                .expect("create annotations dir");
        }
        Self {
            root: root.to_path_buf(),
        }
    }

    /// Adds `<stem>.jpg` (1920x1080) and `<stem>.txt` to `subset`.
    pub fn add(&self, subset: &str, stem: &str, annotations: &str) -> &Self {
        self.add_sized(subset, stem, annotations, 1920, 1080)
    }

    pub fn add_sized(
        &self,
        subset: &str,
        stem: &str,
        annotations: &str,
        width: u32,
        height: u32,
    ) -> &Self {
        self.add_image(subset, stem, width, height);
        fs::write(
            self.root
                .join("annotations")
                .join(subset)
                .join(format!("{stem}.txt")),
            annotations,
        )
        .expect("write annotations");
        self
    }

    pub fn add_image(&self, subset: &str, stem: &str, width: u32, height: u32) -> &Self {
        write_image(
            &self
                .root
                .join("images")
                .join(subset)
                .join(format!("{stem}.jpg")),
            width,
            height,
        );
        self
    }
}

pub fn write_class_list(dir: &Path) -> PathBuf {
    let path = dir.join("VisDrone.yaml");
    fs::write(&path, VISDRONE_YAML).expect("write class list");
    path
}

/// Lists file names in `dir`, sorted; empty if `dir` does not exist.
pub fn list_files(dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .map(|entry| {
            entry
                .expect("read dir entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}
