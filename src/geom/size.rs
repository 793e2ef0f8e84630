//! Image dimensions and how the pipeline obtains them.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;

use crate::error::FedsplitError;

/// Resolution of the VisDrone capture rig, used when an image header cannot
/// be read.
pub const DEFAULT_RESOLUTION: ImageSize = ImageSize {
    width: 1920,
    height: 1080,
};

/// Width and height of an image in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Reads the dimensions from the image header without decoding pixels.
    ///
    /// Returns `None` for unreadable or unrecognized files, or dimensions that
    /// are zero or do not fit in `u32`.
    pub fn read_from(path: &Path) -> Option<Self> {
        let size = imagesize::size(path).ok()?;
        let width: u32 = size.width.try_into().ok()?;
        let height: u32 = size.height.try_into().ok()?;
        (width > 0 && height > 0).then_some(Self { width, height })
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for ImageSize {
    type Err = FedsplitError;

    /// Parses `WIDTHxHEIGHT`, e.g. `1920x1080`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || FedsplitError::InvalidResolution(raw.to_string());

        let (w, h) = raw
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(invalid)?;
        let width: u32 = w.trim().parse().map_err(|_| invalid())?;
        let height: u32 = h.trim().parse().map_err(|_| invalid())?;

        if width == 0 || height == 0 {
            return Err(invalid());
        }

        Ok(Self { width, height })
    }
}

/// Where the normalization step gets each image's dimensions from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolutionPolicy {
    /// Read the real size from every image header, using `fallback` only when
    /// the header cannot be read.
    Measured { fallback: ImageSize },
    /// Use one resolution for every image without looking at the file.
    Fixed(ImageSize),
}

impl Default for ResolutionPolicy {
    fn default() -> Self {
        ResolutionPolicy::Measured {
            fallback: DEFAULT_RESOLUTION,
        }
    }
}

/// A resolved image size and whether the fallback had to be used.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedSize {
    pub size: ImageSize,
    pub used_fallback: bool,
}

impl ResolutionPolicy {
    /// Determines the size to normalize `image_path`'s boxes against.
    pub fn resolve(&self, image_path: &Path) -> ResolvedSize {
        match *self {
            ResolutionPolicy::Fixed(size) => ResolvedSize {
                size,
                used_fallback: false,
            },
            ResolutionPolicy::Measured { fallback } => match ImageSize::read_from(image_path) {
                Some(size) => ResolvedSize {
                    size,
                    used_fallback: false,
                },
                None => ResolvedSize {
                    size: fallback,
                    used_fallback: true,
                },
            },
        }
    }
}
