//! Axis-aligned boxes in corner (XYXY) form.

use super::coord::Coord;
use super::{ImageSize, Normalized, Pixel};

/// An axis-aligned bounding box stored as its two corners.
///
/// The constructor does not require `min <= max`. Source annotations with
/// negative sizes are passed through unchanged, the same way out-of-range
/// normalized values are (nothing is clamped).
#[derive(Clone, Copy, PartialEq)]
pub struct BBoxXYXY<TSpace> {
    pub min: Coord<TSpace>,
    pub max: Coord<TSpace>,
}

impl<TSpace> BBoxXYXY<TSpace> {
    #[inline]
    pub fn from_xyxy(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            min: Coord::new(xmin, ymin),
            max: Coord::new(xmax, ymax),
        }
    }

    /// Builds a box from its top-left corner and size, the layout used by
    /// VisDrone annotation rows.
    #[inline]
    pub fn from_xywh(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self::from_xyxy(left, top, left + width, top + height)
    }

    #[inline]
    pub fn xmin(&self) -> f64 {
        self.min.x
    }

    #[inline]
    pub fn ymin(&self) -> f64 {
        self.min.y
    }

    #[inline]
    pub fn xmax(&self) -> f64 {
        self.max.x
    }

    #[inline]
    pub fn ymax(&self) -> f64 {
        self.max.y
    }

    /// May be negative for a malformed box.
    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// May be negative for a malformed box.
    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Returns `(center_x, center_y, width, height)` in this box's space.
    #[inline]
    pub fn to_cxcywh(&self) -> (f64, f64, f64, f64) {
        (
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
            self.width(),
            self.height(),
        )
    }
}

impl<TSpace> std::fmt::Debug for BBoxXYXY<TSpace> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BBoxXYXY")
            .field("xmin", &self.min.x)
            .field("ymin", &self.min.y)
            .field("xmax", &self.max.x)
            .field("ymax", &self.max.y)
            .finish()
    }
}

impl BBoxXYXY<Pixel> {
    /// Divides every coordinate by the matching image dimension.
    pub fn to_normalized(&self, size: ImageSize) -> BBoxXYXY<Normalized> {
        let w = size.width as f64;
        let h = size.height as f64;
        BBoxXYXY::from_xyxy(
            self.min.x / w,
            self.min.y / h,
            self.max.x / w,
            self.max.y / h,
        )
    }
}
