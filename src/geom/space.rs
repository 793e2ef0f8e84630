//! Coordinate space markers.
//!
//! Uninhabited enums used only as type parameters on [`Coord`](super::Coord)
//! and [`BBoxXYXY`](super::BBoxXYXY).

use std::fmt;

/// Absolute pixel positions, origin at the top-left corner of the image.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pixel {}

/// Positions as fractions of the image width and height.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Normalized {}

impl fmt::Debug for Pixel {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}

impl fmt::Debug for Normalized {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}
