//! Box geometry shared by the annotation transformer.
//!
//! Source annotations describe boxes in pixel space as a top-left corner plus
//! a size; the YOLO output wants normalized center-format boxes. Keeping the
//! coordinate space in the type means a pixel box cannot be written out
//! without first going through [`BBoxXYXY::to_normalized`].
//!
//! ```
//! use fedsplit::geom::{BBoxXYXY, ImageSize, Pixel};
//!
//! let bbox = BBoxXYXY::<Pixel>::from_xywh(100.0, 200.0, 300.0, 150.0);
//! let (cx, cy, w, h) = bbox.to_normalized(ImageSize::new(1920, 1080)).to_cxcywh();
//! assert!((cx - 0.130208).abs() < 1e-5);
//! assert!((cy - 0.254630).abs() < 1e-5);
//! assert!((w - 0.156250).abs() < 1e-5);
//! assert!((h - 0.138889).abs() < 1e-5);
//! ```

mod bbox;
mod coord;
mod size;
mod space;

pub use bbox::BBoxXYXY;
pub use coord::Coord;
pub use size::{ImageSize, ResolutionPolicy, ResolvedSize, DEFAULT_RESOLUTION};
pub use space::{Normalized, Pixel};
