//! VisDrone-style source annotation rows.
//!
//! Each row is comma separated:
//!
//! ```text
//! bbox_left,bbox_top,bbox_width,bbox_height,score,class_id,status,truncation[,...]
//! ```
//!
//! Box values are pixels. `class_id` is 1-based. A `status` of zero marks a
//! region that must be ignored. Fields past the eighth are ignored.

use crate::geom::{BBoxXYXY, Pixel};

/// Number of comma-separated fields a row must have.
pub const MIN_FIELDS: usize = 8;

/// One parsed source row.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceAnnotationLine {
    pub bbox_left: f64,
    pub bbox_top: f64,
    pub width: f64,
    pub height: f64,
    /// Not used by the conversion; `None` when the field is not a number.
    pub score: Option<f64>,
    pub class_id: i64,
    pub status: i64,
    /// Not used by the conversion; `None` when the field is not an integer.
    pub truncation: Option<i64>,
}

impl SourceAnnotationLine {
    /// Parses a row, returning `None` for malformed input.
    ///
    /// A row is malformed if it has fewer than [`MIN_FIELDS`] fields, if one
    /// of the box values, `class_id` or `status` does not parse, or if a box
    /// value is NaN or infinite.
    pub fn parse(line: &str) -> Option<Self> {
        // Bounded so a pathological line does not allocate a field per comma.
        let fields: Vec<&str> = line.trim().split(',').take(MIN_FIELDS).collect();
        if fields.len() < MIN_FIELDS {
            return None;
        }

        let bbox_left = parse_finite(fields[0])?;
        let bbox_top = parse_finite(fields[1])?;
        let width = parse_finite(fields[2])?;
        let height = parse_finite(fields[3])?;
        let class_id = fields[5].trim().parse::<i64>().ok()?;
        let status = fields[6].trim().parse::<i64>().ok()?;

        Some(Self {
            bbox_left,
            bbox_top,
            width,
            height,
            score: fields[4].trim().parse::<f64>().ok(),
            class_id,
            status,
            truncation: fields[7].trim().parse::<i64>().ok(),
        })
    }

    /// The row's box in corner form.
    pub fn bbox(&self) -> BBoxXYXY<Pixel> {
        BBoxXYXY::from_xywh(self.bbox_left, self.bbox_top, self.width, self.height)
    }
}

fn parse_finite(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Fuzz-only entrypoint for source row parsing.
#[cfg(feature = "fuzzing")]
pub fn fuzz_parse_source_line(input: &str) {
    if let Some(row) = SourceAnnotationLine::parse(input) {
        let _ = row.bbox();
    }
}
