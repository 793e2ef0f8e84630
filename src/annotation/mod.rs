//! Conversion of source annotation files into YOLO label files.
//!
//! Every source row ends up in exactly one bucket of [`LineOutcome`]:
//! malformed rows and filtered rows are dropped without raising an error,
//! surviving rows are normalized into a [`NormalizedAnnotationLine`].

mod source;

#[cfg(feature = "fuzzing")]
pub use source::fuzz_parse_source_line;
pub use source::{SourceAnnotationLine, MIN_FIELDS};

use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::ops::AddAssign;
use std::path::Path;

use serde::Serialize;

use crate::classes::ClassList;
use crate::distribution::{DistributionTable, SAMPLES_ROW};
use crate::geom::ImageSize;
use crate::split::Bucket;

/// One YOLO label row: 0-based class id and a normalized center-format box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NormalizedAnnotationLine {
    pub class_id: usize,
    pub x_center: f64,
    pub y_center: f64,
    pub width: f64,
    pub height: f64,
}

impl NormalizedAnnotationLine {
    /// Converts a source row against the given image size.
    ///
    /// The caller must have checked that `row.class_id >= 1`.
    pub fn from_source(row: &SourceAnnotationLine, size: ImageSize) -> Self {
        let (x_center, y_center, width, height) = row.bbox().to_normalized(size).to_cxcywh();
        Self {
            class_id: (row.class_id - 1) as usize,
            x_center,
            y_center,
            width,
            height,
        }
    }
}

impl fmt::Display for NormalizedAnnotationLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:.6} {:.6} {:.6} {:.6}",
            self.class_id, self.x_center, self.y_center, self.width, self.height
        )
    }
}

/// What happened to one source row.
#[derive(Clone, Debug, PartialEq)]
pub enum LineOutcome {
    /// The row survived and was converted.
    Kept(NormalizedAnnotationLine),
    /// Too few fields, an unparseable required field, or bytes that are not
    /// UTF-8.
    Malformed,
    /// The status flag is zero.
    Ignored,
    /// The class id has no entry in the class list.
    ClassOutOfRange(i64),
}

/// Parses, filters and converts a single source row.
pub fn classify_line(line: &str, classes: &ClassList, size: ImageSize) -> LineOutcome {
    let Some(row) = SourceAnnotationLine::parse(line) else {
        return LineOutcome::Malformed;
    };

    if row.status == 0 {
        return LineOutcome::Ignored;
    }

    if classes.name_for_source_id(row.class_id).is_none() {
        return LineOutcome::ClassOutOfRange(row.class_id);
    }

    LineOutcome::Kept(NormalizedAnnotationLine::from_source(&row, size))
}

/// Row tallies for one or more label files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LineCounts {
    pub kept: usize,
    pub malformed: usize,
    /// Dropped because the status flag was zero.
    pub ignored: usize,
    /// Dropped because the class id was out of range.
    pub out_of_range: usize,
}

impl LineCounts {
    pub fn total(&self) -> usize {
        self.kept + self.malformed + self.ignored + self.out_of_range
    }

    fn record(&mut self, outcome: &LineOutcome) {
        match outcome {
            LineOutcome::Kept(_) => self.kept += 1,
            LineOutcome::Malformed => self.malformed += 1,
            LineOutcome::Ignored => self.ignored += 1,
            LineOutcome::ClassOutOfRange(_) => self.out_of_range += 1,
        }
    }
}

impl AddAssign for LineCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.kept += rhs.kept;
        self.malformed += rhs.malformed;
        self.ignored += rhs.ignored;
        self.out_of_range += rhs.out_of_range;
    }
}

/// A label file that has been written but not yet counted.
#[derive(Clone, Debug, PartialEq)]
pub struct ConvertedLabels {
    pub counts: LineCounts,
    /// Rows written to the label file, in source order.
    pub lines: Vec<NormalizedAnnotationLine>,
}

impl ConvertedLabels {
    /// Adds the written rows to `table` under `bucket`: one count per row on
    /// its class, plus one on `Samples` if any row was kept. `Samples`
    /// therefore counts images.
    pub fn record(&self, classes: &ClassList, bucket: Bucket, table: &mut DistributionTable) {
        let column = bucket.name();
        // Kept rows passed the class range check, so every id has a name.
        for name in self
            .lines
            .iter()
            .filter_map(|line| classes.names().get(line.class_id))
        {
            table.increment(name, &column);
        }
        if !self.lines.is_empty() {
            table.increment(SAMPLES_ROW, &column);
        }
    }
}

/// Converts `source` into a YOLO label file at `destination`.
///
/// The source is read as bytes and split on `\n`; a row that is not valid
/// UTF-8 is malformed like any other unparseable row. The destination file
/// is always created, empty when no row survives. Nothing is counted in a
/// distribution table until the caller passes the result to
/// [`ConvertedLabels::record`].
pub fn write_labels(
    source: &Path,
    destination: &Path,
    size: ImageSize,
    classes: &ClassList,
) -> io::Result<ConvertedLabels> {
    let content = fs::read(source)?;

    let mut counts = LineCounts::default();
    let mut lines = Vec::new();
    for raw in content.split_inclusive(|&byte| byte == b'\n') {
        let outcome = match std::str::from_utf8(raw) {
            Ok(line) => classify_line(line, classes, size),
            Err(_) => LineOutcome::Malformed,
        };
        counts.record(&outcome);
        if let LineOutcome::Kept(normalized) = outcome {
            lines.push(normalized);
        }
    }

    let mut writer = BufWriter::new(File::create(destination)?);
    for line in &lines {
        writeln!(writer, "{line}")?;
    }
    writer.flush()?;

    Ok(ConvertedLabels { counts, lines })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::DEFAULT_RESOLUTION;

    fn visdrone_classes() -> ClassList {
        ClassList::new(
            [
                "pedestrian",
                "people",
                "bicycle",
                "car",
                "van",
                "truck",
                "tricycle",
                "awning-tricycle",
                "bus",
                "motor",
            ]
            .iter()
            .map(|name| name.to_string())
            .collect(),
        )
        .expect("class list")
    }

    fn classify(line: &str) -> LineOutcome {
        classify_line(line, &visdrone_classes(), DEFAULT_RESOLUTION)
    }

    fn kept(outcome: LineOutcome) -> NormalizedAnnotationLine {
        match outcome {
            LineOutcome::Kept(line) => line,
            other => panic!("expected a kept line, got {other:?}"),
        }
    }

    #[test]
    fn converts_reference_box() {
        let line = kept(classify("100,200,300,150,1,4,1,0"));
        assert_eq!(line.class_id, 3);
        assert!((line.x_center - 0.130208).abs() < 1e-5);
        assert!((line.y_center - 0.254630).abs() < 1e-5);
        assert!((line.width - 0.156250).abs() < 1e-5);
        assert!((line.height - 0.138889).abs() < 1e-5);
        assert_eq!(line.to_string(), "3 0.130208 0.254630 0.156250 0.138889");
    }

    #[test]
    fn shifts_every_class_id_down_by_one() {
        for class_id in 1..=10 {
            let line = kept(classify(&format!("0,0,10,10,1,{class_id},1,0")));
            assert_eq!(line.class_id as i64, class_id - 1);
        }
    }

    #[test]
    fn status_zero_is_dropped_for_any_class() {
        for class_id in 0..=11 {
            let raw = format!("0,0,10,10,1,{class_id},0,0");
            assert_eq!(classify(&raw), LineOutcome::Ignored);
        }
    }

    #[test]
    fn out_of_range_class_is_dropped_for_any_status() {
        for status in [1, 2, -1] {
            for class_id in [0, 11, -3] {
                let raw = format!("0,0,10,10,1,{class_id},{status},0");
                assert_eq!(classify(&raw), LineOutcome::ClassOutOfRange(class_id));
            }
        }
    }

    #[test]
    fn malformed_rows_are_reported_as_such() {
        assert_eq!(classify("1,2,3"), LineOutcome::Malformed);
        assert_eq!(classify("1,2,3,4,5,six,1,0"), LineOutcome::Malformed);
    }

    #[test]
    fn normalizes_against_the_given_size() {
        let line = kept(classify_line(
            "0,0,50,25,1,1,1,0",
            &visdrone_classes(),
            ImageSize::new(100, 50),
        ));
        assert_eq!(line.to_string(), "0 0.250000 0.250000 0.500000 0.500000");
    }

    #[test]
    fn write_labels_writes_rows_and_counts() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let source = temp.path().join("0000001.txt");
        let destination = temp.path().join("out.txt");
        fs::write(
            &source,
            "100,200,300,150,1,4,1,0\n\
             10,10,20,20,1,4,1,0\n\
             0,0,5,5,1,1,1,0\n\
             0,0,5,5,1,1,0,0\n\
             0,0,5,5,1,11,1,0\n\
             garbage\n",
        )
        .expect("write source");

        let classes = visdrone_classes();
        let labels =
            write_labels(&source, &destination, DEFAULT_RESOLUTION, &classes).expect("convert");

        assert_eq!(
            labels.counts,
            LineCounts {
                kept: 3,
                malformed: 1,
                ignored: 1,
                out_of_range: 1,
            }
        );
        assert_eq!(labels.counts.total(), 6);

        let written = fs::read_to_string(&destination).expect("read labels");
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "3 0.130208 0.254630 0.156250 0.138889");
        assert!(written.ends_with('\n'));

        let mut table = DistributionTable::for_clients(&classes, 2);
        labels.record(&classes, Bucket::Client(2), &mut table);
        assert_eq!(table.get("car", "client2"), 2);
        assert_eq!(table.get("pedestrian", "client2"), 1);
        assert_eq!(table.get(SAMPLES_ROW, "client2"), 1);
        assert_eq!(table.get("car", "client1"), 0);
    }

    #[test]
    fn non_utf8_row_is_malformed_without_losing_the_rest() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let source = temp.path().join("a.txt");
        let destination = temp.path().join("a_out.txt");
        fs::write(
            &source,
            b"100,200,300,150,1,4,1,0\n1,2,3,4,1,4,1,0,caf\xe9\r\n0,0,5,5,1,1,1,0",
        )
        .expect("write source");

        let labels = write_labels(&source, &destination, DEFAULT_RESOLUTION, &visdrone_classes())
            .expect("convert");

        assert_eq!(labels.counts.kept, 2);
        assert_eq!(labels.counts.malformed, 1);
        assert_eq!(
            fs::read_to_string(&destination).expect("read labels").lines().count(),
            2
        );
    }

    #[test]
    fn samples_row_counts_images_not_boxes() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let classes = visdrone_classes();
        let mut table = DistributionTable::for_clients(&classes, 1);

        let first = temp.path().join("a.txt");
        let second = temp.path().join("b.txt");
        fs::write(&first, "0,0,1,1,1,4,1,0\n0,0,1,1,1,4,1,0\n0,0,1,1,1,4,1,0\n")
            .expect("write a");
        fs::write(&second, "0,0,1,1,1,4,1,0\n0,0,1,1,1,4,1,0\n").expect("write b");

        for source in [&first, &second] {
            write_labels(
                source,
                &temp.path().join("out.txt"),
                DEFAULT_RESOLUTION,
                &classes,
            )
            .expect("convert")
            .record(&classes, Bucket::Client(1), &mut table);
        }

        assert_eq!(table.get("car", "client1"), 5);
        assert_eq!(table.get(SAMPLES_ROW, "client1"), 2);
    }

    #[test]
    fn file_without_survivors_writes_empty_labels_and_no_sample() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let source = temp.path().join("a.txt");
        let destination = temp.path().join("a_out.txt");
        fs::write(&source, "0,0,1,1,0,0,0,0\n").expect("write source");

        let classes = visdrone_classes();
        let labels =
            write_labels(&source, &destination, DEFAULT_RESOLUTION, &classes).expect("convert");
        assert_eq!(labels.counts.kept, 0);
        assert_eq!(fs::read_to_string(&destination).expect("read"), "");

        let mut table = DistributionTable::for_clients(&classes, 0);
        labels.record(&classes, Bucket::Server, &mut table);
        assert_eq!(table.get(SAMPLES_ROW, "server"), 0);
    }

    #[test]
    fn missing_source_writes_nothing() {
        let temp = tempfile::tempdir().expect("create temp dir");

        let err = write_labels(
            &temp.path().join("missing.txt"),
            &temp.path().join("out.txt"),
            DEFAULT_RESOLUTION,
            &visdrone_classes(),
        )
        .unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(!temp.path().join("out.txt").exists());
    }
}
