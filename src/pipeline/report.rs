//! Run reports.
//!
//! A [`SubsetReport`] records what happened to every file of one subset,
//! including the typed reason for each skipped file, so a run can be audited
//! (and tested) without scraping logs. [`ConvertReport`] bundles the subset
//! reports with the merged distribution table.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::annotation::LineCounts;
use crate::distribution::DistributionTable;
use crate::layout::Subset;
use crate::split::{Bucket, PartitionAssignment};

/// Pipeline stage during which an I/O error made a file unusable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IoStage {
    CopyImage,
    ConvertLabels,
}

impl fmt::Display for IoStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoStage::CopyImage => f.write_str("copying image"),
            IoStage::ConvertLabels => f.write_str("converting labels"),
        }
    }
}

/// Why a file was left out of the output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// The image listed for the subset is gone.
    MissingImage,
    /// No annotation file with the image's stem.
    MissingAnnotation,
    Io { stage: IoStage, message: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingImage => f.write_str("image file is missing"),
            SkipReason::MissingAnnotation => f.write_str("annotation file is missing"),
            SkipReason::Io { stage, message } => write!(f, "I/O error while {stage}: {message}"),
        }
    }
}

/// Result of processing a single image/annotation pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FileOutcome {
    Converted {
        lines: LineCounts,
        /// The image header was unreadable and the fallback size was used.
        used_fallback: bool,
    },
    Skipped(SkipReason),
}

/// A file that was not converted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub file: String,
    pub bucket: Bucket,
    pub reason: SkipReason,
}

/// Number of files assigned to a bucket.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BucketCount {
    pub bucket: Bucket,
    pub files: usize,
}

/// Summary of one subset's conversion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SubsetReport {
    pub subset: Subset,
    /// Images matched in the source directory.
    pub images: usize,
    /// Files converted successfully.
    pub converted: usize,
    pub skipped: Vec<SkippedFile>,
    /// Row tallies over all converted files.
    pub lines: LineCounts,
    /// Converted files whose size came from the fallback resolution.
    pub fallback_resolution: usize,
    pub buckets: Vec<BucketCount>,
}

impl SubsetReport {
    /// Empty report for `subset` with the bucket sizes of `assignment`.
    pub fn new(subset: Subset, assignment: &PartitionAssignment) -> Self {
        Self {
            subset,
            images: assignment.total_files(),
            converted: 0,
            skipped: Vec::new(),
            lines: LineCounts::default(),
            fallback_resolution: 0,
            buckets: assignment
                .iter()
                .map(|(bucket, files)| BucketCount {
                    bucket,
                    files: files.len(),
                })
                .collect(),
        }
    }

    /// Folds one file's outcome into the report.
    pub fn record(&mut self, file: &str, bucket: Bucket, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Converted {
                lines,
                used_fallback,
            } => {
                self.converted += 1;
                self.lines += lines;
                if used_fallback {
                    self.fallback_resolution += 1;
                }
            }
            FileOutcome::Skipped(reason) => self.skipped.push(SkippedFile {
                file: file.to_string(),
                bucket,
                reason,
            }),
        }
    }
}

impl fmt::Display for SubsetReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {} images, {} converted, {} skipped",
            self.subset,
            self.images,
            self.converted,
            self.skipped.len()
        )?;

        let buckets: Vec<String> = self
            .buckets
            .iter()
            .map(|b| format!("{}={}", b.bucket, b.files))
            .collect();
        writeln!(f, "  buckets: {}", buckets.join(", "))?;

        writeln!(
            f,
            "  rows: {} read, {} kept, {} malformed, {} ignored, {} out-of-range class",
            self.lines.total(),
            self.lines.kept,
            self.lines.malformed,
            self.lines.ignored,
            self.lines.out_of_range
        )?;

        if self.fallback_resolution > 0 {
            writeln!(
                f,
                "  {} image(s) normalized with the fallback resolution",
                self.fallback_resolution
            )?;
        }

        if !self.skipped.is_empty() {
            writeln!(f, "  Skipped ({}):", self.skipped.len())?;
            for skipped in &self.skipped {
                writeln!(
                    f,
                    "    - {} [{}]: {}",
                    skipped.file, skipped.bucket, skipped.reason
                )?;
            }
        }

        Ok(())
    }
}

/// Summary of a whole conversion run.
#[derive(Clone, Debug, Serialize)]
pub struct ConvertReport {
    pub subsets: Vec<SubsetReport>,
    /// Train and val tables merged.
    pub distribution: DistributionTable,
    /// Where the distribution CSV was written.
    pub distribution_path: PathBuf,
    /// Per-subset file assignments, in subset order.
    #[serde(skip)]
    pub assignments: Vec<(Subset, PartitionAssignment)>,
}

impl ConvertReport {
    pub fn skipped_count(&self) -> usize {
        self.subsets.iter().map(|s| s.skipped.len()).sum()
    }

    pub fn subset(&self, subset: Subset) -> Option<&SubsetReport> {
        self.subsets.iter().find(|s| s.subset == subset)
    }

    pub fn assignment(&self, subset: Subset) -> Option<&PartitionAssignment> {
        self.assignments
            .iter()
            .find(|(s, _)| *s == subset)
            .map(|(_, assignment)| assignment)
    }
}

impl fmt::Display for ConvertReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for subset in &self.subsets {
            write!(f, "{subset}")?;
        }
        writeln!(f)?;
        writeln!(f, "Object distribution:")?;
        write!(f, "{}", self.distribution)?;
        writeln!(f)?;
        writeln!(
            f,
            "Distribution written to {}",
            self.distribution_path.display()
        )
    }
}
