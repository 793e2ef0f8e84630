//! The partition-and-transform pipeline.
//!
//! [`convert_dataset`] runs the whole job: it checks the configuration,
//! creates the destination tree, processes `train` into the client buckets
//! and `val` into the server bucket, then merges both distribution tables
//! and writes them as CSV.
//!
//! Configuration problems abort the run with a [`FedsplitError`]. Problems
//! with a single file only skip that file; the reason ends up in the
//! [`SubsetReport`].

mod report;

pub use report::{
    BucketCount, ConvertReport, FileOutcome, IoStage, SkipReason, SkippedFile, SubsetReport,
};

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::annotation::write_labels;
use crate::classes::ClassList;
use crate::distribution::DistributionTable;
use crate::error::FedsplitError;
use crate::geom::ResolutionPolicy;
use crate::layout::{create_layout, label_name_for, BucketDirs, SourceLayout, Subset};
use crate::split::{partition_train, partition_val, Bucket, PartitionAssignment, DEFAULT_SEED};

/// File name of the distribution CSV inside the destination directory.
pub const DISTRIBUTION_FILE_NAME: &str = "objects_distribution.csv";

/// Settings for one conversion run.
#[derive(Clone, Debug)]
pub struct ConvertOptions {
    /// Source dataset root containing `images/` and `annotations/`.
    pub src: PathBuf,
    /// Destination root for the bucket directories.
    pub dst: PathBuf,
    /// Class list (`data.yaml` or `classes.txt`).
    pub class_list: PathBuf,
    pub nclients: usize,
    pub seed: u64,
    pub resolution: ResolutionPolicy,
}

impl ConvertOptions {
    /// Options with ten clients, the default seed and measured resolution.
    pub fn new(
        src: impl Into<PathBuf>,
        dst: impl Into<PathBuf>,
        class_list: impl Into<PathBuf>,
    ) -> Self {
        Self {
            src: src.into(),
            dst: dst.into(),
            class_list: class_list.into(),
            nclients: 10,
            seed: DEFAULT_SEED,
            resolution: ResolutionPolicy::default(),
        }
    }

    pub fn validate(&self) -> Result<(), FedsplitError> {
        if self.nclients == 0 {
            return Err(FedsplitError::InvalidClientCount(self.nclients));
        }
        Ok(())
    }

    pub fn distribution_path(&self) -> PathBuf {
        self.dst.join(DISTRIBUTION_FILE_NAME)
    }
}

/// Everything one subset run produces.
#[derive(Clone, Debug)]
pub struct SubsetOutcome {
    pub assignment: PartitionAssignment,
    pub table: DistributionTable,
    pub report: SubsetReport,
}

/// Assigns a subset's files to buckets: train is shuffled over the clients,
/// val goes to the server unchanged.
pub fn partition_subset(
    subset: Subset,
    files: &[String],
    nclients: usize,
    seed: u64,
) -> Result<PartitionAssignment, FedsplitError> {
    match subset {
        Subset::Train => partition_train(files, nclients, seed),
        Subset::Val => Ok(partition_val(files)),
    }
}

/// Computes a subset's assignment without writing anything.
pub fn plan_subset(
    src: &Path,
    subset: Subset,
    nclients: usize,
    seed: u64,
) -> Result<PartitionAssignment, FedsplitError> {
    let layout = SourceLayout::discover(src, subset)?;
    let files = layout.image_files()?;
    partition_subset(subset, &files, nclients, seed)
}

/// Converts one subset into the already created destination tree.
///
/// The returned table has the full `server, client1..clientN` column set so
/// the train and val tables line up when merged.
pub fn process_subset(
    opts: &ConvertOptions,
    classes: &ClassList,
    subset: Subset,
) -> Result<SubsetOutcome, FedsplitError> {
    opts.validate()?;
    let layout = SourceLayout::discover(&opts.src, subset)?;
    let files = layout.image_files()?;
    let assignment = partition_subset(subset, &files, opts.nclients, opts.seed)?;

    info!(
        "Processing {} subset: {} images into {} bucket(s)",
        subset,
        files.len(),
        assignment.buckets().count()
    );

    let mut table = DistributionTable::for_clients(classes, opts.nclients);
    let mut report = SubsetReport::new(subset, &assignment);

    for (bucket, bucket_files) in assignment.iter() {
        let dirs = BucketDirs::new(&opts.dst, bucket);
        for image in bucket_files {
            let outcome = process_file(
                &layout,
                &dirs,
                image,
                bucket,
                classes,
                opts.resolution,
                &mut table,
            );
            if let FileOutcome::Skipped(reason) = &outcome {
                warn!("Skipping {} ({}): {}", image, bucket, reason);
            }
            report.record(image, bucket, outcome);
        }
    }

    info!(
        "Finished {} subset: {} converted, {} skipped",
        subset,
        report.converted,
        report.skipped.len()
    );

    Ok(SubsetOutcome {
        assignment,
        table,
        report,
    })
}

/// Converts one annotation file and copies its image into `dirs`.
///
/// Labels are written first and the image is copied only once they exist, so
/// a bucket never holds an image without its label file. `table` is updated
/// only when both steps succeed.
fn process_file(
    layout: &SourceLayout,
    dirs: &BucketDirs,
    image: &str,
    bucket: Bucket,
    classes: &ClassList,
    resolution: ResolutionPolicy,
    table: &mut DistributionTable,
) -> FileOutcome {
    let image_src = layout.image_path(image);
    let annotation_src = layout.annotation_path(image);

    if !image_src.is_file() {
        return FileOutcome::Skipped(SkipReason::MissingImage);
    }
    if !annotation_src.is_file() {
        return FileOutcome::Skipped(SkipReason::MissingAnnotation);
    }

    let resolved = resolution.resolve(&image_src);
    if resolved.used_fallback {
        debug!(
            "Could not read dimensions of {}; using {}",
            image_src.display(),
            resolved.size
        );
    }

    let label_dst = dirs.labels.join(label_name_for(image));
    let labels = match write_labels(&annotation_src, &label_dst, resolved.size, classes) {
        Ok(labels) => labels,
        Err(err) => {
            remove_partial_output(&label_dst);
            return FileOutcome::Skipped(SkipReason::Io {
                stage: IoStage::ConvertLabels,
                message: err.to_string(),
            });
        }
    };

    let image_dst = dirs.images.join(image);
    if let Err(err) = fs::copy(&image_src, &image_dst) {
        remove_partial_output(&image_dst);
        remove_partial_output(&label_dst);
        return FileOutcome::Skipped(SkipReason::Io {
            stage: IoStage::CopyImage,
            message: err.to_string(),
        });
    }

    labels.record(classes, bucket, table);
    debug!("{} -> {}: {} row(s) kept", image, bucket, labels.counts.kept);
    FileOutcome::Converted {
        lines: labels.counts,
        used_fallback: resolved.used_fallback,
    }
}

/// Removes a file left behind by a failed step. Directories are left alone.
fn remove_partial_output(path: &Path) {
    if !path.is_file() {
        return;
    }
    if let Err(err) = fs::remove_file(path) {
        warn!("Could not remove partial output {}: {}", path.display(), err);
    }
}

/// Runs the full conversion described by `opts`.
///
/// Every configuration check (client count, source root, class list, both
/// subset layouts, at least one image per subset) happens before anything
/// is written.
pub fn convert_dataset(opts: &ConvertOptions) -> Result<ConvertReport, FedsplitError> {
    opts.validate()?;

    if !opts.src.is_dir() {
        return Err(FedsplitError::SourceNotFound {
            path: opts.src.clone(),
        });
    }

    let classes = ClassList::load(&opts.class_list)?;
    for subset in [Subset::Train, Subset::Val] {
        SourceLayout::discover(&opts.src, subset)?.image_files()?;
    }

    create_layout(&opts.dst, opts.nclients)?;

    let train = process_subset(opts, &classes, Subset::Train)?;
    let val = process_subset(opts, &classes, Subset::Val)?;

    let distribution = train.table.merge(&val.table);
    let distribution_path = opts.distribution_path();
    distribution.write_csv(&distribution_path)?;
    info!(
        "Object distribution written to {}",
        distribution_path.display()
    );

    Ok(ConvertReport {
        subsets: vec![train.report, val.report],
        distribution,
        distribution_path,
        assignments: vec![
            (Subset::Train, train.assignment),
            (Subset::Val, val.assignment),
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_default_to_reference_settings() {
        let opts = ConvertOptions::new("src", "dst", "VisDrone.yaml");
        assert_eq!(opts.nclients, 10);
        assert_eq!(opts.seed, 42);
        assert_eq!(opts.resolution, ResolutionPolicy::default());
        assert_eq!(
            opts.distribution_path(),
            Path::new("dst").join("objects_distribution.csv")
        );
    }

    #[test]
    fn zero_clients_fail_validation() {
        let mut opts = ConvertOptions::new("src", "dst", "VisDrone.yaml");
        opts.nclients = 0;
        assert!(matches!(
            opts.validate(),
            Err(FedsplitError::InvalidClientCount(0))
        ));
    }

    #[test]
    fn val_partition_ignores_client_count_and_seed() {
        let files = vec!["b.jpg".to_string(), "a.jpg".to_string()];
        let assignment = partition_subset(Subset::Val, &files, 3, 1).expect("partition");
        assert_eq!(assignment.files(Bucket::Server).unwrap(), files.as_slice());
    }

    #[test]
    fn missing_source_root_is_fatal() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let opts = ConvertOptions::new(
            temp.path().join("nope"),
            temp.path().join("out"),
            temp.path().join("VisDrone.yaml"),
        );

        let err = convert_dataset(&opts).unwrap_err();
        assert!(matches!(err, FedsplitError::SourceNotFound { .. }));
        assert!(!temp.path().join("out").exists());
    }
}
