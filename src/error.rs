use std::path::PathBuf;
use thiserror::Error;

/// The main error type for fedsplit operations.
///
/// Every variant is fatal for the run. Per-line problems never become an
/// error, and per-file problems are recorded as
/// [`SkipReason`](crate::pipeline::SkipReason) values in the report instead.
#[derive(Debug, Error)]
pub enum FedsplitError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Source dataset not found: {path}")]
    SourceNotFound { path: PathBuf },

    #[error("Invalid source layout at {path}: {message}")]
    SourceLayoutInvalid { path: PathBuf, message: String },

    #[error("Failed while traversing {path}: {message}")]
    DirectoryTraversal { path: PathBuf, message: String },

    #[error("No images found for subset '{subset}' in {path}")]
    NoImagesFound { subset: String, path: PathBuf },

    #[error("Class list not found: {path}")]
    ClassListNotFound { path: PathBuf },

    #[error("Failed to parse class list YAML from {path}: {source}")]
    ClassListParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid class list {path}: {message}")]
    ClassListInvalid { path: PathBuf, message: String },

    #[error("Invalid client count {0}; at least one client is required")]
    InvalidClientCount(usize),

    #[error("Invalid resolution '{0}'; expected WIDTHxHEIGHT with both values > 0")]
    InvalidResolution(String),

    #[error("Failed to write distribution CSV to {path}: {source}")]
    DistributionCsvWrite {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to serialize report: {0}")]
    ReportSerialize(#[from] serde_json::Error),
}
