//! Assignment of source files to federated buckets.
//!
//! Training files are shuffled with a seeded [`PythonRandom`] and dealt to
//! `client1..clientN` round-robin, so client sizes differ by at most one.
//! Validation files all go to the single `server` bucket in input order.
//! The split is uniform, not stratified by class.

mod mt;

pub use mt::PythonRandom;

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::FedsplitError;

/// Seed used when the caller does not pick one.
pub const DEFAULT_SEED: u64 = 42;

/// A named partition of the output dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Bucket {
    /// Holds the validation data.
    Server,
    /// Holds one share of the training data. Numbered from 1.
    Client(usize),
}

impl Bucket {
    /// `server` followed by `client1..=clientN`, the column order of the
    /// distribution table.
    pub fn all(nclients: usize) -> Vec<Bucket> {
        std::iter::once(Bucket::Server)
            .chain((1..=nclients).map(Bucket::Client))
            .collect()
    }

    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bucket::Server => f.write_str("server"),
            Bucket::Client(k) => write!(f, "client{k}"),
        }
    }
}

impl Serialize for Bucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Which bucket every file of one subset goes to.
///
/// Buckets keep their creation order (`client1, client2, ...`) and each file
/// list keeps assignment order. Every input file appears in exactly one list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PartitionAssignment {
    buckets: Vec<(Bucket, Vec<String>)>,
}

impl PartitionAssignment {
    /// Iterates `(bucket, files)` pairs in bucket order.
    pub fn iter(&self) -> impl Iterator<Item = (Bucket, &[String])> {
        self.buckets
            .iter()
            .map(|(bucket, files)| (*bucket, files.as_slice()))
    }

    pub fn buckets(&self) -> impl Iterator<Item = Bucket> + '_ {
        self.buckets.iter().map(|(bucket, _)| *bucket)
    }

    /// Files assigned to `bucket`, or `None` if the bucket is not part of
    /// this assignment.
    pub fn files(&self, bucket: Bucket) -> Option<&[String]> {
        self.buckets
            .iter()
            .find(|(b, _)| *b == bucket)
            .map(|(_, files)| files.as_slice())
    }

    /// Total number of assigned files across all buckets.
    pub fn total_files(&self) -> usize {
        self.buckets.iter().map(|(_, files)| files.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_files() == 0
    }
}

impl Serialize for PartitionAssignment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.buckets.len()))?;
        for (bucket, files) in &self.buckets {
            map.serialize_entry(bucket, files)?;
        }
        map.end()
    }
}

/// Shuffles `files` with `seed` and deals them to `nclients` client buckets.
///
/// File `i` of the shuffled list goes to `client{(i % nclients) + 1}`. The
/// same seed and input order always give the same assignment.
pub fn partition_train(
    files: &[String],
    nclients: usize,
    seed: u64,
) -> Result<PartitionAssignment, FedsplitError> {
    if nclients == 0 {
        return Err(FedsplitError::InvalidClientCount(nclients));
    }

    let mut shuffled = files.to_vec();
    PythonRandom::seed(seed).shuffle(&mut shuffled);

    let mut buckets: Vec<(Bucket, Vec<String>)> = (1..=nclients)
        .map(|k| {
            (
                Bucket::Client(k),
                Vec::with_capacity(shuffled.len() / nclients + 1),
            )
        })
        .collect();

    for (i, file) in shuffled.into_iter().enumerate() {
        buckets[i % nclients].1.push(file);
    }

    Ok(PartitionAssignment { buckets })
}

/// Puts every file in the `server` bucket, keeping input order.
pub fn partition_val(files: &[String]) -> PartitionAssignment {
    PartitionAssignment {
        buckets: vec![(Bucket::Server, files.to_vec())],
    }
}
