//! Per-class, per-bucket object counts.
//!
//! A [`DistributionTable`] is created zeroed over a fixed set of rows
//! (`Samples` followed by the class names) and columns (bucket names), then
//! only ever incremented. Tables from different subsets are combined with
//! [`DistributionTable::merge`].

mod export;

pub use export::{DistributionExport, DistributionRow};

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::classes::ClassList;
use crate::split::Bucket;

/// Name of the row counting images rather than objects.
pub const SAMPLES_ROW: &str = "Samples";

/// Count matrix indexed by row label × column label.
///
/// Rows and columns keep insertion order; that order is what
/// [`export`](Self::export) and the CSV output use.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DistributionTable {
    rows: Vec<String>,
    columns: Vec<String>,
    /// `cells[row][column]`
    cells: Vec<Vec<u64>>,
}

impl DistributionTable {
    /// Creates a zeroed table over the given axes. Repeated labels are kept
    /// once, at their first position.
    pub fn with_axes<R, C>(rows: R, columns: C) -> Self
    where
        R: IntoIterator,
        R::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let mut table = Self::default();
        for column in columns {
            table.column_index_or_insert(&column.into());
        }
        for row in rows {
            table.row_index_or_insert(&row.into());
        }
        table
    }

    /// Zeroed table with `Samples` + class rows over the given buckets.
    pub fn new(classes: &ClassList, buckets: &[Bucket]) -> Self {
        Self::with_axes(
            std::iter::once(SAMPLES_ROW.to_string()).chain(classes.names().iter().cloned()),
            buckets.iter().map(Bucket::name),
        )
    }

    /// Zeroed table over `server, client1..=clientN`.
    pub fn for_clients(classes: &ClassList, nclients: usize) -> Self {
        Self::new(classes, &Bucket::all(nclients))
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Current count, zero for labels the table does not know.
    pub fn get(&self, row: &str, column: &str) -> u64 {
        match (self.row_index(row), self.column_index(column)) {
            (Some(r), Some(c)) => self.cells[r][c],
            _ => 0,
        }
    }

    /// Adds one to a cell. Unknown labels are appended to the axes.
    pub fn increment(&mut self, row: &str, column: &str) {
        self.add(row, column, 1);
    }

    /// Adds `count` to a cell. Unknown labels are appended to the axes.
    pub fn add(&mut self, row: &str, column: &str, count: u64) {
        let c = self.column_index_or_insert(column);
        let r = self.row_index_or_insert(row);
        self.cells[r][c] += count;
    }


    /// Element-wise sum over the union of both tables' labels.
    ///
    /// This table's axis order comes first, labels only `other` has are
    /// appended in `other`'s order. Missing cells count as zero, so the cell
    /// values do not depend on argument order.
    pub fn merge(&self, other: &DistributionTable) -> DistributionTable {
        let mut merged = self.clone();
        for column in &other.columns {
            merged.column_index_or_insert(column);
        }
        for (row, cells) in other.rows.iter().zip(&other.cells) {
            let r = merged.row_index_or_insert(row);
            for (column, count) in other.columns.iter().zip(cells) {
                let c = merged
                    .column_index(column)
                    .expect("columns were merged above");
                merged.cells[r][c] += count;
            }
        }
        merged
    }

    fn row_index(&self, row: &str) -> Option<usize> {
        self.rows.iter().position(|label| label == row)
    }

    fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|label| label == column)
    }

    fn row_index_or_insert(&mut self, row: &str) -> usize {
        if let Some(index) = self.row_index(row) {
            return index;
        }
        self.rows.push(row.to_string());
        self.cells.push(vec![0; self.columns.len()]);
        self.rows.len() - 1
    }

    fn column_index_or_insert(&mut self, column: &str) -> usize {
        if let Some(index) = self.column_index(column) {
            return index;
        }
        self.columns.push(column.to_string());
        for cells in &mut self.cells {
            cells.push(0);
        }
        self.columns.len() - 1
    }
}

/// Serializes as `{row: {column: count}}`, both levels in table order.
impl Serialize for DistributionTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct RowView<'a> {
            columns: &'a [String],
            cells: &'a [u64],
        }

        impl Serialize for RowView<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.columns.len()))?;
                for (column, count) in self.columns.iter().zip(self.cells) {
                    map.serialize_entry(column, count)?;
                }
                map.end()
            }
        }

        let mut map = serializer.serialize_map(Some(self.rows.len()))?;
        for (row, cells) in self.rows.iter().zip(&self.cells) {
            map.serialize_entry(
                row,
                &RowView {
                    columns: &self.columns,
                    cells,
                },
            )?;
        }
        map.end()
    }
}
