//! Tabular export of a distribution table: CSV for persistence and an aligned
//! text rendering for the terminal.

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use super::DistributionTable;
use crate::error::FedsplitError;

/// A snapshot of the table in output order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DistributionExport {
    /// Column labels, i.e. bucket names.
    pub columns: Vec<String>,
    pub rows: Vec<DistributionRow>,
}

/// One labelled row of counts, aligned with [`DistributionExport::columns`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DistributionRow {
    pub label: String,
    pub counts: Vec<u64>,
}

impl DistributionTable {
    /// Snapshot of the table with rows and columns in insertion order.
    pub fn export(&self) -> DistributionExport {
        DistributionExport {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .zip(&self.cells)
                .map(|(label, counts)| DistributionRow {
                    label: label.clone(),
                    counts: counts.clone(),
                })
                .collect(),
        }
    }

    /// Renders the table as CSV.
    ///
    /// The header starts with an empty cell followed by the column labels,
    /// then one line per row label, the same shape pandas writes for a
    /// labelled frame. Output is identical for identical tables.
    pub fn to_csv_string(&self) -> Result<String, FedsplitError> {
        let dummy_path = Path::new("<string>");
        let bytes = self.write_csv_to(Vec::new(), dummy_path)?;
        String::from_utf8(bytes)
            .map_err(|e| FedsplitError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
    }

    /// Writes the CSV rendering to `path`, replacing any existing file.
    pub fn write_csv(&self, path: &Path) -> Result<(), FedsplitError> {
        let file = File::create(path).map_err(FedsplitError::Io)?;
        self.write_csv_to(BufWriter::new(file), path)?
            .flush()
            .map_err(FedsplitError::Io)
    }

    fn write_csv_to<W: Write>(&self, writer: W, path: &Path) -> Result<W, FedsplitError> {
        let csv_error = |source| FedsplitError::DistributionCsvWrite {
            path: path.to_path_buf(),
            source,
        };

        let export = self.export();
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer
            .write_record(std::iter::once("").chain(export.columns.iter().map(String::as_str)))
            .map_err(csv_error)?;

        for row in &export.rows {
            let mut record = Vec::with_capacity(row.counts.len() + 1);
            record.push(row.label.clone());
            record.extend(row.counts.iter().map(u64::to_string));
            csv_writer.write_record(&record).map_err(csv_error)?;
        }

        csv_writer
            .into_inner()
            .map_err(|e| FedsplitError::Io(e.into_error()))
    }
}

impl fmt::Display for DistributionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let export = self.export();

        let label_width = export
            .rows
            .iter()
            .map(|row| row.label.len())
            .max()
            .unwrap_or(0);

        let column_widths: Vec<usize> = export
            .columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                export
                    .rows
                    .iter()
                    .map(|row| row.counts[i].to_string().len())
                    .max()
                    .unwrap_or(0)
                    .max(column.len())
            })
            .collect();

        write!(f, "{:label_width$}", "")?;
        for (column, &width) in export.columns.iter().zip(&column_widths) {
            write!(f, "  {column:>width$}")?;
        }
        writeln!(f)?;

        for row in &export.rows {
            write!(f, "{:label_width$}", row.label)?;
            for (count, &width) in row.counts.iter().zip(&column_widths) {
                write!(f, "  {count:>width$}")?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}
