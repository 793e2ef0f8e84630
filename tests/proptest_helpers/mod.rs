#![allow(dead_code)]

use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

use fedsplit::distribution::DistributionTable;

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// Distinct, sorted image names like the ones read from a source directory.
pub fn arb_file_names(max_files: usize) -> BoxedStrategy<Vec<String>> {
    proptest::collection::btree_set(
        proptest::string::string_regex("[a-z0-9_]{1,12}").expect("valid filename regex"),
        0..=max_files,
    )
    .prop_map(|stems| stems.into_iter().map(|s| format!("{s}.jpg")).collect())
    .boxed()
}

const ROWS: &[&str] = &["Samples", "pedestrian", "car", "bus", "truck"];
const COLUMNS: &[&str] = &["server", "client1", "client2", "client3"];

/// Tables over random subsets of a shared label pool with random counts.
pub fn arb_table() -> BoxedStrategy<DistributionTable> {
    (
        proptest::sample::subsequence(ROWS, 1..=ROWS.len()),
        proptest::sample::subsequence(COLUMNS, 1..=COLUMNS.len()),
        proptest::collection::vec(0u64..1000, ROWS.len() * COLUMNS.len()),
    )
        .prop_map(|(rows, columns, counts)| {
            let mut table = DistributionTable::with_axes(rows.clone(), columns.clone());
            for (r, row) in rows.iter().enumerate() {
                for (c, column) in columns.iter().enumerate() {
                    table.add(row, column, counts[r * COLUMNS.len() + c]);
                }
            }
            table
        })
        .boxed()
}

/// Cell values by label, independent of axis order.
pub fn cell_values(table: &DistributionTable) -> Vec<(String, String, u64)> {
    let mut cells = Vec::new();
    for row in table.rows() {
        for column in table.columns() {
            cells.push((row.clone(), column.clone(), table.get(row, column)));
        }
    }
    cells.sort();
    cells
}
