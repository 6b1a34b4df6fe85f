//! Batch drivers: generate statements into a CSV, or execute a CSV's statements
//!
//! Both drivers process rows strictly one at a time. A failing row is logged,
//! recorded in the summary and skipped; only file-level problems abort.

pub mod execute;
pub mod generate;

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::config::{
    COL_SOURCE_CATALOG, COL_SOURCE_SCHEMA, COL_SOURCE_TABLE, COL_TARGET_CATALOG,
    COL_TARGET_SCHEMA, COL_TARGET_TABLE, COL_TYPE,
};
use crate::error::JobError;
use crate::jobs::{JobDataset, JobRow};

pub use execute::BatchExecutor;
pub use generate::BatchGenerator;

/// A row that was skipped, with enough context to find it in the input
#[derive(Debug)]
pub struct RowFailure {
    pub line: u64,
    pub description: String,
    pub error: JobError,
}

/// Outcome of a generate or execute run
#[derive(Debug)]
pub struct BatchSummary {
    pub rows_read: usize,
    pub rows_failed: usize,
    /// Statements written (generate) or executed successfully (execute)
    pub statements: u64,
    pub duration: Duration,
    /// Row latency percentiles, when any row was processed
    pub latency: Option<String>,
    pub failures: Vec<RowFailure>,
}

/// Identifying fields of a raw row for log lines: `TYPE source -> target`
///
/// Built from the raw cells so it also works for rows that fail to parse.
pub(crate) fn describe_row(dataset: &JobDataset, row: &JobRow) -> String {
    let job_type = match dataset.field(row, COL_TYPE) {
        "" => "CTAS".to_string(),
        t => t.to_ascii_uppercase(),
    };
    let dotted = |catalog: &str, schema: &str, table: &str| {
        format!(
            "{}.{}.{}",
            dataset.field(row, catalog),
            dataset.field(row, schema),
            dataset.field(row, table)
        )
    };

    format!(
        "{} {} -> {}",
        job_type,
        dotted(COL_SOURCE_CATALOG, COL_SOURCE_SCHEMA, COL_SOURCE_TABLE),
        dotted(COL_TARGET_CATALOG, COL_TARGET_SCHEMA, COL_TARGET_TABLE)
    )
}

/// Progress bar over rows, hidden in quiet mode
pub(crate) fn row_progress(total: usize, quiet: bool, prefix: &'static str) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(total as u64);
    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {prefix}: [{bar:30.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        .map(|style| style.progress_chars("=>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar.set_prefix(prefix);
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_row() {
        let dataset = JobDataset::from_bytes(
            b"type,Source Catalog,Source Schema,Source Table,Target catalog,Target Schema,Target Table Name\n\
              iis,hive,raw,events,lake,curated,events\n\
              ,hive,raw,,lake,curated,events\n",
        )
        .unwrap();

        assert_eq!(
            describe_row(&dataset, &dataset.rows[0]),
            "IIS hive.raw.events -> lake.curated.events"
        );
        assert_eq!(
            describe_row(&dataset, &dataset.rows[1]),
            "CTAS hive.raw. -> lake.curated.events"
        );
    }
}
