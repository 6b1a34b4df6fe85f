use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::{BatchSummary, RowFailure, describe_row, row_progress};
use crate::config::COL_GENERATED_QUERY;
use crate::error::JobError;
use crate::jobs::{DatasetWriter, JobDataset, JobRecord, JobRow};
use crate::sql::{ColumnLookup, generate_statements};
use crate::telemetry::{BatchStats, TelemetryEvent};

/// Reads a job list, generates statements per row and writes them to a new CSV
pub struct BatchGenerator {
    lookup: Arc<dyn ColumnLookup>,
}

impl BatchGenerator {
    pub fn new(lookup: Arc<dyn ColumnLookup>) -> Self {
        Self { lookup }
    }

    /// Run the generation pass over `input`, writing the result to `output`
    ///
    /// Every generated statement becomes its own output row cloned from the
    /// input row. Rows that fail are logged and left out of the output.
    pub async fn run(&self, input: &Path, output: &Path, quiet: bool) -> Result<BatchSummary> {
        let start_time = Instant::now();

        let dataset = JobDataset::read(input).await?;
        info!(
            "Read {} job rows from {}",
            dataset.rows.len(),
            input.display()
        );

        let mut writer = DatasetWriter::new(&dataset.raw_headers, COL_GENERATED_QUERY);
        let (stats, failures) = self.generate_all(&dataset, &mut writer, quiet).await;

        writer.write(output).await?;
        info!(
            "Wrote {} statements to {} ({} rows succeeded, {} failed)",
            writer.len(),
            output.display(),
            stats.rows_succeeded,
            stats.rows_failed
        );

        Ok(BatchSummary {
            rows_read: dataset.rows.len(),
            rows_failed: stats.rows_failed,
            statements: stats.statements,
            duration: start_time.elapsed(),
            latency: stats.latency_summary(),
            failures,
        })
    }

    /// Generate statements for every row into `writer`
    async fn generate_all(
        &self,
        dataset: &JobDataset,
        writer: &mut DatasetWriter,
        quiet: bool,
    ) -> (BatchStats, Vec<RowFailure>) {
        let progress = row_progress(dataset.rows.len(), quiet, "Rows");
        let mut stats = BatchStats::new();
        let mut failures = Vec::new();

        for row in &dataset.rows {
            let row_start = Instant::now();

            match self.generate_row(dataset, row).await {
                Ok(statements) => {
                    for statement in &statements {
                        writer.push(&row.record, statement);
                    }
                    stats.update(&TelemetryEvent::RowSucceeded {
                        statements: statements.len() as u64,
                        duration_ms: row_start.elapsed().as_millis() as u64,
                    });
                }
                Err(error) => {
                    let description = describe_row(dataset, row);
                    warn!(
                        line = row.line,
                        kind = error.kind(),
                        "Skipping row {} ({}): {}",
                        row.line,
                        description,
                        error
                    );
                    stats.update(&TelemetryEvent::RowFailed {
                        duration_ms: row_start.elapsed().as_millis() as u64,
                    });
                    failures.push(RowFailure {
                        line: row.line,
                        description,
                        error,
                    });
                }
            }

            progress.inc(1);
            if let Some(message) = stats.latency_summary() {
                progress.set_message(message);
            }
        }

        progress.finish();
        (stats, failures)
    }

    async fn generate_row(&self, dataset: &JobDataset, row: &JobRow) -> Result<Vec<String>, JobError> {
        let job = JobRecord::from_record(&dataset.headers, &row.record)?;
        let statements = generate_statements(&job, self.lookup.as_ref()).await?;
        debug!(
            line = row.line,
            job_type = %job.job_type,
            count = statements.len(),
            "generated statements"
        );
        Ok(statements)
    }
}
