use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use super::{BatchSummary, RowFailure, row_progress};
use crate::config::{COL_GENERATED_QUERY, COL_SOURCE_CATALOG, COL_SOURCE_SCHEMA};
use crate::engine::{QueryEngine, QueryOutput, Session};
use crate::error::JobError;
use crate::jobs::{JobDataset, JobRow};
use crate::telemetry::{BatchStats, TelemetryEvent};

/// Runs every statement of a generated job list against the engine
pub struct BatchExecutor {
    engine: Arc<dyn QueryEngine>,
}

impl BatchExecutor {
    pub fn new(engine: Arc<dyn QueryEngine>) -> Self {
        Self { engine }
    }

    /// Execute the statement column of `input`, one row at a time
    ///
    /// Each statement runs with the row's source catalog and schema as the
    /// session defaults. No retries: a failed statement is reported and the
    /// next row is executed.
    pub async fn run(&self, input: &Path, quiet: bool) -> Result<BatchSummary> {
        let start_time = Instant::now();

        let dataset = JobDataset::read(input).await?;
        if dataset.column_index(COL_GENERATED_QUERY).is_none() {
            anyhow::bail!(
                "{} has no '{}' column. Run the generate command first.",
                input.display(),
                COL_GENERATED_QUERY
            );
        }
        info!(
            "Executing {} statements from {}",
            dataset.rows.len(),
            input.display()
        );

        let progress = row_progress(dataset.rows.len(), quiet, "Statements");
        let mut stats = BatchStats::new();
        let mut failures = Vec::new();

        for row in &dataset.rows {
            let row_start = Instant::now();
            let session = Session::new(
                dataset.field(row, COL_SOURCE_CATALOG),
                dataset.field(row, COL_SOURCE_SCHEMA),
            );
            let statement = statement_text(dataset.field(row, COL_GENERATED_QUERY));

            match self.execute_row(&session, statement).await {
                Ok(output) => {
                    info!(line = row.line, session = %session.label(), "Statement succeeded");
                    if !quiet {
                        progress.suspend(|| print_success(&session, statement, &output));
                    }
                    stats.update(&TelemetryEvent::RowSucceeded {
                        statements: 1,
                        duration_ms: row_start.elapsed().as_millis() as u64,
                    });
                }
                Err(error) => {
                    warn!(
                        line = row.line,
                        kind = error.kind(),
                        "Error executing query on {}: {}",
                        session.label(),
                        error
                    );
                    stats.update(&TelemetryEvent::RowFailed {
                        duration_ms: row_start.elapsed().as_millis() as u64,
                    });
                    failures.push(RowFailure {
                        line: row.line,
                        description: describe_statement(row, &session, statement),
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
        info!(
            "Executed {} rows: {} succeeded, {} failed",
            dataset.rows.len(),
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

    async fn execute_row(&self, session: &Session, statement: &str) -> Result<QueryOutput, JobError> {
        if statement.is_empty() {
            return Err(JobError::MalformedInput(format!(
                "empty '{}' value",
                COL_GENERATED_QUERY
            )));
        }
        self.engine.execute(session, statement).await
    }
}

/// The engine rejects a trailing statement terminator
fn statement_text(cell: &str) -> &str {
    cell.trim().trim_end_matches(';').trim_end()
}

fn describe_statement(row: &JobRow, session: &Session, statement: &str) -> String {
    let preview: String = statement.chars().take(80).collect();
    format!("line {} on {}: {}", row.line, session.label(), preview)
}

fn print_success(session: &Session, statement: &str, output: &QueryOutput) {
    println!(
        "Query executed successfully on {}: {}",
        session.label(),
        statement
    );
    for row in &output.rows {
        println!("{}", serde_json::Value::Array(row.clone()));
    }
}
