//! High-level runner API for the migration tool.
//!
//! This module provides a simplified public interface that encapsulates the
//! setup of the engine client, column lookup and batch drivers.
//!
//! This is the primary API for external users and for the CLI.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::engine::{
    EngineColumnLookup, EngineConfigBuilder, QueryEngine, TrinoClient, describe_columns,
};
use crate::jobs::TableRef;
use crate::pipeline::{BatchExecutor, BatchGenerator};
use crate::sql::reorder_columns_with_partitions;

pub use crate::error::JobError;
pub use crate::pipeline::{BatchSummary, RowFailure};

/// Query engine connection parameters
#[derive(Debug, Clone)]
pub struct ConnectionArgs {
    pub host: String,
    pub port: u16,
    pub user: String,
    /// Upper bound for one statement, including all result pages
    pub query_timeout: Duration,
}

impl ConnectionArgs {
    fn engine(&self) -> Result<Arc<dyn QueryEngine>> {
        let config = EngineConfigBuilder::default()
            .host(&self.host)
            .port(self.port)
            .user(&self.user)
            .query_timeout(self.query_timeout)
            .build()
            .context("Invalid engine configuration")?;
        Ok(Arc::new(TrinoClient::new(config)?))
    }
}

/// Arguments for generating statements from a job list
#[derive(Clone)]
pub struct GenerateArgs {
    pub connection: ConnectionArgs,
    pub input_csv: PathBuf,
    pub output_csv: PathBuf,
    pub quiet: bool,

    // Test-only: inject an in-memory engine
    #[cfg(test)]
    pub test_engine: Option<Arc<dyn QueryEngine>>,
}

/// Arguments for executing the statements of a generated job list
#[derive(Clone)]
pub struct ExecuteArgs {
    pub connection: ConnectionArgs,
    pub input_csv: PathBuf,
    pub quiet: bool,

    // Test-only: inject an in-memory engine
    #[cfg(test)]
    pub test_engine: Option<Arc<dyn QueryEngine>>,
}

/// Arguments for introspecting one table
#[derive(Clone)]
pub struct DescribeArgs {
    pub connection: ConnectionArgs,
    /// `catalog.schema.table`
    pub table: String,
    /// Surrounding whitespace is ignored and empty names are dropped
    pub partition_columns: Vec<String>,

    // Test-only: inject an in-memory engine
    #[cfg(test)]
    pub test_engine: Option<Arc<dyn QueryEngine>>,
}

/// Columns of an introspected table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribeResult {
    pub table: String,
    pub columns: Vec<String>,
    /// Column order with partition columns last, when partition columns were given
    pub reordered: Option<Vec<String>>,
}

/// Generate statements for every row of a job list and write them to a CSV
///
/// The engine is only contacted for partitioned parquet jobs, whose SELECT
/// list is built from the table's columns.
///
/// # Example
///
/// ```no_run
/// use trino_migrate::runner::{ConnectionArgs, GenerateArgs, run_generate};
/// use std::time::Duration;
///
/// # async fn example() -> anyhow::Result<()> {
/// let args = GenerateArgs {
///     connection: ConnectionArgs {
///         host: "localhost".to_string(),
///         port: 8080,
///         user: "admin".to_string(),
///         query_timeout: Duration::from_secs(180),
///     },
///     input_csv: "trino_input.csv".into(),
///     output_csv: "output_data.csv".into(),
///     quiet: true,
/// };
///
/// let summary = run_generate(args).await?;
/// println!("Generated {} statements", summary.statements);
/// # Ok(())
/// # }
/// ```
pub async fn run_generate(args: GenerateArgs) -> Result<BatchSummary> {
    #[cfg(test)]
    let engine = match args.test_engine {
        Some(engine) => engine,
        None => args.connection.engine()?,
    };

    #[cfg(not(test))]
    let engine = args.connection.engine()?;

    let lookup = Arc::new(EngineColumnLookup::new(engine));
    BatchGenerator::new(lookup)
        .run(&args.input_csv, &args.output_csv, args.quiet)
        .await
}

/// Execute every generated statement of a job list, row by row
pub async fn run_execute(args: ExecuteArgs) -> Result<BatchSummary> {
    #[cfg(test)]
    let engine = match args.test_engine {
        Some(engine) => engine,
        None => args.connection.engine()?,
    };

    #[cfg(not(test))]
    let engine = args.connection.engine()?;

    BatchExecutor::new(engine)
        .run(&args.input_csv, args.quiet)
        .await
}

/// Introspect a table's columns, optionally reordering partition columns last
pub async fn run_describe(args: DescribeArgs) -> Result<DescribeResult> {
    #[cfg(test)]
    let engine = match args.test_engine {
        Some(engine) => engine,
        None => args.connection.engine()?,
    };

    #[cfg(not(test))]
    let engine = args.connection.engine()?;

    let table = TableRef::parse(&args.table)?;
    let columns = describe_columns(engine.as_ref(), &table)
        .await
        .with_context(|| format!("Failed to describe {}", table))?;

    let partition_columns: Vec<String> = args
        .partition_columns
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();
    let reordered = (!partition_columns.is_empty())
        .then(|| reorder_columns_with_partitions(&columns, &partition_columns));

    Ok(DescribeResult {
        table: table.to_string(),
        columns,
        reordered,
    })
}
