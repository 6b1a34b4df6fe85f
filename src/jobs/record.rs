use csv::StringRecord;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::error::JobError;
use crate::sql::ident::quote_identifier;

/// Kind of statement a job row asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobType {
    /// CREATE TABLE AS SELECT
    Ctas,
    /// CREATE TABLE AS SELECT ... WITH NO DATA
    CtasNoData,
    /// INSERT INTO ... SELECT
    Iis,
}

impl FromStr for JobType {
    type Err = JobError;

    /// Parse job type (case-insensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CTAS" => Ok(JobType::Ctas),
            "CTASND" => Ok(JobType::CtasNoData),
            "IIS" => Ok(JobType::Iis),
            other => Err(JobError::MalformedInput(format!(
                "unsupported job type '{}'. Supported types: CTAS, CTASND, IIS",
                other
            ))),
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobType::Ctas => "CTAS",
            JobType::CtasNoData => "CTASND",
            JobType::Iis => "IIS",
        };
        f.write_str(name)
    }
}

/// Storage format of the target table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableFormat {
    Iceberg,
    Delta,
    Parquet,
    /// Anything else; generates an unpartitioned statement
    Other(String),
}

impl TableFormat {
    /// Parse format from string (case-insensitive, never fails)
    pub fn parse(s: &str) -> Self {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "iceberg" => TableFormat::Iceberg,
            "delta" => TableFormat::Delta,
            "parquet" => TableFormat::Parquet,
            _ => TableFormat::Other(lower),
        }
    }
}

/// A `catalog.schema.table` reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub catalog: String,
    pub schema: String,
    pub table: String,
}

impl TableRef {
    pub fn new(
        catalog: impl Into<String>,
        schema: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            catalog: catalog.into(),
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// Parse a dotted `catalog.schema.table` name
    pub fn parse(name: &str) -> Result<Self, JobError> {
        let parts: Vec<&str> = name.trim().split('.').map(str::trim).collect();
        match parts.as_slice() {
            [catalog, schema, table]
                if !catalog.is_empty() && !schema.is_empty() && !table.is_empty() =>
            {
                Ok(Self::new(*catalog, *schema, *table))
            }
            _ => Err(JobError::MalformedInput(format!(
                "expected a fully-qualified table name 'catalog.schema.table', got '{}'",
                name
            ))),
        }
    }
}

/// Renders the fully-qualified name, quoting parts only where needed
impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}",
            quote_identifier(&self.catalog),
            quote_identifier(&self.schema),
            quote_identifier(&self.table)
        )
    }
}

/// One parsed migration job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    pub job_type: JobType,
    pub source: TableRef,
    pub target: TableRef,
    pub target_format: TableFormat,
    pub partition_columns: Vec<String>,
    pub where_predicates: Vec<String>,
}

/// Raw row as it appears in the job list, keyed by header name
#[derive(Debug, Deserialize)]
struct RawJobRow {
    #[serde(rename = "type", default)]
    job_type: Option<String>,
    #[serde(rename = "Source Catalog", default)]
    source_catalog: Option<String>,
    #[serde(rename = "Source Schema", default)]
    source_schema: Option<String>,
    #[serde(rename = "Source Table", default)]
    source_table: Option<String>,
    #[serde(rename = "Partition Column names", default)]
    partition_columns: Option<String>,
    #[serde(rename = "Target catalog", default)]
    target_catalog: Option<String>,
    #[serde(rename = "Target Schema", default)]
    target_schema: Option<String>,
    #[serde(rename = "Target Table Name", default)]
    target_table: Option<String>,
    #[serde(rename = "Target Table Format", default)]
    target_format: Option<String>,
    #[serde(rename = "where_predicate", default)]
    where_predicate: Option<String>,
}

impl JobRecord {
    /// Parse a job from a CSV record using the file's header row
    pub fn from_record(headers: &StringRecord, record: &StringRecord) -> Result<Self, JobError> {
        let raw: RawJobRow = record
            .deserialize(Some(headers))
            .map_err(|e| JobError::MalformedInput(e.to_string()))?;

        // An absent type column means CTAS, the only kind older job lists carry
        let job_type = match non_empty(raw.job_type) {
            Some(t) => t.parse()?,
            None => JobType::Ctas,
        };

        let source = TableRef::new(
            required(raw.source_catalog, "Source Catalog")?,
            required(raw.source_schema, "Source Schema")?,
            required(raw.source_table, "Source Table")?,
        );
        let target = TableRef::new(
            required(raw.target_catalog, "Target catalog")?,
            required(raw.target_schema, "Target Schema")?,
            required(raw.target_table, "Target Table Name")?,
        );

        Ok(JobRecord {
            job_type,
            source,
            target,
            target_format: TableFormat::parse(raw.target_format.as_deref().unwrap_or_default()),
            partition_columns: split_list(raw.partition_columns.as_deref()),
            where_predicates: split_list(raw.where_predicate.as_deref()),
        })
    }

    pub fn has_partitions(&self) -> bool {
        !self.partition_columns.is_empty()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(value: Option<String>, field: &str) -> Result<String, JobError> {
    non_empty(value)
        .ok_or_else(|| JobError::MalformedInput(format!("missing required field '{}'", field)))
}

/// Split a comma-separated cell, trimming entries and dropping empty ones
fn split_list(cell: Option<&str>) -> Vec<String> {
    cell.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
