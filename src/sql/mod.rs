//! SQL statement generation for migration jobs

pub mod generator;
pub mod ident;
pub mod reorder;

use async_trait::async_trait;

use crate::error::JobError;
use crate::jobs::TableRef;

pub use generator::generate_statements;
pub use reorder::reorder_columns_with_partitions;

/// Source of a table's column names in declaration order
///
/// Only consulted for parquet targets with partition columns, where the
/// partition columns have to be moved to the end of the SELECT list.
#[async_trait]
pub trait ColumnLookup: Send + Sync {
    async fn columns(&self, table: &TableRef) -> Result<Vec<String>, JobError>;
}
