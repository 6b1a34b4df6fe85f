use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use super::{QueryEngine, Session};
use crate::config::COMMENT_MARKER;
use crate::error::JobError;
use crate::jobs::TableRef;
use crate::sql::ColumnLookup;

/// Query a table's column names in declaration order with `DESCRIBE`
///
/// The first field of every result row is the column name. Rows whose first
/// field is empty or starts with the comment marker are partition summary
/// pseudo-rows and are skipped.
pub async fn describe_columns(
    engine: &dyn QueryEngine,
    table: &TableRef,
) -> Result<Vec<String>, JobError> {
    let session = Session::new(&table.catalog, &table.schema);
    let output = engine
        .execute(&session, &format!("DESCRIBE {}", table))
        .await?;

    let columns: Vec<String> = output
        .rows
        .iter()
        .filter_map(|row| row.first().and_then(column_name))
        .filter(|name| !name.is_empty() && !name.starts_with(COMMENT_MARKER))
        .collect();

    if columns.is_empty() {
        return Err(JobError::NotFound(format!(
            "table {} not found or has no columns",
            table
        )));
    }

    debug!(table = %table, count = columns.len(), "described table");
    Ok(columns)
}

fn column_name(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.trim().to_string()),
        other => Some(other.to_string()),
    }
}

/// Column lookup that introspects tables through the query engine
#[derive(Clone)]
pub struct EngineColumnLookup {
    engine: Arc<dyn QueryEngine>,
}

impl EngineColumnLookup {
    pub fn new(engine: Arc<dyn QueryEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl ColumnLookup for EngineColumnLookup {
    async fn columns(&self, table: &TableRef) -> Result<Vec<String>, JobError> {
        describe_columns(self.engine.as_ref(), table).await
    }
}
