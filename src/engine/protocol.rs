//! Wire types for the engine's HTTP statement protocol
//!
//! A statement is submitted with `POST /v1/statement`. Every response is a
//! `QueryResults` page; while it carries a `nextUri` the client keeps fetching
//! it. Column metadata and data rows may arrive on any page, and an `error`
//! object on a page ends the query.

use serde::Deserialize;
use serde_json::Value;

use crate::error::JobError;

/// Engine error names reported when a catalog object does not exist
const NOT_FOUND_ERRORS: &[&str] = &["TABLE_NOT_FOUND", "SCHEMA_NOT_FOUND", "CATALOG_NOT_FOUND"];

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResults {
    pub id: String,
    #[serde(default)]
    pub next_uri: Option<String>,
    #[serde(default)]
    pub columns: Option<Vec<ColumnInfo>>,
    #[serde(default)]
    pub data: Option<Vec<Vec<Value>>>,
    #[serde(default)]
    pub error: Option<QueryErrorInfo>,
    #[serde(default)]
    pub stats: Option<StatementStats>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryErrorInfo {
    pub message: String,
    #[serde(default)]
    pub error_name: Option<String>,
    #[serde(default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub error_code: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatementStats {
    pub state: String,
}

impl From<QueryErrorInfo> for JobError {
    fn from(err: QueryErrorInfo) -> Self {
        tracing::debug!(
            error_type = ?err.error_type,
            error_code = ?err.error_code,
            "engine reported query error"
        );
        let error_name = err.error_name.unwrap_or_else(|| "UNKNOWN".to_string());
        if NOT_FOUND_ERRORS.contains(&error_name.as_str()) {
            JobError::NotFound(err.message)
        } else {
            JobError::Execution {
                error_name,
                message: err.message,
            }
        }
    }
}

/// Columns and rows accumulated over all pages of a finished statement
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOutput {
    pub query_id: Option<String>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub state: Option<String>,
}

impl QueryOutput {
    /// Merge a page into the output
    ///
    /// Returns the next page to fetch, `None` once the statement has finished,
    /// or the engine's error if the page reports one.
    pub fn absorb(&mut self, page: QueryResults) -> Result<Option<String>, JobError> {
        if let Some(err) = page.error {
            return Err(err.into());
        }

        if self.query_id.is_none() {
            self.query_id = Some(page.id);
        }
        if self.columns.is_empty()
            && let Some(columns) = page.columns
        {
            self.columns = columns.into_iter().map(|c| c.name).collect();
        }
        if let Some(data) = page.data {
            self.rows.extend(data);
        }
        if let Some(stats) = page.stats {
            self.state = Some(stats.state);
        }

        Ok(page.next_uri)
    }
}
