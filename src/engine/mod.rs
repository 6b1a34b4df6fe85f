//! Query engine layer - HTTP statement client and column introspection

pub mod introspect;
pub mod protocol;
pub mod trino;

use async_trait::async_trait;
use derive_builder::Builder;
use std::time::Duration;

use crate::config::{CONNECT_TIMEOUT, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_USER, QUERY_TIMEOUT};
use crate::error::JobError;

pub use introspect::{EngineColumnLookup, describe_columns};
pub use protocol::QueryOutput;
pub use trino::TrinoClient;

/// Connection parameters for the query engine
#[derive(Debug, Clone, Builder)]
pub struct EngineConfig {
    #[builder(setter(into), default = "DEFAULT_HOST.to_string()")]
    pub host: String,
    #[builder(default = "DEFAULT_PORT")]
    pub port: u16,
    #[builder(setter(into), default = "DEFAULT_USER.to_string()")]
    pub user: String,
    #[builder(default = "QUERY_TIMEOUT")]
    pub query_timeout: Duration,
    #[builder(default = "CONNECT_TIMEOUT")]
    pub connect_timeout: Duration,
}

/// Default catalog and schema a statement runs in
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub catalog: Option<String>,
    pub schema: Option<String>,
}

impl Session {
    /// Session from possibly-empty catalog and schema names
    pub fn new(catalog: &str, schema: &str) -> Self {
        let non_empty = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        };
        Self {
            catalog: non_empty(catalog),
            schema: non_empty(schema),
        }
    }

    /// `catalog.schema` for log lines
    pub fn label(&self) -> String {
        format!(
            "{}.{}",
            self.catalog.as_deref().unwrap_or("<default>"),
            self.schema.as_deref().unwrap_or("<default>")
        )
    }
}

/// Anything that can run a SQL statement to completion
///
/// Implemented over HTTP by [`TrinoClient`]; tests substitute an in-memory engine.
#[async_trait]
pub trait QueryEngine: Send + Sync {
    async fn execute(&self, session: &Session, sql: &str) -> Result<QueryOutput, JobError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = EngineConfigBuilder::default().build().unwrap();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 8080);
        assert_eq!(config.user, "admin");
        assert_eq!(config.query_timeout, QUERY_TIMEOUT);
    }

    #[test]
    fn test_session_labels() {
        assert_eq!(Session::new("hive", " raw ").label(), "hive.raw");
        let session = Session::new("", "");
        assert_eq!(session, Session::default());
        assert_eq!(session.label(), "<default>.<default>");
    }
}
