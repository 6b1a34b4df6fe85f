//! HTTP client for Trino's statement protocol
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, warn};
use url::Url;

use super::protocol::{QueryOutput, QueryResults};
use super::{EngineConfig, QueryEngine, Session};
use crate::config::{CANCEL_TIMEOUT, CLIENT_SOURCE};
use crate::error::JobError;

const HEADER_USER: &str = "X-Trino-User";
const HEADER_SOURCE: &str = "X-Trino-Source";
const HEADER_CATALOG: &str = "X-Trino-Catalog";
const HEADER_SCHEMA: &str = "X-Trino-Schema";

/// Statement client for a single coordinator
///
/// Creating the client does not touch the network; connectivity problems
/// surface on the first statement, as a per-row error.
#[derive(Debug, Clone)]
pub struct TrinoClient {
    config: EngineConfig,
    statement_url: Url,
    http_client: reqwest::Client,
}

impl TrinoClient {
    pub fn new(config: EngineConfig) -> Result<Self> {
        let statement_url = base_url(&config.host, config.port)?
            .join("/v1/statement")
            .context("Failed to build statement URL")?;

        let http_client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            config,
            statement_url,
            http_client,
        })
    }

    /// Submit the statement and follow `nextUri` until it finishes or
    /// `deadline` passes
    ///
    /// A query that runs past the deadline is cancelled on the coordinator
    /// before the timeout is reported.
    async fn run_to_completion(
        &self,
        session: &Session,
        sql: &str,
        deadline: Instant,
    ) -> Result<QueryOutput, JobError> {
        let mut request = self
            .http_client
            .post(self.statement_url.clone())
            .header(HEADER_USER, &self.config.user)
            .header(HEADER_SOURCE, CLIENT_SOURCE)
            .body(sql.to_string());
        if let Some(catalog) = &session.catalog {
            request = request.header(HEADER_CATALOG, catalog);
        }
        if let Some(schema) = &session.schema {
            request = request.header(HEADER_SCHEMA, schema);
        }

        // No query id is known until the first page arrives
        let submit = async { read_page(request.send().await?).await };
        let mut page = timeout_at(deadline, submit)
            .await
            .map_err(|_| JobError::Timeout(self.config.query_timeout))??;

        let mut output = QueryOutput::default();
        let mut pages = 1u32;

        while let Some(next_uri) = output.absorb(page)? {
            page = match timeout_at(deadline, self.fetch_page(&next_uri)).await {
                Ok(result) => result?,
                Err(_) => {
                    self.cancel(&next_uri).await;
                    return Err(JobError::Timeout(self.config.query_timeout));
                }
            };
            pages += 1;
        }

        debug!(
            query_id = output.query_id.as_deref().unwrap_or_default(),
            pages,
            rows = output.rows.len(),
            "statement finished"
        );

        Ok(output)
    }

    async fn fetch_page(&self, next_uri: &str) -> Result<QueryResults, JobError> {
        let response = self
            .http_client
            .get(next_uri)
            .header(HEADER_USER, &self.config.user)
            .send()
            .await?;
        read_page(response).await
    }

    /// Best-effort `DELETE` of a running query; failures are only logged
    async fn cancel(&self, next_uri: &str) {
        let result = self
            .http_client
            .delete(next_uri)
            .header(HEADER_USER, &self.config.user)
            .timeout(CANCEL_TIMEOUT)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                debug!(uri = next_uri, "cancelled timed-out query");
            }
            Ok(response) => {
                warn!(uri = next_uri, status = %response.status(), "Failed to cancel timed-out query");
            }
            Err(e) => {
                warn!(uri = next_uri, "Failed to cancel timed-out query: {}", e);
            }
        }
    }
}

#[async_trait]
impl QueryEngine for TrinoClient {
    async fn execute(&self, session: &Session, sql: &str) -> Result<QueryOutput, JobError> {
        let sql_preview = if sql.len() > 80 {
            format!("{}...", sql.chars().take(80).collect::<String>())
        } else {
            sql.to_string()
        };
        debug!(session = %session.label(), sql = %sql_preview, "submitting statement");

        let start = Instant::now();
        let deadline = start + self.config.query_timeout;
        let output = self.run_to_completion(session, sql, deadline).await?;

        debug!(duration_ms = start.elapsed().as_millis() as u64, "statement complete");
        Ok(output)
    }
}

/// Decode one response page, mapping HTTP failures to connectivity errors
async fn read_page(response: reqwest::Response) -> Result<QueryResults, JobError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(classify_http_status(status, body.trim()));
    }

    Ok(response.json::<QueryResults>().await?)
}

fn classify_http_status(status: StatusCode, body: &str) -> JobError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            JobError::Connectivity(format!("authentication rejected ({}): {}", status, body))
        }
        _ => JobError::Connectivity(format!("unexpected HTTP status {}: {}", status, body)),
    }
}

/// Coordinator base URL from a host that may or may not carry a scheme
fn base_url(host: &str, port: u16) -> Result<Url> {
    let host = host.trim().trim_end_matches('/');
    let with_scheme = if host.contains("://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    };

    let mut url = Url::parse(&with_scheme)
        .with_context(|| format!("Invalid engine host '{}'", host))?;
    url.set_port(Some(port))
        .map_err(|_| anyhow::anyhow!("Cannot set port on engine URL '{}'", with_scheme))?;
    Ok(url)
}
