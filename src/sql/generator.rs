use tracing::debug;

use super::ColumnLookup;
use super::ident::{quote_identifier, quote_literal};
use super::reorder::reorder_columns_with_partitions;
use crate::error::JobError;
use crate::jobs::{JobRecord, JobType, TableFormat, TableRef};

/// Generate every statement a job row asks for
pub async fn generate_statements(
    job: &JobRecord,
    lookup: &dyn ColumnLookup,
) -> Result<Vec<String>, JobError> {
    match job.job_type {
        JobType::Ctas => Ok(vec![generate_ctas_query(job, false, lookup).await?]),
        JobType::CtasNoData => Ok(vec![generate_ctas_query(job, true, lookup).await?]),
        JobType::Iis => generate_iis_query(job, lookup).await,
    }
}

/// Generate a CREATE TABLE AS SELECT statement
///
/// Partition columns go into the table properties (`partitioning` for
/// iceberg, `partitioned_by` for delta and parquet). Parquet targets also get
/// `format = 'PARQUET'`, and when partitioned their SELECT list is built from
/// the source table's columns with the partition columns moved last.
/// Unknown formats produce an unpartitioned statement.
pub async fn generate_ctas_query(
    job: &JobRecord,
    with_no_data: bool,
    lookup: &dyn ColumnLookup,
) -> Result<String, JobError> {
    let properties = table_properties(&job.target_format, &job.partition_columns);
    let select_list = select_list(job, &job.source, lookup).await?;

    let mut parts = vec![format!("CREATE TABLE {}", job.target)];
    if !properties.is_empty() {
        parts.push(format!("WITH ({})", properties));
    }
    parts.push(format!("AS SELECT {} FROM {}", select_list, job.source));
    if with_no_data {
        parts.push("WITH NO DATA".to_string());
    }

    Ok(parts.join(" ").trim().to_string())
}

/// Generate INSERT INTO ... SELECT statements, one per WHERE predicate
///
/// Without predicates a single unconditioned statement is returned.
pub async fn generate_iis_query(
    job: &JobRecord,
    lookup: &dyn ColumnLookup,
) -> Result<Vec<String>, JobError> {
    // Column order must match the existing target table
    let select_list = select_list(job, &job.target, lookup).await?;
    let base = format!(
        "INSERT INTO {} SELECT {} FROM {}",
        job.target, select_list, job.source
    );

    if job.where_predicates.is_empty() {
        return Ok(vec![base]);
    }

    Ok(job
        .where_predicates
        .iter()
        .map(|predicate| format!("{} where {}", base, predicate))
        .collect())
}

/// Build the comma-separated property list that goes inside `WITH (...)`
///
/// Returns an empty string when the statement needs no properties.
pub(crate) fn table_properties(format: &TableFormat, partition_columns: &[String]) -> String {
    let mut properties = Vec::new();

    if !partition_columns.is_empty() {
        let array = partition_columns
            .iter()
            .map(|col| quote_literal(col))
            .collect::<Vec<_>>()
            .join(", ");

        match format {
            TableFormat::Iceberg => properties.push(format!("partitioning = ARRAY[{}]", array)),
            TableFormat::Delta | TableFormat::Parquet => {
                properties.push(format!("partitioned_by = ARRAY[{}]", array))
            }
            TableFormat::Other(_) => {}
        }
    }

    if *format == TableFormat::Parquet {
        properties.push("format = 'PARQUET'".to_string());
    }

    properties.join(", ")
}

/// `*`, or the introspected column list of `columns_of` with partition
/// columns last when the job is a partitioned parquet job
async fn select_list(
    job: &JobRecord,
    columns_of: &TableRef,
    lookup: &dyn ColumnLookup,
) -> Result<String, JobError> {
    if job.target_format != TableFormat::Parquet || !job.has_partitions() {
        return Ok("*".to_string());
    }

    let all_columns = lookup.columns(columns_of).await?;
    let reordered = reorder_columns_with_partitions(&all_columns, &job.partition_columns);
    if reordered.is_empty() {
        return Err(JobError::NotFound(format!(
            "no columns found for table {}",
            columns_of
        )));
    }

    debug!(table = %columns_of, columns = ?reordered, "reordered select list");

    Ok(reordered
        .iter()
        .map(|col| quote_identifier(col))
        .collect::<Vec<_>>()
        .join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Column lookup backed by a map, recording which tables were asked for
    #[derive(Default)]
    struct MapLookup {
        tables: HashMap<String, Vec<String>>,
        requested: Mutex<Vec<String>>,
    }

    impl MapLookup {
        fn with_table(mut self, name: &str, columns: &[&str]) -> Self {
            self.tables.insert(
                name.to_string(),
                columns.iter().map(|c| c.to_string()).collect(),
            );
            self
        }

        fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ColumnLookup for MapLookup {
        async fn columns(&self, table: &TableRef) -> Result<Vec<String>, JobError> {
            let name = table.to_string();
            self.requested.lock().unwrap().push(name.clone());
            self.tables
                .get(&name)
                .cloned()
                .ok_or(JobError::NotFound(name))
        }
    }

    fn job(job_type: JobType, format: &str, partitions: &[&str], predicates: &[&str]) -> JobRecord {
        JobRecord {
            job_type,
            source: TableRef::new("hive", "raw", "events"),
            target: TableRef::new("lake", "curated", "events"),
            target_format: TableFormat::parse(format),
            partition_columns: partitions.iter().map(|s| s.to_string()).collect(),
            where_predicates: predicates.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_ctas_iceberg_partitioned() {
        let lookup = MapLookup::default();
        let sql = generate_ctas_query(&job(JobType::Ctas, "iceberg", &["day", "region"], &[]), false, &lookup)
            .await
            .unwrap();

        assert_eq!(
            sql,
            "CREATE TABLE lake.curated.events WITH (partitioning = ARRAY['day', 'region']) \
             AS SELECT * FROM hive.raw.events"
        );
        assert!(lookup.requested().is_empty());
    }

    #[tokio::test]
    async fn test_ctas_delta_uses_partitioned_by() {
        let lookup = MapLookup::default();
        let sql = generate_ctas_query(&job(JobType::Ctas, "DELTA", &["day"], &[]), false, &lookup)
            .await
            .unwrap();

        assert!(sql.contains("WITH (partitioned_by = ARRAY['day'])"));
        assert!(sql.ends_with("AS SELECT * FROM hive.raw.events"));
    }

    #[tokio::test]
    async fn test_ctas_parquet_unpartitioned() {
        let lookup = MapLookup::default();
        let sql = generate_ctas_query(&job(JobType::Ctas, "parquet", &[], &[]), false, &lookup)
            .await
            .unwrap();

        assert_eq!(
            sql,
            "CREATE TABLE lake.curated.events WITH (format = 'PARQUET') AS SELECT * FROM hive.raw.events"
        );
        assert_eq!(table_properties(&TableFormat::Parquet, &[]), "format = 'PARQUET'");
    }

    #[tokio::test]
    async fn test_ctas_parquet_partitioned_reorders_source_columns() {
        let lookup = MapLookup::default().with_table("hive.raw.events", &["day", "id", "payload"]);
        let sql = generate_ctas_query(&job(JobType::Ctas, "parquet", &["day"], &[]), false, &lookup)
            .await
            .unwrap();

        assert_eq!(
            sql,
            "CREATE TABLE lake.curated.events WITH (partitioned_by = ARRAY['day'], format = 'PARQUET') \
             AS SELECT id, payload, day FROM hive.raw.events"
        );
        assert_eq!(lookup.requested(), vec!["hive.raw.events"]);
    }

    #[tokio::test]
    async fn test_ctas_no_data_suffix() {
        let lookup = MapLookup::default();
        let record = job(JobType::CtasNoData, "iceberg", &[], &[]);

        let with_data = generate_ctas_query(&record, false, &lookup).await.unwrap();
        let no_data = generate_ctas_query(&record, true, &lookup).await.unwrap();

        assert!(!with_data.contains("WITH NO DATA"));
        assert_eq!(
            no_data,
            "CREATE TABLE lake.curated.events AS SELECT * FROM hive.raw.events WITH NO DATA"
        );

        let dispatched = generate_statements(&record, &lookup).await.unwrap();
        assert_eq!(dispatched, vec![no_data]);
    }

    #[tokio::test]
    async fn test_unknown_format_is_unpartitioned() {
        let lookup = MapLookup::default();
        let sql = generate_ctas_query(&job(JobType::Ctas, "orc", &["day"], &[]), false, &lookup)
            .await
            .unwrap();

        assert_eq!(sql, "CREATE TABLE lake.curated.events AS SELECT * FROM hive.raw.events");
        assert!(!sql.contains("WITH"));
    }

    #[tokio::test]
    async fn test_iis_one_statement_per_predicate() {
        let lookup = MapLookup::default();
        let statements = generate_iis_query(&job(JobType::Iis, "iceberg", &[], &["x>1", "y<2"]), &lookup)
            .await
            .unwrap();

        assert_eq!(
            statements,
            vec![
                "INSERT INTO lake.curated.events SELECT * FROM hive.raw.events where x>1",
                "INSERT INTO lake.curated.events SELECT * FROM hive.raw.events where y<2",
            ]
        );
    }

    #[tokio::test]
    async fn test_iis_without_predicates_emits_base_once() {
        let lookup = MapLookup::default();
        let statements = generate_iis_query(&job(JobType::Iis, "delta", &["day"], &[]), &lookup)
            .await
            .unwrap();

        assert_eq!(
            statements,
            vec!["INSERT INTO lake.curated.events SELECT * FROM hive.raw.events"]
        );
    }

    #[tokio::test]
    async fn test_iis_parquet_introspects_target() {
        let lookup = MapLookup::default()
            .with_table("lake.curated.events", &["region", "id", "amount"]);
        let statements = generate_statements(
            &job(JobType::Iis, "parquet", &["region"], &["id > 10"]),
            &lookup,
        )
        .await
        .unwrap();

        assert_eq!(
            statements,
            vec!["INSERT INTO lake.curated.events SELECT id, amount, region FROM hive.raw.events where id > 10"]
        );
        assert_eq!(lookup.requested(), vec!["lake.curated.events"]);
    }

    #[tokio::test]
    async fn test_lookup_failure_propagates() {
        let lookup = MapLookup::default();
        let err = generate_statements(&job(JobType::Ctas, "parquet", &["day"], &[]), &lookup)
            .await
            .unwrap_err();

        assert!(matches!(err, JobError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_identifiers_and_literals_are_quoted() {
        let lookup = MapLookup::default().with_table("hive.raw.events", &["order id", "it's"]);
        let mut record = job(JobType::Ctas, "parquet", &["it's"], &[]);
        record.target = TableRef::new("lake", "curated", "events-v2");

        let sql = generate_ctas_query(&record, false, &lookup).await.unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE lake.curated.\"events-v2\" WITH (partitioned_by = ARRAY['it''s'], format = 'PARQUET') \
             AS SELECT \"order id\", \"it's\" FROM hive.raw.events"
        );
    }
}
