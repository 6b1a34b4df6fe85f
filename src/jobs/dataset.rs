use anyhow::{Context, Result};
use csv::StringRecord;
use std::path::Path;

/// One data row of a job list, with its 1-based line number in the file
#[derive(Debug, Clone)]
pub struct JobRow {
    pub line: u64,
    pub record: StringRecord,
}

/// A job list CSV held in memory: header row plus data rows
#[derive(Debug, Clone)]
pub struct JobDataset {
    /// Trimmed header names, used for lookups
    pub headers: StringRecord,
    /// Header row exactly as it appears in the file
    pub raw_headers: StringRecord,
    pub rows: Vec<JobRow>,
}

impl JobDataset {
    /// Read a CSV file with a header row
    pub async fn read(path: &Path) -> Result<Self> {
        let buffer = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read job list {}", path.display()))?;
        Self::from_bytes(&buffer)
    }

    pub fn from_bytes(buffer: &[u8]) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(buffer);

        let raw_headers = csv_reader
            .headers()
            .context("Failed to parse CSV header row")?
            .clone();
        let headers = raw_headers.iter().map(str::trim).collect::<StringRecord>();

        if headers.is_empty() {
            anyhow::bail!("Job list has no header row");
        }

        let mut rows = Vec::new();
        for result in csv_reader.records() {
            let record = result.context("Failed to parse CSV record")?;
            if record.iter().all(|field| field.trim().is_empty()) {
                continue;
            }
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            rows.push(JobRow { line, record });
        }

        Ok(Self {
            headers,
            raw_headers,
            rows,
        })
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Value of a named column in a row, trimmed (empty when absent)
    pub fn field<'a>(&self, row: &'a JobRow, name: &str) -> &'a str {
        self.column_index(name)
            .and_then(|idx| row.record.get(idx))
            .map(str::trim)
            .unwrap_or_default()
    }
}

/// Builds an output CSV that clones input rows and fills one extra column
pub struct DatasetWriter {
    headers: StringRecord,
    target_idx: usize,
    rows: Vec<StringRecord>,
}

impl DatasetWriter {
    /// Use the input headers verbatim, appending `column` unless a header
    /// with that name (ignoring surrounding whitespace) is already present
    pub fn new(input_headers: &StringRecord, column: &str) -> Self {
        let mut headers = input_headers.clone();
        let target_idx = match headers.iter().position(|h| h.trim() == column) {
            Some(idx) => idx,
            None => {
                headers.push_field(column);
                headers.len() - 1
            }
        };

        Self {
            headers,
            target_idx,
            rows: Vec::new(),
        }
    }

    /// Clone `source` into a new output row with `value` in the extra column
    pub fn push(&mut self, source: &StringRecord, value: &str) {
        let row = (0..self.headers.len())
            .map(|idx| {
                if idx == self.target_idx {
                    value
                } else {
                    source.get(idx).unwrap_or_default()
                }
            })
            .collect::<StringRecord>();
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut csv_writer = csv::Writer::from_writer(Vec::new());
        csv_writer
            .write_record(&self.headers)
            .context("Failed to write CSV header")?;
        for row in &self.rows {
            csv_writer
                .write_record(row)
                .context("Failed to write CSV record")?;
        }
        csv_writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush CSV output: {}", e))
    }

    pub async fn write(&self, path: &Path) -> Result<()> {
        let bytes = self.to_bytes()?;
        tokio::fs::write(path, bytes)
            .await
            .with_context(|| format!("Failed to write output {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_dataset() {
        let data = b"type,Source Catalog , note\nCTAS,hive,x\n,,\nIIS,iceberg\n";
        let dataset = JobDataset::from_bytes(data).unwrap();

        assert_eq!(dataset.headers.len(), 3);
        assert_eq!(dataset.column_index("Source Catalog"), Some(1));
        // Blank row skipped, short row kept
        assert_eq!(dataset.rows.len(), 2);
        assert_eq!(dataset.rows[0].line, 2);
        assert_eq!(dataset.rows[1].line, 4);
        assert_eq!(dataset.field(&dataset.rows[1], "Source Catalog"), "iceberg");
        assert_eq!(dataset.field(&dataset.rows[1], "note"), "");
        assert_eq!(dataset.field(&dataset.rows[0], "missing"), "");
    }

    #[test]
    fn test_empty_file_rejected() {
        assert!(JobDataset::from_bytes(b"").is_err());
    }

    #[test]
    fn test_writer_appends_column() {
        let headers = StringRecord::from(vec!["a", "b"]);
        let mut writer = DatasetWriter::new(&headers, "Generated CTAS Query");
        writer.push(&StringRecord::from(vec!["1", "2"]), "SELECT 1");
        writer.push(&StringRecord::from(vec!["3"]), "SELECT 'x, y'");

        let output = String::from_utf8(writer.to_bytes().unwrap()).unwrap();
        assert_eq!(
            output,
            "a,b,Generated CTAS Query\n1,2,SELECT 1\n3,,\"SELECT 'x, y'\"\n"
        );
        assert_eq!(writer.len(), 2);
    }

    #[test]
    fn test_writer_overwrites_existing_column() {
        let headers = StringRecord::from(vec!["Generated CTAS Query", "b"]);
        let mut writer = DatasetWriter::new(&headers, "Generated CTAS Query");
        writer.push(&StringRecord::from(vec!["old", "2"]), "new");

        let output = String::from_utf8(writer.to_bytes().unwrap()).unwrap();
        assert_eq!(output, "Generated CTAS Query,b\nnew,2\n");
    }

    #[test]
    fn test_writer_keeps_original_header_text() {
        let dataset =
            JobDataset::from_bytes(b" type ,Source Catalog , Generated CTAS Query\nCTAS,hive,old\n")
                .unwrap();
        assert_eq!(dataset.column_index("Source Catalog"), Some(1));

        let mut writer = DatasetWriter::new(&dataset.raw_headers, "Generated CTAS Query");
        writer.push(&dataset.rows[0].record, "new");

        let output = String::from_utf8(writer.to_bytes().unwrap()).unwrap();
        assert_eq!(
            output,
            " type ,Source Catalog , Generated CTAS Query\nCTAS,hive,new\n"
        );
    }
}
