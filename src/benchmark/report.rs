use fs_extra::dir::create_all;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

use crate::error::Result;

/// Outcome of one backend run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub backend: &'static str,
    /// Records generated for the run.
    pub records: usize,
    pub inserted: usize,
    pub failed_inserts: usize,
    pub insert_time: Option<Duration>,
    pub query_time: Option<Duration>,
    /// Records materialized by the query.
    pub returned: usize,
    pub error: Option<String>,
}

impl RunReport {
    pub fn new(backend: &'static str) -> Self {
        RunReport {
            backend,
            records: 0,
            inserted: 0,
            failed_inserts: 0,
            insert_time: None,
            query_time: None,
            returned: 0,
            error: None,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }

    pub fn summary_line(&self) -> String {
        match &self.error {
            None => format!(
                "{}: inserted {}/{} in {}, query returned {} in {}",
                self.backend,
                self.inserted,
                self.records,
                format_duration(self.insert_time),
                self.returned,
                format_duration(self.query_time),
            ),
            Some(error) => format!("{}: failed ({})", self.backend, error),
        }
    }
}

fn millis(duration: Duration) -> f64 {
    duration.as_micros() as f64 / 1000.0
}

pub fn format_millis(duration: Duration) -> String {
    format!("{:.3}ms", millis(duration))
}

fn format_duration(duration: Option<Duration>) -> String {
    duration.map(format_millis).unwrap_or_else(|| "-".to_string())
}

#[derive(Serialize)]
struct CsvRow<'a> {
    backend: &'a str,
    records: usize,
    inserted: usize,
    failed_inserts: usize,
    insert_ms: Option<f64>,
    query_ms: Option<f64>,
    returned: usize,
    error: Option<&'a str>,
}

impl<'a> From<&'a RunReport> for CsvRow<'a> {
    fn from(report: &'a RunReport) -> Self {
        CsvRow {
            backend: report.backend,
            records: report.records,
            inserted: report.inserted,
            failed_inserts: report.failed_inserts,
            insert_ms: report.insert_time.map(millis),
            query_ms: report.query_time.map(millis),
            returned: report.returned,
            error: report.error.as_deref(),
        }
    }
}

/// Write one CSV row per report, creating the parent directory if needed.
pub fn write_csv(path: &Path, reports: &[RunReport]) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            create_all(dir, false)?;
        }
    }

    let mut writer = csv::Writer::from_path(path)?;
    for report in reports {
        writer.serialize(CsvRow::from(report))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finished() -> RunReport {
        RunReport {
            records: 10,
            inserted: 10,
            insert_time: Some(Duration::from_micros(1_500)),
            query_time: Some(Duration::from_millis(2)),
            returned: 3,
            ..RunReport::new("MongoDB")
        }
    }

    #[test]
    fn formats_millis_like_console_timers() {
        assert_eq!(format_millis(Duration::from_micros(1_234_567)), "1234.567ms");
        assert_eq!(format_millis(Duration::ZERO), "0.000ms");
    }

    #[test]
    fn summary_reports_counts_or_error() {
        assert_eq!(
            finished().summary_line(),
            "MongoDB: inserted 10/10 in 1.500ms, query returned 3 in 2.000ms"
        );

        let failed = RunReport {
            error: Some("connection refused".to_string()),
            ..RunReport::new("DianaDB")
        };
        assert!(!failed.succeeded());
        assert_eq!(failed.summary_line(), "DianaDB: failed (connection refused)");
    }

    #[test]
    fn writes_one_row_per_backend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results").join("run.csv");
        let failed = RunReport {
            error: Some("boom".to_string()),
            ..RunReport::new("PostgreSQL")
        };

        write_csv(&path, &[finished(), failed]).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[0], "backend");
        assert_eq!(&headers[7], "error");

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "MongoDB");
        assert_eq!(&rows[0][4], "1.5");
        assert_eq!(&rows[1][0], "PostgreSQL");
        assert_eq!(&rows[1][4], "");
        assert_eq!(&rows[1][7], "boom");
    }
}
