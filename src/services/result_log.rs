//! Test-case result sink
//!
//! Rows go to one CSV file per worksheet under the workbook directory. When a
//! row cannot be written there it is appended to a JSON backup file instead.

use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::ReportConfig;
use crate::errors::SuiteError;

pub const HEADER: [&str; 7] = [
    "Test Case ID",
    "Description",
    "Input Data",
    "Expected Result",
    "Actual Result",
    "Status",
    "Timestamp",
];

const TIMESTAMP_FORMAT: &str = "%H:%M:%S, %d-%m-%Y";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowStatus {
    Passed,
    Failed,
}

impl RowStatus {
    pub fn from_passed(passed: bool) -> Self {
        if passed {
            RowStatus::Passed
        } else {
            RowStatus::Failed
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            RowStatus::Passed => "Passed",
            RowStatus::Failed => "Failed",
        }
    }
}

/// One test-case row. Input, expected and actual are stored as JSON text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub id: String,
    pub description: String,
    pub input: Value,
    pub expected: Value,
    pub actual: Value,
    pub status: RowStatus,
}

impl ResultRow {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            input: Value::Null,
            expected: Value::Null,
            actual: Value::Null,
            status: RowStatus::Failed,
        }
    }

    pub fn input(mut self, input: impl Into<Value>) -> Self {
        self.input = input.into();
        self
    }

    pub fn expected(mut self, expected: impl Into<Value>) -> Self {
        self.expected = expected.into();
        self
    }

    /// Record the observed value; the row passes when it equals `expected`.
    pub fn actual(mut self, actual: impl Into<Value>) -> Self {
        self.actual = actual.into();
        self.status = RowStatus::from_passed(self.actual == self.expected);
        self
    }

    pub fn status(mut self, status: RowStatus) -> Self {
        self.status = status;
        self
    }

    fn cells(&self, timestamp: &str) -> [String; 7] {
        [
            self.id.clone(),
            self.description.clone(),
            self.input.to_string(),
            self.expected.to_string(),
            self.actual.to_string(),
            self.status.as_str().to_string(),
            timestamp.to_string(),
        ]
    }
}

/// Where a row ended up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RowSink {
    Sheet(PathBuf),
    Backup(PathBuf),
}

#[derive(Debug, Serialize, Deserialize)]
struct BackupEntry {
    sheet: String,
    #[serde(flatten)]
    row: ResultRow,
    timestamp: String,
}

pub struct ResultLog {
    workbook: PathBuf,
    backup: PathBuf,
    // Serialises appends so header detection and the backup rewrite do not race.
    lock: Mutex<()>,
}

impl ResultLog {
    pub fn new(workbook: impl Into<PathBuf>, backup: impl Into<PathBuf>) -> Self {
        Self {
            workbook: workbook.into(),
            backup: backup.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn from_config(report: &ReportConfig) -> Self {
        Self::new(report.workbook_dir(), report.backup_path())
    }

    pub fn sheet_path(&self, sheet: &str) -> PathBuf {
        self.workbook.join(format!("{}.csv", sheet_file_name(sheet)))
    }

    pub async fn append(&self, sheet: &str, row: &ResultRow) -> Result<RowSink, SuiteError> {
        let _guard = self.lock.lock().await;
        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        let path = self.sheet_path(sheet);

        match write_sheet_row(&path, &row.cells(&timestamp)).await {
            Ok(()) => {
                info!(sheet, id = %row.id, status = row.status.as_str(), "result row written");
                Ok(RowSink::Sheet(path))
            }
            Err(err) => {
                warn!(sheet, id = %row.id, error = %err, "sheet write failed; using backup");
                self.append_backup(sheet, row, timestamp).await?;
                Ok(RowSink::Backup(self.backup.clone()))
            }
        }
    }

    async fn append_backup(
        &self,
        sheet: &str,
        row: &ResultRow,
        timestamp: String,
    ) -> Result<(), SuiteError> {
        let mut entries: Vec<BackupEntry> = match tokio::fs::read_to_string(&self.backup).await {
            Ok(content) if !content.trim().is_empty() => serde_json::from_str(&content)
                .map_err(|err| SuiteError::Report(format!("corrupt backup file: {}", err)))?,
            _ => Vec::new(),
        };
        entries.push(BackupEntry {
            sheet: sheet.to_string(),
            row: row.clone(),
            timestamp,
        });
        let json = serde_json::to_string_pretty(&entries)
            .map_err(|err| SuiteError::Report(err.to_string()))?;
        write_atomic(&self.backup, json.as_bytes())
            .await
            .map_err(|err| SuiteError::Report(format!("backup write failed: {}", err)))
    }
}

async fn write_sheet_row(path: &Path, cells: &[String; 7]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let is_new = !tokio::fs::try_exists(path).await.unwrap_or(false);

    let mut writer = csv::Writer::from_writer(Vec::new());
    if is_new {
        writer.write_record(HEADER)?;
    }
    writer.write_record(cells)?;
    let bytes = writer
        .into_inner()
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err.to_string()))?;

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(&bytes).await?;
    file.flush().await
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await
}

fn sheet_file_name(sheet: &str) -> String {
    sheet
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn header_is_written_once_per_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let log = ResultLog::new(dir.path().join("book"), dir.path().join("backup.json"));

        let row = ResultRow::new("TC_SUP_01", "support name accepts 255 chars")
            .input(json!({"field": "firstName", "length": 255}))
            .expected("accepted")
            .actual("accepted");
        assert_eq!(row.status, RowStatus::Passed);

        log.append("Support", &row).await.unwrap();
        let sink = log
            .append("Support", &row.clone().actual("rejected"))
            .await
            .unwrap();
        assert_eq!(sink, RowSink::Sheet(log.sheet_path("Support")));

        let mut reader = csv::Reader::from_path(log.sheet_path("Support")).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), HEADER.to_vec());
        let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][2], r#"{"field":"firstName","length":255}"#);
        assert_eq!(&rows[0][3], r#""accepted""#);
        assert_eq!(&rows[1][5], "Failed");
    }

    #[tokio::test]
    async fn unwritable_sheet_falls_back_to_backup() {
        let dir = tempfile::tempdir().unwrap();
        // A plain file where the workbook directory should be.
        let blocker = dir.path().join("book");
        std::fs::write(&blocker, b"not a dir").unwrap();
        let backup = dir.path().join("backup.json");
        let log = ResultLog::new(&blocker, &backup);

        let row = ResultRow::new("TC_CART_02", "remove item").expected(0).actual(0);
        assert_eq!(
            log.append("Cart", &row).await.unwrap(),
            RowSink::Backup(backup.clone())
        );
        log.append("Cart", &row).await.unwrap();

        let entries: Vec<Value> =
            serde_json::from_str(&std::fs::read_to_string(&backup).unwrap()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["sheet"], "Cart");
        assert_eq!(entries[0]["id"], "TC_CART_02");
    }

    #[test]
    fn timestamp_layout() {
        let stamp = chrono::NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(7, 5, 1)
            .unwrap()
            .format(TIMESTAMP_FORMAT)
            .to_string();
        assert_eq!(stamp, "07:05:01, 09-03-2024");
    }
}
