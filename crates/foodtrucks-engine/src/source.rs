//! Where raw permit rows come from.

use std::path::{Path, PathBuf};

use crate::error::EngineError;
use crate::mapper::RawRow;

/// Rows read from a source, plus how many rows could not be decoded at all.
#[derive(Debug, Clone, Default)]
pub struct SourceRows {
    pub rows: Vec<RawRow>,
    pub unreadable: usize,
}

impl From<Vec<RawRow>> for SourceRows {
    fn from(rows: Vec<RawRow>) -> Self {
        Self {
            rows,
            unreadable: 0,
        }
    }
}

/// A tabular snapshot of permit rows, re-read in full on every load.
pub trait RecordSource: Send + Sync {
    /// Human-readable identifier used in logs and errors.
    fn name(&self) -> String;

    /// Reads every row of the current source snapshot.
    ///
    /// A row that cannot be decoded is counted in
    /// [`SourceRows::unreadable`] and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SourceUnavailable`] if the source is missing or
    /// its structure cannot be read.
    fn read_rows(&self) -> Result<SourceRows, EngineError>;
}

/// Headered CSV file on local disk.
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn unavailable(&self, reason: impl std::fmt::Display) -> EngineError {
        EngineError::SourceUnavailable {
            source_name: self.name(),
            reason: reason.to_string(),
        }
    }
}

impl RecordSource for CsvFileSource {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn read_rows(&self) -> Result<SourceRows, EngineError> {
        if !self.path.is_file() {
            return Err(self.unavailable("file not found"));
        }

        // Ragged rows are tolerated here; the mapper drops the ones that
        // lack required fields.
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| self.unavailable(e))?;

        let headers = reader.headers().map_err(|e| self.unavailable(e))?.clone();
        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(self.unavailable("missing header row"));
        }

        let mut read = SourceRows::default();
        for (index, result) in reader.byte_records().enumerate() {
            let decoded = match result {
                Ok(bytes) => csv::StringRecord::from_byte_record(bytes).map_err(|e| e.to_string()),
                Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => {
                    return Err(self.unavailable(e));
                }
                Err(e) => Err(e.to_string()),
            };
            match decoded {
                Ok(record) => read.rows.push(
                    headers
                        .iter()
                        .zip(record.iter())
                        .map(|(name, value)| (name.to_string(), value.to_string()))
                        .collect(),
                ),
                Err(reason) => {
                    tracing::debug!(
                        path = %self.path.display(),
                        row = index + 1,
                        %reason,
                        "csv source: skipping unreadable row"
                    );
                    read.unreadable += 1;
                }
            }
        }

        tracing::debug!(
            path = %self.path.display(),
            rows = read.rows.len(),
            unreadable = read.unreadable,
            "csv source read"
        );
        Ok(read)
    }
}

/// Rows held in memory, optionally failing every read.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    rows: Vec<RawRow>,
    failure: Option<String>,
}

impl MemorySource {
    #[must_use]
    pub fn new(rows: Vec<RawRow>) -> Self {
        Self {
            rows,
            failure: None,
        }
    }

    /// A source whose every read fails with the given reason.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            rows: Vec::new(),
            failure: Some(reason.into()),
        }
    }
}

impl RecordSource for MemorySource {
    fn name(&self) -> String {
        "memory".to_string()
    }

    fn read_rows(&self) -> Result<SourceRows, EngineError> {
        match &self.failure {
            Some(reason) => Err(EngineError::SourceUnavailable {
                source_name: self.name(),
                reason: reason.clone(),
            }),
            None => Ok(self.rows.clone().into()),
        }
    }
}
