use std::future::Future;
use std::path::{Path, PathBuf};

use polars::prelude::*;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("segment file {0} does not exist")]
    NotFound(PathBuf),
    #[error("polars operation failed: {0}")]
    Polars(#[from] PolarsError),
    #[cfg(feature = "runtime")]
    #[error("segment query failed: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Supplies the joined segment table, one row per route leg.
///
/// Implementations make a single fetch with no retry; the pipeline treats a
/// failure as fatal.
pub trait RowSource {
    fn fetch_segments(&self) -> impl Future<Output = Result<DataFrame, SourceError>>;
}

/// A table that is already in memory.
#[derive(Debug, Clone)]
pub struct FrameSource {
    frame: DataFrame,
}

impl FrameSource {
    pub fn new(frame: DataFrame) -> Self {
        Self { frame }
    }
}

impl RowSource for FrameSource {
    async fn fetch_segments(&self) -> Result<DataFrame, SourceError> {
        Ok(self.frame.clone())
    }
}

/// Reads a CSV export of the segment query. Every column is read as text so
/// quoted timestamps and zone names survive untouched; numeric columns are
/// cast later when the rows are decoded.
#[derive(Debug, Clone)]
pub struct CsvRowSource {
    path: PathBuf,
}

impl CsvRowSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> Result<DataFrame, SourceError> {
        if !self.path.exists() {
            return Err(SourceError::NotFound(self.path.clone()));
        }

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .try_into_reader_with_file_path(Some(self.path.clone()))?
            .finish()?;

        info!(
            path = %self.path.display(),
            rows = df.height(),
            "Loaded segment CSV"
        );
        Ok(df)
    }
}

impl RowSource for CsvRowSource {
    async fn fetch_segments(&self) -> Result<DataFrame, SourceError> {
        self.read()
    }
}
