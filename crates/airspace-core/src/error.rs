// crates/airspace-core/src/error.rs

use thiserror::Error;

use crate::aggregator::AggregateError;
use crate::segments::SegmentError;
use crate::source::SourceError;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Row source failed: {0}")]
    Source(#[from] SourceError),

    #[error("Segment table rejected: {0}")]
    Segments(#[from] SegmentError),

    #[error("Order aggregation failed: {0}")]
    Aggregate(#[from] AggregateError),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Report delivery failed: {0}")]
    Delivery(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;
