use polars::prelude::DataFrame;
use tracing::info;

use crate::aggregator::aggregate_orders;
use crate::error::Result;
use crate::report::OrderReport;
use crate::segments::SegmentRow;
use crate::source::RowSource;

/// Turns a segment table into the sorted order report. Pure: no I/O.
pub fn build_report(segments: &DataFrame) -> Result<OrderReport> {
    let rows = SegmentRow::from_frame(segments)?;
    let summaries = aggregate_orders(&rows)?;
    Ok(OrderReport::assemble(summaries))
}

/// Fetches the segment table once and builds the report from it.
pub async fn run<S: RowSource>(source: &S) -> Result<OrderReport> {
    info!("Querying segment rows");
    let segments = source.fetch_segments().await?;
    let report = build_report(&segments)?;
    info!(orders = report.len(), "Built order report");
    Ok(report)
}
