use std::fs::File;
use std::io::{Cursor, Write};
use std::path::Path;

use chrono::{DateTime, SecondsFormat};
use chrono_tz::Tz;
use comfy_table::{presets::UTF8_FULL, Table};
use polars::io::parquet::write::{ParquetCompression, ParquetWriter, StatisticsOptions};
use polars::prelude::*;
use tracing::info;

use crate::aggregator::OrderSummary;
use crate::config::ReportDestination;
use crate::error::{ReportError, Result};

const REPORT_COLUMNS: [&str; 10] = [
    "order_id",
    "company_id",
    "origin_city",
    "destination_city",
    "pick_up_time_local",
    "delivery_time",
    "minutes_to_pickup",
    "order_type",
    "total_drive_distance",
    "total_distance",
];

/// Order summaries sorted ascending by geodesic distance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderReport {
    summaries: Vec<OrderSummary>,
}

impl OrderReport {
    /// Orders summaries by `total_distance`. The sort is stable, so ties keep
    /// their aggregation order.
    pub fn assemble(mut summaries: Vec<OrderSummary>) -> Self {
        summaries.sort_by(|a, b| a.total_distance.total_cmp(&b.total_distance));
        Self { summaries }
    }

    pub fn summaries(&self) -> &[OrderSummary] {
        &self.summaries
    }

    pub fn into_summaries(self) -> Vec<OrderSummary> {
        self.summaries
    }

    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }

    /// Zoned timestamps become RFC 3339 strings since each row has its own zone.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let rows = &self.summaries;
        df![
            "order_id" => rows.iter().map(|s| s.order_id.as_str()).collect::<Vec<_>>(),
            "company_id" => rows.iter().map(|s| s.company_id.as_deref()).collect::<Vec<_>>(),
            "origin_city" => rows.iter().map(|s| s.origin_city.as_deref()).collect::<Vec<_>>(),
            "destination_city" => rows.iter().map(|s| s.destination_city.as_deref()).collect::<Vec<_>>(),
            "pick_up_time_local" => rows.iter().map(|s| s.pick_up_time_local.map(format_zoned)).collect::<Vec<_>>(),
            "delivery_time" => rows.iter().map(|s| s.delivery_time.map(format_zoned)).collect::<Vec<_>>(),
            "minutes_to_pickup" => rows.iter().map(|s| s.minutes_to_pickup).collect::<Vec<_>>(),
            "order_type" => rows.iter().map(|s| s.order_type.as_str()).collect::<Vec<_>>(),
            "total_drive_distance" => rows.iter().map(|s| s.total_drive_distance).collect::<Vec<_>>(),
            "total_distance" => rows.iter().map(|s| s.total_distance).collect::<Vec<_>>(),
        ]
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.summaries)
    }

    pub fn render_table(&self) -> String {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL).set_header(REPORT_COLUMNS);

        for s in &self.summaries {
            table.add_row(vec![
                s.order_id.clone(),
                display_opt(s.company_id.as_deref()),
                display_opt(s.origin_city.as_deref()),
                display_opt(s.destination_city.as_deref()),
                s.pick_up_time_local.map(format_zoned).unwrap_or_else(null_marker),
                s.delivery_time.map(format_zoned).unwrap_or_else(null_marker),
                s.minutes_to_pickup
                    .map(|m| format!("{m:.1}"))
                    .unwrap_or_else(null_marker),
                s.order_type.to_string(),
                format!("{:.2}", s.total_drive_distance),
                format!("{:.2}", s.total_distance),
            ]);
        }

        table.to_string()
    }

    /// Hands the report to its configured destination.
    pub fn deliver(&self, destination: &ReportDestination) -> Result<()> {
        match destination {
            ReportDestination::Discard => {}
            ReportDestination::Stdout => println!("{}", self.render_table()),
            ReportDestination::Json { path } => {
                let mut file = create(path)?;
                serde_json::to_writer_pretty(&mut file, &self.summaries)?;
            }
            ReportDestination::Csv { path } => {
                let mut df = self.to_dataframe()?;
                let mut file = create(path)?;
                CsvWriter::new(&mut file).include_header(true).finish(&mut df)?;
            }
            ReportDestination::Parquet { path } => {
                let bytes = self.to_parquet_bytes()?;
                create(path)?.write_all(&bytes)?;
            }
        }

        info!(
            orders = self.len(),
            destination = destination.describe(),
            "Delivered order report"
        );
        Ok(())
    }

    pub fn to_parquet_bytes(&self) -> Result<Vec<u8>> {
        let mut df = self.to_dataframe()?;
        let mut buffer = Vec::new();
        {
            let mut cursor = Cursor::new(&mut buffer);
            ParquetWriter::new(&mut cursor)
                .with_compression(ParquetCompression::Zstd(None))
                .with_statistics(StatisticsOptions::default())
                .finish(&mut df)?;
        }
        Ok(buffer)
    }
}

fn create(path: &Path) -> Result<File> {
    File::create(path)
        .map_err(|err| ReportError::Delivery(format!("cannot create {}: {err}", path.display())))
}

fn format_zoned(value: DateTime<Tz>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, false)
}

fn display_opt(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

fn null_marker() -> String {
    "NaT".to_string()
}
