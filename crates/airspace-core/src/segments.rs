use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use polars::prelude::*;
use thiserror::Error;

use crate::order_type::RouteType;

pub const ORDER_ID: &str = "order_id";
pub const COMPANY_ID: &str = "company_id";
pub const ORIGIN_CITY: &str = "origin_city";
pub const DESTINATION_CITY: &str = "destination_city";
pub const PICK_UP_TIME: &str = "pick_up_time_local";
pub const DELIVERY_TIME: &str = "delivery_time";
pub const CREATE_TIME: &str = "create_time";
pub const START_TIME_ZONE: &str = "start_time_zone";
pub const END_TIME_ZONE: &str = "end_time_zone";
pub const ROUTE_TYPE: &str = "route_type";
pub const MILES: &str = "miles";
pub const START_LAT: &str = "start_lat";
pub const START_LNG: &str = "start_lng";
pub const END_LAT: &str = "end_lat";
pub const END_LNG: &str = "end_lng";

/// Columns every row source must provide.
pub const SEGMENT_COLUMNS: [&str; 15] = [
    ORDER_ID,
    COMPANY_ID,
    ORIGIN_CITY,
    DESTINATION_CITY,
    PICK_UP_TIME,
    DELIVERY_TIME,
    CREATE_TIME,
    START_TIME_ZONE,
    END_TIME_ZONE,
    ROUTE_TYPE,
    MILES,
    START_LAT,
    START_LNG,
    END_LAT,
    END_LNG,
];

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];
const OFFSET_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M:%S%.f%#z",
];

#[derive(Debug, Error)]
pub enum SegmentError {
    #[error("segment table is missing column {0}")]
    MissingColumn(&'static str),
    #[error("column {column} row {row}: cannot parse timestamp {value:?}")]
    InvalidTimestamp {
        column: &'static str,
        row: usize,
        value: String,
    },
    #[error("column {column} is not numeric: {source}")]
    InvalidNumber {
        column: &'static str,
        #[source]
        source: PolarsError,
    },
    #[error("polars operation failed: {0}")]
    Polars(#[from] PolarsError),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("cannot parse timestamp {0:?}")]
pub struct TimestampParseError(pub String);

/// One route leg joined with its order, address and search context.
///
/// Timestamps are UTC instants; time zones stay raw until localization.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SegmentRow {
    pub order_id: Option<String>,
    pub company_id: Option<String>,
    pub origin_city: Option<String>,
    pub destination_city: Option<String>,
    pub pick_up_time: Option<DateTime<Utc>>,
    pub delivery_time: Option<DateTime<Utc>>,
    pub create_time: Option<DateTime<Utc>>,
    pub start_time_zone: Option<String>,
    pub end_time_zone: Option<String>,
    pub route_type: Option<String>,
    pub miles: Option<f64>,
    pub start_lat: Option<f64>,
    pub start_lng: Option<f64>,
    pub end_lat: Option<f64>,
    pub end_lng: Option<f64>,
}

impl SegmentRow {
    pub fn route_kind(&self) -> RouteType {
        RouteType::from_tag(self.route_type.as_deref())
    }

    /// Decodes a row-source frame. Identifier and text columns are cast to
    /// strings, numeric columns are cast strictly so that malformed cells fail
    /// the whole table, and timestamp columns are quote-stripped and parsed.
    pub fn from_frame(df: &DataFrame) -> Result<Vec<SegmentRow>, SegmentError> {
        for name in SEGMENT_COLUMNS {
            if df.column(name).is_err() {
                return Err(SegmentError::MissingColumn(name));
            }
        }

        let order_ids = string_values(df, ORDER_ID)?;
        let company_ids = string_values(df, COMPANY_ID)?;
        let origin_cities = string_values(df, ORIGIN_CITY)?;
        let destination_cities = string_values(df, DESTINATION_CITY)?;
        let pick_up_times = timestamp_values(df, PICK_UP_TIME)?;
        let delivery_times = timestamp_values(df, DELIVERY_TIME)?;
        let create_times = timestamp_values(df, CREATE_TIME)?;
        let start_zones = string_values(df, START_TIME_ZONE)?;
        let end_zones = string_values(df, END_TIME_ZONE)?;
        let route_types = string_values(df, ROUTE_TYPE)?;
        let miles = float_values(df, MILES)?;
        let start_lats = float_values(df, START_LAT)?;
        let start_lngs = float_values(df, START_LNG)?;
        let end_lats = float_values(df, END_LAT)?;
        let end_lngs = float_values(df, END_LNG)?;

        let rows = (0..df.height())
            .map(|idx| SegmentRow {
                order_id: order_ids[idx].clone(),
                company_id: company_ids[idx].clone(),
                origin_city: origin_cities[idx].clone(),
                destination_city: destination_cities[idx].clone(),
                pick_up_time: pick_up_times[idx],
                delivery_time: delivery_times[idx],
                create_time: create_times[idx],
                start_time_zone: start_zones[idx].clone(),
                end_time_zone: end_zones[idx].clone(),
                route_type: route_types[idx].clone(),
                miles: miles[idx],
                start_lat: start_lats[idx],
                start_lng: start_lngs[idx],
                end_lat: end_lats[idx],
                end_lng: end_lngs[idx],
            })
            .collect();

        Ok(rows)
    }
}

/// Parses an upstream timestamp after removing its quote characters.
///
/// Returns `Ok(None)` for values that are empty once unquoted. Values without
/// an explicit offset are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Result<Option<DateTime<Utc>>, TimestampParseError> {
    let cleaned = raw.replace('"', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Ok(None);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(cleaned) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(cleaned, format) {
            return Ok(Some(dt.with_timezone(&Utc)));
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(cleaned, format) {
            return Ok(Some(naive.and_utc()));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(cleaned, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(Some(naive.and_utc()));
        }
    }

    Err(TimestampParseError(raw.to_string()))
}

fn string_values(df: &DataFrame, name: &'static str) -> Result<Vec<Option<String>>, SegmentError> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

fn float_values(df: &DataFrame, name: &'static str) -> Result<Vec<Option<f64>>, SegmentError> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .strict_cast(&DataType::Float64)
        .map_err(|source| SegmentError::InvalidNumber {
            column: name,
            source,
        })?;
    Ok(series.f64()?.into_iter().collect())
}

fn timestamp_values(
    df: &DataFrame,
    name: &'static str,
) -> Result<Vec<Option<DateTime<Utc>>>, SegmentError> {
    string_values(df, name)?
        .into_iter()
        .enumerate()
        .map(|(row, value)| match value {
            None => Ok(None),
            Some(raw) => parse_timestamp(&raw).map_err(|_| SegmentError::InvalidTimestamp {
                column: name,
                row,
                value: raw,
            }),
        })
        .collect()
}
