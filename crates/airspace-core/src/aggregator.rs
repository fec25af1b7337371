use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::distance::{haversine_miles, Coordinate, DistanceError};
use crate::order_type::{classify, OrderType, RouteType};
use crate::segments::{SegmentRow, END_LAT, END_LNG, START_LAT, START_LNG};
use crate::timezone::{localize, strip_quotes, TimezoneError};

const MILLIS_PER_MINUTE: f64 = 60_000.0;

#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("order {order_id}: missing {field}")]
    MissingCoordinate {
        order_id: String,
        field: &'static str,
    },
    #[error("order {order_id}: invalid coordinate: {source}")]
    InvalidCoordinate {
        order_id: String,
        #[source]
        source: DistanceError,
    },
    #[error("order {order_id}: {source}")]
    Timezone {
        order_id: String,
        #[source]
        source: TimezoneError,
    },
}

/// Order-level record derived from all segments sharing an `order_id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderSummary {
    pub order_id: String,
    pub company_id: Option<String>,
    pub origin_city: Option<String>,
    pub destination_city: Option<String>,
    /// `None` when the pickup instant or the start zone is missing.
    pub pick_up_time_local: Option<DateTime<Tz>>,
    /// `None` when the delivery instant or the end zone is missing.
    pub delivery_time: Option<DateTime<Tz>>,
    pub minutes_to_pickup: Option<f64>,
    pub order_type: OrderType,
    pub total_drive_distance: f64,
    pub total_distance: f64,
}

/// The segments of one order, in the row source's natural order.
///
/// A group always holds at least one row.
#[derive(Debug, Clone)]
pub struct OrderGroup<'a> {
    order_id: &'a str,
    rows: Vec<&'a SegmentRow>,
}

impl<'a> OrderGroup<'a> {
    pub fn order_id(&self) -> &'a str {
        self.order_id
    }

    pub fn rows(&self) -> &[&'a SegmentRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First row by natural order. Order-constant fields are read here.
    pub fn first(&self) -> &'a SegmentRow {
        self.rows[0]
    }

    /// Last row by natural order. Only the destination city is read here.
    pub fn last(&self) -> &'a SegmentRow {
        self.rows[self.rows.len() - 1]
    }

    pub fn route_types(&self) -> Vec<RouteType> {
        self.rows.iter().map(|row| row.route_kind()).collect()
    }

    /// Sum of driving miles; null and NaN cells count as zero.
    pub fn total_miles(&self) -> f64 {
        self.rows
            .iter()
            .filter_map(|row| row.miles)
            .filter(|miles| !miles.is_nan())
            .sum()
    }
}

/// Sort key for order ids: integer ids compare numerically and come before
/// any non-integer id, which compare as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum OrderKey<'a> {
    Numeric(i64, &'a str),
    Text(&'a str),
}

impl<'a> OrderKey<'a> {
    fn new(order_id: &'a str) -> Self {
        match order_id.parse::<i64>() {
            Ok(value) => OrderKey::Numeric(value, order_id),
            Err(_) => OrderKey::Text(order_id),
        }
    }

    fn order_id(self) -> &'a str {
        match self {
            OrderKey::Numeric(_, order_id) | OrderKey::Text(order_id) => order_id,
        }
    }
}

/// Partitions rows by `order_id`, yielding groups in ascending id order
/// (numeric ids numerically, so "9" precedes "10").
/// Rows without an `order_id` cannot be attributed to an order and are dropped.
pub fn group_by_order(rows: &[SegmentRow]) -> Vec<OrderGroup<'_>> {
    let mut groups: BTreeMap<OrderKey<'_>, Vec<&SegmentRow>> = BTreeMap::new();
    let mut orphaned = 0usize;

    for row in rows {
        match row.order_id.as_deref() {
            Some(order_id) => groups.entry(OrderKey::new(order_id)).or_default().push(row),
            None => orphaned += 1,
        }
    }

    if orphaned > 0 {
        warn!(rows = orphaned, "Dropped segments without an order_id");
    }

    groups
        .into_iter()
        .map(|(key, rows)| OrderGroup {
            order_id: key.order_id(),
            rows,
        })
        .collect()
}

pub fn summarize(group: &OrderGroup<'_>) -> Result<OrderSummary, AggregateError> {
    let order_id = group.order_id();
    let first = group.first();
    let last = group.last();

    let start = coordinate(order_id, (first.start_lat, START_LAT), (first.start_lng, START_LNG))?;
    let end = coordinate(order_id, (first.end_lat, END_LAT), (first.end_lng, END_LNG))?;

    let pick_up_time_local = localized(order_id, first.pick_up_time, first.start_time_zone.as_deref())?;
    let delivery_time = localized(order_id, first.delivery_time, first.end_time_zone.as_deref())?;

    let minutes_to_pickup = match (first.pick_up_time, first.create_time) {
        (Some(pick_up), Some(created)) => {
            Some((pick_up - created).num_milliseconds().abs() as f64 / MILLIS_PER_MINUTE)
        }
        _ => None,
    };

    let summary = OrderSummary {
        order_id: order_id.to_string(),
        company_id: first.company_id.clone(),
        origin_city: first.origin_city.clone(),
        destination_city: last.destination_city.clone(),
        pick_up_time_local,
        delivery_time,
        minutes_to_pickup,
        order_type: classify(&group.route_types()),
        total_drive_distance: group.total_miles(),
        total_distance: haversine_miles(start, end),
    };

    debug!(
        order_id,
        segments = group.len(),
        order_type = %summary.order_type,
        total_distance = summary.total_distance,
        "Summarized order"
    );

    Ok(summary)
}

/// Produces one summary per distinct `order_id`. Any fatal row problem
/// aborts the whole aggregation.
pub fn aggregate_orders(rows: &[SegmentRow]) -> Result<Vec<OrderSummary>, AggregateError> {
    let groups = group_by_order(rows);
    let summaries = groups
        .iter()
        .map(summarize)
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        segments = rows.len(),
        orders = summaries.len(),
        "Aggregated segments into orders"
    );

    Ok(summaries)
}

fn coordinate(
    order_id: &str,
    (lat, lat_field): (Option<f64>, &'static str),
    (lng, lng_field): (Option<f64>, &'static str),
) -> Result<Coordinate, AggregateError> {
    let lat = lat.ok_or_else(|| AggregateError::MissingCoordinate {
        order_id: order_id.to_string(),
        field: lat_field,
    })?;
    let lng = lng.ok_or_else(|| AggregateError::MissingCoordinate {
        order_id: order_id.to_string(),
        field: lng_field,
    })?;
    Coordinate::new(lat, lng).map_err(|source| AggregateError::InvalidCoordinate {
        order_id: order_id.to_string(),
        source,
    })
}

/// Localizes an instant, degrading to `None` when the instant or zone is
/// absent. A zone that is present but unknown is an error.
fn localized(
    order_id: &str,
    instant: Option<DateTime<Utc>>,
    raw_zone: Option<&str>,
) -> Result<Option<DateTime<Tz>>, AggregateError> {
    let (Some(instant), Some(raw_zone)) = (instant, raw_zone) else {
        return Ok(None);
    };
    if strip_quotes(raw_zone).is_empty() {
        return Ok(None);
    }
    localize(instant, raw_zone)
        .map(Some)
        .map_err(|source| AggregateError::Timezone {
            order_id: order_id.to_string(),
            source,
        })
}
