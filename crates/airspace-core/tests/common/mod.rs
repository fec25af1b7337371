#![allow(dead_code)]

use polars::prelude::*;

/// One segment row as the upstream query delivers it, quotes included.
#[derive(Debug, Clone)]
pub struct Leg {
    pub order_id: Option<&'static str>,
    pub company_id: Option<&'static str>,
    pub origin_city: Option<&'static str>,
    pub destination_city: Option<&'static str>,
    pub pick_up_time: Option<&'static str>,
    pub delivery_time: Option<&'static str>,
    pub create_time: Option<&'static str>,
    pub start_time_zone: Option<&'static str>,
    pub end_time_zone: Option<&'static str>,
    pub route_type: Option<&'static str>,
    pub miles: Option<f64>,
    pub start: (Option<f64>, Option<f64>),
    pub end: (Option<f64>, Option<f64>),
}

pub const LOS_ANGELES: (f64, f64) = (34.0522, -118.2437);
pub const SAN_FRANCISCO: (f64, f64) = (37.7749, -122.4194);
pub const SAN_DIEGO: (f64, f64) = (32.7157, -117.1611);
pub const CHICAGO: (f64, f64) = (41.8781, -87.6298);
pub const INDIANAPOLIS: (f64, f64) = (39.7684, -86.1581);

impl Leg {
    /// A driving leg from Los Angeles to San Francisco with every field set.
    pub fn driving(order_id: &'static str) -> Self {
        Self {
            order_id: Some(order_id),
            company_id: Some("company-1"),
            origin_city: Some("Los Angeles"),
            destination_city: Some("San Francisco"),
            pick_up_time: Some("\"2021-06-01 15:30:00\""),
            delivery_time: Some("\"2021-06-01 22:00:00\""),
            create_time: Some("\"2021-06-01 14:00:00\""),
            start_time_zone: Some("\"Pacific Time (US & Canada)\""),
            end_time_zone: Some("\"America/Los_Angeles\""),
            route_type: Some("\"DrivingSegment\""),
            miles: Some(10.0),
            start: (Some(LOS_ANGELES.0), Some(LOS_ANGELES.1)),
            end: (Some(SAN_FRANCISCO.0), Some(SAN_FRANCISCO.1)),
        }
    }

    pub fn flying(order_id: &'static str) -> Self {
        Self {
            route_type: Some("\"FlyingSegment\""),
            miles: None,
            ..Self::driving(order_id)
        }
    }

    pub fn between(mut self, start: (f64, f64), end: (f64, f64)) -> Self {
        self.start = (Some(start.0), Some(start.1));
        self.end = (Some(end.0), Some(end.1));
        self
    }

    pub fn miles(mut self, miles: Option<f64>) -> Self {
        self.miles = miles;
        self
    }
}

fn text(legs: &[Leg], f: fn(&Leg) -> Option<&'static str>) -> Vec<Option<&'static str>> {
    legs.iter().map(f).collect()
}

fn float(legs: &[Leg], f: fn(&Leg) -> Option<f64>) -> Vec<Option<f64>> {
    legs.iter().map(f).collect()
}

pub fn segment_frame(legs: &[Leg]) -> DataFrame {
    df![
        "order_id" => text(legs, |l| l.order_id),
        "company_id" => text(legs, |l| l.company_id),
        "origin_city" => text(legs, |l| l.origin_city),
        "destination_city" => text(legs, |l| l.destination_city),
        "pick_up_time_local" => text(legs, |l| l.pick_up_time),
        "delivery_time" => text(legs, |l| l.delivery_time),
        "create_time" => text(legs, |l| l.create_time),
        "start_time_zone" => text(legs, |l| l.start_time_zone),
        "end_time_zone" => text(legs, |l| l.end_time_zone),
        "route_type" => text(legs, |l| l.route_type),
        "miles" => float(legs, |l| l.miles),
        "start_lat" => float(legs, |l| l.start.0),
        "start_lng" => float(legs, |l| l.start.1),
        "end_lat" => float(legs, |l| l.end.0),
        "end_lng" => float(legs, |l| l.end.1),
    ]
    .expect("segment frame")
}
