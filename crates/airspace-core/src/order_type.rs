use std::fmt;

use serde::Serialize;

use crate::timezone::strip_quotes;

/// Kind of leg a route segment represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteType {
    Driving,
    Flying,
    /// Unrecognized or missing tag. Counts toward the segment total only.
    Other,
}

impl RouteType {
    /// Reads an upstream segment tag such as `"DrivingSegment"`.
    pub fn from_tag(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return RouteType::Other;
        };
        match strip_quotes(raw).to_ascii_lowercase().as_str() {
            "drivingsegment" | "driving" => RouteType::Driving,
            "flyingsegment" | "flying" => RouteType::Flying,
            _ => RouteType::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    /// A single driving leg.
    Drive,
    /// Balanced flying and driving legs.
    Hfpu,
    /// Anything else.
    Nfo,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Drive => "drive",
            OrderType::Hfpu => "hfpu",
            OrderType::Nfo => "nfo",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies an order from the ordered route types of its segments.
///
/// Equal counts classify as `Hfpu` even when both are zero.
pub fn classify(route_types: &[RouteType]) -> OrderType {
    if let [RouteType::Driving] = route_types {
        return OrderType::Drive;
    }

    let flying = route_types
        .iter()
        .filter(|kind| **kind == RouteType::Flying)
        .count();
    let driving = route_types
        .iter()
        .filter(|kind| **kind == RouteType::Driving)
        .count();

    if flying == driving {
        OrderType::Hfpu
    } else {
        OrderType::Nfo
    }
}
