//! Normalization of the upstream address time zone vocabulary.
//!
//! Address records carry zone names in several shapes: IANA identifiers,
//! Rails-style display names and bare state abbreviations, usually wrapped in
//! an extra layer of quotes. Everything is folded into an IANA name that
//! `chrono-tz` can resolve.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use thiserror::Error;

pub const LOS_ANGELES: &str = "America/Los_Angeles";
pub const CHICAGO: &str = "America/Chicago";

/// Known aliases, keyed by the quote-stripped upstream value.
///
/// Indianapolis addresses are mislabelled upstream and actually sit in the
/// Chicago zone, so that identifier is remapped on purpose.
static ZONE_ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("Pacific Time (US & Canada)", LOS_ANGELES),
        ("CA", LOS_ANGELES),
        ("America/Indiana/Indianapolis", CHICAGO),
    ])
});

#[derive(Debug, Error)]
pub enum TimezoneError {
    #[error("unknown time zone {name:?} (raw value {raw:?})")]
    Unknown { raw: String, name: String },
}

/// Removes every `"` and `'` character and surrounding whitespace.
pub fn strip_quotes(raw: &str) -> String {
    raw.replace(['"', '\''], "").trim().to_string()
}

/// Maps a raw upstream zone string onto an IANA identifier. Never fails:
/// unrecognized values pass through with their quotes removed.
pub fn normalize_timezone(raw: &str) -> String {
    let cleaned = strip_quotes(raw);
    match ZONE_ALIASES.get(cleaned.as_str()) {
        Some(canonical) => (*canonical).to_string(),
        None => cleaned,
    }
}

pub fn resolve_timezone(raw: &str) -> Result<Tz, TimezoneError> {
    let name = normalize_timezone(raw);
    name.parse::<Tz>().map_err(|_| TimezoneError::Unknown {
        raw: raw.to_string(),
        name,
    })
}

/// Expresses a UTC instant in the zone named by `raw_zone`.
pub fn localize(instant: DateTime<Utc>, raw_zone: &str) -> Result<DateTime<Tz>, TimezoneError> {
    let tz = resolve_timezone(raw_zone)?;
    Ok(instant.with_timezone(&tz))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn pacific_aliases_map_to_los_angeles() {
        assert_eq!(normalize_timezone("\"Pacific Time (US & Canada)\""), LOS_ANGELES);
        assert_eq!(normalize_timezone("\"CA\""), LOS_ANGELES);
        assert_eq!(normalize_timezone("\"CA"), LOS_ANGELES);
    }

    #[test]
    fn indianapolis_is_remapped_to_chicago() {
        assert_eq!(normalize_timezone("\"America/Indiana/Indianapolis\""), CHICAGO);
    }

    #[test]
    fn unknown_zones_pass_through_without_quotes() {
        assert_eq!(normalize_timezone("\"America/Denver\""), "America/Denver");
        assert_eq!(normalize_timezone("'Europe/Berlin'"), "Europe/Berlin");
        assert_eq!(normalize_timezone("Not/AZone"), "Not/AZone");
    }

    #[test]
    fn resolve_rejects_unknown_names() {
        let err = resolve_timezone("\"Mars/Olympus_Mons\"").unwrap_err();
        assert!(err.to_string().contains("Mars/Olympus_Mons"));
    }

    #[test]
    fn localize_applies_zone_offset() {
        let instant = Utc.with_ymd_and_hms(2021, 6, 1, 15, 30, 0).unwrap();
        let local = localize(instant, "\"CA\"").unwrap();
        assert_eq!(local.to_rfc3339(), "2021-06-01T08:30:00-07:00");

        let chicago = localize(instant, "\"America/Indiana/Indianapolis\"").unwrap();
        assert_eq!(chicago.to_rfc3339(), "2021-06-01T10:30:00-05:00");
    }
}
