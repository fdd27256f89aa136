//! Date recognition for text cells.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::ontology::TemporalCoverage;

/// Date-only layouts, tried in order. US month-first wins over day-first
/// when a value is ambiguous.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d/%m/%Y", "%m-%d-%Y", "%d-%m-%Y", "%d.%m.%Y",
    "%d %b %Y", "%d %B %Y", "%b %d, %Y", "%B %d, %Y", "%b %d %Y", "%B %d %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M",
];

/// Parse a text cell as a calendar date.
///
/// Accepts RFC 3339 timestamps, common date and datetime layouts, and
/// month-only forms (`2024-03`, `Mar 2024`) which resolve to the first day.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.len() < 6 || !s.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    // Month granularity
    for (fmt, padded) in [
        ("%Y-%m-%d", format!("{}-01", s)),
        ("%Y/%m/%d", format!("{}/01", s)),
        ("%d %b %Y", format!("01 {}", s)),
        ("%d %B %Y", format!("01 {}", s)),
    ] {
        if let Ok(d) = NaiveDate::parse_from_str(&padded, fmt) {
            return Some(d);
        }
    }
    None
}

/// Classify a set of dates against `reference` with a `margin_days` window.
///
/// Dates reaching past `reference + margin` make the set future-looking
/// (mixed when it also starts before the reference); otherwise dates starting
/// before `reference - margin` make it past-looking.
pub fn coverage_of(dates: &[NaiveDate], reference: NaiveDate, margin_days: i64) -> Option<TemporalCoverage> {
    let min = dates.iter().min()?;
    let max = dates.iter().max()?;
    let margin = Duration::days(margin_days);

    if *max > reference + margin {
        if *min < reference {
            return Some(TemporalCoverage::Mixed);
        }
        return Some(TemporalCoverage::Future);
    }
    if *min < reference - margin {
        return Some(TemporalCoverage::Past);
    }
    None
}
