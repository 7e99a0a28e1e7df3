//! Dataset shape detection: wide (time-indexed headers) or long.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

use crate::schema::{FieldType, HeaderRef, TimeSeries, TimeSeriesDetection};

static YEAR_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}$").unwrap());
static YEAR_MONTH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})[-/](\d{1,2})$").unwrap());

const HEADER_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const HEADER_DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parse a column header as a point in time.
pub fn parse_header_date(header: &str) -> Option<NaiveDateTime> {
    let h = header.trim();
    if h.is_empty() {
        return None;
    }

    if YEAR_ONLY.is_match(h) {
        let year = h.parse().ok()?;
        return NaiveDate::from_ymd_opt(year, 1, 1)?.and_hms_opt(0, 0, 0);
    }

    if let Some(caps) = YEAR_MONTH.captures(h) {
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, 1)?.and_hms_opt(0, 0, 0);
    }

    for fmt in HEADER_DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(h, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    // "Mar 2020" / "March 2020"
    for fmt in ["%d %b %Y", "%d %B %Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(&format!("01 {h}"), fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    for fmt in HEADER_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(h, fmt) {
            return Some(dt);
        }
    }

    DateTime::parse_from_rfc3339(h).ok().map(|dt| dt.naive_utc())
}

/// Detect a block of at least two contiguous date headers whose columns share one type.
///
/// The longest run of parseable headers is used (the first on ties). The
/// interval assumes uniform spacing between headers.
pub fn detect_time_series(headers: &[String], field_types: &[FieldType]) -> Option<TimeSeriesDetection> {
    let parsed: Vec<Option<NaiveDateTime>> = headers.iter().map(|h| parse_header_date(h)).collect();

    if parsed.iter().all(Option::is_none) {
        info!("not a time series: no header parses as a date");
        return None;
    }

    let mut best: Option<(usize, usize)> = None;
    let mut run_start = None;
    for i in 0..=parsed.len() {
        match (parsed.get(i).is_some_and(Option::is_some), run_start) {
            (true, None) => run_start = Some(i),
            (false, Some(s)) => {
                let len = i - s;
                if best.is_none_or(|(bs, be)| len > be - bs + 1) {
                    best = Some((s, i - 1));
                }
                run_start = None;
            }
            _ => {}
        }
    }

    let (start, end) = best?;
    if end <= start {
        info!("not a time series: need at least two contiguous date headers");
        return None;
    }

    let block_types = &field_types[start.min(field_types.len())..(end + 1).min(field_types.len())];
    if block_types.len() != end - start + 1 || block_types.iter().any(|t| *t != block_types[0]) {
        info!("not a time series: date-headed columns have different types");
        return None;
    }

    let first = parsed[start]?;
    let last = parsed[end]?;
    let num_elements = end - start + 1;
    let length_in_seconds = (last - first).num_seconds() as f64;

    Some(TimeSeriesDetection {
        start: HeaderRef {
            index: start,
            name: headers[start].clone(),
        },
        end: HeaderRef {
            index: end,
            name: headers[end].clone(),
        },
        time_series: TimeSeries {
            num_elements,
            length_in_seconds,
            interval_seconds: length_in_seconds / num_elements as f64,
            names: headers[start..=end].to_vec(),
        },
    })
}
