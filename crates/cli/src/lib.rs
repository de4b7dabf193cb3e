//! Shared helpers for the CLI bins: calendar dates at the boundary, seconds
//! past J2000 inside.

use anyhow::Context;
use chrono::{Duration, NaiveDate, NaiveDateTime};

/// The J2000 reference instant as a calendar timestamp.
fn j2000() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2000, 1, 1)
        .expect("static date")
        .and_hms_opt(12, 0, 0)
        .expect("static time")
}

/// Parse an epoch argument: an ISO date (`2020-07-01`) or raw seconds past
/// J2000 (`646833600`).
pub fn parse_epoch(arg: &str) -> anyhow::Result<f64> {
    if let Ok(date) = NaiveDate::parse_from_str(arg, "%Y-%m-%d") {
        let midnight = date.and_hms_opt(0, 0, 0).context("invalid date")?;
        return Ok((midnight - j2000()).num_seconds() as f64);
    }
    arg.parse::<f64>()
        .with_context(|| format!("`{arg}` is neither an ISO date nor an epoch in seconds"))
}

/// Render an epoch as an ISO date for axis labels and log lines.
pub fn format_epoch(epoch_s: f64) -> String {
    let shifted = j2000() + Duration::seconds(epoch_s as i64);
    shifted.format("%Y-%m-%d").to_string()
}
