//! Activity records – the `(date, total)` pairs a heatmap is drawn from.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::HeatmapError;

/// One day's activity as supplied by the host.
///
/// Several records may share a date; see `DuplicatePolicy` in the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub date: NaiveDate,
    pub total: f64,
}

/// A single timestamped contribution that rolls up into a daily total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityDetail {
    pub at: NaiveDateTime,
    pub value: f64,
}

impl ActivityRecord {
    pub fn new(date: NaiveDate, total: f64) -> Self {
        Self { date, total }
    }

    /// Build a daily record whose total is the sum of its details.
    pub fn from_details(date: NaiveDate, details: &[ActivityDetail]) -> Self {
        let total = details.iter().map(|d| d.value).sum();
        Self { date, total }
    }

    /// Total used for scaling: negative values count as no activity.
    pub fn effective_total(&self) -> f64 {
        self.total.max(0.0)
    }
}

/// Parse and validate a JSON array of records.
///
/// Each element must be an object with a `date` and a finite numeric
/// `total`. Dates may be plain (`2024-03-01`), naive timestamps
/// (`2024-03-01T10:30:00`) or RFC 3339; timestamps keep only their date in
/// the local clock. Extra fields are ignored.
pub fn parse_records(json: &str) -> Result<Vec<ActivityRecord>, HeatmapError> {
    let items: Vec<Value> =
        serde_json::from_str(json).map_err(|e| HeatmapError::InvalidDocument {
            reason: format!("not a JSON array of records: {e}"),
        })?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| validate(index, item))
        .collect()
}

fn validate(index: usize, item: &Value) -> Result<ActivityRecord, HeatmapError> {
    let invalid = |reason: &str| HeatmapError::InvalidRecord {
        index,
        reason: reason.to_string(),
    };

    let obj = item.as_object().ok_or_else(|| invalid("not an object"))?;

    let date = obj
        .get("date")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid("missing string field `date`"))?;
    let date = parse_date(date).ok_or_else(|| invalid("unrecognised date format"))?;

    let total = obj
        .get("total")
        .and_then(Value::as_f64)
        .ok_or_else(|| invalid("missing numeric field `total`"))?;
    if !total.is_finite() {
        return Err(invalid("total is not finite"));
    }

    Ok(ActivityRecord { date, total })
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local).date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
}

// ─── tests ───────────────────────────────────────────────────────────────
