//! Events the heatmap emits to its host, and the preview server's JSON
//! payloads.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The year now on display, emitted once per redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowChange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Everything the core sends outward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum HostEvent {
    WindowChange(WindowChange),
    /// Host-defined payload passed through untouched.
    Handler(serde_json::Value),
}

/// Health-check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
    pub records: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_change_json_shape() {
        let ev = HostEvent::WindowChange(WindowChange {
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        });
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["event"], "window_change");
        assert_eq!(json["payload"]["start"], "2024-01-01");
        assert_eq!(json["payload"]["end"], "2024-12-31");
    }
}
