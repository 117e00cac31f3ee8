//! Activity data for the preview host: a JSON records file, or generated
//! demo data when none is configured.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate, NaiveTime};
use heatmap_common::record::parse_records;
use heatmap_common::{ActivityDetail, ActivityRecord};
use rand::Rng;
use tracing::info;

/// Most events a generated day can have.
const MAX_DAILY_EVENTS: usize = 14;

/// Load records from `path`, or generate `years` of demo data ending today.
pub fn load_or_demo<R: Rng>(
    path: Option<&Path>,
    rng: &mut R,
    today: NaiveDate,
    years: i32,
) -> Result<Vec<ActivityRecord>> {
    match path {
        Some(p) => load(p),
        None => {
            let records = demo_records(rng, today, years);
            info!("Generated {} demo records", records.len());
            Ok(records)
        }
    }
}

/// Read and validate a JSON array of `{date, total}` records.
pub fn load(path: &Path) -> Result<Vec<ActivityRecord>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read data file: {}", path.display()))?;
    let records =
        parse_records(&text).with_context(|| format!("Bad data file: {}", path.display()))?;
    info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// One record per day from `years` before `today` through `today`.
///
/// Each day rolls up to 14 timestamped events; later days weigh random
/// extra value more heavily, so activity drifts upward over time.
pub fn demo_records<R: Rng>(rng: &mut R, today: NaiveDate, years: i32) -> Vec<ActivityRecord> {
    let start = today
        .with_year(today.year() - years)
        .or_else(|| NaiveDate::from_ymd_opt(today.year() - years, 3, 1))
        .unwrap_or(today);

    let mut records = Vec::new();
    for (index, date) in start.iter_days().take_while(|d| *d <= today).enumerate() {
        let count = rng.gen_range(0..=MAX_DAILY_EVENTS);
        let mut details = Vec::with_capacity(count);
        for i in 0..count {
            let time = NaiveTime::from_hms_opt(rng.gen_range(0..24), rng.gen_range(0..60), 0)
                .unwrap_or_default();
            let weight = (rng.gen::<f64>() * (index as f64 / 365.0)).round();
            let value =
                3600.0 * ((count - i) as f64 / 5.0) + rng.gen_range(0..3600) as f64 * weight;
            details.push(ActivityDetail {
                at: date.and_time(time),
                value,
            });
        }
        records.push(ActivityRecord::from_details(date, &details));
    }
    records
}

// ─── tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::TempDir;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn test_demo_covers_every_day() {
        let mut rng = StdRng::seed_from_u64(1);
        let records = demo_records(&mut rng, today(), 10);
        // 2014-03-15 ..= 2024-03-15
        let expected = (today() - NaiveDate::from_ymd_opt(2014, 3, 15).unwrap()).num_days() + 1;
        assert_eq!(records.len() as i64, expected);
        assert_eq!(records.first().unwrap().date, NaiveDate::from_ymd_opt(2014, 3, 15).unwrap());
        assert_eq!(records.last().unwrap().date, today());
        assert!(records.iter().all(|r| r.total >= 0.0 && r.total.is_finite()));
        assert!(records.iter().any(|r| r.total > 0.0));
    }

    #[test]
    fn test_demo_is_deterministic_per_seed() {
        let a = demo_records(&mut StdRng::seed_from_u64(9), today(), 1);
        let b = demo_records(&mut StdRng::seed_from_u64(9), today(), 1);
        assert_eq!(a, b);
    }

    #[test]
    fn test_leap_day_start() {
        let leap = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let records = demo_records(&mut StdRng::seed_from_u64(3), leap, 1);
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2023, 3, 1).unwrap());
    }

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("records.json");
        std::fs::write(&path, r#"[{"date": "2024-03-01", "total": 10}]"#).unwrap();

        let records = load(&path).unwrap();
        assert_eq!(records, vec![ActivityRecord::new(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), 10.0)]);

        std::fs::write(&path, r#"[{"date": "2024-03-01"}]"#).unwrap();
        let err = load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("total"));
    }

    #[test]
    fn test_missing_path_uses_demo() {
        let mut rng = StdRng::seed_from_u64(5);
        let records = load_or_demo(None, &mut rng, today(), 1).unwrap();
        assert!(!records.is_empty());
    }
}
