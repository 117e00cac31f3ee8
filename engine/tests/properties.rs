//! Property-based invariant tests for the calendar mapping, scaling and
//! frame geometry.
//!
//! 1. Every day of a window maps to row 0..=6 and a non-negative column
//!    inside the column count.
//! 2. The column count of a calendar year depends only on its length and
//!    starting weekday, and is 53 or 54.
//! 3. A zero total always maps to the fill colour.
//! 4. Cell size is monotone in the total and bounded by 75%..100% of base.
//! 5. Every cell of a frame lies inside the grid.

use chrono::{Datelike, NaiveDate, Weekday};
use heatmap_common::{ActivityRecord, Locale, Rgb, Settings};
use heatmap_engine::{build_frame, scale_color, scale_size, CalendarIndexer, YearWindow};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

fn week_start_strategy() -> impl Strategy<Value = Weekday> {
    (0usize..7).prop_map(|i| WEEKDAYS[i])
}

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (1900i32..=2200, 1u32..=366).prop_map(|(year, ordinal)| {
        NaiveDate::from_yo_opt(year, ordinal)
            .or_else(|| NaiveDate::from_yo_opt(year, 365))
            .unwrap()
    })
}

fn rgb_strategy() -> impl Strategy<Value = Rgb> {
    (any::<u8>(), any::<u8>(), any::<u8>()).prop_map(|(r, g, b)| Rgb::new(r, g, b))
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Grid coordinates stay in range
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn cell_coordinates_in_range(date in date_strategy(), start in week_start_strategy()) {
        let indexer = CalendarIndexer::new(start);
        let window = YearWindow::containing(date);
        let row = indexer.cell_row(date);
        let column = indexer.cell_column(date, &window);

        prop_assert!(row <= 6, "row {} for {}", row, date);
        prop_assert!(column >= 0, "column {} for {}", column, date);
        prop_assert!(column < indexer.week_column_count(&window) as i64);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Column count is a function of year shape
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn column_count_depends_on_year_shape(
        a in 1900i32..=2200,
        b in 1900i32..=2200,
        start in week_start_strategy(),
    ) {
        let indexer = CalendarIndexer::new(start);
        let wa = YearWindow::containing(NaiveDate::from_ymd_opt(a, 6, 1).unwrap());
        let wb = YearWindow::containing(NaiveDate::from_ymd_opt(b, 6, 1).unwrap());
        let count = indexer.week_column_count(&wa);

        prop_assert!(count == 53 || count == 54, "{} columns in {}", count, a);

        let same_shape = wa.days().count() == wb.days().count()
            && wa.start.weekday() == wb.start.weekday();
        if same_shape {
            prop_assert_eq!(count, indexer.week_column_count(&wb));
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Zero maps to the fill colour
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn zero_total_is_fill(
        max in prop_oneof![Just(0.0), -100.0f64..1e6],
        base in rgb_strategy(),
        fill in rgb_strategy(),
    ) {
        prop_assert_eq!(scale_color(0.0, max, base, fill), fill);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Size is monotone and bounded
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn size_monotone_and_bounded(
        a in -10.0f64..1000.0,
        b in -10.0f64..1000.0,
        max in 0.001f64..1000.0,
        base in 0.0f64..100.0,
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let s_lo = scale_size(lo, max, base);
        let s_hi = scale_size(hi, max, base);

        prop_assert!(s_lo <= s_hi + 1e-9, "size({}) = {} > size({}) = {}", lo, s_lo, hi, s_hi);
        for s in [s_lo, s_hi] {
            prop_assert!(s >= 0.75 * base - 1e-9 && s <= base + 1e-9, "size {} outside bounds for base {}", s, base);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Cells fit the grid
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn frame_cells_fit_grid(
        year in 1990i32..=2100,
        width in prop_oneof![Just(None), (0.0f64..4000.0).prop_map(Some)],
        totals in prop::collection::vec((1u32..=365, 0.0f64..50.0), 0..40),
    ) {
        let window = YearWindow::containing(NaiveDate::from_ymd_opt(year, 1, 1).unwrap());
        let records: Vec<ActivityRecord> = totals
            .into_iter()
            .filter_map(|(ordinal, total)| {
                NaiveDate::from_yo_opt(year, ordinal).map(|d| ActivityRecord::new(d, total))
            })
            .collect();

        let frame = build_frame(&records, &window, &Settings::default(), Locale::En, width);
        let g = frame.geometry;
        prop_assert!(g.width >= 1000.0);
        for cell in &frame.cells {
            prop_assert!(cell.x >= g.label_padding - 1e-9);
            prop_assert!(cell.y >= g.label_padding - 1e-9);
            prop_assert!(cell.x + cell.size <= g.width + 1e-6, "cell {:?} past {}", cell, g.width);
            prop_assert!(cell.y + cell.size <= g.grid_height + 1e-6);
        }
    }
}
