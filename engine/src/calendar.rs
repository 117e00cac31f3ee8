//! Calendar-to-grid index mapping.
//!
//! A year is laid out as week columns (left to right) by weekday rows (top
//! to bottom). Column 0 is the week containing 1 January; the week boundary
//! is a fixed weekday, independent of the display locale.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// The calendar year currently on display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct YearWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl YearWindow {
    /// 1 January through 31 December of `anchor`'s year.
    pub fn containing(anchor: NaiveDate) -> Self {
        let start = anchor.with_ordinal(1).unwrap_or(anchor);
        let end = NaiveDate::from_ymd_opt(anchor.year(), 12, 31).unwrap_or(anchor);
        Self { start, end }
    }

    pub fn year(&self) -> i32 {
        self.start.year()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Every day of the window, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

/// Maps dates to grid coordinates for a fixed week-start convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarIndexer {
    week_start: Weekday,
}

impl Default for CalendarIndexer {
    fn default() -> Self {
        Self::new(Weekday::Sun)
    }
}

impl CalendarIndexer {
    pub fn new(week_start: Weekday) -> Self {
        Self { week_start }
    }

    pub fn week_start(&self) -> Weekday {
        self.week_start
    }

    /// Most recent week boundary at or before the window start. `None` when
    /// that day precedes the earliest representable date.
    pub fn week_aligned_start(&self, window: &YearWindow) -> Option<NaiveDate> {
        window
            .start
            .checked_sub_days(Days::new(u64::from(self.cell_row(window.start))))
    }

    /// Number of week columns needed to hold every day of `window`.
    pub fn week_column_count(&self, window: &YearWindow) -> u32 {
        let span = self.days_from_aligned_start(window.end, window);
        (span.div_euclid(7) + 1).max(1) as u32
    }

    /// Week column of `date`. Negative for dates before the window's first
    /// week; callers filter by window membership first.
    pub fn cell_column(&self, date: NaiveDate, window: &YearWindow) -> i64 {
        self.days_from_aligned_start(date, window).div_euclid(7)
    }

    // Offset from the window start plus its row, so the aligned start never
    // has to exist as a date.
    fn days_from_aligned_start(&self, date: NaiveDate, window: &YearWindow) -> i64 {
        date.signed_duration_since(window.start).num_days() + i64::from(self.cell_row(window.start))
    }

    /// Weekday row of `date`, in `0..=6`.
    pub fn cell_row(&self, date: NaiveDate) -> u32 {
        self.row_of(date.weekday())
    }

    pub fn row_of(&self, day: Weekday) -> u32 {
        (day.num_days_from_sunday() + 7 - self.week_start.num_days_from_sunday()) % 7
    }

    /// Weekdays in row order, starting with the week start.
    pub fn weekday_order(&self) -> [Weekday; 7] {
        let mut days = [self.week_start; 7];
        for i in 1..7 {
            days[i] = days[i - 1].succ();
        }
        days
    }

    /// First-of-month dates for every month overlapping `window`.
    pub fn month_boundaries(&self, window: &YearWindow) -> Vec<NaiveDate> {
        let mut months = Vec::with_capacity(12);
        let mut cursor = window.start.with_day(1);
        while let Some(first) = cursor {
            if first > window.end {
                break;
            }
            months.push(first);
            cursor = if first.month() == 12 {
                NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
            } else {
                NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
            };
        }
        months
    }
}

// ─── tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_window_covers_calendar_year() {
        let w = YearWindow::containing(ymd(2024, 7, 14));
        assert_eq!(w.start, ymd(2024, 1, 1));
        assert_eq!(w.end, ymd(2024, 12, 31));
        assert!(w.contains(ymd(2024, 12, 31)));
        assert!(!w.contains(ymd(2025, 1, 1)));
        assert_eq!(w.days().count(), 366);
    }

    #[test]
    fn test_first_week_and_rows_sunday_start() {
        // 2024-01-01 is a Monday: the grid starts on Sunday 2023-12-31.
        let idx = CalendarIndexer::default();
        let w = YearWindow::containing(ymd(2024, 1, 1));
        assert_eq!(idx.week_aligned_start(&w), Some(ymd(2023, 12, 31)));
        assert_eq!(idx.cell_row(ymd(2024, 1, 1)), 1);
        assert_eq!(idx.cell_column(ymd(2024, 1, 1), &w), 0);
        assert_eq!(idx.cell_column(ymd(2024, 1, 6), &w), 0);
        assert_eq!(idx.cell_column(ymd(2024, 1, 7), &w), 1);
        assert_eq!(idx.cell_row(ymd(2024, 1, 7)), 0);
        assert_eq!(idx.cell_column(ymd(2024, 12, 31), &w), 52);
    }

    #[test]
    fn test_monday_start_shifts_rows() {
        let idx = CalendarIndexer::new(Weekday::Mon);
        let w = YearWindow::containing(ymd(2024, 1, 1));
        assert_eq!(idx.week_aligned_start(&w), Some(ymd(2024, 1, 1)));
        assert_eq!(idx.cell_row(ymd(2024, 1, 1)), 0);
        assert_eq!(idx.cell_row(ymd(2024, 1, 7)), 6);
        assert_eq!(idx.weekday_order()[0], Weekday::Mon);
        assert_eq!(idx.weekday_order()[6], Weekday::Sun);
    }

    #[test]
    fn test_week_column_count() {
        let idx = CalendarIndexer::default();
        let count = |y| idx.week_column_count(&YearWindow::containing(ymd(y, 6, 1)));
        assert_eq!(count(2023), 53);
        assert_eq!(count(2024), 53);
        assert_eq!(count(2025), 53);
        // Leap year starting on Saturday needs one more column.
        assert_eq!(count(2000), 54);
    }

    #[test]
    fn test_earliest_year_maps_without_aligned_start() {
        let w = YearWindow::containing(NaiveDate::MIN);
        for day in CalendarIndexer::default().weekday_order() {
            let idx = CalendarIndexer::new(day);
            let row = idx.cell_row(w.start);
            assert_eq!(idx.week_aligned_start(&w).is_none(), row != 0, "{day}");
            assert_eq!(idx.cell_column(w.start, &w), 0);
            assert!((53..=54).contains(&idx.week_column_count(&w)));
            assert_eq!(idx.cell_column(w.end, &w), idx.week_column_count(&w) as i64 - 1);
        }
    }

    #[test]
    fn test_dates_before_window_go_negative() {
        let idx = CalendarIndexer::default();
        let w = YearWindow::containing(ymd(2024, 1, 1));
        assert_eq!(idx.cell_column(ymd(2023, 12, 30), &w), -1);
    }

    #[test]
    fn test_month_boundaries() {
        let idx = CalendarIndexer::default();
        let w = YearWindow::containing(ymd(2024, 5, 5));
        let months = idx.month_boundaries(&w);
        assert_eq!(months.len(), 12);
        assert_eq!(months[0], ymd(2024, 1, 1));
        assert_eq!(months[11], ymd(2024, 12, 1));

        let partial = YearWindow {
            start: ymd(2024, 3, 15),
            end: ymd(2024, 5, 1),
        };
        assert_eq!(
            idx.month_boundaries(&partial),
            vec![ymd(2024, 3, 1), ymd(2024, 4, 1), ymd(2024, 5, 1)]
        );
    }
}
