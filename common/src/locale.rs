//! Display strings for labels and tooltips.
//!
//! Only string substitution is supported: week numbering, calendars and
//! number formats are the same for every locale.

use chrono::{Datelike, NaiveDate, Weekday};
use tracing::warn;

const EN_MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    En,
    ZhCn,
}

impl Locale {
    /// Resolve a locale tag; unknown tags fall back to English.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "zh-cn" | "zh" | "zh-hans" => Locale::ZhCn,
            "en" | "en-us" | "en-gb" => Locale::En,
            other => {
                warn!("Unsupported locale {other:?}, falling back to en");
                Locale::En
            }
        }
    }

    /// Short month name for a 1-based month.
    pub fn month_short(self, month: u32) -> String {
        let idx = month.clamp(1, 12) as usize - 1;
        match self {
            Locale::En => EN_MONTHS[idx].to_string(),
            Locale::ZhCn => format!("{}月", idx + 1),
        }
    }

    pub fn weekday_name(self, day: Weekday) -> &'static str {
        match self {
            Locale::En => match day {
                Weekday::Mon => "Monday",
                Weekday::Tue => "Tuesday",
                Weekday::Wed => "Wednesday",
                Weekday::Thu => "Thursday",
                Weekday::Fri => "Friday",
                Weekday::Sat => "Saturday",
                Weekday::Sun => "Sunday",
            },
            Locale::ZhCn => match day {
                Weekday::Mon => "星期一",
                Weekday::Tue => "星期二",
                Weekday::Wed => "星期三",
                Weekday::Thu => "星期四",
                Weekday::Fri => "星期五",
                Weekday::Sat => "星期六",
                Weekday::Sun => "星期日",
            },
        }
    }

    /// One-character weekday label drawn left of the grid.
    pub fn weekday_label(self, day: Weekday) -> String {
        let name = self.weekday_name(day);
        let pick = match self {
            // "星期日" → "日"
            Locale::ZhCn => 2,
            Locale::En => 0,
        };
        name.chars().nth(pick).map(String::from).unwrap_or_default()
    }

    /// Long date used in tooltips, e.g. `Friday, Mar 1st 2024`.
    pub fn format_date(self, date: NaiveDate) -> String {
        let weekday = self.weekday_name(date.weekday());
        let month = self.month_short(date.month());
        match self {
            Locale::En => format!(
                "{weekday}, {month} {}{} {}",
                date.day(),
                ordinal_suffix(date.day()),
                date.year()
            ),
            Locale::ZhCn => format!("{weekday}, {month} {}日 {}", date.day(), date.year()),
        }
    }

    /// Tooltip body for one cell.
    pub fn tooltip_text(self, total: f64, date: NaiveDate) -> String {
        let total = format_total(total);
        let date = self.format_date(date);
        match self {
            Locale::En => format!("{total} contributions on {date}"),
            Locale::ZhCn => format!("{total} 条数据创建于 {date}"),
        }
    }
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

fn format_total(total: f64) -> String {
    if !total.is_finite() || total == 0.0 {
        "0".to_string()
    } else if total.fract() == 0.0 {
        format!("{total:.0}")
    } else {
        format!("{total}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tag() {
        assert_eq!(Locale::from_tag("zh-cn"), Locale::ZhCn);
        assert_eq!(Locale::from_tag("zh_CN"), Locale::ZhCn);
        assert_eq!(Locale::from_tag("en"), Locale::En);
        assert_eq!(Locale::from_tag("fr"), Locale::En);
    }

    #[test]
    fn test_month_and_weekday_labels() {
        assert_eq!(Locale::En.month_short(3), "Mar");
        assert_eq!(Locale::ZhCn.month_short(12), "12月");
        assert_eq!(Locale::En.weekday_label(Weekday::Sun), "S");
        assert_eq!(Locale::ZhCn.weekday_label(Weekday::Sun), "日");
        assert_eq!(Locale::ZhCn.weekday_label(Weekday::Wed), "三");
    }

    #[test]
    fn test_format_date() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(Locale::En.format_date(d), "Friday, Mar 1st 2024");
        assert_eq!(Locale::ZhCn.format_date(d), "星期五, 3月 1日 2024");
        let d = NaiveDate::from_ymd_opt(2024, 3, 12).unwrap();
        assert_eq!(Locale::En.format_date(d), "Tuesday, Mar 12th 2024");
        let d = NaiveDate::from_ymd_opt(2024, 3, 23).unwrap();
        assert_eq!(Locale::En.format_date(d), "Saturday, Mar 23rd 2024");
    }

    #[test]
    fn test_tooltip_text() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(
            Locale::En.tooltip_text(10.0, d),
            "10 contributions on Friday, Mar 1st 2024"
        );
        assert_eq!(
            Locale::ZhCn.tooltip_text(0.0, d),
            "0 条数据创建于 星期五, 3月 1日 2024"
        );
        assert!(Locale::En.tooltip_text(2.5, d).starts_with("2.5 "));
    }
}
