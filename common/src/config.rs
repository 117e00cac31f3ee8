//! Configuration parsing – reads a TOML file with `[heatmap]`, `[layout]`
//! and `[tooltip]` sections.
//!
//! ```toml
//! [heatmap]
//! color = "#7bc96f"
//! fill_color = "#ebedf0"
//! locale = "zh-cn"
//! is_fill = false
//! week_start = "sunday"
//! duplicates = "render_all"
//!
//! [layout]
//! gutter = 5.0
//! label_padding = 40.0
//! min_width = 1000.0
//! transition_ms = 500
//!
//! [tooltip]
//! width = 250.0
//! padding = 15.0
//! ```
//!
//! Every key is optional; missing keys take the defaults shown above.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::color::Rgb;
use crate::error::HeatmapError;
use crate::locale::Locale;

/// Everything the engine and the preview host read from the config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub heatmap: HeatmapConfig,
    pub layout: LayoutSettings,
    pub tooltip: TooltipSettings,
}

/// Per-render appearance options supplied by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapConfig {
    /// Colour of the most active day.
    pub color: Rgb,
    /// Colour of days with a zero total.
    #[serde(alias = "fillColor")]
    pub fill_color: Rgb,
    /// Locale tag for labels and tooltips (`en`, `zh-cn`).
    pub locale: String,
    /// Synthesize zero-total cells for days without a record.
    #[serde(alias = "isFill")]
    pub is_fill: bool,
    /// First day of each week column.
    #[serde(alias = "weekStart")]
    pub week_start: Weekday,
    /// What to do with several records on the same date.
    pub duplicates: DuplicatePolicy,
}

/// Handling of records that share a date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Every record becomes its own cell; same-day cells overlap.
    #[default]
    RenderAll,
    /// Totals are summed into one cell per date.
    Sum,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            color: Rgb::new(0x7b, 0xc9, 0x6f),
            fill_color: Rgb::new(0xeb, 0xed, 0xf0),
            locale: "zh-cn".to_string(),
            is_fill: false,
            week_start: Weekday::Sun,
            duplicates: DuplicatePolicy::RenderAll,
        }
    }
}

impl HeatmapConfig {
    pub fn locale(&self) -> Locale {
        Locale::from_tag(&self.locale)
    }
}

/// Grid spacing and animation timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    /// Space between adjacent cells.
    pub gutter: f64,
    /// Room reserved above and left of the grid for labels.
    pub label_padding: f64,
    /// Container widths below this are treated as this width.
    pub min_width: f64,
    /// Standard transition duration in milliseconds.
    pub transition_ms: u64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            gutter: 5.0,
            label_padding: 40.0,
            min_width: 1000.0,
            transition_ms: 500,
        }
    }
}

impl LayoutSettings {
    pub fn transition(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TooltipSettings {
    pub width: f64,
    pub padding: f64,
}

impl Default for TooltipSettings {
    fn default() -> Self {
        Self {
            width: 250.0,
            padding: 15.0,
        }
    }
}

impl Settings {
    /// Default config path.
    pub fn default_path() -> &'static str {
        "/etc/heatmap/heatmap.toml"
    }

    /// Reject values that would produce degenerate geometry.
    pub fn validate(&self) -> Result<(), HeatmapError> {
        let invalid = |reason: String| Err(HeatmapError::InvalidConfig { reason });
        let layout = &self.layout;

        for (name, value) in [
            ("layout.gutter", layout.gutter),
            ("layout.label_padding", layout.label_padding),
            ("tooltip.width", self.tooltip.width),
            ("tooltip.padding", self.tooltip.padding),
        ] {
            if !value.is_finite() || value < 0.0 {
                return invalid(format!("{name} must be a finite, non-negative number"));
            }
        }
        if !layout.min_width.is_finite() || layout.min_width <= layout.label_padding {
            return invalid(format!(
                "layout.min_width ({}) must exceed layout.label_padding ({})",
                layout.min_width, layout.label_padding
            ));
        }
        Ok(())
    }
}

/// Load and validate settings from a TOML file.
pub fn load(path: &Path) -> Result<Settings> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read config: {}", path.display()))?;
    let settings = parse(&text).with_context(|| format!("Bad config: {}", path.display()))?;
    info!("Loaded config from {}", path.display());
    Ok(settings)
}

/// Load from `path` when given, otherwise fall back to defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(p) => load(p),
        None => {
            info!("No config file given, using defaults");
            Ok(Settings::default())
        }
    }
}

fn parse(text: &str) -> Result<Settings> {
    let settings: Settings = toml::from_str(text).context("Cannot parse TOML")?;
    settings.validate()?;
    Ok(settings)
}

// ─── tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_component_defaults() {
        let s = Settings::default();
        assert_eq!(s.heatmap.color.to_string(), "#7bc96f");
        assert_eq!(s.heatmap.fill_color.to_string(), "#ebedf0");
        assert_eq!(s.heatmap.locale, "zh-cn");
        assert!(!s.heatmap.is_fill);
        assert_eq!(s.heatmap.week_start, Weekday::Sun);
        assert_eq!(s.layout.transition(), Duration::from_millis(500));
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_toml() {
        let text = r##"
[heatmap]
color = "#196127"
locale = "en"
duplicates = "sum"

[layout]
gutter = 2.0
"##;
        let s = parse(text).unwrap();
        assert_eq!(s.heatmap.color, Rgb::new(0x19, 0x61, 0x27));
        assert_eq!(s.heatmap.fill_color.to_string(), "#ebedf0");
        assert_eq!(s.heatmap.locale(), Locale::En);
        assert_eq!(s.heatmap.duplicates, DuplicatePolicy::Sum);
        assert_eq!(s.layout.gutter, 2.0);
        assert_eq!(s.layout.label_padding, 40.0);
        assert_eq!(s.tooltip.width, 250.0);
    }

    #[test]
    fn test_parse_rejects_bad_colour() {
        let err = parse("[heatmap]\ncolor = \"green\"\n").unwrap_err();
        assert!(format!("{err:#}").contains("invalid colour"));
    }

    #[test]
    fn test_validate_rejects_min_width_below_padding() {
        let mut s = Settings::default();
        s.layout.min_width = 30.0;
        assert!(matches!(
            s.validate(),
            Err(HeatmapError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("heatmap.toml");
        std::fs::write(&path, "[heatmap]\nis_fill = true\nweek_start = \"Mon\"\n").unwrap();

        let s = load(&path).unwrap();
        assert!(s.heatmap.is_fill);
        assert_eq!(s.heatmap.week_start, Weekday::Mon);

        assert!(load(&PathBuf::from("/nonexistent/heatmap.toml")).is_err());
        assert_eq!(load_or_default(None).unwrap(), Settings::default());
    }
}
