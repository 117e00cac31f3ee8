//! Off-screen rendering: drive a coordinator against an in-memory scene
//! until its transitions settle, then serialise the scene to SVG.

use std::str::FromStr;
use std::time::Duration;

use chrono::{NaiveDate, Weekday};
use heatmap_common::{ActivityRecord, HeatmapError, HostEvent, Settings, WindowChange};
use heatmap_engine::{HighlightTarget, RenderCoordinator, Scene};
use thiserror::Error;
use tracing::debug;

/// Frame interval of the virtual clock.
const STEP: Duration = Duration::from_millis(16);

/// Upper bound on simulated time spent waiting for transitions.
const SETTLE_LIMIT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid hover target {0:?}; expected month-<1..12>, weekday-<mon..sun> or YYYY-MM-DD")]
    InvalidHover(String),
    #[error("year {0} is out of range")]
    InvalidYear(i32),
    #[error(transparent)]
    Heatmap(#[from] HeatmapError),
}

/// What to highlight before taking the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hover {
    Month(u32),
    Weekday(Weekday),
    Date(NaiveDate),
}

impl FromStr for Hover {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RenderError::InvalidHover(s.to_string());
        if let Some(month) = s.strip_prefix("month-") {
            return match month.parse::<u32>() {
                Ok(m @ 1..=12) => Ok(Hover::Month(m)),
                _ => Err(invalid()),
            };
        }
        if let Some(day) = s.strip_prefix("weekday-") {
            return day.parse::<Weekday>().map(Hover::Weekday).map_err(|_| invalid());
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Hover::Date)
            .map_err(|_| invalid())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderRequest {
    /// Year to show; the current year when absent.
    pub year: Option<i32>,
    /// Container width; unmeasurable when absent.
    pub width: Option<f64>,
    pub hover: Option<Hover>,
}

/// Render `records` as an SVG document.
pub fn render_svg(
    settings: &Settings,
    records: &[ActivityRecord],
    request: &RenderRequest,
) -> Result<String, RenderError> {
    let mut coordinator = coordinator_for(settings, request.year)?;
    let mut scene = Scene::new(request.width);
    let mut events: Vec<HostEvent> = Vec::new();

    coordinator.redraw(Some(records), &mut scene, &mut events)?;
    coordinator.settle(&mut scene, STEP, SETTLE_LIMIT);

    if let Some(hover) = request.hover {
        match resolve(hover, &coordinator) {
            Some(target) => {
                coordinator.pointer_enter(target, &mut scene);
                // A hovered cell pulses indefinitely; stop at the peak.
                coordinator.settle(&mut scene, STEP, settings.layout.transition());
            }
            None => debug!("Nothing to hover for {hover:?}"),
        }
    }

    Ok(scene.svg().to_string())
}

/// The window a redraw of `year` announces to its host.
pub fn window_change(settings: &Settings, year: Option<i32>) -> Result<WindowChange, RenderError> {
    let mut coordinator = coordinator_for(settings, year)?;
    let mut scene = Scene::new(None);
    let mut events: Vec<HostEvent> = Vec::new();
    let empty: &[ActivityRecord] = &[];
    coordinator.redraw(Some(empty), &mut scene, &mut events)?;

    events
        .into_iter()
        .find_map(|e| match e {
            HostEvent::WindowChange(change) => Some(change),
            HostEvent::Handler(_) => None,
        })
        .ok_or(RenderError::Heatmap(HeatmapError::MissingData))
}

fn coordinator_for(settings: &Settings, year: Option<i32>) -> Result<RenderCoordinator, RenderError> {
    let mut coordinator = RenderCoordinator::new(settings.clone());
    if let Some(year) = year {
        let anchor = NaiveDate::from_ymd_opt(year, 1, 1).ok_or(RenderError::InvalidYear(year))?;
        coordinator.select_anchor(anchor);
    }
    Ok(coordinator)
}

fn resolve(hover: Hover, coordinator: &RenderCoordinator) -> Option<HighlightTarget> {
    let frame = coordinator.frame()?;
    match hover {
        Hover::Month(month) => Some(HighlightTarget::Month {
            year: frame.window.year(),
            month,
        }),
        Hover::Weekday(day) => Some(HighlightTarget::Weekday(day)),
        Hover::Date(date) => frame
            .cells
            .iter()
            .position(|c| c.date == date)
            .map(HighlightTarget::Cell),
    }
}

// ─── tests ───────────────────────────────────────────────────────────────
