//! Redraw orchestration and hover handling.
//!
//! A redraw is a strictly sequential pass: window → filtered records →
//! maximum → geometry → teardown → cells with entrance → labels → host event.
//! Everything after that is driven by pointer events and by transition
//! continuations handed back from the surface.

use std::collections::{BTreeMap, BTreeSet};
use std::f64::consts::PI;
use std::sync::mpsc;
use std::time::Duration;

use chrono::{Datelike, Local, NaiveDate};
use heatmap_common::{
    ActivityRecord, DuplicatePolicy, HeatmapConfig, HeatmapError, HostEvent, Locale, Rgb,
    Settings, WindowChange,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::calendar::{CalendarIndexer, YearWindow};
use crate::highlight::{
    HighlightChange, HighlightController, HighlightState, HighlightTarget, Phase, TransitionToken,
};
use crate::layout::{Geometry, LayoutEngine};
use crate::scale::{max_total, scale_color, scale_size};
use crate::surface::{
    Attr, Continuation, ElementId, Layer, PulsePhase, Shape, Surface, Transition,
};

/// Pulse peak, relative to a full slot.
const PULSE_SCALE: f64 = 1.1;

/// One drawn day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridCell {
    pub date: NaiveDate,
    pub total: f64,
    pub column: i64,
    pub row: u32,
    pub size: f64,
    pub color: Rgb,
    /// Top-left corner, centred in the slot.
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Label {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
    pub target: HighlightTarget,
}

/// Everything computed by one redraw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub window: YearWindow,
    pub geometry: Geometry,
    pub max_total: f64,
    pub cells: Vec<GridCell>,
    pub month_labels: Vec<Label>,
    pub weekday_labels: Vec<Label>,
}

/// Records to draw for `window`, in date order.
///
/// Records outside the window are dropped. Same-day records are kept or
/// summed per the duplicate policy, and with `is_fill` every missing day is
/// added with a zero total.
pub fn select_records(
    records: &[ActivityRecord],
    window: &YearWindow,
    config: &HeatmapConfig,
) -> Vec<ActivityRecord> {
    let in_window = records.iter().filter(|r| window.contains(r.date));

    let mut selected: Vec<ActivityRecord> = match config.duplicates {
        DuplicatePolicy::RenderAll => in_window.cloned().collect(),
        DuplicatePolicy::Sum => {
            let mut sums: BTreeMap<NaiveDate, f64> = BTreeMap::new();
            for r in in_window {
                *sums.entry(r.date).or_insert(0.0) += r.total;
            }
            sums.into_iter()
                .map(|(date, total)| ActivityRecord::new(date, total))
                .collect()
        }
    };

    if config.is_fill {
        let present: BTreeSet<NaiveDate> = selected.iter().map(|r| r.date).collect();
        selected.extend(
            window
                .days()
                .filter(|d| !present.contains(d))
                .map(|d| ActivityRecord::new(d, 0.0)),
        );
    }

    // Stable: same-day records keep their input order.
    selected.sort_by_key(|r| r.date);
    selected
}

/// Cells and labels for already-selected `records`.
pub fn build_frame(
    records: &[ActivityRecord],
    window: &YearWindow,
    settings: &Settings,
    locale: Locale,
    container_width: Option<f64>,
) -> Frame {
    let config = &settings.heatmap;
    let indexer = CalendarIndexer::new(config.week_start);
    let geometry =
        LayoutEngine::new(&settings.layout).compute(container_width, indexer.week_column_count(window));
    let max = max_total(records);

    let cells = records
        .iter()
        .map(|r| {
            let column = indexer.cell_column(r.date, window);
            let row = indexer.cell_row(r.date);
            let size = scale_size(r.total, max, geometry.cell_size);
            let (x, y) = geometry.centered_origin(column, row, size);
            GridCell {
                date: r.date,
                total: r.total,
                column,
                row,
                size,
                color: scale_color(r.total, max, config.color, config.fill_color),
                x,
                y,
            }
        })
        .collect();

    let font_size = geometry.label_font_size();
    let months = indexer.month_boundaries(window);
    let month_labels = months
        .iter()
        .enumerate()
        .map(|(i, first)| {
            let (x, y) = geometry.month_label_position(i, months.len());
            Label {
                text: locale.month_short(first.month()),
                x,
                y,
                font_size,
                target: HighlightTarget::Month {
                    year: first.year(),
                    month: first.month(),
                },
            }
        })
        .collect();

    let weekday_labels = indexer
        .weekday_order()
        .into_iter()
        .enumerate()
        .map(|(row, day)| {
            let (x, y) = geometry.weekday_label_position(row as u32);
            Label {
                text: locale.weekday_label(day),
                x,
                y,
                font_size,
                target: HighlightTarget::Weekday(day),
            }
        })
        .collect();

    Frame {
        window: *window,
        geometry,
        max_total: max,
        cells,
        month_labels,
        weekday_labels,
    }
}

/// Receiver of events for the host.
pub trait EventSink {
    fn emit(&mut self, event: HostEvent);
}

impl EventSink for Vec<HostEvent> {
    fn emit(&mut self, event: HostEvent) {
        self.push(event);
    }
}

impl EventSink for mpsc::Sender<HostEvent> {
    fn emit(&mut self, event: HostEvent) {
        if self.send(event).is_err() {
            debug!("Host event dropped: receiver gone");
        }
    }
}

/// Outstanding completions of the transition group holding the guard.
#[derive(Debug, Clone, Copy)]
struct PendingGuard {
    token: TransitionToken,
    remaining: usize,
}

#[derive(Debug, Default)]
struct Drawn {
    cells: Vec<ElementId>,
    tooltip: Option<ElementId>,
}

pub struct RenderCoordinator<R = StdRng> {
    settings: Settings,
    locale: Locale,
    anchor: NaiveDate,
    rng: R,
    controller: HighlightController,
    frame: Option<Frame>,
    drawn: Drawn,
    guard: Option<PendingGuard>,
    pulse_generation: u64,
}

impl RenderCoordinator<StdRng> {
    /// Coordinator anchored at today's local date.
    pub fn new(settings: Settings) -> Self {
        Self::with_rng(settings, StdRng::from_entropy())
    }
}

impl<R: Rng> RenderCoordinator<R> {
    pub fn with_rng(settings: Settings, rng: R) -> Self {
        let locale = settings.heatmap.locale();
        Self {
            settings,
            locale,
            anchor: Local::now().date_naive(),
            rng,
            controller: HighlightController::new(),
            frame: None,
            drawn: Drawn::default(),
            guard: None,
            pulse_generation: 0,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    pub fn window(&self) -> YearWindow {
        YearWindow::containing(self.anchor)
    }

    /// Show the year containing `date` on the next redraw.
    pub fn select_anchor(&mut self, date: NaiveDate) {
        self.anchor = date;
    }

    /// Move the anchor by `delta` years. 29 February falls back to 1 January
    /// when the target year has no such day.
    pub fn shift_year(&mut self, delta: i32) {
        let target = self.anchor.year().checked_add(delta).and_then(|year| {
            self.anchor
                .with_year(year)
                .or_else(|| NaiveDate::from_ymd_opt(year, 1, 1))
        });
        match target {
            Some(anchor) => self.anchor = anchor,
            None => warn!("Cannot shift {} by {delta} years, keeping it", self.anchor),
        }
    }

    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    pub fn state(&self) -> &HighlightState {
        self.controller.state()
    }

    pub fn phase(&self) -> Phase {
        self.controller.phase()
    }

    pub fn cell_element(&self, index: usize) -> Option<ElementId> {
        self.drawn.cells.get(index).copied()
    }

    pub fn tooltip_element(&self) -> Option<ElementId> {
        self.drawn.tooltip
    }

    /// Pass a host-defined payload through unchanged.
    pub fn forward(&self, payload: serde_json::Value, sink: &mut dyn EventSink) {
        sink.emit(HostEvent::Handler(payload));
    }

    /// Full redraw of the anchor's year.
    ///
    /// Absent data fails before anything is touched. Otherwise every
    /// element is rebuilt, the highlight state is reset and the entrance
    /// animation holds the guard until its last cell has faded in.
    pub fn redraw<S: Surface + ?Sized>(
        &mut self,
        data: Option<&[ActivityRecord]>,
        surface: &mut S,
        sink: &mut dyn EventSink,
    ) -> Result<&Frame, HeatmapError> {
        let window = self.window();
        let data = data.ok_or(HeatmapError::MissingData)?;
        let records = select_records(data, &window, &self.settings.heatmap);
        let frame = build_frame(
            &records,
            &window,
            &self.settings,
            self.locale,
            surface.container_width(),
        );

        for layer in [Layer::Items, Layer::Labels, Layer::Tooltip] {
            surface.clear(layer);
        }
        self.controller.reset();
        self.guard = None;
        self.pulse_generation += 1;
        surface.resize_canvas(frame.geometry.grid_width(), frame.geometry.grid_height);

        let duration = self.settings.layout.transition();
        let token = self.controller.begin_entrance();
        let mut cells = Vec::with_capacity(frame.cells.len());
        for (index, cell) in frame.cells.iter().enumerate() {
            let id = surface.create(
                Layer::Items,
                Shape::Rect {
                    x: cell.x,
                    y: cell.y,
                    width: cell.size,
                    height: cell.size,
                    fill: cell.color,
                },
                0.0,
            );
            let delay = duration.mul_f64((PI * self.rng.gen::<f64>()).cos() + 1.0);
            surface.animate(
                id,
                Transition::new(duration)
                    .delay(delay)
                    .attr(Attr::Opacity(1.0))
                    .notify(Continuation::Guard(token)),
            );
            surface.set_hover_target(id, HighlightTarget::Cell(index));
            cells.push(id);
        }
        self.hold(token, cells.len());

        for label in frame.month_labels.iter().chain(&frame.weekday_labels) {
            let id = surface.create(
                Layer::Labels,
                Shape::Text {
                    x: label.x,
                    y: label.y,
                    content: label.text.clone(),
                    font_size: label.font_size,
                },
                1.0,
            );
            surface.set_hover_target(id, label.target);
        }

        let tooltip = surface.create(
            Layer::Tooltip,
            Shape::Tooltip {
                x: 0.0,
                y: 0.0,
                width: self.settings.tooltip.width,
                text: String::new(),
            },
            0.0,
        );

        sink.emit(HostEvent::WindowChange(WindowChange {
            start: window.start,
            end: window.end,
        }));

        debug!(
            "Redraw {}: {} of {} records, max_total={}, cell_size={:.2}",
            window.year(),
            frame.cells.len(),
            data.len(),
            frame.max_total,
            frame.geometry.cell_size
        );

        self.drawn = Drawn {
            cells,
            tooltip: Some(tooltip),
        };
        Ok(self.frame.insert(frame))
    }

    /// Pointer entered a hover target. Returns whether the event was
    /// applied; events arriving while a guarded transition runs are dropped.
    pub fn pointer_enter<S: Surface + ?Sized>(
        &mut self,
        target: HighlightTarget,
        surface: &mut S,
    ) -> bool {
        if let HighlightTarget::Cell(index) = target {
            if index >= self.drawn.cells.len() {
                debug!("Pointer enter on unknown cell {index} ignored");
                return false;
            }
        }
        match self.controller.pointer_enter(target) {
            Some(change) => {
                self.apply(change, surface);
                true
            }
            None => false,
        }
    }

    /// Pointer left the active target.
    pub fn pointer_leave<S: Surface + ?Sized>(&mut self, surface: &mut S) -> bool {
        match self.controller.pointer_leave() {
            Some(change) => {
                self.apply(change, surface);
                true
            }
            None => false,
        }
    }

    /// Resume work after a surface transition finished.
    pub fn on_transition_end<S: Surface + ?Sized>(&mut self, done: Continuation, surface: &mut S) {
        match done {
            Continuation::Guard(token) => {
                let Some(pending) = self.guard.as_mut().filter(|g| g.token == token) else {
                    trace!("Completion for {token:?} ignored");
                    return;
                };
                pending.remaining = pending.remaining.saturating_sub(1);
                if pending.remaining == 0 {
                    self.guard = None;
                    self.controller.complete(token);
                }
            }
            Continuation::Pulse {
                cell,
                generation,
                phase,
            } => {
                if generation != self.pulse_generation {
                    return;
                }
                let next = match phase {
                    PulsePhase::Grow => PulsePhase::Shrink,
                    PulsePhase::Shrink => PulsePhase::Grow,
                };
                self.pulse(cell, next, surface);
            }
        }
    }

    /// Advance the surface clock by `dt` and resume whatever finished.
    pub fn tick<S: Surface + ?Sized>(&mut self, surface: &mut S, dt: Duration) {
        for done in surface.advance(dt) {
            self.on_transition_end(done, surface);
        }
    }

    /// Tick in `step`s until the surface is idle or `limit` has passed.
    /// Returns whether the surface went idle; a pulsing cell never does.
    pub fn settle<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        step: Duration,
        limit: Duration,
    ) -> bool {
        let mut elapsed = Duration::ZERO;
        while surface.is_animating() && elapsed < limit {
            self.tick(surface, step);
            elapsed += step;
        }
        !surface.is_animating()
    }

    fn apply<S: Surface + ?Sized>(&mut self, change: HighlightChange, surface: &mut S) {
        let duration = self.settings.layout.transition();
        let half = duration / 2;
        let fade = change.previous.is_some_and(|t| t.dims_others())
            || change.current.is_some_and(|t| t.dims_others());
        let restore = match change.previous {
            Some(HighlightTarget::Cell(index)) => Some(index),
            _ => None,
        };
        if restore.is_some() {
            // Stops the running pulse from rescheduling itself.
            self.pulse_generation += 1;
        }

        let mut attached = 0;
        if fade {
            if let Some(frame) = &self.frame {
                for (index, (cell, id)) in frame.cells.iter().zip(&self.drawn.cells).enumerate() {
                    let mut t = Transition::new(duration)
                        .attr(Attr::Opacity(self.controller.opacity_for(cell.date)));
                    if restore == Some(index) {
                        t.to.extend(resting_attrs(cell));
                    }
                    if let Some(token) = change.guard {
                        t = t.notify(Continuation::Guard(token));
                        attached += 1;
                    }
                    surface.animate(*id, t);
                }
            }
        } else if let Some(index) = restore {
            if let Some((cell, id)) = self.cell_and_element(index) {
                let mut t = Transition::new(half);
                t.to.extend(resting_attrs(cell));
                if let Some(token) = change.guard {
                    t = t.notify(Continuation::Guard(token));
                    attached += 1;
                }
                surface.animate(id, t);
            }
        }

        if restore.is_some() {
            if let Some(tooltip) = self.drawn.tooltip {
                surface.animate(tooltip, Transition::new(half).attr(Attr::Opacity(0.0)));
            }
        }

        if let Some(HighlightTarget::Cell(index)) = change.current {
            self.show_tooltip(index, half, surface);
            self.pulse(index, PulsePhase::Grow, surface);
        }

        if let Some(token) = change.guard {
            self.hold(token, attached);
        }
    }

    fn show_tooltip<S: Surface + ?Sized>(&self, index: usize, fade: Duration, surface: &mut S) {
        let (Some(frame), Some(tooltip)) = (&self.frame, self.drawn.tooltip) else {
            return;
        };
        let Some(cell) = frame.cells.get(index) else {
            return;
        };
        let (x, y) = frame
            .geometry
            .tooltip_position(cell.column, cell.row, &self.settings.tooltip);
        surface.set_text(tooltip, &self.locale.tooltip_text(cell.total, cell.date));
        surface.set(tooltip, &[Attr::X(x), Attr::Y(y)]);
        surface.animate(tooltip, Transition::new(fade).attr(Attr::Opacity(1.0)));
    }

    /// Start one half of the hover pulse on cell `index`.
    fn pulse<S: Surface + ?Sized>(&self, index: usize, phase: PulsePhase, surface: &mut S) {
        let Some((cell, id)) = self.cell_and_element(index) else {
            return;
        };
        let Some(geometry) = self.frame.as_ref().map(|f| f.geometry) else {
            return;
        };
        let size = match phase {
            PulsePhase::Grow => geometry.cell_size * PULSE_SCALE,
            PulsePhase::Shrink => cell.size,
        };
        let (x, y) = geometry.centered_origin(cell.column, cell.row, size);
        surface.animate(
            id,
            Transition::new(self.settings.layout.transition())
                .attr(Attr::X(x))
                .attr(Attr::Y(y))
                .attr(Attr::Width(size))
                .attr(Attr::Height(size))
                .attr(Attr::Opacity(1.0))
                .notify(Continuation::Pulse {
                    cell: index,
                    generation: self.pulse_generation,
                    phase,
                }),
        );
    }

    fn cell_and_element(&self, index: usize) -> Option<(&GridCell, ElementId)> {
        let cell = self.frame.as_ref()?.cells.get(index)?;
        Some((cell, self.cell_element(index)?))
    }

    /// Track `count` completions for `token`; zero releases the guard now.
    fn hold(&mut self, token: TransitionToken, count: usize) {
        if count == 0 {
            self.guard = None;
            self.controller.complete(token);
        } else {
            self.guard = Some(PendingGuard {
                token,
                remaining: count,
            });
        }
    }
}

/// Attributes of `cell` at rest: scaled size, centred in its slot.
fn resting_attrs(cell: &GridCell) -> [Attr; 4] {
    [
        Attr::X(cell.x),
        Attr::Y(cell.y),
        Attr::Width(cell.size),
        Attr::Height(cell.size),
    ]
}

// ─── tests ───────────────────────────────────────────────────────────────
