//! Hover highlight state machine.
//!
//! One highlight can be active at a time: a single cell, every cell of a
//! month, or every cell of a weekday. Transitions that hold the in-flight
//! guard (entrance, month/weekday fades, restores on leave) block all pointer
//! events until their completion signal arrives; blocked events are dropped,
//! never queued.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;
use tracing::trace;

/// Opacity of cells outside a month/weekday highlight.
pub const DIM_OPACITY: f64 = 0.1;

/// Something the pointer can hover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HighlightTarget {
    /// Index of a cell in the current frame.
    Cell(usize),
    Month { year: i32, month: u32 },
    Weekday(Weekday),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HighlightKind {
    None,
    Cell,
    Month,
    Weekday,
}

impl HighlightTarget {
    pub fn kind(&self) -> HighlightKind {
        match self {
            HighlightTarget::Cell(_) => HighlightKind::Cell,
            HighlightTarget::Month { .. } => HighlightKind::Month,
            HighlightTarget::Weekday(_) => HighlightKind::Weekday,
        }
    }

    /// Whether a month/weekday highlight dims the rest of the grid.
    pub fn dims_others(&self) -> bool {
        !matches!(self, HighlightTarget::Cell(_))
    }

    /// Whether a cell dated `date` stays lit under this highlight.
    pub fn covers(&self, date: NaiveDate) -> bool {
        match *self {
            HighlightTarget::Cell(_) => true,
            HighlightTarget::Month { year, month } => date.year() == year && date.month() == month,
            HighlightTarget::Weekday(day) => date.weekday() == day,
        }
    }
}

/// Identifies one guarded transition. Completions carrying any other token
/// are stale and release nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct TransitionToken(u64);

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HighlightState {
    pub active: Option<HighlightTarget>,
    pub transition_in_flight: bool,
}

impl HighlightState {
    pub fn kind(&self) -> HighlightKind {
        self.active.map_or(HighlightKind::None, |t| t.kind())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Highlighting(HighlightTarget),
    /// A guarded transition is running.
    Dimming,
}

/// An accepted pointer event: the highlight before and after, and the token
/// the resulting transition must complete when it holds the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightChange {
    pub previous: Option<HighlightTarget>,
    pub current: Option<HighlightTarget>,
    pub guard: Option<TransitionToken>,
}

#[derive(Debug, Default)]
pub struct HighlightController {
    state: HighlightState,
    token: TransitionToken,
    issued: u64,
}

impl HighlightController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &HighlightState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            HighlightState {
                transition_in_flight: true,
                ..
            } => Phase::Dimming,
            HighlightState {
                active: Some(target),
                ..
            } => Phase::Highlighting(target),
            _ => Phase::Idle,
        }
    }

    /// Pointer entered `target`. Returns `None` when dropped by the guard.
    ///
    /// Cell highlights pulse indefinitely and so do not take the guard;
    /// month and weekday highlights do.
    pub fn pointer_enter(&mut self, target: HighlightTarget) -> Option<HighlightChange> {
        if self.state.transition_in_flight {
            trace!("pointer enter {target:?} dropped: transition in flight");
            return None;
        }
        let previous = self.state.active.replace(target);
        let guard = target.dims_others().then(|| self.acquire());
        Some(HighlightChange {
            previous,
            current: Some(target),
            guard,
        })
    }

    /// Pointer left the active target. Returns `None` when dropped by the
    /// guard or when nothing is highlighted.
    pub fn pointer_leave(&mut self) -> Option<HighlightChange> {
        if self.state.transition_in_flight {
            trace!("pointer leave dropped: transition in flight");
            return None;
        }
        let previous = self.state.active.take()?;
        Some(HighlightChange {
            previous: Some(previous),
            current: None,
            guard: Some(self.acquire()),
        })
    }

    /// Take the guard for a redraw's entrance animation.
    pub fn begin_entrance(&mut self) -> TransitionToken {
        self.acquire()
    }

    /// Completion signal for `token`. Releases the guard only when `token`
    /// is the one currently holding it.
    pub fn complete(&mut self, token: TransitionToken) -> bool {
        if self.state.transition_in_flight && token == self.token {
            self.state.transition_in_flight = false;
            true
        } else {
            trace!("stale completion {token:?} ignored");
            false
        }
    }

    /// Back to idle; any outstanding token becomes stale.
    pub fn reset(&mut self) {
        self.state = HighlightState::default();
        self.token = self.next_token();
    }

    /// Opacity a cell dated `date` should settle at under the current state.
    pub fn opacity_for(&self, date: NaiveDate) -> f64 {
        match self.state.active {
            Some(target) if target.dims_others() && !target.covers(date) => DIM_OPACITY,
            _ => 1.0,
        }
    }

    fn acquire(&mut self) -> TransitionToken {
        self.token = self.next_token();
        self.state.transition_in_flight = true;
        self.token
    }

    fn next_token(&mut self) -> TransitionToken {
        self.issued += 1;
        TransitionToken(self.issued)
    }
}

// ─── tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn march() -> HighlightTarget {
        HighlightTarget::Month {
            year: 2024,
            month: 3,
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_starts_idle() {
        let c = HighlightController::new();
        assert_eq!(c.phase(), Phase::Idle);
        assert_eq!(c.state().kind(), HighlightKind::None);
    }

    #[test]
    fn test_cell_enter_does_not_take_guard() {
        let mut c = HighlightController::new();
        let change = c.pointer_enter(HighlightTarget::Cell(4)).unwrap();
        assert_eq!(change.previous, None);
        assert_eq!(change.guard, None);
        assert_eq!(c.phase(), Phase::Highlighting(HighlightTarget::Cell(4)));
        // Moving straight to a neighbour is accepted.
        let change = c.pointer_enter(HighlightTarget::Cell(5)).unwrap();
        assert_eq!(change.previous, Some(HighlightTarget::Cell(4)));
        assert_eq!(c.opacity_for(ymd(2024, 1, 1)), 1.0);
    }

    #[test]
    fn test_enter_dropped_while_in_flight() {
        let mut c = HighlightController::new();
        let token = c.begin_entrance();
        let before = c.state().clone();
        assert!(c.pointer_enter(HighlightTarget::Cell(0)).is_none());
        assert!(c.pointer_enter(march()).is_none());
        assert!(c.pointer_leave().is_none());
        assert_eq!(c.state(), &before);
        assert!(c.complete(token));
        assert_eq!(c.phase(), Phase::Idle);
    }

    #[test]
    fn test_month_highlight_cycle() {
        let mut c = HighlightController::new();
        let change = c.pointer_enter(march()).unwrap();
        let token = change.guard.unwrap();
        assert_eq!(c.phase(), Phase::Dimming);
        assert_eq!(c.opacity_for(ymd(2024, 3, 9)), 1.0);
        assert_eq!(c.opacity_for(ymd(2024, 4, 9)), DIM_OPACITY);
        assert_eq!(c.opacity_for(ymd(2023, 3, 9)), DIM_OPACITY);

        assert!(c.complete(token));
        assert_eq!(c.phase(), Phase::Highlighting(march()));

        let change = c.pointer_leave().unwrap();
        assert_eq!(change.previous, Some(march()));
        assert_eq!(change.current, None);
        assert_eq!(c.phase(), Phase::Dimming);
        assert_eq!(c.opacity_for(ymd(2024, 4, 9)), 1.0);
        assert!(c.complete(change.guard.unwrap()));
        assert_eq!(c.phase(), Phase::Idle);
    }

    #[test]
    fn test_weekday_highlight() {
        let mut c = HighlightController::new();
        c.pointer_enter(HighlightTarget::Weekday(Weekday::Fri)).unwrap();
        assert_eq!(c.state().kind(), HighlightKind::Weekday);
        assert_eq!(c.opacity_for(ymd(2024, 3, 1)), 1.0);
        assert_eq!(c.opacity_for(ymd(2024, 3, 2)), DIM_OPACITY);
    }

    #[test]
    fn test_leave_with_nothing_active_is_noop() {
        let mut c = HighlightController::new();
        assert!(c.pointer_leave().is_none());
        assert!(!c.state().transition_in_flight);
    }

    #[test]
    fn test_stale_token_does_not_release() {
        let mut c = HighlightController::new();
        let old = c.begin_entrance();
        c.reset();
        let fresh = c.begin_entrance();
        assert!(!c.complete(old));
        assert!(c.state().transition_in_flight);
        assert!(c.complete(fresh));
        assert!(!c.complete(fresh));
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut c = HighlightController::new();
        c.pointer_enter(march()).unwrap();
        c.reset();
        c.reset();
        assert_eq!(c.state(), &HighlightState::default());
        assert_eq!(c.phase(), Phase::Idle);
    }
}
