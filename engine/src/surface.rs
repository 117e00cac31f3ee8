//! The drawing surface the coordinator renders into.
//!
//! A surface owns shape elements, runs timed attribute transitions on its
//! own clock, and reports hover targets. When a transition finishes, its
//! [`Continuation`] is handed back from [`Surface::advance`] for the
//! coordinator to resume; transitions interrupted by a newer one on the same
//! element, or whose element was removed, never report.

use std::time::Duration;

use heatmap_common::Rgb;

use crate::highlight::{HighlightTarget, TransitionToken};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(pub(crate) u64);

/// Element groups, drawn bottom to top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    Items,
    Labels,
    Tooltip,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Rgb,
    },
    Text {
        x: f64,
        y: f64,
        content: String,
        font_size: f64,
    },
    Tooltip {
        x: f64,
        y: f64,
        width: f64,
        text: String,
    },
}

/// An animatable attribute and its target value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Attr {
    X(f64),
    Y(f64),
    Width(f64),
    Height(f64),
    Opacity(f64),
}

impl Attr {
    pub fn value(self) -> f64 {
        match self {
            Attr::X(v) | Attr::Y(v) | Attr::Width(v) | Attr::Height(v) | Attr::Opacity(v) => v,
        }
    }

    /// Same attribute, different value.
    pub fn with_value(self, v: f64) -> Attr {
        match self {
            Attr::X(_) => Attr::X(v),
            Attr::Y(_) => Attr::Y(v),
            Attr::Width(_) => Attr::Width(v),
            Attr::Height(_) => Attr::Height(v),
            Attr::Opacity(_) => Attr::Opacity(v),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulsePhase {
    Grow,
    Shrink,
}

/// Work to resume once a transition completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    /// One element of a guarded transition group finished.
    Guard(TransitionToken),
    /// One half of a hovered cell's pulse finished.
    Pulse {
        cell: usize,
        generation: u64,
        phase: PulsePhase,
    },
}

/// A scheduled change of one or more attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub to: Vec<Attr>,
    pub duration: Duration,
    pub delay: Duration,
    pub on_end: Option<Continuation>,
}

impl Transition {
    pub fn new(duration: Duration) -> Self {
        Self {
            to: Vec::new(),
            duration,
            delay: Duration::ZERO,
            on_end: None,
        }
    }

    pub fn attr(mut self, attr: Attr) -> Self {
        self.to.push(attr);
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn notify(mut self, continuation: Continuation) -> Self {
        self.on_end = Some(continuation);
        self
    }
}

pub trait Surface {
    /// Current width of the hosting container, if it can be measured.
    fn container_width(&self) -> Option<f64>;

    /// Size the drawing area.
    fn resize_canvas(&mut self, width: f64, height: f64);

    fn create(&mut self, layer: Layer, shape: Shape, opacity: f64) -> ElementId;

    /// Remove every element of `layer`, abandoning their transitions.
    fn clear(&mut self, layer: Layer);

    /// Set attributes immediately. Unknown ids are ignored.
    fn set(&mut self, id: ElementId, attrs: &[Attr]);

    fn set_text(&mut self, id: ElementId, text: &str);

    /// Start `transition` on `id`, interrupting any transition already
    /// running there.
    fn animate(&mut self, id: ElementId, transition: Transition);

    /// Report `target` when the pointer enters or leaves `id`.
    fn set_hover_target(&mut self, id: ElementId, target: HighlightTarget);

    /// Move the surface clock forward and collect finished continuations.
    fn advance(&mut self, dt: Duration) -> Vec<Continuation>;

    fn is_animating(&self) -> bool;
}
