//! In-memory retained scene: a [`Surface`] that keeps its elements in a map,
//! interpolates transitions on a virtual clock, hit-tests pointer positions
//! and serialises to SVG.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use tracing::trace;

use crate::highlight::HighlightTarget;
use crate::surface::{Attr, Continuation, ElementId, Layer, Shape, Surface, Transition};

const LABEL_FILL: &str = "#aaaaaa";
const TOOLTIP_BACKGROUND: &str = "#495057";
const TOOLTIP_HEIGHT: f64 = 44.0;
const TOOLTIP_FONT_SIZE: f64 = 12.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub layer: Layer,
    pub shape: Shape,
    pub opacity: f64,
    pub hover: Option<HighlightTarget>,
}

impl Element {
    fn get(&self, attr: Attr) -> f64 {
        match (&self.shape, attr) {
            (_, Attr::Opacity(_)) => self.opacity,
            (Shape::Rect { x, .. }, Attr::X(_))
            | (Shape::Text { x, .. }, Attr::X(_))
            | (Shape::Tooltip { x, .. }, Attr::X(_)) => *x,
            (Shape::Rect { y, .. }, Attr::Y(_))
            | (Shape::Text { y, .. }, Attr::Y(_))
            | (Shape::Tooltip { y, .. }, Attr::Y(_)) => *y,
            (Shape::Rect { width, .. }, Attr::Width(_))
            | (Shape::Tooltip { width, .. }, Attr::Width(_)) => *width,
            (Shape::Rect { height, .. }, Attr::Height(_)) => *height,
            _ => 0.0,
        }
    }

    fn apply(&mut self, attr: Attr) {
        match (&mut self.shape, attr) {
            (_, Attr::Opacity(v)) => self.opacity = v.clamp(0.0, 1.0),
            (Shape::Rect { x, .. }, Attr::X(v))
            | (Shape::Text { x, .. }, Attr::X(v))
            | (Shape::Tooltip { x, .. }, Attr::X(v)) => *x = v,
            (Shape::Rect { y, .. }, Attr::Y(v))
            | (Shape::Text { y, .. }, Attr::Y(v))
            | (Shape::Tooltip { y, .. }, Attr::Y(v)) => *y = v,
            (Shape::Rect { width, .. }, Attr::Width(v))
            | (Shape::Tooltip { width, .. }, Attr::Width(v)) => *width = v,
            (Shape::Rect { height, .. }, Attr::Height(v)) => *height = v,
            _ => {}
        }
    }

    fn contains(&self, px: f64, py: f64) -> bool {
        match &self.shape {
            Shape::Rect {
                x,
                y,
                width,
                height,
                ..
            } => px >= *x && px <= x + width && py >= *y && py <= y + height,
            Shape::Text {
                x,
                y,
                content,
                font_size,
            } => {
                // Text is anchored at its baseline; approximate the glyph box.
                let w = font_size * content.chars().count() as f64;
                px >= *x && px <= x + w && py >= y - font_size && py <= *y
            }
            Shape::Tooltip { .. } => false,
        }
    }
}

#[derive(Debug, Clone)]
struct Running {
    started: Duration,
    transition: Transition,
    /// Start values, captured once the delay has elapsed.
    from: Option<Vec<Attr>>,
}

#[derive(Debug, Clone, Default)]
pub struct Scene {
    container_width: Option<f64>,
    canvas: (f64, f64),
    clock: Duration,
    next_id: u64,
    elements: BTreeMap<ElementId, Element>,
    running: BTreeMap<ElementId, Running>,
}

impl Scene {
    pub fn new(container_width: Option<f64>) -> Self {
        Self {
            container_width,
            ..Self::default()
        }
    }

    pub fn set_container_width(&mut self, width: Option<f64>) {
        self.container_width = width;
    }

    pub fn canvas(&self) -> (f64, f64) {
        self.canvas
    }

    pub fn now(&self) -> Duration {
        self.clock
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    pub fn elements(&self, layer: Layer) -> impl Iterator<Item = (ElementId, &Element)> {
        self.elements
            .iter()
            .filter(move |(_, el)| el.layer == layer)
            .map(|(id, el)| (*id, el))
    }

    /// Topmost hover target under the point, if any.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<HighlightTarget> {
        let mut hits: Vec<(&ElementId, &Element)> = self
            .elements
            .iter()
            .filter(|(_, el)| el.hover.is_some() && el.contains(x, y))
            .collect();
        hits.sort_by_key(|(id, el)| (el.layer, **id));
        hits.last().and_then(|(_, el)| el.hover)
    }

    pub fn svg(&self) -> SvgDocument<'_> {
        SvgDocument { scene: self }
    }
}

impl Surface for Scene {
    fn container_width(&self) -> Option<f64> {
        self.container_width
    }

    fn resize_canvas(&mut self, width: f64, height: f64) {
        self.canvas = (width, height);
    }

    fn create(&mut self, layer: Layer, shape: Shape, opacity: f64) -> ElementId {
        self.next_id += 1;
        let id = ElementId(self.next_id);
        self.elements.insert(
            id,
            Element {
                layer,
                shape,
                opacity: opacity.clamp(0.0, 1.0),
                hover: None,
            },
        );
        id
    }

    fn clear(&mut self, layer: Layer) {
        self.elements.retain(|_, el| el.layer != layer);
        let elements = &self.elements;
        self.running.retain(|id, _| elements.contains_key(id));
    }

    fn set(&mut self, id: ElementId, attrs: &[Attr]) {
        if let Some(el) = self.elements.get_mut(&id) {
            for attr in attrs {
                el.apply(*attr);
            }
        }
    }

    fn set_text(&mut self, id: ElementId, text: &str) {
        if let Some(el) = self.elements.get_mut(&id) {
            match &mut el.shape {
                Shape::Text { content, .. } => *content = text.to_string(),
                Shape::Tooltip { text: body, .. } => *body = text.to_string(),
                Shape::Rect { .. } => {}
            }
        }
    }

    fn animate(&mut self, id: ElementId, transition: Transition) {
        if !self.elements.contains_key(&id) {
            return;
        }
        if self.running.contains_key(&id) {
            trace!("transition on {id:?} interrupted");
        }
        self.running.insert(
            id,
            Running {
                started: self.clock,
                transition,
                from: None,
            },
        );
    }

    fn set_hover_target(&mut self, id: ElementId, target: HighlightTarget) {
        if let Some(el) = self.elements.get_mut(&id) {
            el.hover = Some(target);
        }
    }

    fn advance(&mut self, dt: Duration) -> Vec<Continuation> {
        self.clock += dt;
        let mut fired = Vec::new();
        let mut finished = Vec::new();

        for (id, run) in self.running.iter_mut() {
            let Some(el) = self.elements.get_mut(id) else {
                finished.push(*id);
                continue;
            };
            let elapsed = self.clock.saturating_sub(run.started);
            if elapsed < run.transition.delay {
                continue;
            }
            let targets = &run.transition.to;
            let from = run
                .from
                .get_or_insert_with(|| targets.iter().map(|a| a.with_value(el.get(*a))).collect());

            let active = elapsed - run.transition.delay;
            let t = if run.transition.duration.is_zero() {
                1.0
            } else {
                active.as_secs_f64() / run.transition.duration.as_secs_f64()
            };

            if t >= 1.0 {
                for attr in targets {
                    el.apply(*attr);
                }
                finished.push(*id);
                fired.extend(run.transition.on_end);
            } else {
                for (start, end) in from.iter().zip(targets) {
                    let v = start.value() + (end.value() - start.value()) * t;
                    el.apply(end.with_value(v));
                }
            }
        }

        for id in finished {
            self.running.remove(&id);
        }
        fired
    }

    fn is_animating(&self) -> bool {
        !self.running.is_empty()
    }
}

/// SVG rendering of a [`Scene`] at its current clock.
pub struct SvgDocument<'a> {
    scene: &'a Scene,
}

impl fmt::Display for SvgDocument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (w, h) = self.scene.canvas;
        writeln!(
            f,
            r#"<svg xmlns="http://www.w3.org/2000/svg" class="svg" width="{}" height="{}">"#,
            num(w),
            num(h)
        )?;
        for (layer, class) in [
            (Layer::Items, "items"),
            (Layer::Labels, "labels"),
            (Layer::Tooltip, "tooltips"),
        ] {
            writeln!(f, r#"<g class="{class}">"#)?;
            for (_, el) in self.scene.elements(layer) {
                write_element(f, el)?;
            }
            writeln!(f, "</g>")?;
        }
        writeln!(f, "</svg>")
    }
}

fn write_element(f: &mut fmt::Formatter<'_>, el: &Element) -> fmt::Result {
    let opacity = num(el.opacity);
    match &el.shape {
        Shape::Rect {
            x,
            y,
            width,
            height,
            fill,
        } => writeln!(
            f,
            r#"<rect class="item item-circle" x="{}" y="{}" width="{}" height="{}" fill="{fill}" opacity="{opacity}"/>"#,
            num(*x),
            num(*y),
            num(*width),
            num(*height),
        ),
        Shape::Text {
            x,
            y,
            content,
            font_size,
        } => writeln!(
            f,
            r#"<text class="label" x="{}" y="{}" font-size="{}px" fill="{LABEL_FILL}" opacity="{opacity}">{}</text>"#,
            num(*x),
            num(*y),
            num(*font_size),
            escape(content),
        ),
        Shape::Tooltip { x, y, width, text } => {
            writeln!(f, r#"<g class="heatmap-tooltip" opacity="{opacity}">"#)?;
            writeln!(
                f,
                r#"<rect x="{}" y="{}" width="{}" height="{}" rx="4" fill="{TOOLTIP_BACKGROUND}"/>"#,
                num(*x),
                num(*y),
                num(*width),
                num(TOOLTIP_HEIGHT),
            )?;
            writeln!(
                f,
                r##"<text x="{}" y="{}" font-size="{}px" fill="#ffffff"><tspan font-weight="bold">{}</tspan></text>"##,
                num(x + 15.0),
                num(y + TOOLTIP_HEIGHT / 2.0 + TOOLTIP_FONT_SIZE / 3.0),
                num(TOOLTIP_FONT_SIZE),
                escape(text),
            )?;
            writeln!(f, "</g>")
        }
    }
}

/// Two decimals, trailing zeros trimmed.
fn num(v: f64) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

// ─── tests ───────────────────────────────────────────────────────────────
