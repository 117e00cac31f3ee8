//! Layout and scaling engine for a calendar contribution heatmap.
//!
//! Turns `(date, total)` records into a week × weekday grid of sized,
//! coloured cells with month and weekday labels, and drives the hover
//! highlight and tooltip state on top of a [`surface::Surface`].
//!
//! ```text
//! calendar ─┐
//! scale ────┼─> coordinator ──> surface (scene: in-memory + SVG)
//! layout ───┤
//! highlight ┘
//! ```

pub mod calendar;
pub mod coordinator;
pub mod highlight;
pub mod layout;
pub mod scale;
pub mod scene;
pub mod surface;

pub use calendar::{CalendarIndexer, YearWindow};
pub use coordinator::{build_frame, select_records, EventSink, Frame, GridCell, Label, RenderCoordinator};
pub use highlight::{HighlightController, HighlightKind, HighlightState, HighlightTarget, Phase};
pub use layout::{Geometry, LayoutEngine};
pub use scale::{max_total, scale_color, scale_size};
pub use scene::Scene;
pub use surface::{Surface, Transition};
