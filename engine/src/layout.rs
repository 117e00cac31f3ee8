//! Pixel geometry of the grid, its labels and the tooltip.

use heatmap_common::{LayoutSettings, TooltipSettings};
use serde::Serialize;
use tracing::debug;

/// Rows in the grid, one per weekday.
pub const ROWS: u32 = 7;

/// Computed geometry for one redraw. Never reused across windows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Geometry {
    /// Clamped container width; also the grid width.
    pub width: f64,
    pub grid_height: f64,
    /// Edge length of a full-size cell slot.
    pub cell_size: f64,
    pub gutter: f64,
    pub label_padding: f64,
    pub week_columns: u32,
}

impl Geometry {
    pub fn grid_width(&self) -> f64 {
        self.width
    }

    /// Distance between the origins of adjacent slots.
    pub fn pitch(&self) -> f64 {
        self.cell_size + self.gutter
    }

    /// Top-left corner of the slot at (`column`, `row`).
    pub fn cell_position(&self, column: i64, row: u32) -> (f64, f64) {
        let x = column as f64 * self.pitch() + self.label_padding;
        let y = self.label_padding + row as f64 * self.pitch();
        (x, y)
    }

    /// Top-left corner of a cell of `size` centred in its slot.
    pub fn centered_origin(&self, column: i64, row: u32, size: f64) -> (f64, f64) {
        let (x, y) = self.cell_position(column, row);
        let offset = (self.cell_size - size) / 2.0;
        (x + offset, y + offset)
    }

    pub fn slot_center(&self, column: i64, row: u32) -> (f64, f64) {
        let (x, y) = self.cell_position(column, row);
        (x + self.cell_size / 2.0, y + self.cell_size / 2.0)
    }

    pub fn label_font_size(&self) -> f64 {
        (self.label_padding / 3.0).floor()
    }

    /// Anchor of the `index`-th of `count` month labels: months share the
    /// full width evenly and sit half a share in.
    pub fn month_label_position(&self, index: usize, count: usize) -> (f64, f64) {
        let share = self.width / count.max(1) as f64;
        let x = index as f64 * share + share / 2.0;
        (x, self.label_padding / 2.0)
    }

    /// Anchor of the weekday label for `row`, banded over the grid height
    /// with whole-pixel bands.
    pub fn weekday_label_position(&self, row: u32) -> (f64, f64) {
        let (start, stop) = (self.label_padding, self.grid_height);
        let step = ((stop - start) / ROWS as f64).floor();
        let first = (start + (stop - start - step * ROWS as f64) / 2.0).round();
        let y = first + step * row as f64 + step / 1.75;
        (self.label_padding / 3.0, y)
    }

    /// Tooltip anchor for the slot at (`column`, `row`), flipped to the left
    /// of the cell when it would overflow the right edge.
    pub fn tooltip_position(&self, column: i64, row: u32, tooltip: &TooltipSettings) -> (f64, f64) {
        let (mut x, y) = self.slot_center(column, row);
        if self.width - x < tooltip.width + tooltip.padding * 3.0 {
            x -= tooltip.width + tooltip.padding * 2.0;
        }
        (x, y)
    }
}

/// Turns a container width and a week-column count into [`Geometry`].
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutEngine {
    gutter: f64,
    label_padding: f64,
    min_width: f64,
}

impl LayoutEngine {
    pub fn new(settings: &LayoutSettings) -> Self {
        Self {
            gutter: settings.gutter,
            label_padding: settings.label_padding,
            min_width: settings.min_width,
        }
    }

    /// Geometry for the given container. Widths below the floor, and
    /// unmeasurable widths, lay out at the floor.
    pub fn compute(&self, container_width: Option<f64>, week_columns: u32) -> Geometry {
        let width = match container_width {
            Some(w) if w.is_finite() && w >= self.min_width => w,
            _ => self.min_width,
        };
        let columns = week_columns.max(1);
        let cell_size = ((width - self.label_padding) / columns as f64 - self.gutter).max(0.0);
        let grid_height = self.label_padding + ROWS as f64 * (cell_size + self.gutter);

        debug!(
            "Layout: width={width} columns={columns} cell_size={cell_size:.2} height={grid_height:.2}"
        );

        Geometry {
            width,
            grid_height,
            cell_size,
            gutter: self.gutter,
            label_padding: self.label_padding,
            week_columns: columns,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> LayoutEngine {
        LayoutEngine::new(&LayoutSettings::default())
    }

    #[test]
    fn test_compute_at_floor() {
        let g = engine().compute(Some(1000.0), 53);
        assert_eq!(g.width, 1000.0);
        let expected = 960.0 / 53.0 - 5.0;
        assert!((g.cell_size - expected).abs() < 1e-9);
        assert!((g.grid_height - (40.0 + 7.0 * (expected + 5.0))).abs() < 1e-9);
    }

    #[test]
    fn test_narrow_and_unmeasurable_widths_clamp() {
        let at_floor = engine().compute(Some(1000.0), 53);
        for w in [None, Some(0.0), Some(-20.0), Some(640.0), Some(f64::NAN)] {
            assert_eq!(engine().compute(w, 53), at_floor, "width {w:?}");
        }
    }

    #[test]
    fn test_wider_container_grows_cells() {
        let g = engine().compute(Some(1600.0), 53);
        assert_eq!(g.grid_width(), 1600.0);
        assert!(g.cell_size > engine().compute(None, 53).cell_size);
    }

    #[test]
    fn test_cell_positions() {
        let g = engine().compute(Some(1100.0), 53);
        // (1100 - 40) / 53 - 5 = 15
        assert_eq!(g.cell_size, 15.0);
        assert_eq!(g.cell_position(0, 0), (40.0, 40.0));
        assert_eq!(g.cell_position(2, 3), (80.0, 100.0));
        assert_eq!(g.centered_origin(2, 3, 12.0), (81.5, 101.5));
        assert_eq!(g.slot_center(0, 0), (47.5, 47.5));
    }

    #[test]
    fn test_label_positions() {
        let g = engine().compute(Some(1100.0), 53);
        assert_eq!(g.label_font_size(), 13.0);
        assert_eq!(g.month_label_position(0, 12), (1100.0 / 24.0, 20.0));
        // Bands of 20px starting at y = 40.
        assert_eq!(g.weekday_label_position(0), (40.0 / 3.0, 40.0 + 20.0 / 1.75));
        assert_eq!(g.weekday_label_position(6).1, 160.0 + 20.0 / 1.75);
    }

    #[test]
    fn test_tooltip_flips_near_right_edge() {
        let g = engine().compute(Some(1100.0), 53);
        let tooltip = TooltipSettings::default();
        let (x, y) = g.tooltip_position(0, 0, &tooltip);
        assert_eq!((x, y), (47.5, 47.5));
        // Column 52 centre is at 40 + 52 * 20 + 7.5 = 1087.5
        let (x, _) = g.tooltip_position(52, 0, &tooltip);
        assert_eq!(x, 1087.5 - 280.0);
    }
}
