//! Heatmap Web – preview host for the contribution heatmap engine.
//!
//! Loads settings and activity data, then either serves rendered heatmaps
//! over HTTP or writes a single SVG to disk.

pub mod data;
pub mod render;
pub mod server;
