//! Shared types for the contribution heatmap: activity records, settings,
//! colours, locale strings and host events.

pub mod color;
pub mod config;
pub mod error;
pub mod locale;
pub mod protocol;
pub mod record;

pub use color::Rgb;
pub use config::{DuplicatePolicy, HeatmapConfig, LayoutSettings, Settings, TooltipSettings};
pub use error::HeatmapError;
pub use locale::Locale;
pub use protocol::{HostEvent, WindowChange};
pub use record::{ActivityDetail, ActivityRecord};
