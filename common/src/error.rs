//! Error type shared by the heatmap crates.

/// Errors reported synchronously to the host.
///
/// None of these are transient: each one is an input-contract violation and
/// is reported once, never retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HeatmapError {
    /// A redraw was requested without a dataset.
    #[error("contribution data is missing; a redraw needs a dataset")]
    MissingData,

    /// The record list as a whole is not a JSON array.
    #[error("invalid record list: {reason}")]
    InvalidDocument {
        /// Description of the problem.
        reason: String,
    },

    /// A record failed validation at the input boundary.
    #[error("invalid record at index {index}: {reason}")]
    InvalidRecord {
        /// Position of the record in the supplied list.
        index: usize,
        /// Description of the problem.
        reason: String,
    },

    /// A colour string could not be parsed.
    #[error("invalid colour: {value:?}")]
    InvalidColor {
        /// The rejected input.
        value: String,
    },

    /// A configuration value is out of range.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },
}
