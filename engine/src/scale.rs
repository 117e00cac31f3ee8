//! Value-to-visual scaling: cell colour and cell size from a daily total.

use heatmap_common::{ActivityRecord, Rgb};

/// Fraction of `max_total` by which the colour domain extends below zero,
/// so that small positive totals are still visibly tinted.
const DOMAIN_HEADROOM: f64 = 0.15;

/// Share of the base size every non-empty day keeps regardless of total.
const MIN_SIZE_SHARE: f64 = 0.75;

/// Largest effective total among `records`, or 0 for an empty set.
pub fn max_total(records: &[ActivityRecord]) -> f64 {
    records
        .iter()
        .map(ActivityRecord::effective_total)
        .fold(0.0, f64::max)
}

/// Colour for `total`: `fill` for zero, otherwise white → `base` over
/// `[-0.15 * max_total, max_total]`.
///
/// A degenerate domain (`max_total <= 0`) resolves to `base`.
pub fn scale_color(total: f64, max_total: f64, base: Rgb, fill: Rgb) -> Rgb {
    let total = sanitize(total);
    if total == 0.0 {
        return fill;
    }
    let lo = -DOMAIN_HEADROOM * max_total;
    let span = max_total - lo;
    if span.is_nan() || span <= 0.0 {
        return base;
    }
    Rgb::WHITE.lerp(base, (total - lo) / span)
}

/// Cell edge length for `total`: between 75% and 100% of `base_size`.
pub fn scale_size(total: f64, max_total: f64, base_size: f64) -> f64 {
    if max_total.is_nan() || max_total <= 0.0 {
        return base_size;
    }
    let ratio = sanitize(total).min(max_total) / max_total;
    base_size * MIN_SIZE_SHARE + base_size * ratio * (1.0 - MIN_SIZE_SHARE)
}

fn sanitize(total: f64) -> f64 {
    if total.is_finite() {
        total.max(0.0)
    } else {
        0.0
    }
}
