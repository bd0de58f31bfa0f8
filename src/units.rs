//! Pixel ↔ feet/inches conversion for dimension labels and the wall panel.

#[cfg(test)]
#[path = "units_test.rs"]
mod units_test;

use crate::consts::PX_PER_FOOT;

/// Convert a pixel distance to feet.
#[must_use]
pub fn px_to_feet(px: f64) -> f64 {
    px / PX_PER_FOOT
}

/// Convert feet to a pixel distance.
#[must_use]
pub fn feet_to_px(feet: f64) -> f64 {
    feet * PX_PER_FOOT
}

/// Format a pixel distance as a feet/inches label, e.g. `12' 6"`.
///
/// Inches are rounded to the nearest whole inch; a value that rounds up to
/// twelve inches carries into the next foot.
#[must_use]
pub fn px_to_feet_inches(px: f64) -> String {
    // `+ 0.0` folds negative zero so tiny negative inputs print as `0' 0"`.
    let total_inches = (px_to_feet(px) * 12.0).round() + 0.0;
    let feet = (total_inches / 12.0).floor();
    let inches = total_inches - feet * 12.0;
    format!("{feet}' {inches}\"")
}
