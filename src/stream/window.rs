//! How a time axis window moves once the data passes its right edge.

use crate::config::TimeWindowBehavior;
use crate::data::axis_range::AxisRange;

/// The replacement window for an axis whose current time `t` lies beyond `range.end()`.
///
/// `Scroll` keeps the width `w` and slides: `[max(0, t - w), max(t, w)]`. The low end is
/// clamped at zero and the window never gets narrower than one width near the origin.
/// `Squeeze` pins the start at `initial_start` and stretches the end to `t`.
///
/// Returns the range unchanged when `t` is not past the end.
pub fn advance_window(
    range: &AxisRange,
    t: f64,
    behavior: TimeWindowBehavior,
    initial_start: f64,
) -> AxisRange {
    if t.is_nan() || t <= range.end() {
        return *range;
    }
    match behavior {
        TimeWindowBehavior::Scroll => {
            let width = range.span();
            range.update((t - width).max(0.0), t.max(width))
        }
        TimeWindowBehavior::Squeeze => range.update(initial_start, t),
    }
}
