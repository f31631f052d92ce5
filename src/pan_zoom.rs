//! Zoom, pan and reset over every axis a set of series is drawn against.
//!
//! Gesture recognition lives in the rendering layer; these handlers receive the already
//! interpreted gesture (a relative zoom, a pan distance) and apply it to the range map.

use std::collections::HashMap;

use crate::data::assignment::{resolve, AxisAssignments, AxisSide};
use crate::data::axis_range::AxisRange;
use crate::data::ordinal_range::OrdinalRange;
use crate::error::{Error, Result};

/// Ranges that support the zoom/pan/reset transitions.
pub trait ZoomableRange: Sized {
    fn scale_factor(&self) -> f64;
    fn scale(&self, factor: f64, pivot: f64) -> Self;
    fn constrained_scale(&self, factor: f64, pivot: f64, bounds: (f64, f64)) -> Self;
    fn translate(&self, amount: f64) -> Self;
    fn reset(&self) -> Self;
}

impl ZoomableRange for AxisRange {
    fn scale_factor(&self) -> f64 {
        AxisRange::scale_factor(self)
    }
    fn scale(&self, factor: f64, pivot: f64) -> Self {
        AxisRange::scale(self, factor, pivot)
    }
    fn constrained_scale(&self, factor: f64, pivot: f64, bounds: (f64, f64)) -> Self {
        AxisRange::constrained_scale(self, factor, pivot, bounds)
    }
    fn translate(&self, amount: f64) -> Self {
        AxisRange::translate(self, amount)
    }
    fn reset(&self) -> Self {
        AxisRange::reset(self)
    }
}

impl ZoomableRange for OrdinalRange {
    fn scale_factor(&self) -> f64 {
        OrdinalRange::scale_factor(self)
    }
    fn scale(&self, factor: f64, pivot: f64) -> Self {
        OrdinalRange::scale(self, factor, pivot)
    }
    fn constrained_scale(&self, factor: f64, pivot: f64, bounds: (f64, f64)) -> Self {
        OrdinalRange::constrained_scale(self, factor, pivot, bounds)
    }
    fn translate(&self, amount: f64) -> Self {
        OrdinalRange::translate(self, amount)
    }
    fn reset(&self) -> Self {
        OrdinalRange::reset(self)
    }
}

/// Registered axis ids on `side` that the given series are drawn against. Series whose
/// assignment names an unknown axis count toward `default_id`.
pub fn axes_for_series<'n, R, I>(
    series_names: I,
    assignments: &AxisAssignments,
    side: AxisSide,
    default_id: &str,
    ranges: &HashMap<String, R>,
) -> Vec<String>
where
    I: IntoIterator<Item = &'n str>,
{
    resolve(
        |a| {
            let id = side.axis_id(a, default_id);
            (if ranges.contains_key(id) { id } else { default_id }).to_string()
        },
        series_names,
        assignments,
    )
    .into_keys()
    .filter(|id| ranges.contains_key(id))
    .collect()
}

/// Zoom each listed axis by the relative factor `delta` about `pivot`, optionally keeping
/// it inside `bounds`.
///
/// `delta` multiplies the current scale factor, so `delta > 1` zooms out. Non-finite or
/// non-positive values are rejected before any range is touched.
pub fn zoom_axes<R: ZoomableRange>(
    ranges: &mut HashMap<String, R>,
    axis_ids: &[String],
    delta: f64,
    pivot: f64,
    bounds: Option<(f64, f64)>,
) -> Result<()> {
    if !delta.is_finite() || delta <= 0.0 {
        return Err(Error::InvalidZoomFactor(delta));
    }
    for id in axis_ids {
        if let Some(range) = ranges.get_mut(id) {
            let factor = range.scale_factor() * delta;
            *range = match bounds {
                Some(b) => range.constrained_scale(factor, pivot, b),
                None => range.scale(factor, pivot),
            };
        }
    }
    Ok(())
}

/// Shift each listed axis by `amount`.
pub fn pan_axes<R: ZoomableRange>(ranges: &mut HashMap<String, R>, axis_ids: &[String], amount: f64) {
    for id in axis_ids {
        if let Some(range) = ranges.get_mut(id) {
            *range = range.translate(amount);
        }
    }
}

/// Put each listed axis back to its original extent.
pub fn reset_axes<R: ZoomableRange>(ranges: &mut HashMap<String, R>, axis_ids: &[String]) {
    for id in axis_ids {
        if let Some(range) = ranges.get_mut(id) {
            *range = range.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::assignment::AxisAssignment;
    use approx::assert_relative_eq;

    fn ranges() -> HashMap<String, AxisRange> {
        let mut m = HashMap::new();
        m.insert("x-default".to_string(), AxisRange::new(0.0, 100.0));
        m.insert("x-top".to_string(), AxisRange::new(0.0, 1000.0));
        m
    }

    fn table() -> AxisAssignments {
        let mut t = AxisAssignments::new();
        t.insert("a".into(), AxisAssignment::new("x-top", "y"));
        t.insert("b".into(), AxisAssignment::new("x-missing", "y"));
        t
    }

    #[test]
    fn unknown_axes_fall_back_to_default() {
        let ids = axes_for_series(["a", "b", "c"], &table(), AxisSide::X, "x-default", &ranges());
        assert_eq!(ids, vec!["x-top".to_string(), "x-default".to_string()]);
    }

    #[test]
    fn zoom_is_relative_to_current_scale() {
        let mut r = ranges();
        let ids = vec!["x-default".to_string()];
        zoom_axes(&mut r, &ids, 0.5, 0.0, None).unwrap();
        zoom_axes(&mut r, &ids, 0.5, 0.0, None).unwrap();
        let x = r["x-default"];
        assert_relative_eq!(x.end(), 25.0);
        assert_relative_eq!(x.scale_factor(), 0.25);
        assert_eq!(r["x-top"], AxisRange::new(0.0, 1000.0));
    }

    #[test]
    fn zoom_rejects_non_positive_factor() {
        let mut r = ranges();
        let ids = vec!["x-default".to_string()];
        assert!(matches!(
            zoom_axes(&mut r, &ids, 0.0, 0.0, None),
            Err(Error::InvalidZoomFactor(_))
        ));
        assert!(zoom_axes(&mut r, &ids, f64::NAN, 0.0, None).is_err());
        assert_eq!(r["x-default"], AxisRange::new(0.0, 100.0));
    }

    #[test]
    fn pan_then_reset() {
        let mut r = ranges();
        let ids = vec!["x-default".to_string(), "x-top".to_string()];
        pan_axes(&mut r, &ids, 10.0);
        assert_relative_eq!(r["x-default"].start(), 10.0);
        assert_relative_eq!(r["x-top"].end(), 1010.0);
        reset_axes(&mut r, &ids);
        assert_eq!(r["x-top"], AxisRange::new(0.0, 1000.0));
    }

    #[test]
    fn ordinal_axes_zoom_too() {
        let mut r = HashMap::new();
        r.insert("cat".to_string(), OrdinalRange::new(["a", "b"], 0.0, 200.0));
        zoom_axes(&mut r, &["cat".to_string()], 2.0, 0.0, Some((0.0, 300.0))).unwrap();
        assert_relative_eq!(r["cat"].end(), 300.0);
    }
}
