//! Continuous axis windows that can be zoomed and panned while remembering where
//! they started.

use serde::{Deserialize, Serialize};

/// A continuous `[start, end]` axis window.
///
/// Every transition returns a new value; `original` is fixed at construction and the
/// scale factor is always expressed relative to it, so
/// `scale_factor == (end - start) / (original.1 - original.0)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    start: f64,
    end: f64,
    original: (f64, f64),
    scale_factor: f64,
}

impl AxisRange {
    /// Create a range from two ends in any order. The smaller one becomes the start.
    pub fn new(start: f64, end: f64) -> Self {
        let lo = start.min(end);
        let hi = start.max(end);
        Self {
            start: lo,
            end: hi,
            original: (lo, hi),
            scale_factor: 1.0,
        }
    }

    #[inline]
    pub fn start(&self) -> f64 {
        self.start
    }

    #[inline]
    pub fn end(&self) -> f64 {
        self.end
    }

    #[inline]
    pub fn original(&self) -> (f64, f64) {
        self.original
    }

    #[inline]
    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// Width of the current window.
    #[inline]
    pub fn span(&self) -> f64 {
        self.end - self.start
    }

    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.start && value <= self.end
    }

    pub fn matches_original(&self, start: f64, end: f64) -> bool {
        self.original.0 == start && self.original.1 == end
    }

    /// Zoom about `pivot` so the resulting scale factor is `factor`.
    ///
    /// Distances from `pivot` are multiplied by `factor / self.scale_factor()`, so repeated
    /// zooms compose from the present extent. The factor is not validated here: zero or
    /// negative factors collapse or flip the window.
    #[must_use]
    pub fn scale(&self, factor: f64, pivot: f64) -> Self {
        let ratio = factor / self.scale_factor;
        Self {
            start: pivot - (pivot - self.start) * ratio,
            end: pivot + (self.end - pivot) * ratio,
            original: self.original,
            scale_factor: factor,
        }
    }

    /// Like [`scale`](Self::scale) but keeps both ends inside `bounds`.
    #[must_use]
    pub fn constrained_scale(&self, factor: f64, pivot: f64, bounds: (f64, f64)) -> Self {
        let scaled = self.scale(factor, pivot);
        let (lo, hi) = bounds;
        scaled.update(scaled.start.max(lo).min(hi), scaled.end.min(hi).max(lo))
    }

    #[must_use]
    pub fn translate(&self, amount: f64) -> Self {
        Self {
            start: self.start + amount,
            end: self.end + amount,
            ..*self
        }
    }

    /// Replace the window ends; the scale factor is recomputed against the original.
    #[must_use]
    pub fn update(&self, start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            original: self.original,
            scale_factor: (end - start) / (self.original.1 - self.original.0),
        }
    }

    /// Back to the original extent.
    #[must_use]
    pub fn reset(&self) -> Self {
        Self::new(self.original.0, self.original.1)
    }
}

impl From<(f64, f64)> for AxisRange {
    fn from((start, end): (f64, f64)) -> Self {
        Self::new(start, end)
    }
}
