//! Category (band) axis windows.
//!
//! The categories are spread evenly across a pixel interval. Zooming stretches the pixel
//! interval about a pixel location, so the scale factor is the ratio of the current pixel
//! distance to the original one.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrdinalRange {
    categories: Vec<String>,
    start: f64,
    end: f64,
    original: (f64, f64),
}

impl OrdinalRange {
    /// Create a band axis over `categories` laid out on the pixel interval `[start, end]`.
    pub fn new<I, S>(categories: I, start: f64, end: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lo = start.min(end);
        let hi = start.max(end);
        Self {
            categories: categories.into_iter().map(Into::into).collect(),
            start: lo,
            end: hi,
            original: (lo, hi),
        }
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
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
    pub fn current_distance(&self) -> f64 {
        self.end - self.start
    }

    #[inline]
    pub fn original_distance(&self) -> f64 {
        self.original.1 - self.original.0
    }

    #[inline]
    pub fn scale_factor(&self) -> f64 {
        self.current_distance() / self.original_distance()
    }

    pub fn matches_original(&self, start: f64, end: f64) -> bool {
        self.original.0 == start && self.original.1 == end
    }

    /// Width of one category band in pixels.
    pub fn band_width(&self) -> f64 {
        if self.categories.is_empty() {
            return self.current_distance();
        }
        self.current_distance() / self.categories.len() as f64
    }

    /// Pixel centre of a category's band.
    pub fn position_of(&self, category: &str) -> Option<f64> {
        let idx = self.categories.iter().position(|c| c == category)?;
        Some(self.start + (idx as f64 + 0.5) * self.band_width())
    }

    /// Category whose band contains `pixel`.
    pub fn category_at(&self, pixel: f64) -> Option<&str> {
        if self.categories.is_empty() || !pixel.is_finite() || pixel < self.start || pixel > self.end {
            return None;
        }
        let idx = ((pixel - self.start) / self.band_width()).floor() as usize;
        self.categories
            .get(idx.min(self.categories.len() - 1))
            .map(String::as_str)
    }

    /// Add a category at the end of the axis if it is not already present.
    pub fn with_category<S: Into<String>>(mut self, category: S) -> Self {
        let category = category.into();
        if !self.categories.contains(&category) {
            self.categories.push(category);
        }
        self
    }

    /// Zoom about the pixel `location` so the resulting scale factor is `factor`.
    #[must_use]
    pub fn scale(&self, factor: f64, location: f64) -> Self {
        let ratio = factor / self.scale_factor();
        self.update(
            location - (location - self.start) * ratio,
            location + (self.end - location) * ratio,
        )
    }

    #[must_use]
    pub fn constrained_scale(&self, factor: f64, location: f64, bounds: (f64, f64)) -> Self {
        let scaled = self.scale(factor, location);
        let (lo, hi) = bounds;
        scaled.update(scaled.start.max(lo).min(hi), scaled.end.min(hi).max(lo))
    }

    #[must_use]
    pub fn translate(&self, amount: f64) -> Self {
        self.update(self.start + amount, self.end + amount)
    }

    #[must_use]
    pub fn update(&self, start: f64, end: f64) -> Self {
        Self {
            categories: self.categories.clone(),
            start,
            end,
            original: self.original,
        }
    }

    #[must_use]
    pub fn reset(&self) -> Self {
        self.update(self.original.0, self.original.1)
    }
}
