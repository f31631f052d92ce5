//! Incremental per-series aggregates.
//!
//! `ValueStats` is updated batch-wise: arrivals grow it, evictions shrink it. Count, sum
//! and sum-squared are adjusted incrementally. On eviction the extrema are rescanned from
//! the surviving points because removing the current minimum or maximum leaves no way to
//! recover the next one from the aggregates alone.
//!
//! `sum_squared` accumulates the square of each *batch* sum, not the sum of the squared
//! values. Variance derived from it is only meaningful for single-point batches.

use super::datum::{OrdinalDatum, StreamDatum};

#[derive(Debug, Clone, PartialEq)]
pub struct ValueStats<D> {
    pub count: usize,
    pub sum: f64,
    pub sum_squared: f64,
    /// `sum / count`, NaN when empty.
    pub mean: f64,
    pub min: Option<D>,
    pub max: Option<D>,
}

/// Windowed stats of an ordinal series.
pub type OrdinalValueStats = ValueStats<OrdinalDatum>;

impl<D> Default for ValueStats<D> {
    fn default() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            sum_squared: 0.0,
            mean: f64::NAN,
            min: None,
            max: None,
        }
    }
}

fn mean_of(sum: f64, count: usize) -> f64 {
    if count > 0 {
        sum / count as f64
    } else {
        f64::NAN
    }
}

impl<D: StreamDatum> ValueStats<D> {
    /// Stats with nothing observed yet.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Stats over an existing run of points, e.g. an initial snapshot.
    pub fn from_points<'a, I>(points: I) -> Self
    where
        I: IntoIterator<Item = &'a D>,
        D: 'a,
    {
        let points: Vec<D> = points.into_iter().cloned().collect();
        Self::empty().apply_arrivals(&points)
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn min_value(&self) -> Option<f64> {
        self.min.as_ref().map(StreamDatum::value)
    }

    pub fn max_value(&self) -> Option<f64> {
        self.max.as_ref().map(StreamDatum::value)
    }

    /// Fold newly arrived points into the stats.
    #[must_use]
    pub fn apply_arrivals(&self, new_points: &[D]) -> Self {
        let batch_sum: f64 = new_points.iter().map(StreamDatum::value).sum();
        let count = self.count + new_points.len();
        let sum = self.sum + batch_sum;

        let mut min = self.min.clone();
        let mut max = self.max.clone();
        for p in new_points {
            if min.as_ref().map_or(true, |m| p.value() < m.value()) {
                min = Some(p.clone());
            }
            if max.as_ref().map_or(true, |m| p.value() > m.value()) {
                max = Some(p.clone());
            }
        }

        Self {
            count,
            sum,
            sum_squared: self.sum_squared + batch_sum * batch_sum,
            mean: mean_of(sum, count),
            min,
            max,
        }
    }

    /// Remove evicted points from the stats. `survivors` is the series content after the
    /// eviction and is scanned for the new extrema.
    #[must_use]
    pub fn apply_evictions<'a, I>(&self, dropped: &[D], survivors: I) -> Self
    where
        I: IntoIterator<Item = &'a D>,
        D: 'a,
    {
        let batch_sum: f64 = dropped.iter().map(StreamDatum::value).sum();
        let count = self.count.saturating_sub(dropped.len());
        let sum = self.sum - batch_sum;

        let mut min: Option<&D> = None;
        let mut max: Option<&D> = None;
        for p in survivors {
            if min.map_or(true, |m| p.value() < m.value()) {
                min = Some(p);
            }
            if max.map_or(true, |m| p.value() > m.value()) {
                max = Some(p);
            }
        }

        Self {
            count,
            sum,
            sum_squared: self.sum_squared - batch_sum * batch_sum,
            mean: mean_of(sum, count),
            min: min.cloned(),
            max: max.cloned(),
        }
    }
}

/// Lifetime stats (everything the source ever emitted) next to the windowed stats
/// (only what is still inside the retention window).
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesStats<D> {
    pub lifetime: ValueStats<D>,
    pub windowed: ValueStats<D>,
}

impl<D: StreamDatum> SeriesStats<D> {
    /// Seed both views from the source's lifetime stats.
    pub fn seeded(lifetime: ValueStats<D>) -> Self {
        Self {
            windowed: lifetime.clone(),
            lifetime,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::datum::Datum;
    use approx::assert_relative_eq;

    fn pts(values: &[(f64, f64)]) -> Vec<Datum> {
        values.iter().map(|&(t, v)| Datum::new(t, v)).collect()
    }

    #[test]
    fn empty_stats_have_nan_mean() {
        let s: ValueStats<Datum> = ValueStats::empty();
        assert_eq!(s.count, 0);
        assert!(s.mean.is_nan());
        assert!(s.min.is_none());
    }

    #[test]
    fn arrivals_accumulate() {
        let s = ValueStats::<Datum>::empty().apply_arrivals(&pts(&[(0.0, 1.0), (1.0, 5.0), (2.0, -2.0)]));
        assert_eq!(s.count, 3);
        assert_relative_eq!(s.sum, 4.0);
        assert_relative_eq!(s.sum_squared, 16.0);
        assert_relative_eq!(s.mean, 4.0 / 3.0);
        assert_eq!(s.min, Some(Datum::new(2.0, -2.0)));
        assert_eq!(s.max, Some(Datum::new(1.0, 5.0)));
    }

    #[test]
    fn sum_squared_squares_each_batch_sum() {
        let s = ValueStats::<Datum>::empty()
            .apply_arrivals(&pts(&[(0.0, 1.0), (1.0, 2.0)]))
            .apply_arrivals(&pts(&[(2.0, 3.0)]));
        assert_relative_eq!(s.sum_squared, 9.0 + 9.0);
    }

    #[test]
    fn evicting_the_extremum_rescans_survivors() {
        let all = pts(&[(0.0, 9.0), (1.0, 2.0), (2.0, 4.0)]);
        let s = ValueStats::<Datum>::empty().apply_arrivals(&all);
        let s = s.apply_evictions(&all[..1], all[1..].iter());
        assert_eq!(s.count, 2);
        assert_relative_eq!(s.sum, 6.0);
        assert_relative_eq!(s.mean, 3.0);
        assert_eq!(s.max, Some(Datum::new(2.0, 4.0)));
        assert_eq!(s.min, Some(Datum::new(1.0, 2.0)));
    }

    #[test]
    fn evicting_everything_leaves_nan_mean() {
        let all = pts(&[(0.0, 1.0), (1.0, 2.0)]);
        let s = ValueStats::<Datum>::empty().apply_arrivals(&all).apply_evictions(&all, [].iter());
        assert_eq!(s.count, 0);
        assert!(s.mean.is_nan());
        assert!(s.min.is_none() && s.max.is_none());
    }

    #[test]
    fn seeded_series_stats_start_equal() {
        let lifetime = ValueStats::from_points(pts(&[(0.0, 3.0)]).iter());
        let s = SeriesStats::seeded(lifetime.clone());
        assert_eq!(s.windowed, lifetime);
    }
}
