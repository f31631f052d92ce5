//! Poincaré iterate helpers: turning a time series into `(f[n], f[n+1])` pairs and
//! sizing iterate axes from windowed stats.

use std::collections::HashMap;

use super::axis_range::AxisRange;
use super::datum::{Datum, IterateDatum};
use super::stats::ValueStats;

/// Remembers the last point of each series so consecutive batches chain into iterates.
#[derive(Debug, Default, Clone)]
pub struct IterateBuilder {
    last: HashMap<String, Datum>,
}

impl IterateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert a run of new points for `series` into iterate pairs. The first point ever seen
    /// for a series only primes the builder.
    pub fn push(&mut self, series: &str, points: &[Datum]) -> Vec<IterateDatum> {
        let mut out = Vec::with_capacity(points.len());
        let mut prev = self.last.get(series).copied();
        for p in points {
            if let Some(q) = prev {
                out.push(IterateDatum::new(p.time, q.value, p.value));
            }
            prev = Some(*p);
        }
        if let Some(p) = prev {
            self.last.insert(series.to_string(), p);
        }
        out
    }

    pub fn forget(&mut self, series: &str) {
        self.last.remove(series);
    }
}

/// Axis extent covering the windowed iterate values, or `fallback` when nothing is in the
/// window yet. Both iterate axes share the extent so the identity line is the diagonal.
///
/// The stats track `iterate_n_1`. Every `iterate_n` in a chained series is the previous
/// point's `iterate_n_1`, except for the oldest point still buffered, so pass that as
/// `oldest`.
pub fn iterate_extent(
    stats: &ValueStats<IterateDatum>,
    oldest: Option<&IterateDatum>,
    fallback: (f64, f64),
) -> AxisRange {
    let (Some(min), Some(max)) = (&stats.min, &stats.max) else {
        return AxisRange::new(fallback.0, fallback.1);
    };
    let (mut lo, mut hi) = (min.iterate_n_1, max.iterate_n_1);
    if let Some(first) = oldest {
        lo = lo.min(first.iterate_n);
        hi = hi.max(first.iterate_n);
    }
    if hi > lo {
        AxisRange::new(lo, hi)
    } else {
        AxisRange::new(fallback.0, fallback.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chains_across_batches() {
        let mut b = IterateBuilder::new();
        let first = b.push("s", &[Datum::new(0.0, 1.0), Datum::new(1.0, 2.0)]);
        assert_eq!(first, vec![IterateDatum::new(1.0, 1.0, 2.0)]);
        let second = b.push("s", &[Datum::new(2.0, 4.0)]);
        assert_eq!(second, vec![IterateDatum::new(2.0, 2.0, 4.0)]);
    }

    #[test]
    fn series_are_independent() {
        let mut b = IterateBuilder::new();
        assert!(b.push("a", &[Datum::new(0.0, 1.0)]).is_empty());
        assert!(b.push("b", &[Datum::new(0.0, 5.0)]).is_empty());
        b.forget("a");
        assert!(b.push("a", &[Datum::new(1.0, 1.0)]).is_empty());
    }

    #[test]
    fn extent_falls_back_when_empty() {
        let r = iterate_extent(&ValueStats::empty(), None, (-1.0, 1.0));
        assert_eq!(r, AxisRange::new(-1.0, 1.0));

        let stats = ValueStats::<IterateDatum>::empty().apply_arrivals(&[
            IterateDatum::new(1.0, 0.5, 3.0),
            IterateDatum::new(2.0, 3.0, -2.0),
        ]);
        let r = iterate_extent(&stats, None, (-1.0, 1.0));
        assert_eq!((r.start(), r.end()), (-2.0, 3.0));
    }

    #[test]
    fn extent_includes_oldest_iterate_n() {
        // The point before (2.0, 5.0, 1.0) was evicted, so 5.0 only shows up as its iterate_n.
        let window = [IterateDatum::new(2.0, 5.0, 1.0), IterateDatum::new(3.0, 1.0, 2.0)];
        let stats = ValueStats::<IterateDatum>::empty().apply_arrivals(&window);
        let r = iterate_extent(&stats, window.first(), (0.0, 1.0));
        assert_eq!((r.start(), r.end()), (1.0, 5.0));
    }
}
