//! Per-stream point buffers.

use std::collections::VecDeque;

use super::datum::StreamDatum;

/// One logical data stream (a neuron, a sensor, ...). Points are kept in
/// time-ascending order; new points go to the back, evictions come off the front.
#[derive(Debug, Clone)]
pub struct Series<D> {
    pub name: String,
    pub data: VecDeque<D>,
}

impl<D: StreamDatum> Series<D> {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            data: VecDeque::new(),
        }
    }

    /// Build a series from an initial snapshot.
    pub fn with_data<S: Into<String>, I: IntoIterator<Item = D>>(name: S, data: I) -> Self {
        Self {
            name: name.into(),
            data: data.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn first(&self) -> Option<&D> {
        self.data.front()
    }

    pub fn last(&self) -> Option<&D> {
        self.data.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &D> {
        self.data.iter()
    }

    pub fn extend_from_slice(&mut self, points: &[D]) {
        self.data.extend(points.iter().cloned());
    }

    /// Pop points from the front while they are older than `retention` relative to
    /// `current_time`. A point exactly `retention` old survives. Returns the dropped points
    /// only when `collect` is set, so the common path does not allocate.
    pub fn evict_older_than(&mut self, current_time: f64, retention: f64, collect: bool) -> Vec<D> {
        let mut dropped = Vec::new();
        if !retention.is_finite() {
            return dropped;
        }
        while let Some(front) = self.data.front() {
            if current_time - front.time() > retention {
                if let Some(p) = self.data.pop_front() {
                    if collect {
                        dropped.push(p);
                    }
                }
            } else {
                break;
            }
        }
        dropped
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::datum::Datum;

    fn series() -> Series<Datum> {
        Series::with_data(
            "neuron-1",
            [Datum::new(0.0, 1.0), Datum::new(10.0, 2.0), Datum::new(20.0, 3.0)],
        )
    }

    #[test]
    fn evicts_only_points_past_retention() {
        let mut s = series();
        let dropped = s.evict_older_than(20.0, 15.0, true);
        assert_eq!(dropped, vec![Datum::new(0.0, 1.0)]);
        assert_eq!(s.data, [Datum::new(10.0, 2.0), Datum::new(20.0, 3.0)]);
    }

    #[test]
    fn infinite_retention_never_evicts() {
        let mut s = series();
        let dropped = s.evict_older_than(1e12, f64::INFINITY, true);
        assert!(dropped.is_empty());
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn eviction_without_collect_returns_nothing() {
        let mut s = series();
        let dropped = s.evict_older_than(100.0, 15.0, false);
        assert!(dropped.is_empty());
        assert!(s.is_empty());
    }
}
