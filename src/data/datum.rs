//! Point types carried by streaming series.

use serde::{Deserialize, Serialize};

/// Anything that can live in a streamed series: it has a timestamp (ms) and a
/// scalar value that windowed statistics are computed over.
pub trait StreamDatum: Clone {
    fn time(&self) -> f64;
    fn value(&self) -> f64;
}

/// A plain time-series point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Datum {
    pub time: f64,
    pub value: f64,
}

impl Datum {
    pub const fn new(time: f64, value: f64) -> Self {
        Self { time, value }
    }
}

impl StreamDatum for Datum {
    #[inline]
    fn time(&self) -> f64 {
        self.time
    }

    #[inline]
    fn value(&self) -> f64 {
        self.value
    }
}

/// A Poincaré iterate pair `(f[n], f[n+1])` stamped with the time of `f[n+1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IterateDatum {
    pub time: f64,
    pub iterate_n: f64,
    pub iterate_n_1: f64,
}

impl IterateDatum {
    pub const fn new(time: f64, iterate_n: f64, iterate_n_1: f64) -> Self {
        Self {
            time,
            iterate_n,
            iterate_n_1,
        }
    }
}

impl StreamDatum for IterateDatum {
    #[inline]
    fn time(&self) -> f64 {
        self.time
    }

    /// Statistics on iterate series track the newest iterate.
    #[inline]
    fn value(&self) -> f64 {
        self.iterate_n_1
    }
}

/// A point that also belongs to a named category (ordinal axes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrdinalDatum {
    pub time: f64,
    pub value: f64,
    pub category: String,
}

impl OrdinalDatum {
    pub fn new<S: Into<String>>(time: f64, value: f64, category: S) -> Self {
        Self {
            time,
            value,
            category: category.into(),
        }
    }
}

impl StreamDatum for OrdinalDatum {
    #[inline]
    fn time(&self) -> f64 {
        self.time
    }

    #[inline]
    fn value(&self) -> f64 {
        self.value
    }
}
