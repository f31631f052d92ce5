//! Data source types and channels for feeding points into a stream.
//!
//! Producers push [`Arrival`]s through a [`StreamSink`]. A [`BatchBuffer`] thread groups
//! whatever arrived during one windowing interval into a [`Batch`] and hands it to the
//! window controller. The grouping itself lives in [`BatchAccumulator`] so it can be driven
//! without a thread.

use std::collections::HashMap;
use std::sync::mpsc::{Receiver, RecvTimeoutError, SendError, Sender};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use indexmap::IndexMap;

use crate::data::datum::StreamDatum;
use crate::data::stats::ValueStats;

/// A run of new points for one series.
#[derive(Debug, Clone)]
pub struct Arrival<D> {
    pub series: String,
    pub points: Vec<D>,
}

/// Everything that arrived during one windowing interval.
///
/// A batch with no points is a cadence tick.
#[derive(Debug, Clone)]
pub struct Batch<D> {
    /// New points per series, in order of first arrival.
    pub new_points: IndexMap<String, Vec<D>>,
    /// Largest time across the whole batch.
    pub max_time: f64,
    /// Largest time per series in this batch.
    pub max_times: HashMap<String, f64>,
    /// Lifetime stats of each series in this batch as they were before the batch. Used to
    /// seed windowed stats the first time a series is seen.
    pub lifetime_stats: HashMap<String, ValueStats<D>>,
}

impl<D> Batch<D> {
    /// A cadence tick: no points, only the passage of time.
    pub fn tick() -> Self {
        Self {
            new_points: IndexMap::new(),
            max_time: f64::NEG_INFINITY,
            max_times: HashMap::new(),
            lifetime_stats: HashMap::new(),
        }
    }

    pub fn is_tick(&self) -> bool {
        self.new_points.is_empty()
    }

    pub fn point_count(&self) -> usize {
        self.new_points.values().map(Vec::len).sum()
    }
}

impl<D: StreamDatum> Batch<D> {
    /// Build a batch directly from per-series points, deriving the max times.
    pub fn from_points<S, I>(points: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, Vec<D>)>,
    {
        let mut acc = BatchAccumulator::new();
        for (series, pts) in points {
            acc.push(Arrival {
                series: series.into(),
                points: pts,
            });
        }
        acc.flush().unwrap_or_else(Batch::tick)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// StreamSink
// ─────────────────────────────────────────────────────────────────────────────

/// Convenience sender for feeding points into a stream.
#[derive(Clone)]
pub struct StreamSink<D> {
    tx: Sender<Arrival<D>>,
}

impl<D> StreamSink<D> {
    pub fn send_point<S: Into<String>>(&self, series: S, point: D) -> Result<(), SendError<Arrival<D>>> {
        self.tx.send(Arrival {
            series: series.into(),
            points: vec![point],
        })
    }

    /// Send a chunk of points for one series (cheaper than point-by-point).
    pub fn send_points<S, I>(&self, series: S, points: I) -> Result<(), SendError<Arrival<D>>>
    where
        S: Into<String>,
        I: Into<Vec<D>>,
    {
        self.tx.send(Arrival {
            series: series.into(),
            points: points.into(),
        })
    }
}

/// Create a new channel pair: `(StreamSink, Receiver<Arrival>)`.
pub fn channel_stream<D>() -> (StreamSink<D>, Receiver<Arrival<D>>) {
    let (tx, rx) = std::sync::mpsc::channel();
    (StreamSink { tx }, rx)
}

// ─────────────────────────────────────────────────────────────────────────────
// BatchAccumulator
// ─────────────────────────────────────────────────────────────────────────────

/// Groups arrivals into batches and keeps lifetime stats per series.
#[derive(Debug, Clone)]
pub struct BatchAccumulator<D> {
    pending: IndexMap<String, Vec<D>>,
    max_time: f64,
    max_times: HashMap<String, f64>,
    lifetime: HashMap<String, ValueStats<D>>,
}

impl<D: StreamDatum> Default for BatchAccumulator<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: StreamDatum> BatchAccumulator<D> {
    pub fn new() -> Self {
        Self {
            pending: IndexMap::new(),
            max_time: f64::NEG_INFINITY,
            max_times: HashMap::new(),
            lifetime: HashMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn push(&mut self, arrival: Arrival<D>) {
        if arrival.points.is_empty() {
            return;
        }
        let latest = arrival
            .points
            .iter()
            .map(StreamDatum::time)
            .fold(f64::NEG_INFINITY, f64::max);
        let series_max = self.max_times.entry(arrival.series.clone()).or_insert(f64::NEG_INFINITY);
        *series_max = series_max.max(latest);
        self.max_time = self.max_time.max(latest);
        self.pending.entry(arrival.series).or_default().extend(arrival.points);
    }

    /// Take everything pending as one batch. `None` when nothing arrived.
    pub fn flush(&mut self) -> Option<Batch<D>> {
        if self.pending.is_empty() {
            return None;
        }
        let new_points = std::mem::take(&mut self.pending);
        let mut lifetime_stats = HashMap::with_capacity(new_points.len());
        for (series, points) in &new_points {
            let before = self.lifetime.remove(series).unwrap_or_default();
            self.lifetime.insert(series.clone(), before.apply_arrivals(points));
            lifetime_stats.insert(series.clone(), before);
        }
        let batch = Batch {
            new_points,
            max_time: self.max_time,
            max_times: std::mem::take(&mut self.max_times),
            lifetime_stats,
        };
        self.max_time = f64::NEG_INFINITY;
        Some(batch)
    }

    /// Lifetime stats of a series over everything flushed so far.
    pub fn lifetime_stats(&self, series: &str) -> Option<&ValueStats<D>> {
        self.lifetime.get(series)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// BatchBuffer
// ─────────────────────────────────────────────────────────────────────────────

/// Background thread that turns a stream of arrivals into periodic batches.
pub struct BatchBuffer;

impl BatchBuffer {
    /// Spawn the buffering thread.
    ///
    /// Every `windowing_time` the pending arrivals are sent as one batch. With a `cadence`,
    /// a tick batch is also sent once per cadence period, whether or not data went out.
    /// The thread ends when all sinks are gone or the batch receiver is dropped.
    pub fn spawn<D>(
        arrivals: Receiver<Arrival<D>>,
        windowing_time: Duration,
        cadence: Option<Duration>,
    ) -> (Receiver<Batch<D>>, JoinHandle<()>)
    where
        D: StreamDatum + Send + 'static,
    {
        let (tx, rx) = std::sync::mpsc::channel();
        let handle = std::thread::spawn(move || {
            let mut acc = BatchAccumulator::new();
            let mut next_flush = Instant::now() + windowing_time;
            let mut next_tick = cadence.map(|c| Instant::now() + c);
            loop {
                let wake = next_tick.map_or(next_flush, |t| t.min(next_flush));
                let timeout = wake.saturating_duration_since(Instant::now());
                match arrivals.recv_timeout(timeout) {
                    Ok(arrival) => acc.push(arrival),
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => {
                        if let Some(batch) = acc.flush() {
                            let _ = tx.send(batch);
                        }
                        tracing::debug!("arrival channel closed, batch buffer exiting");
                        return;
                    }
                }

                let now = Instant::now();
                if now >= next_flush {
                    if let Some(batch) = acc.flush() {
                        if tx.send(batch).is_err() {
                            return;
                        }
                    }
                    next_flush = now + windowing_time;
                }
                if let (Some(tick_at), Some(period)) = (next_tick, cadence) {
                    if now >= tick_at {
                        if tx.send(Batch::tick()).is_err() {
                            return;
                        }
                        next_tick = Some(now + period);
                    }
                }
            }
        });
        (rx, handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::datum::Datum;

    #[test]
    fn accumulator_tracks_max_times() {
        let mut acc = BatchAccumulator::new();
        acc.push(Arrival { series: "a".into(), points: vec![Datum::new(1.0, 0.0), Datum::new(5.0, 0.0)] });
        acc.push(Arrival { series: "b".into(), points: vec![Datum::new(3.0, 0.0)] });
        acc.push(Arrival { series: "a".into(), points: vec![Datum::new(7.0, 0.0)] });

        let batch = acc.flush().unwrap();
        assert_eq!(batch.max_time, 7.0);
        assert_eq!(batch.max_times["a"], 7.0);
        assert_eq!(batch.max_times["b"], 3.0);
        assert_eq!(batch.new_points["a"].len(), 3);
        assert_eq!(batch.point_count(), 4);
        let names: Vec<&String> = batch.new_points.keys().collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(acc.flush().is_none());
    }

    #[test]
    fn lifetime_stats_are_pre_batch_snapshots() {
        let mut acc = BatchAccumulator::new();
        acc.push(Arrival { series: "a".into(), points: vec![Datum::new(1.0, 2.0)] });
        let first = acc.flush().unwrap();
        assert_eq!(first.lifetime_stats["a"].count, 0);

        acc.push(Arrival { series: "a".into(), points: vec![Datum::new(2.0, 4.0)] });
        let second = acc.flush().unwrap();
        assert_eq!(second.lifetime_stats["a"].count, 1);
        assert_eq!(acc.lifetime_stats("a").map(|s| s.count), Some(2));
    }

    #[test]
    fn sink_to_buffer_thread() {
        let (sink, arrivals) = channel_stream::<Datum>();
        let (batches, handle) = BatchBuffer::spawn(arrivals, Duration::from_millis(5), None);
        sink.send_points("s", vec![Datum::new(1.0, 1.0), Datum::new(2.0, 2.0)]).unwrap();
        sink.send_point("s", Datum::new(3.0, 3.0)).unwrap();
        drop(sink);
        handle.join().unwrap();

        let total: usize = batches.try_iter().map(|b| b.point_count()).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn cadence_emits_ticks_without_data() {
        let (sink, arrivals) = channel_stream::<Datum>();
        let (batches, _handle) =
            BatchBuffer::spawn(arrivals, Duration::from_millis(2), Some(Duration::from_millis(5)));
        let tick = batches.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(tick.is_tick());
        drop(sink);
    }

    #[test]
    fn cadence_ticks_keep_coming_while_data_flows() {
        let (sink, arrivals) = channel_stream::<Datum>();
        let (batches, handle) =
            BatchBuffer::spawn(arrivals, Duration::from_millis(1), Some(Duration::from_millis(5)));
        let started = Instant::now();
        let mut t = 0.0;
        while started.elapsed() < Duration::from_millis(100) {
            sink.send_point("s", Datum::new(t, 1.0)).unwrap();
            t += 1.0;
            std::thread::sleep(Duration::from_millis(1));
        }
        drop(sink);
        handle.join().unwrap();

        let (ticks, data): (Vec<Batch<Datum>>, Vec<Batch<Datum>>) = batches.try_iter().partition(Batch::is_tick);
        assert!(ticks.len() >= 5, "only {} ticks", ticks.len());
        assert_eq!(data.iter().map(Batch::point_count).sum::<usize>(), t as usize);
    }
}
