//! The window controller: consumes batches of arrivals, owns the series buffers and keeps
//! the time axis windows moving with the data.
//!
//! One [`StreamWindowController`] exists per plot. Per batch it
//!
//! 1. groups the batch's series by the axis they are drawn against,
//! 2. appends each series' new points and evicts what fell out of the retention horizon,
//! 3. folds arrivals and evictions into the windowed stats when enabled,
//! 4. moves an axis window forward once its current time passes the window's end (current
//!    times only move forward),
//! 5. reports the range map and current times to the observer and the view controller.
//!
//! The plain and cadence variants work on the x axes. The cadence variant additionally
//! treats an empty batch as a tick that moves every axis forward by the cadence period.
//! The ordinal variant groups by y axis.
//!
//! Batches arrive over an `mpsc` channel (see [`crate::sink::BatchBuffer`]) and are
//! processed on [`poll`](StreamWindowController::poll). Dropping the channel on
//! [`unsubscribe`](StreamWindowController::unsubscribe) is the only cancellation there is.

mod observer;
mod window;

pub use observer::{EventObserver, StreamObserver};
pub use window::advance_window;

use std::collections::HashMap;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use indexmap::IndexMap;

use crate::config::StreamConfig;
use crate::controllers::{ViewInfo, ViewRequest};
use crate::data::assignment::{resolve, AxisSide};
use crate::data::axis_range::AxisRange;
use crate::data::datum::{OrdinalDatum, StreamDatum};
use crate::data::series::Series;
use crate::data::stats::{SeriesStats, ValueStats};
use crate::error::{Error, Result};
use crate::events::EventKind;
use crate::pan_zoom::{axes_for_series, pan_axes, reset_axes, zoom_axes};
use crate::sink::{Arrival, Batch, BatchBuffer};

struct Subscription<D> {
    id: u64,
    batches: Receiver<Batch<D>>,
}

/// Streams batches into per-series buffers and per-axis windows.
pub struct StreamWindowController<D, O = ()> {
    config: StreamConfig,
    time_side: AxisSide,
    cadence_period: Option<f64>,
    series: HashMap<String, Series<D>>,
    series_order: Vec<String>,
    ranges: HashMap<String, AxisRange>,
    initial_starts: HashMap<String, f64>,
    current_times: HashMap<String, f64>,
    stats: HashMap<String, SeriesStats<D>>,
    subscription: Option<Subscription<D>>,
    next_subscription_id: u64,
    observer: (O, Option<EventObserver>),
}

impl<D: StreamDatum> StreamWindowController<D> {
    fn build<S, I>(config: StreamConfig, time_side: AxisSide, cadence_period: Option<f64>, axes: I) -> Result<Self>
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, AxisRange)>,
    {
        config.validate()?;
        let ranges: HashMap<String, AxisRange> = axes.into_iter().map(|(id, r)| (id.into(), r)).collect();
        let initial_starts = ranges.iter().map(|(id, r)| (id.clone(), r.start())).collect();
        let events = config.controllers.event.clone().map(EventObserver::new);
        Ok(Self {
            config,
            time_side,
            cadence_period,
            series: HashMap::new(),
            series_order: Vec::new(),
            ranges,
            initial_starts,
            current_times: HashMap::new(),
            stats: HashMap::new(),
            subscription: None,
            next_subscription_id: 0,
            observer: ((), events),
        })
    }

    /// Plain time-series controller over the given x axes.
    pub fn time_series<S, I>(config: StreamConfig, axes: I) -> Result<Self>
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, AxisRange)>,
    {
        Self::build(config, AxisSide::X, None, axes)
    }

    /// Time-series controller that also advances on ticks. Needs `cadence_period_ms`.
    pub fn cadence<S, I>(config: StreamConfig, axes: I) -> Result<Self>
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, AxisRange)>,
    {
        let period = config
            .cadence_period_ms
            .ok_or_else(|| Error::InvalidConfig("cadence controller needs cadence_period_ms".into()))?;
        Self::build(config, AxisSide::X, Some(period), axes)
    }
}

impl StreamWindowController<OrdinalDatum> {
    /// Controller for categorical data, grouped by y axis.
    pub fn ordinal<S, I>(config: StreamConfig, axes: I) -> Result<Self>
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, AxisRange)>,
    {
        Self::build(config, AxisSide::Y, None, axes)
    }
}

impl<O> StreamWindowController<OrdinalDatum, O> {
    /// Categories seen so far, in first-seen order across series.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for name in &self.series_order {
            let Some(series) = self.series.get(name) else {
                continue;
            };
            for p in series.iter() {
                if !seen.contains(&p.category.as_str()) {
                    seen.push(&p.category);
                }
            }
        }
        seen
    }
}

impl<D: StreamDatum, O: StreamObserver<D>> StreamWindowController<D, O> {
    /// Replace the observer. An event controller from the config keeps receiving events.
    pub fn with_observer<P: StreamObserver<D>>(self, observer: P) -> StreamWindowController<D, P> {
        StreamWindowController {
            config: self.config,
            time_side: self.time_side,
            cadence_period: self.cadence_period,
            series: self.series,
            series_order: self.series_order,
            ranges: self.ranges,
            initial_starts: self.initial_starts,
            current_times: self.current_times,
            stats: self.stats,
            subscription: self.subscription,
            next_subscription_id: self.next_subscription_id,
            observer: (observer, self.observer.1),
        }
    }

    /// Start from a snapshot of existing series, e.g. data loaded before the plot mounted.
    pub fn with_initial_data<I: IntoIterator<Item = Series<D>>>(mut self, initial: I) -> Self {
        for series in initial {
            if self.config.windowed_stats {
                let lifetime = ValueStats::from_points(series.iter());
                self.stats.insert(series.name.clone(), SeriesStats::seeded(lifetime));
            }
            if !self.series.contains_key(&series.name) {
                self.series_order.push(series.name.clone());
            }
            self.series.insert(series.name.clone(), series);
        }
        self
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn observer(&self) -> &O {
        &self.observer.0
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer.0
    }

    pub fn series(&self, name: &str) -> Option<&Series<D>> {
        self.series.get(name)
    }

    /// Series names in the order they first appeared.
    pub fn series_names(&self) -> impl Iterator<Item = &str> {
        self.series_order.iter().map(String::as_str)
    }

    pub fn ranges(&self) -> &HashMap<String, AxisRange> {
        &self.ranges
    }

    pub fn range(&self, axis_id: &str) -> Option<&AxisRange> {
        self.ranges.get(axis_id)
    }

    pub fn stats(&self, series: &str) -> Option<&SeriesStats<D>> {
        self.stats.get(series)
    }

    pub fn current_time(&self, axis_id: &str) -> Option<f64> {
        self.current_times.get(axis_id).copied()
    }

    // ── Subscription ────────────────────────────────────────────────────

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn subscription_id(&self) -> Option<u64> {
        self.subscription.as_ref().map(|s| s.id)
    }

    /// Start consuming `batches`. Returns the new subscription id, or `None` (and drops
    /// `batches`) when already subscribed.
    pub fn subscribe(&mut self, batches: Receiver<Batch<D>>) -> Option<u64> {
        if let Some(sub) = &self.subscription {
            tracing::debug!(subscription_id = sub.id, "already subscribed");
            return None;
        }
        self.next_subscription_id += 1;
        let id = self.next_subscription_id;
        self.subscription = Some(Subscription { id, batches });
        tracing::info!(subscription_id = id, "subscribed to batch stream");
        StreamObserver::<D>::on_subscribe(&mut self.observer, id);
        Some(id)
    }

    /// Drop the batch channel. Returns `false` when there was nothing to drop.
    pub fn unsubscribe(&mut self) -> bool {
        let Some(sub) = self.subscription.take() else {
            return false;
        };
        tracing::info!(subscription_id = sub.id, "unsubscribed from batch stream");
        StreamObserver::<D>::on_unsubscribe(&mut self.observer, sub.id);
        true
    }

    /// Apply pending view requests, then process every batch waiting on the channel.
    /// Returns the number of batches processed.
    pub fn poll(&mut self) -> usize {
        self.apply_view_requests();
        let batches: Vec<Batch<D>> = match &self.subscription {
            Some(sub) => sub.batches.try_iter().collect(),
            None => return 0,
        };
        for batch in &batches {
            self.process_batch(batch);
        }
        batches.len()
    }

    // ── Batch handling ──────────────────────────────────────────────────

    fn default_axis(&self) -> &str {
        match self.time_side {
            AxisSide::X => &self.config.default_x_axis_id,
            AxisSide::Y => &self.config.default_y_axis_id,
        }
    }

    /// Group series by time axis. Assignments naming an axis that is not registered fall
    /// back to the default axis.
    fn group_by_axis<'n, I>(&self, names: I) -> IndexMap<String, Vec<String>>
    where
        I: IntoIterator<Item = &'n str>,
    {
        let default_id = self.default_axis();
        resolve(
            |assignment| {
                let id = self.time_side.axis_id(assignment, default_id);
                if id == default_id || self.ranges.contains_key(id) {
                    id.to_string()
                } else {
                    tracing::warn!(axis = id, fallback = default_id, "series assigned to unregistered axis");
                    default_id.to_string()
                }
            },
            names,
            &self.config.axis_assignments,
        )
    }

    /// Handle one batch. This is what [`poll`](Self::poll) calls for every batch it
    /// receives; call it directly to drive the controller without a channel.
    pub fn process_batch(&mut self, batch: &Batch<D>) {
        if batch.is_tick() {
            self.advance_cadence();
            return;
        }
        tracing::debug!(
            series = batch.new_points.len(),
            points = batch.point_count(),
            max_time = batch.max_time,
            "processing batch"
        );

        let mut ranges = self.ranges.clone();
        let groups = self.group_by_axis(batch.new_points.keys().map(String::as_str));
        let retention = self.config.retention();
        let windowed = self.config.windowed_stats;
        let behavior = self.config.time_window_behavior;
        let mut touched = Vec::with_capacity(groups.len());

        for (axis_id, names) in groups {
            let axis_time = names
                .iter()
                .map(|n| batch.max_times.get(n).copied().unwrap_or(batch.max_time))
                .fold(f64::NEG_INFINITY, f64::max);

            for name in &names {
                let Some(points) = batch.new_points.get(name) else {
                    continue;
                };
                self.observer.on_update_data(name, points);

                if !self.series.contains_key(name) {
                    self.series_order.push(name.clone());
                }
                let series = self.series.entry(name.clone()).or_insert_with(|| Series::new(name.as_str()));
                series.extend_from_slice(points);

                let before = series.len();
                let dropped = series.evict_older_than(axis_time, retention, windowed);
                let evicted = before - series.len();
                if evicted > 0 {
                    tracing::trace!(series = %name, evicted, "evicted points past retention");
                    StreamObserver::<D>::on_evict_data(&mut self.observer, name, evicted);
                }

                if windowed {
                    let lifetime_before = batch.lifetime_stats.get(name);
                    let stats = self
                        .stats
                        .entry(name.clone())
                        .or_insert_with(|| SeriesStats::seeded(lifetime_before.cloned().unwrap_or_default()));
                    let mut next = stats.windowed.apply_arrivals(points);
                    if !dropped.is_empty() {
                        next = next.apply_evictions(&dropped, series.iter());
                    }
                    stats.windowed = next;
                    stats.lifetime = stats.lifetime.apply_arrivals(points);
                }
            }

            let axis_time = self.current_times.get(&axis_id).map_or(axis_time, |&t| t.max(axis_time));
            if let Some(range) = ranges.get_mut(&axis_id) {
                let initial = self.initial_starts.get(&axis_id).copied().unwrap_or(range.start());
                let next = advance_window(range, axis_time, behavior, initial);
                if next != *range {
                    tracing::debug!(axis = %axis_id, start = next.start(), end = next.end(), "advanced window");
                    *range = next;
                }
            }
            self.current_times.insert(axis_id.clone(), axis_time);
            touched.push((axis_id, axis_time));
        }

        self.ranges = ranges;
        self.publish(&touched);
    }

    /// A tick: every axis' current time moves on by the cadence period. An axis that has
    /// not seen data yet starts from its window end, so the first tick already scrolls.
    fn advance_cadence(&mut self) {
        let Some(period) = self.cadence_period else {
            tracing::debug!("ignoring empty batch without a cadence");
            return;
        };
        let behavior = self.config.time_window_behavior;
        let mut touched = Vec::with_capacity(self.ranges.len());
        for (axis_id, range) in self.ranges.iter_mut() {
            let t = self.current_times.get(axis_id).copied().unwrap_or(range.end()) + period;
            let initial = self.initial_starts.get(axis_id).copied().unwrap_or(range.start());
            *range = advance_window(range, t, behavior, initial);
            self.current_times.insert(axis_id.clone(), t);
            touched.push((axis_id.clone(), t));
        }
        touched.sort_by(|a, b| a.0.cmp(&b.0));
        tracing::trace!(axes = touched.len(), period, "cadence tick");
        self.publish(&touched);
    }

    fn publish(&mut self, touched: &[(String, f64)]) {
        StreamObserver::<D>::on_update_ranges(&mut self.observer, &self.ranges);
        for (axis_id, t) in touched {
            StreamObserver::<D>::on_current_time(&mut self.observer, axis_id, *t);
        }
        self.publish_view();
    }

    fn publish_view(&self) {
        if let Some(view) = &self.config.controllers.view {
            view.publish(ViewInfo {
                ranges: self.ranges.clone(),
                current_times: self.current_times.clone(),
            });
        }
    }

    // ── Pan / zoom ──────────────────────────────────────────────────────

    fn axes_of<'n, I>(&self, series_names: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'n str>,
    {
        axes_for_series(
            series_names,
            &self.config.axis_assignments,
            self.time_side,
            self.default_axis(),
            &self.ranges,
        )
    }

    fn all_axes(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.ranges.keys().cloned().collect();
        ids.sort();
        ids
    }

    fn view_changed(&mut self, kind: EventKind) {
        if let Some(events) = &self.observer.1 {
            events.view_changed(kind, &self.ranges);
        }
        StreamObserver::<D>::on_update_ranges(&mut self.observer.0, &self.ranges);
        self.publish_view();
    }

    fn zoom_ids(&mut self, ids: &[String], delta: f64, pivot: f64) -> Result<()> {
        zoom_axes(&mut self.ranges, ids, delta, pivot, None)?;
        tracing::debug!(axes = ids.len(), delta, pivot, "zoomed");
        self.view_changed(EventKind::ZOOM);
        Ok(())
    }

    fn pan_ids(&mut self, ids: &[String], amount: f64) {
        pan_axes(&mut self.ranges, ids, amount);
        tracing::debug!(axes = ids.len(), amount, "panned");
        self.view_changed(EventKind::PAN);
    }

    fn reset_ids(&mut self, ids: &[String]) {
        reset_axes(&mut self.ranges, ids);
        tracing::debug!(axes = ids.len(), "reset");
        self.view_changed(EventKind::RESET);
    }

    /// Zoom the axes the named series are drawn against by the relative factor `delta`.
    pub fn zoom<'n, I>(&mut self, series_names: I, delta: f64, pivot: f64) -> Result<()>
    where
        I: IntoIterator<Item = &'n str>,
    {
        let ids = self.axes_of(series_names);
        self.zoom_ids(&ids, delta, pivot)
    }

    pub fn pan<'n, I>(&mut self, series_names: I, amount: f64)
    where
        I: IntoIterator<Item = &'n str>,
    {
        let ids = self.axes_of(series_names);
        self.pan_ids(&ids, amount);
    }

    pub fn reset<'n, I>(&mut self, series_names: I)
    where
        I: IntoIterator<Item = &'n str>,
    {
        let ids = self.axes_of(series_names);
        self.reset_ids(&ids);
    }

    pub fn zoom_all(&mut self, delta: f64, pivot: f64) -> Result<()> {
        let ids = self.all_axes();
        self.zoom_ids(&ids, delta, pivot)
    }

    pub fn pan_all(&mut self, amount: f64) {
        let ids = self.all_axes();
        self.pan_ids(&ids, amount);
    }

    pub fn reset_all(&mut self) {
        let ids = self.all_axes();
        self.reset_ids(&ids);
    }

    fn apply_view_requests(&mut self) {
        let Some(view) = self.config.controllers.view.clone() else {
            return;
        };
        for request in view.take_requests() {
            let result = match request {
                ViewRequest::Zoom { delta, pivot } => self.zoom_all(delta, pivot),
                ViewRequest::Pan { amount } => {
                    self.pan_all(amount);
                    Ok(())
                }
                ViewRequest::Reset => {
                    self.reset_all();
                    Ok(())
                }
            };
            if let Err(e) = result {
                tracing::warn!(error = %e, "ignoring view request");
            }
        }
    }
}

impl<D: StreamDatum + Send + 'static, O: StreamObserver<D>> StreamWindowController<D, O> {
    /// Subscribe straight to a sink's arrivals. A [`BatchBuffer`] thread groups them every
    /// `windowing_time` and, for the cadence variant, emits ticks. The thread ends once
    /// every sink is dropped, or on its next send after the controller unsubscribes.
    pub fn subscribe_arrivals(&mut self, arrivals: Receiver<Arrival<D>>) -> Option<u64> {
        if self.is_subscribed() {
            tracing::debug!("already subscribed");
            return None;
        }
        let cadence = self.cadence_period.map(|ms| Duration::from_secs_f64(ms / 1000.0));
        let (batches, _thread) = BatchBuffer::spawn(arrivals, self.config.windowing_time(), cadence);
        self.subscribe(batches)
    }
}
