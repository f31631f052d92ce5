//! Event fan-out for streaming plots.
//!
//! Callers subscribe to stream events via [`EventController`]. Each event carries a set of
//! [`EventKind`] flags so a single occurrence can match several categories: a zoom, pan or
//! reset also carries `RANGES_UPDATED` since it republishes the range map.
//!
//! An [`EventFilter`] selects kinds with an OR mask and can be narrowed to one series or
//! one axis. Events are numbered in emission order, so a subscriber can tell whether it
//! missed anything filtered out for it.

use std::collections::HashMap;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::data::axis_range::AxisRange;

// ─────────────────────────────────────────────────────────────────────────────
// EventKind – bitflags
// ─────────────────────────────────────────────────────────────────────────────

/// Bitflags describing the *categories* an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventKind(pub u64);

impl EventKind {
    // ── Subscription ─────────────────────────────────────────────────────
    /// The controller started consuming batches.
    pub const SUBSCRIBED: Self = Self(1 << 0);
    /// The controller dropped its batch source.
    pub const UNSUBSCRIBED: Self = Self(1 << 1);

    // ── Data ────────────────────────────────────────────────────────────
    /// New points were appended to a series.
    pub const DATA_UPDATED: Self = Self(1 << 2);
    /// Points fell out of the retention window.
    pub const DATA_EVICTED: Self = Self(1 << 3);

    // ── Axes ────────────────────────────────────────────────────────────
    /// Axis ranges were (re-)published.
    pub const RANGES_UPDATED: Self = Self(1 << 4);
    /// The current time of an axis moved.
    pub const TIME_UPDATED: Self = Self(1 << 5);

    // ── View ────────────────────────────────────────────────────────────
    pub const ZOOM: Self = Self(1 << 6);
    pub const PAN: Self = Self(1 << 7);
    /// Axes went back to their original extent.
    pub const RESET: Self = Self(1 << 8);

    pub const DATA: Self = Self(Self::DATA_UPDATED.0 | Self::DATA_EVICTED.0);
    pub const VIEW: Self = Self(Self::ZOOM.0 | Self::PAN.0 | Self::RESET.0);
    pub const ALL: Self = Self(u64::MAX);

    /// All bits of `other` are set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl std::ops::BitOr for EventKind {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// StreamEvent
// ─────────────────────────────────────────────────────────────────────────────

/// What an event is about.
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    Subscription { subscription_id: u64 },
    /// Points added to or evicted from one series.
    Data { series: String, added: usize, evicted: usize },
    /// The full range map after the change.
    Ranges(HashMap<String, AxisRange>),
    Time { axis_id: String, time: f64 },
}

impl EventPayload {
    fn series(&self) -> Option<&str> {
        match self {
            Self::Data { series, .. } => Some(series),
            _ => None,
        }
    }

    fn mentions_axis(&self, id: &str) -> bool {
        match self {
            Self::Ranges(ranges) => ranges.contains_key(id),
            Self::Time { axis_id, .. } => axis_id == id,
            _ => true,
        }
    }
}

/// An event emitted while streaming.
#[derive(Debug, Clone)]
pub struct StreamEvent {
    pub kinds: EventKind,
    /// Position in the controller's emission order, starting at 1. Set on emit.
    pub seq: u64,
    pub payload: EventPayload,
}

impl StreamEvent {
    pub fn new(kinds: EventKind, payload: EventPayload) -> Self {
        Self { kinds, seq: 0, payload }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// EventFilter
// ─────────────────────────────────────────────────────────────────────────────

/// Selects which events a subscriber receives.
///
/// A series scope drops data events about other series; an axis scope drops range and
/// time events that do not mention the axis. Events of other shapes pass either scope.
#[derive(Debug, Clone)]
pub struct EventFilter {
    pub mask: EventKind,
    pub series: Option<String>,
    pub axis: Option<String>,
}

impl EventFilter {
    pub fn all() -> Self {
        Self::only(EventKind::ALL)
    }

    pub fn only(mask: EventKind) -> Self {
        Self {
            mask,
            series: None,
            axis: None,
        }
    }

    pub fn for_series(mut self, series: impl Into<String>) -> Self {
        self.series = Some(series.into());
        self
    }

    pub fn for_axis(mut self, axis_id: impl Into<String>) -> Self {
        self.axis = Some(axis_id.into());
        self
    }

    pub fn matches(&self, event: &StreamEvent) -> bool {
        if !event.kinds.intersects(self.mask) {
            return false;
        }
        if let (Some(want), Some(got)) = (&self.series, event.payload.series()) {
            if want != got {
                return false;
            }
        }
        self.axis.as_deref().map_or(true, |id| event.payload.mentions_axis(id))
    }
}

impl Default for EventFilter {
    fn default() -> Self {
        Self::all()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// EventController
// ─────────────────────────────────────────────────────────────────────────────

/// Numbers stream events and hands them to matching subscribers over `mpsc` channels.
#[derive(Clone, Default)]
pub struct EventController {
    inner: Arc<Mutex<EventCtrlInner>>,
}

#[derive(Default)]
struct EventCtrlInner {
    subscribers: Vec<(EventFilter, Sender<StreamEvent>)>,
    emitted: u64,
}

impl EventController {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, EventCtrlInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn subscribe(&self, filter: EventFilter) -> Receiver<StreamEvent> {
        let (tx, rx) = std::sync::mpsc::channel();
        self.lock().subscribers.push((filter, tx));
        rx
    }

    /// Number of events emitted so far, delivered or not.
    pub fn emitted(&self) -> u64 {
        self.lock().emitted
    }

    /// Stamp `event` with the next sequence number and send it to every matching
    /// subscriber. Subscribers whose receiver is gone are dropped on their next match.
    pub fn emit(&self, mut event: StreamEvent) {
        let mut inner = self.lock();
        inner.emitted += 1;
        event.seq = inner.emitted;
        inner
            .subscribers
            .retain(|(filter, tx)| !filter.matches(&event) || tx.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(series: &str) -> StreamEvent {
        StreamEvent::new(
            EventKind::DATA_UPDATED,
            EventPayload::Data {
                series: series.into(),
                added: 1,
                evicted: 0,
            },
        )
    }

    fn time(axis_id: &str) -> StreamEvent {
        StreamEvent::new(
            EventKind::TIME_UPDATED,
            EventPayload::Time {
                axis_id: axis_id.into(),
                time: 1.0,
            },
        )
    }

    #[test]
    fn grouped_kinds() {
        assert!(EventKind::DATA.contains(EventKind::DATA_EVICTED));
        assert!(EventKind::VIEW.intersects(EventKind::PAN | EventKind::RANGES_UPDATED));
        assert!(!EventKind::VIEW.intersects(EventKind::DATA));
    }

    #[test]
    fn series_scope_only_filters_data_events() {
        let filter = EventFilter::all().for_series("a");
        assert!(filter.matches(&data("a")));
        assert!(!filter.matches(&data("b")));
        assert!(filter.matches(&time("x")));
    }

    #[test]
    fn axis_scope() {
        let filter = EventFilter::only(EventKind::TIME_UPDATED | EventKind::RANGES_UPDATED).for_axis("x-b");
        assert!(filter.matches(&time("x-b")));
        assert!(!filter.matches(&time("x-a")));
        let ranges = HashMap::from([("x-b".to_string(), AxisRange::new(0.0, 1.0))]);
        assert!(filter.matches(&StreamEvent::new(EventKind::RANGES_UPDATED, EventPayload::Ranges(ranges))));
        assert!(!filter.matches(&data("a")));
    }

    #[test]
    fn sequence_counts_filtered_events_too() {
        let ctrl = EventController::new();
        let rx = ctrl.subscribe(EventFilter::only(EventKind::TIME_UPDATED));
        ctrl.emit(data("a"));
        ctrl.emit(time("x"));
        ctrl.emit(data("a"));
        ctrl.emit(time("x"));

        let seqs: Vec<u64> = rx.try_iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![2, 4]);
        assert_eq!(ctrl.emitted(), 4);
    }

    #[test]
    fn gone_subscribers_are_dropped() {
        let ctrl = EventController::new();
        let gone = ctrl.subscribe(EventFilter::all());
        let kept = ctrl.subscribe(EventFilter::all());
        drop(gone);

        ctrl.emit(time("x"));
        assert!(kept.try_recv().is_ok());
        assert_eq!(ctrl.lock().subscribers.len(), 1);
    }
}
