//! Callbacks the window controller invokes while streaming.

use std::collections::HashMap;

use crate::data::axis_range::AxisRange;
use crate::events::{EventController, EventKind, EventPayload, StreamEvent};

/// Receives notifications from a [`StreamWindowController`](super::StreamWindowController).
///
/// Every method has a no-op default so implementors only override what they need. Calls
/// are made synchronously from inside batch processing.
pub trait StreamObserver<D> {
    fn on_subscribe(&mut self, _subscription_id: u64) {}

    fn on_unsubscribe(&mut self, _subscription_id: u64) {}

    /// New points for `series`, called before they are appended.
    fn on_update_data(&mut self, _series: &str, _points: &[D]) {}

    /// `dropped` points of `series` fell out of the retention window.
    fn on_evict_data(&mut self, _series: &str, _dropped: usize) {}

    /// The full per-axis range map after a batch or a view change.
    fn on_update_ranges(&mut self, _ranges: &HashMap<String, AxisRange>) {}

    fn on_current_time(&mut self, _axis_id: &str, _time: f64) {}
}

impl<D> StreamObserver<D> for () {}

impl<D, O: StreamObserver<D>> StreamObserver<D> for Option<O> {
    fn on_subscribe(&mut self, id: u64) {
        if let Some(o) = self {
            o.on_subscribe(id);
        }
    }

    fn on_unsubscribe(&mut self, id: u64) {
        if let Some(o) = self {
            o.on_unsubscribe(id);
        }
    }

    fn on_update_data(&mut self, series: &str, points: &[D]) {
        if let Some(o) = self {
            o.on_update_data(series, points);
        }
    }

    fn on_evict_data(&mut self, series: &str, dropped: usize) {
        if let Some(o) = self {
            o.on_evict_data(series, dropped);
        }
    }

    fn on_update_ranges(&mut self, ranges: &HashMap<String, AxisRange>) {
        if let Some(o) = self {
            o.on_update_ranges(ranges);
        }
    }

    fn on_current_time(&mut self, axis_id: &str, time: f64) {
        if let Some(o) = self {
            o.on_current_time(axis_id, time);
        }
    }
}

/// Both observers, first then second.
impl<D, A: StreamObserver<D>, B: StreamObserver<D>> StreamObserver<D> for (A, B) {
    fn on_subscribe(&mut self, id: u64) {
        self.0.on_subscribe(id);
        self.1.on_subscribe(id);
    }

    fn on_unsubscribe(&mut self, id: u64) {
        self.0.on_unsubscribe(id);
        self.1.on_unsubscribe(id);
    }

    fn on_update_data(&mut self, series: &str, points: &[D]) {
        self.0.on_update_data(series, points);
        self.1.on_update_data(series, points);
    }

    fn on_evict_data(&mut self, series: &str, dropped: usize) {
        self.0.on_evict_data(series, dropped);
        self.1.on_evict_data(series, dropped);
    }

    fn on_update_ranges(&mut self, ranges: &HashMap<String, AxisRange>) {
        self.0.on_update_ranges(ranges);
        self.1.on_update_ranges(ranges);
    }

    fn on_current_time(&mut self, axis_id: &str, time: f64) {
        self.0.on_current_time(axis_id, time);
        self.1.on_current_time(axis_id, time);
    }
}

/// Forwards observer callbacks to an [`EventController`] as [`StreamEvent`]s.
#[derive(Clone)]
pub struct EventObserver {
    events: EventController,
}

impl EventObserver {
    pub fn new(events: EventController) -> Self {
        Self { events }
    }

    /// Report a zoom, pan or reset along with the resulting ranges.
    pub fn view_changed(&self, kind: EventKind, ranges: &HashMap<String, AxisRange>) {
        self.emit(kind | EventKind::RANGES_UPDATED, EventPayload::Ranges(ranges.clone()));
    }

    fn emit(&self, kinds: EventKind, payload: EventPayload) {
        self.events.emit(StreamEvent::new(kinds, payload));
    }
}

impl<D> StreamObserver<D> for EventObserver {
    fn on_subscribe(&mut self, subscription_id: u64) {
        self.emit(EventKind::SUBSCRIBED, EventPayload::Subscription { subscription_id });
    }

    fn on_unsubscribe(&mut self, subscription_id: u64) {
        self.emit(EventKind::UNSUBSCRIBED, EventPayload::Subscription { subscription_id });
    }

    fn on_update_data(&mut self, series: &str, points: &[D]) {
        let payload = EventPayload::Data {
            series: series.to_string(),
            added: points.len(),
            evicted: 0,
        };
        self.emit(EventKind::DATA_UPDATED, payload);
    }

    fn on_evict_data(&mut self, series: &str, dropped: usize) {
        let payload = EventPayload::Data {
            series: series.to_string(),
            added: 0,
            evicted: dropped,
        };
        self.emit(EventKind::DATA_EVICTED, payload);
    }

    fn on_update_ranges(&mut self, ranges: &HashMap<String, AxisRange>) {
        self.emit(EventKind::RANGES_UPDATED, EventPayload::Ranges(ranges.clone()));
    }

    fn on_current_time(&mut self, axis_id: &str, time: f64) {
        let payload = EventPayload::Time {
            axis_id: axis_id.to_string(),
            time,
        };
        self.emit(EventKind::TIME_UPDATED, payload);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::datum::Datum;
    use crate::events::EventFilter;

    #[derive(Default)]
    struct Count(usize);

    impl StreamObserver<Datum> for Count {
        fn on_update_data(&mut self, _series: &str, points: &[Datum]) {
            self.0 += points.len();
        }
    }

    #[test]
    fn pair_and_option_forward() {
        let mut pair = (Count::default(), Some(Count::default()));
        let points = [Datum::new(0.0, 1.0), Datum::new(1.0, 2.0)];
        StreamObserver::<Datum>::on_update_data(&mut pair, "s", &points);
        assert_eq!(pair.0 .0, 2);
        assert_eq!(pair.1.as_ref().map(|c| c.0), Some(2));

        let mut none: Option<Count> = None;
        StreamObserver::<Datum>::on_current_time(&mut none, "x", 1.0);
    }

    #[test]
    fn event_observer_emits_kinds() {
        let ctrl = EventController::new();
        let rx = ctrl.subscribe(EventFilter::only(EventKind::DATA_EVICTED | EventKind::ZOOM));
        let mut obs = EventObserver::new(ctrl);

        StreamObserver::<Datum>::on_evict_data(&mut obs, "s", 4);
        StreamObserver::<Datum>::on_current_time(&mut obs, "x", 3.0);
        obs.view_changed(EventKind::ZOOM, &HashMap::new());

        let evicted = rx.try_recv().unwrap();
        assert!(matches!(evicted.payload, EventPayload::Data { evicted: 4, added: 0, .. }));
        let zoom = rx.try_recv().unwrap();
        assert!(zoom.kinds.contains(EventKind::ZOOM | EventKind::RANGES_UPDATED));
        assert!(rx.try_recv().is_err());
    }
}
