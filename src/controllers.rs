//! Controllers for interacting with a running stream from external code.
//!
//! A [`ViewController`] exposes the last published axis ranges and a subscription
//! mechanism, and lets non-rendering code push simple view requests (zoom, pan, reset).
//! Requests are recorded here and applied by the window controller the next time it
//! polls.

use std::collections::HashMap;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::data::axis_range::AxisRange;

/// Snapshot of the time axes after a batch or a view change.
#[derive(Debug, Clone, Default)]
pub struct ViewInfo {
    pub ranges: HashMap<String, AxisRange>,
    pub current_times: HashMap<String, f64>,
}

/// A view change requested through a [`ViewController`].
#[derive(Debug, Clone, PartialEq)]
pub enum ViewRequest {
    /// Relative zoom about `pivot`; `delta > 1` zooms out.
    Zoom { delta: f64, pivot: f64 },
    Pan { amount: f64 },
    Reset,
}

/// Controller to request view changes and subscribe to range updates.
#[derive(Clone)]
pub struct ViewController {
    pub(crate) inner: Arc<Mutex<ViewCtrlInner>>,
}

pub(crate) struct ViewCtrlInner {
    pub(crate) latest: Option<ViewInfo>,
    pub(crate) requests: Vec<ViewRequest>,
    pub(crate) listeners: Vec<Sender<ViewInfo>>,
}

impl ViewController {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(ViewCtrlInner {
                latest: None,
                requests: Vec::new(),
                listeners: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ViewCtrlInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Last ranges published by the stream, if any batch has been processed yet.
    pub fn latest_ranges(&self) -> Option<HashMap<String, AxisRange>> {
        self.lock().latest.as_ref().map(|info| info.ranges.clone())
    }

    pub fn latest(&self) -> Option<ViewInfo> {
        self.lock().latest.clone()
    }

    /// Request a relative zoom of every time axis about `pivot`.
    pub fn request_zoom(&self, delta: f64, pivot: f64) {
        self.lock().requests.push(ViewRequest::Zoom { delta, pivot });
    }

    pub fn request_pan(&self, amount: f64) {
        self.lock().requests.push(ViewRequest::Pan { amount });
    }

    /// Request that every time axis goes back to its original extent.
    pub fn request_reset(&self) {
        self.lock().requests.push(ViewRequest::Reset);
    }

    pub fn pending_requests(&self) -> usize {
        self.lock().requests.len()
    }

    /// Subscribe to view updates. The receiver gets a [`ViewInfo`] whenever the stream
    /// publishes new ranges.
    pub fn subscribe(&self) -> Receiver<ViewInfo> {
        let (tx, rx) = std::sync::mpsc::channel();
        self.lock().listeners.push(tx);
        rx
    }

    /// Drain the recorded requests in the order they were made.
    pub(crate) fn take_requests(&self) -> Vec<ViewRequest> {
        std::mem::take(&mut self.lock().requests)
    }

    /// Store `info` as the latest view and send it to live listeners.
    pub(crate) fn publish(&self, info: ViewInfo) {
        let mut inner = self.lock();
        inner.listeners.retain(|tx| tx.send(info.clone()).is_ok());
        inner.latest = Some(info);
    }
}

impl Default for ViewController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_are_drained_in_order() {
        let view = ViewController::new();
        view.request_zoom(0.5, 10.0);
        view.request_pan(3.0);
        view.request_reset();
        assert_eq!(view.pending_requests(), 3);

        let reqs = view.take_requests();
        assert_eq!(
            reqs,
            vec![
                ViewRequest::Zoom { delta: 0.5, pivot: 10.0 },
                ViewRequest::Pan { amount: 3.0 },
                ViewRequest::Reset,
            ]
        );
        assert_eq!(view.pending_requests(), 0);
    }

    #[test]
    fn publish_reaches_clones_and_listeners() {
        let view = ViewController::new();
        let handle = view.clone();
        let rx = handle.subscribe();
        assert!(handle.latest_ranges().is_none());

        let mut info = ViewInfo::default();
        info.ranges.insert("x".into(), AxisRange::new(0.0, 10.0));
        view.publish(info);

        assert_eq!(handle.latest_ranges().unwrap()["x"].end(), 10.0);
        assert_eq!(rx.try_recv().unwrap().ranges.len(), 1);
    }

    #[test]
    fn dropped_listeners_are_pruned() {
        let view = ViewController::new();
        drop(view.subscribe());
        view.publish(ViewInfo::default());
        assert!(view.lock().listeners.is_empty());
    }
}
