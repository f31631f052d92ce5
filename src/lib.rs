//! streamplot crate root: re-exports and module wiring.
//!
//! This crate keeps the state behind a realtime streaming chart: per-series point
//! buffers with a retention horizon, time axis windows that follow the data, and
//! windowed statistics. Rendering is left to the caller.
//!
//! Modules:
//! - `sink`: data types and channels to feed points, plus the batching thread
//! - `stream`: the window controller that consumes batches
//! - `data`: ranges, series buffers, statistics and axis assignment
//! - `controllers`: external control of the view (zoom, pan, reset)
//! - `events`: filtered event fan-out
//! - `config` / `persistence`: stream configuration and config files
//! - `pan_zoom` / `lens`: view transforms

pub mod config;
pub mod controllers;
pub mod data;
pub mod error;
pub mod events;
pub mod lens;
pub mod pan_zoom;
pub mod persistence;
pub mod sink;
pub mod stream;

// Public re-exports for a compact external API
pub use config::{StreamConfig, TimeWindowBehavior};
pub use controllers::{ViewController, ViewInfo, ViewRequest};
pub use data::assignment::{resolve, resolve_x_axes, resolve_y_axes, AxisAssignment, AxisAssignments, AxisSide};
pub use data::axis_range::AxisRange;
pub use data::datum::{Datum, IterateDatum, OrdinalDatum, StreamDatum};
pub use data::iterates::{iterate_extent, IterateBuilder};
pub use data::ordinal_range::OrdinalRange;
pub use data::series::Series;
pub use data::stats::{OrdinalValueStats, SeriesStats, ValueStats};
pub use error::{Error, Result};
pub use events::{EventController, EventFilter, EventKind, EventPayload, StreamEvent};
pub use lens::{BarMagnifier, LensPoint, RadialMagnifier};
pub use sink::{channel_stream, Arrival, Batch, BatchAccumulator, BatchBuffer, StreamSink};
pub use stream::{advance_window, EventObserver, StreamObserver, StreamWindowController};
