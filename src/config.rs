//! Configuration for a streaming plot's windowing behaviour.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::controllers::ViewController;
use crate::data::assignment::{AxisAssignment, AxisAssignments, DEFAULT_X_AXIS_ID, DEFAULT_Y_AXIS_ID};
use crate::error::{Error, Result};
use crate::events::EventController;

// ─────────────────────────────────────────────────────────────────────────────
// Time window behaviour
// ─────────────────────────────────────────────────────────────────────────────

/// How an axis window follows the data once the data passes its right edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeWindowBehavior {
    /// Keep the window width and slide it forward.
    #[default]
    Scroll,
    /// Keep the start pinned at the axis' initial start and stretch the end.
    Squeeze,
}

// ─────────────────────────────────────────────────────────────────────────────
// Controllers sub-config
// ─────────────────────────────────────────────────────────────────────────────

/// Optional programmatic controllers attached to the stream.
#[derive(Clone, Default)]
pub struct Controllers {
    pub view: Option<ViewController>,
    pub event: Option<EventController>,
}

impl std::fmt::Debug for Controllers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controllers")
            .field("view", &self.view.is_some())
            .field("event", &self.event.is_some())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// StreamConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Top-level configuration for one streaming plot.
///
/// | Field                  | Purpose |
/// |------------------------|---------|
/// | `drop_data_after`      | Retention horizon in ms, `None` keeps everything |
/// | `windowing_time_ms`    | How long arrivals are buffered into one batch |
/// | `axis_assignments`     | Series name to x/y axis ids |
/// | `time_window_behavior` | `SCROLL` or `SQUEEZE` |
/// | `cadence_period_ms`    | Synthetic tick period, `None` disables ticks |
/// | `windowed_stats`       | Maintain windowed statistics per series |
/// | `controllers`          | Programmatic interaction handles (not serialized) |
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drop_data_after: Option<f64>,
    pub windowing_time_ms: u64,
    pub axis_assignments: AxisAssignments,
    pub time_window_behavior: TimeWindowBehavior,
    pub default_x_axis_id: String,
    pub default_y_axis_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cadence_period_ms: Option<f64>,
    pub windowed_stats: bool,
    #[serde(skip)]
    pub controllers: Controllers,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            drop_data_after: None,
            windowing_time_ms: 100,
            axis_assignments: AxisAssignments::new(),
            time_window_behavior: TimeWindowBehavior::Scroll,
            default_x_axis_id: DEFAULT_X_AXIS_ID.to_string(),
            default_y_axis_id: DEFAULT_Y_AXIS_ID.to_string(),
            cadence_period_ms: None,
            windowed_stats: false,
            controllers: Controllers::default(),
        }
    }
}

impl StreamConfig {
    /// Retention horizon in ms; infinite when unset.
    pub fn retention(&self) -> f64 {
        self.drop_data_after.unwrap_or(f64::INFINITY)
    }

    pub fn windowing_time(&self) -> Duration {
        Duration::from_millis(self.windowing_time_ms)
    }

    /// Retention horizon in ms. `f64::INFINITY` keeps everything; anything else is stored
    /// as given and checked by [`validate`](Self::validate).
    pub fn with_drop_data_after(mut self, ms: f64) -> Self {
        self.drop_data_after = if ms == f64::INFINITY { None } else { Some(ms) };
        self
    }

    pub fn with_windowing_time(mut self, windowing_time: Duration) -> Self {
        self.windowing_time_ms = windowing_time.as_millis() as u64;
        self
    }

    pub fn with_assignment<S: Into<String>>(mut self, series: S, assignment: AxisAssignment) -> Self {
        self.axis_assignments.insert(series.into(), assignment);
        self
    }

    pub fn with_time_window_behavior(mut self, behavior: TimeWindowBehavior) -> Self {
        self.time_window_behavior = behavior;
        self
    }

    pub fn with_default_axes<X: Into<String>, Y: Into<String>>(mut self, x: X, y: Y) -> Self {
        self.default_x_axis_id = x.into();
        self.default_y_axis_id = y.into();
        self
    }

    pub fn with_cadence(mut self, period_ms: f64) -> Self {
        self.cadence_period_ms = Some(period_ms);
        self
    }

    pub fn with_windowed_stats(mut self, enabled: bool) -> Self {
        self.windowed_stats = enabled;
        self
    }

    pub fn with_view_controller(mut self, view: ViewController) -> Self {
        self.controllers.view = Some(view);
        self
    }

    pub fn with_event_controller(mut self, events: EventController) -> Self {
        self.controllers.event = Some(events);
        self
    }

    /// Reject values the stream cannot work with.
    pub fn validate(&self) -> Result<()> {
        if let Some(ms) = self.drop_data_after {
            if ms.is_nan() || ms < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "drop_data_after must be non-negative, got {ms}"
                )));
            }
        }
        if self.windowing_time_ms == 0 {
            return Err(Error::InvalidConfig("windowing_time_ms must be at least 1".into()));
        }
        if let Some(period) = self.cadence_period_ms {
            if !period.is_finite() || period <= 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "cadence_period_ms must be finite and positive, got {period}"
                )));
            }
        }
        if self.default_x_axis_id.is_empty() || self.default_y_axis_id.is_empty() {
            return Err(Error::InvalidConfig("default axis ids must not be empty".into()));
        }
        Ok(())
    }
}
