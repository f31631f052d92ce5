//! Which axes a series is drawn against, and grouping series by axis.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Axis id used for x when a series has no assignment.
pub const DEFAULT_X_AXIS_ID: &str = "x-axis-default";
/// Axis id used for y when a series has no assignment.
pub const DEFAULT_Y_AXIS_ID: &str = "y-axis-default";

/// The x and y axis a single series is plotted against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AxisAssignment {
    pub x_axis: String,
    pub y_axis: String,
}

impl AxisAssignment {
    pub fn new<X: Into<String>, Y: Into<String>>(x_axis: X, y_axis: Y) -> Self {
        Self {
            x_axis: x_axis.into(),
            y_axis: y_axis.into(),
        }
    }
}

/// Series name to axis assignment.
pub type AxisAssignments = HashMap<String, AxisAssignment>;

/// Which side of an assignment a grouping is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisSide {
    X,
    Y,
}

impl AxisSide {
    /// Axis id on this side of `assignment`, or `default_id` when the series is unassigned.
    pub fn axis_id<'a>(&self, assignment: Option<&'a AxisAssignment>, default_id: &'a str) -> &'a str {
        match (self, assignment) {
            (AxisSide::X, Some(a)) => &a.x_axis,
            (AxisSide::Y, Some(a)) => &a.y_axis,
            (_, None) => default_id,
        }
    }
}

/// Group series names by the axis id `axis_id_for` resolves for them.
///
/// `axis_id_for` gets the series' assignment (if any) and is responsible for falling back
/// to a default id. Buckets and the names inside each bucket keep first-seen order.
pub fn resolve<'n, I, F>(
    mut axis_id_for: F,
    series_names: I,
    assignments: &AxisAssignments,
) -> IndexMap<String, Vec<String>>
where
    I: IntoIterator<Item = &'n str>,
    F: FnMut(Option<&AxisAssignment>) -> String,
{
    let mut groups: IndexMap<String, Vec<String>> = IndexMap::new();
    for name in series_names {
        let axis_id = axis_id_for(assignments.get(name));
        groups.entry(axis_id).or_default().push(name.to_string());
    }
    groups
}

/// Group by the x-axis assignment with `default_id` for unassigned series.
pub fn resolve_x_axes<'n, I>(
    series_names: I,
    assignments: &AxisAssignments,
    default_id: &str,
) -> IndexMap<String, Vec<String>>
where
    I: IntoIterator<Item = &'n str>,
{
    resolve(
        |a| AxisSide::X.axis_id(a, default_id).to_string(),
        series_names,
        assignments,
    )
}

/// Group by the y-axis assignment with `default_id` for unassigned series.
pub fn resolve_y_axes<'n, I>(
    series_names: I,
    assignments: &AxisAssignments,
    default_id: &str,
) -> IndexMap<String, Vec<String>>
where
    I: IntoIterator<Item = &'n str>,
{
    resolve(
        |a| AxisSide::Y.axis_id(a, default_id).to_string(),
        series_names,
        assignments,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> AxisAssignments {
        let mut t = AxisAssignments::new();
        t.insert("a".into(), AxisAssignment::new("x-top", "y-left"));
        t.insert("b".into(), AxisAssignment::new("x-bottom", "y-left"));
        t.insert("c".into(), AxisAssignment::new("x-top", "y-right"));
        t
    }

    #[test]
    fn empty_table_puts_everything_on_default() {
        let groups = resolve_x_axes(["a", "b", "c"], &AxisAssignments::new(), "x-default");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups["x-default"], vec!["a", "b", "c"]);
    }

    #[test]
    fn groups_keep_first_seen_order() {
        let groups = resolve_x_axes(["c", "b", "a", "d"], &table(), "x-default");
        let keys: Vec<&str> = groups.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["x-top", "x-bottom", "x-default"]);
        assert_eq!(groups["x-top"], vec!["c", "a"]);
        assert_eq!(groups["x-default"], vec!["d"]);
    }

    #[test]
    fn y_side_grouping() {
        let groups = resolve_y_axes(["a", "b", "c"], &table(), "y-default");
        assert_eq!(groups["y-left"], vec!["a", "b"]);
        assert_eq!(groups["y-right"], vec!["c"]);
    }

    #[test]
    fn custom_extractor_can_remap_unknown_axes() {
        let known = ["x-top"];
        let groups = resolve(
            |a| {
                let id = AxisSide::X.axis_id(a, "x-default");
                if known.contains(&id) { id.to_string() } else { "x-default".to_string() }
            },
            ["a", "b"],
            &table(),
        );
        assert_eq!(groups["x-top"], vec!["a"]);
        assert_eq!(groups["x-default"], vec!["b"]);
    }
}
