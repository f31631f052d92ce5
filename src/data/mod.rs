pub mod assignment;
pub mod axis_range;
pub mod datum;
pub mod iterates;
pub mod ordinal_range;
pub mod series;
pub mod stats;
