pub mod checksum;
pub mod classes;
pub mod enhance;
pub mod host;
pub mod prelude;
pub mod rules;
pub mod schedule;
pub mod tracker;
pub mod value;

pub use tracker::{FormTracker, TrackerOptions};
