//! Worker side of the map-reduce pipeline: the polling control loop plus
//! the map and reduce executors. Exposed as a library so the loop can be
//! driven end to end in tests against an in-process coordinator.

pub mod core;
pub mod map;
pub mod reduce;
