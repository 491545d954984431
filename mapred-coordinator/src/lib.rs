//! Leader side of the map-reduce pipeline.
//!
//! The coordinator owns one [`task_set::TaskSet`] per phase and serves two
//! RPCs to polling workers: `RequestTask` and `TaskStatus`. It is exposed
//! as a library so the state machine can be driven directly in tests and
//! embedded by an external serving loop.

pub mod core;
pub mod task_set;
