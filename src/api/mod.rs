//! Job and build operations, implemented on [`crate::Jenkins`].
//!
//! * [`jobs`]: reads, configuration and job lifecycle.
//! * [`builds`]: triggering builds and waiting for them.

pub mod builds;
pub mod jobs;
