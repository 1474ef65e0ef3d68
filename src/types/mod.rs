//! Shared request/response types.

pub mod common;
pub mod jobs;
pub mod wait;

pub use common::*;
pub use jobs::*;
pub use wait::*;
