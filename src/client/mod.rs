//! The blocking Jenkins client.

pub mod builder;
mod gateway;
pub mod jenkins;

pub use builder::JenkinsBuilder;
pub use jenkins::Jenkins;
