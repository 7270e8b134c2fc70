//! pictjoin - join DVR recordings into one video
//!
//! This library crate exposes the core functionality for integration testing.

pub mod pipeline;
pub mod segments;
