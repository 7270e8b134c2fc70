//! # pictjoin-av
//!
//! ffmpeg plumbing for joining DVR recordings.
//!
//! This crate provides:
//! - **Tool discovery** ([`locate_encoder`]) -- find the ffmpeg executable.
//! - **Commands** ([`ToolCommand`]) -- argument vectors for external tools.
//! - **Execution** ([`CommandRunner`], [`ProcessRunner`]) -- run a command,
//!   stream its stderr, report the exit status, stop on cancellation.
//! - **Workspaces** ([`Workspace`]) -- temporary intermediates plus a staging
//!   file that is renamed onto the output only on success.
//! - **Stage builders** ([`actions`]) -- the normalize, concat and encode
//!   invocations of a join.
//!
//! ## Example
//!
//! ```no_run
//! use pictjoin_av::{actions, locate_encoder, Container, EncodeSettings};
//! use std::path::Path;
//!
//! let ffmpeg = locate_encoder(None)?;
//! let cmd = actions::encode_command(
//!     &ffmpeg,
//!     Path::new("joined.mkv"),
//!     Path::new("flight.mp4"),
//!     Container::Mp4,
//!     &EncodeSettings::default(),
//! );
//! println!("{cmd}");
//! # Ok::<(), pictjoin_av::Error>(())
//! ```

pub mod actions;
mod command;
mod container;
mod error;
pub mod runner;
pub mod tools;
pub mod workspace;

// Re-exports
pub use actions::EncodeSettings;
pub use command::ToolCommand;
pub use container::Container;
pub use error::{Error, Result};
pub use runner::{CommandRunner, ProcessRunner, ToolOutput};
pub use tools::{check_tool, locate_encoder, ToolInfo, DEFAULT_ENCODER};
pub use workspace::Workspace;
