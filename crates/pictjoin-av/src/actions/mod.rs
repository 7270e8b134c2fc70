//! ffmpeg invocations for each stage of a join.
//!
//! A join runs in three stages:
//! - normalize: rewrite every DVR segment into a lossless intermediate with a
//!   clean timestamp base
//! - concat: join the intermediates with the concat demuxer, copying streams
//! - encode: compress the joined intermediate to H.264/AAC
//!
//! Concatenating the raw AVI segments while re-encoding in one pass lets
//! audio drift away from video, because every segment starts its own clock.

mod concat;
mod encode;
mod normalize;

pub use concat::{concat_command, manifest_contents, write_manifest};
pub use encode::{encode_command, EncodeSettings};
pub use normalize::normalize_command;

use crate::ToolCommand;
use std::path::Path;

/// ffmpeg with the flags every stage shares: no banner, never read the
/// terminal, overwrite the (temporary) output.
fn ffmpeg_command(ffmpeg: &Path) -> ToolCommand {
    let mut cmd = ToolCommand::new(ffmpeg.to_path_buf());
    cmd.args(["-hide_banner", "-nostdin", "-y"]);
    cmd
}
