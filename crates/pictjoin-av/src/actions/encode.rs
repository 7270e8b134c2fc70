//! Final H.264/AAC encode.

use super::ffmpeg_command;
use crate::{Container, ToolCommand};
use serde::Serialize;
use std::path::Path;

/// Encoding parameters for a join.
///
/// The codecs are fixed (libx264 + AAC); the knobs here only tune them.
/// Defaults match what the DVR footage needs: mono 8 kHz audio and 5 minute
/// segments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodeSettings {
    /// x264 preset.
    pub preset: String,
    /// x264 constant rate factor.
    pub crf: u8,
    /// H.264 profile.
    pub profile: String,
    /// Keyframe interval in frames.
    pub gop: u32,
    /// Maximum consecutive B-frames.
    pub bframes: u32,
    /// Output pixel format.
    pub pix_fmt: String,
    /// AAC VBR quality.
    pub audio_quality: u8,
    /// Output audio channels.
    pub audio_channels: u8,
    /// Output audio sample rate in Hz.
    pub audio_rate: u32,
    /// Encoder threads for the normalization stage.
    pub threads: u32,
    /// Per-segment duration cap in seconds; `None` keeps segments whole.
    pub segment_limit_secs: Option<u64>,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self {
            preset: "medium".to_string(),
            crf: 23,
            profile: "high422".to_string(),
            gop: 150,
            bframes: 3,
            pix_fmt: "yuv420p".to_string(),
            audio_quality: 1,
            audio_channels: 1,
            audio_rate: 8000,
            threads: 8,
            segment_limit_secs: Some(300),
        }
    }
}

/// Encode the joined intermediate into the final output.
///
/// Metadata carried over from the intermediates is dropped and the muxer
/// runs bit-exact, so two runs over the same segments produce the same
/// container metadata.
pub fn encode_command(
    ffmpeg: &Path,
    input: &Path,
    output: &Path,
    container: Container,
    settings: &EncodeSettings,
) -> ToolCommand {
    let mut cmd = ffmpeg_command(ffmpeg);
    cmd.arg("-i").arg(input);
    cmd.args(["-map_metadata", "-1"]);
    cmd.args(["-c:a", "aac"]);
    cmd.arg("-q:a").arg(settings.audio_quality.to_string());
    cmd.arg("-ac").arg(settings.audio_channels.to_string());
    cmd.arg("-ar").arg(settings.audio_rate.to_string());
    cmd.args(["-c:v", "libx264"]);
    cmd.arg("-preset").arg(&settings.preset);
    cmd.arg("-crf").arg(settings.crf.to_string());
    cmd.arg("-profile:v").arg(&settings.profile);
    cmd.arg("-g").arg(settings.gop.to_string());
    cmd.arg("-bf").arg(settings.bframes.to_string());
    cmd.arg("-pix_fmt").arg(&settings.pix_fmt);
    cmd.args(container.muxer_args());
    cmd.args(["-fflags", "+bitexact"]);
    cmd.arg(output);
    cmd
}
