//! Per-segment normalization.

use super::{ffmpeg_command, EncodeSettings};
use crate::ToolCommand;
use std::path::Path;

/// Rewrite one DVR segment into an intermediate Matroska file.
///
/// Video becomes intra-only FFV1 (every frame a keyframe, so the concat
/// stage can cut anywhere), audio is copied as-is since the DVR already
/// records PCM, and the duration is capped at the nominal segment length to
/// drop the trailing junk some recordings carry.
pub fn normalize_command(
    ffmpeg: &Path,
    input: &Path,
    output: &Path,
    settings: &EncodeSettings,
) -> ToolCommand {
    let mut cmd = ffmpeg_command(ffmpeg);
    cmd.arg("-i").arg(input);
    cmd.arg("-threads").arg(settings.threads.to_string());
    cmd.args(["-c:a", "copy"]);
    cmd.args([
        "-c:v", "ffv1", "-level", "3", "-coder", "1", "-context", "1", "-g", "1", "-slices",
        "24", "-slicecrc", "1",
    ]);
    if let Some(limit) = settings.segment_limit_secs {
        cmd.arg("-t").arg(limit.to_string());
    }
    cmd.arg(output);
    cmd
}
