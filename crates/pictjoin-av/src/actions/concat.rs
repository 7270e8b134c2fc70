//! Joining intermediates with the concat demuxer.

use super::ffmpeg_command;
use crate::{Result, ToolCommand};
use std::path::{Path, PathBuf};

/// Render a concat demuxer manifest listing `files` in order.
///
/// Paths are single-quoted; an embedded `'` is written as `'\''`.
pub fn manifest_contents(files: &[PathBuf]) -> String {
    files
        .iter()
        .map(|path| {
            let path = path.to_string_lossy().replace('\'', r"'\''");
            format!("file '{path}'\n")
        })
        .collect()
}

/// Write the manifest for `files` to `manifest`.
pub fn write_manifest(manifest: &Path, files: &[PathBuf]) -> Result<()> {
    std::fs::write(manifest, manifest_contents(files))?;
    tracing::debug!(
        "Wrote concat manifest {} ({} entries)",
        manifest.display(),
        files.len()
    );
    Ok(())
}

/// Join the files listed in `manifest` into `output` without re-encoding.
///
/// `-safe 0` allows absolute paths in the manifest. `-max_interleave_delta 0`
/// makes the muxer wait for both streams instead of flushing one ahead of the
/// other, which keeps audio packets next to the video they belong to.
pub fn concat_command(ffmpeg: &Path, manifest: &Path, output: &Path) -> ToolCommand {
    let mut cmd = ffmpeg_command(ffmpeg);
    cmd.args(["-f", "concat", "-safe", "0", "-i"]).arg(manifest);
    cmd.args(["-c:a", "copy", "-c:v", "copy"]);
    cmd.args(["-max_interleave_delta", "0"]);
    cmd.arg(output);
    cmd
}
