//! Encoder discovery.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Executable name searched for when no override is given.
pub const DEFAULT_ENCODER: &str = "ffmpeg";

/// Information about an external tool.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// Name of the tool.
    pub name: String,
    /// Whether the tool is available.
    pub available: bool,
    /// Version string if available.
    pub version: Option<String>,
    /// Path to the tool executable.
    pub path: Option<PathBuf>,
}

/// Locate the encoder executable.
///
/// The override may be a bare name (searched for on `PATH`) or a path to an
/// executable. An override that does not resolve is an error; there is no
/// fallback to the default name.
///
/// # Example
///
/// ```no_run
/// use pictjoin_av::locate_encoder;
///
/// let ffmpeg = locate_encoder(None)?;
/// println!("using {}", ffmpeg.display());
/// # Ok::<(), pictjoin_av::Error>(())
/// ```
pub fn locate_encoder(override_path: Option<&Path>) -> Result<PathBuf> {
    let wanted = override_path.unwrap_or_else(|| Path::new(DEFAULT_ENCODER));

    which::which(wanted).map_err(|e| {
        let reason = if override_path.is_some() {
            format!("{e}; check --ffmpeg-path")
        } else {
            format!("{e}; is it installed and in PATH?")
        };
        Error::encoder_not_found(wanted.display().to_string(), reason)
    })
}

/// Run `<path> -version` and report what it prints first.
///
/// ffmpeg and ffprobe take a single-dash `-version`.
pub async fn check_tool(path: &Path) -> ToolInfo {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    let output = Command::new(path)
        .arg("-version")
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await;

    match output {
        Ok(output) if output.status.success() => ToolInfo {
            name,
            available: true,
            version: String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .map(|s| s.to_string()),
            path: Some(path.to_path_buf()),
        },
        _ => ToolInfo {
            name,
            available: false,
            version: None,
            path: None,
        },
    }
}
