//! Output container inference.

use crate::{Error, Result};
use serde::Serialize;
use std::path::Path;

/// Containers that can carry H.264 video with AAC audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Container {
    /// Matroska container
    Mkv,
    /// MPEG-4 Part 14 container
    Mp4,
    /// iTunes flavoured MP4
    M4v,
    /// QuickTime container
    Mov,
    /// MPEG transport stream
    Ts,
    /// M2TS (Blu-ray) container
    M2ts,
    /// AVI container
    Avi,
}

impl Container {
    /// Get the file extension for this container.
    pub fn extension(&self) -> &'static str {
        match self {
            Container::Mkv => "mkv",
            Container::Mp4 => "mp4",
            Container::M4v => "m4v",
            Container::Mov => "mov",
            Container::Ts => "ts",
            Container::M2ts => "m2ts",
            Container::Avi => "avi",
        }
    }

    /// Infer the container from an output path's extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path.extension().ok_or_else(|| Error::UnsupportedContainer {
            path: path.to_path_buf(),
            reason: "no file extension to infer the container from".to_string(),
        })?;

        ext.to_string_lossy()
            .parse()
            .map_err(|reason| Error::UnsupportedContainer {
                path: path.to_path_buf(),
                reason,
            })
    }

    /// Muxer options added to the final encode.
    pub fn muxer_args(&self) -> &'static [&'static str] {
        match self {
            // Move the moov atom up front so playback can start before the
            // whole file is read.
            Container::Mp4 | Container::M4v | Container::Mov => &["-movflags", "+faststart"],
            Container::Ts | Container::M2ts => &["-f", "mpegts"],
            Container::Mkv | Container::Avi => &[],
        }
    }
}

impl std::str::FromStr for Container {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mkv" | "matroska" => Ok(Container::Mkv),
            "mp4" => Ok(Container::Mp4),
            "m4v" => Ok(Container::M4v),
            "mov" | "quicktime" => Ok(Container::Mov),
            "ts" | "mpegts" => Ok(Container::Ts),
            "m2ts" => Ok(Container::M2ts),
            "avi" => Ok(Container::Avi),
            "webm" => Err("webm cannot hold H.264/AAC".to_string()),
            _ => Err(format!("unknown container format: {}", s)),
        }
    }
}
