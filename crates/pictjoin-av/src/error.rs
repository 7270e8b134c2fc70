//! Error types for pictjoin.
//!
//! Both crates funnel their failures into [`Error`], which carries enough
//! context to print a useful message and to pick a process exit code via
//! [`Error::exit_code`].

use std::path::PathBuf;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving segments and encoding them.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The `START:END` argument is malformed or describes an empty range.
    #[error("invalid range '{range}': {reason}")]
    InvalidRange { range: String, reason: String },

    /// The input directory (or part of the DVR layout inside it) is missing.
    #[error("directory not found: {}", path.display())]
    DirectoryNotFound { path: PathBuf },

    /// At least one segment in the requested range does not exist.
    ///
    /// `missing` names the first absent files in ascending order; `total`
    /// counts all of them.
    #[error("{}", missing_message(dir, missing, *total))]
    SegmentMissing {
        dir: PathBuf,
        missing: Vec<String>,
        total: usize,
    },

    /// The segment directory holds no recordings at all.
    #[error("no DVR recordings found in {}", dir.display())]
    NoSegments { dir: PathBuf },

    /// The encoder executable could not be located.
    #[error("encoder not found: {tool}: {reason}")]
    EncoderNotFound { tool: String, reason: String },

    /// An encoder invocation failed to start or exited unsuccessfully.
    #[error("encode failed during {stage} ({}): {message}", describe_code(*code))]
    EncodeFailed {
        stage: String,
        code: Option<i32>,
        message: String,
    },

    /// The output file could not be written or moved into place.
    #[error("cannot write output {}: {message}", path.display())]
    OutputWriteFailed { path: PathBuf, message: String },

    /// The output extension does not name an H.264/AAC capable container.
    #[error("unsupported output container for {}: {reason}", path.display())]
    UnsupportedContainer { path: PathBuf, reason: String },

    /// The run was cancelled by SIGINT/SIGTERM.
    #[error("interrupted")]
    Interrupted,

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid range error.
    pub fn invalid_range(range: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRange {
            range: range.into(),
            reason: reason.into(),
        }
    }

    /// Create a directory not found error.
    pub fn directory_not_found(path: impl Into<PathBuf>) -> Self {
        Self::DirectoryNotFound { path: path.into() }
    }

    /// Create an encoder not found error.
    pub fn encoder_not_found(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EncoderNotFound {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    /// Create an encode failed error.
    pub fn encode_failed(
        stage: impl Into<String>,
        code: Option<i32>,
        message: impl Into<String>,
    ) -> Self {
        Self::EncodeFailed {
            stage: stage.into(),
            code,
            message: message.into(),
        }
    }

    /// Create an output write failure.
    pub fn output_write_failed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::OutputWriteFailed {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Process exit code for this error.
    ///
    /// `1` is left for unexpected failures and `2` for usage errors reported
    /// by the argument parser.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::InvalidRange { .. } => 3,
            Error::DirectoryNotFound { .. } => 4,
            Error::SegmentMissing { .. } | Error::NoSegments { .. } => 5,
            Error::EncoderNotFound { .. } => 6,
            Error::EncodeFailed { .. } => 7,
            Error::OutputWriteFailed { .. } | Error::UnsupportedContainer { .. } => 8,
            Error::Interrupted => 130,
            Error::Io(_) => 1,
        }
    }
}

fn missing_message(dir: &std::path::Path, missing: &[String], total: usize) -> String {
    let Some(first) = missing.first() else {
        return format!("segment missing in {}", dir.display());
    };
    if total <= 1 {
        return format!("segment {} missing in {}", first, dir.display());
    }

    let mut listed = missing.join(", ");
    if total > missing.len() {
        listed.push_str(&format!(" and {} more", total - missing.len()));
    }
    format!(
        "segment {} missing in {} ({} missing: {})",
        first,
        dir.display(),
        total,
        listed
    )
}

fn describe_code(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code".to_string(),
    }
}
