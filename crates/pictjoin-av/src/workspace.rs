//! Scratch space for one encode run.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tempfile::{TempDir, TempPath};

/// Workspace for one encode run.
///
/// Holds a temporary directory for intermediate files and a staging file
/// next to the destination. The final encode writes into the staging file;
/// [`finalize`](Workspace::finalize) renames it onto the destination. Dropping
/// the workspace without finalizing removes both, so a failed or interrupted
/// run never leaves a partial output behind.
///
/// # Example
///
/// ```no_run
/// use pictjoin_av::Workspace;
/// use std::path::Path;
///
/// let workspace = Workspace::new(Path::new("/videos/flight.mkv"), None)?;
/// // Write intermediates under workspace.temp_dir() and the final encode
/// // to workspace.staging(), then:
/// workspace.finalize(true)?;
/// # Ok::<(), pictjoin_av::Error>(())
/// ```
pub struct Workspace {
    temp_dir: TempDir,
    staging: TempPath,
    destination: PathBuf,
}

impl Workspace {
    /// Create a workspace for producing `destination`.
    ///
    /// Intermediates go under `temp_root` (the system temp directory when
    /// `None`). The staging file is created in the destination's directory
    /// with the destination's extension, so the encoder picks the same
    /// container and the final rename stays on one filesystem.
    pub fn new(destination: &Path, temp_root: Option<&Path>) -> Result<Self> {
        if destination.is_dir() {
            return Err(Error::output_write_failed(destination, "is a directory"));
        }

        let parent = match destination.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        if !parent.is_dir() {
            return Err(Error::output_write_failed(
                destination,
                format!("directory {} does not exist", parent.display()),
            ));
        }

        let suffix = destination
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        let staging = tempfile::Builder::new()
            .prefix(".pictjoin-")
            .suffix(&suffix)
            .tempfile_in(parent)
            .map_err(|e| {
                Error::output_write_failed(destination, format!("cannot create staging file: {e}"))
            })?
            .into_temp_path();

        let mut builder = tempfile::Builder::new();
        builder.prefix("pictjoin-");
        let temp_dir = match temp_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(|e| {
            let root = temp_root
                .map(Path::to_path_buf)
                .unwrap_or_else(std::env::temp_dir);
            Error::output_write_failed(root, format!("cannot create work directory: {e}"))
        })?;

        tracing::debug!(
            "Workspace at {}, staging output {}",
            temp_dir.path().display(),
            staging.display()
        );

        Ok(Self {
            temp_dir,
            staging,
            destination: destination.to_path_buf(),
        })
    }

    /// Get the temp directory path.
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path the final encode writes to.
    pub fn staging(&self) -> &Path {
        &self.staging
    }

    /// Where the output ends up after [`finalize`](Workspace::finalize).
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Move the staged output onto the destination.
    ///
    /// With `overwrite` set an existing destination is replaced atomically;
    /// otherwise an existing destination is an error and is left untouched.
    /// Intermediates are removed either way.
    pub fn finalize(self, overwrite: bool) -> Result<PathBuf> {
        let size = std::fs::metadata(&self.staging).map(|m| m.len()).unwrap_or(0);
        if size == 0 {
            return Err(Error::output_write_failed(
                &self.destination,
                "encoder produced no output",
            ));
        }

        let persisted = if overwrite {
            self.staging.persist(&self.destination)
        } else {
            self.staging.persist_noclobber(&self.destination)
        };
        persisted.map_err(|e| Error::output_write_failed(&self.destination, e.error.to_string()))?;

        tracing::debug!("Output moved into place: {}", self.destination.display());
        Ok(self.destination)
    }
}
