//! Shared test harness for integration tests.
//!
//! Provides [`Card`], a throwaway SD card layout with DVR recordings, and
//! [`FakeRunner`], a [`CommandRunner`] that records commands instead of
//! running ffmpeg.

#![allow(dead_code)]

use async_trait::async_trait;
use pictjoin_av::{CommandRunner, Error, Result, ToolCommand, ToolOutput};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

/// A temporary directory laid out like the DVR's SD card.
pub struct Card {
    root: TempDir,
}

impl Card {
    /// Card with `DCIM/100DSCIM` holding `PICTnnnn.AVI` for each index.
    pub fn with_segments(indices: &[u32]) -> Self {
        let root = tempfile::tempdir().unwrap();
        let card = Self { root };
        fs::create_dir_all(card.recordings()).unwrap();
        for &index in indices {
            card.add(&format!("PICT{index:04}.AVI"));
        }
        card
    }

    /// Add a file with the given name to the recordings folder.
    pub fn add(&self, name: &str) -> PathBuf {
        let path = self.recordings().join(name);
        fs::write(&path, name.as_bytes()).unwrap();
        path
    }

    /// The directory passed as INPUT.
    pub fn root(&self) -> &Path {
        self.root.path()
    }

    pub fn recordings(&self) -> PathBuf {
        self.root.path().join("DCIM").join("100DSCIM")
    }

    pub fn segment(&self, index: u32) -> PathBuf {
        self.recordings().join(format!("PICT{index:04}.AVI"))
    }
}

/// How [`FakeRunner`] answers the n-th command (zero based).
#[derive(Debug, Clone, Copy)]
pub enum Failure {
    /// Exit with this code.
    Exit(usize, i32),
    /// Fail to spawn.
    Spawn(usize),
    /// Behave as if cancelled.
    Interrupt(usize),
}

/// Records every command and writes a few bytes to its output argument.
#[derive(Default)]
pub struct FakeRunner {
    commands: Mutex<Vec<ToolCommand>>,
    failure: Option<Failure>,
    /// Copies of the manifest as seen by the concat step.
    manifests: Mutex<Vec<String>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(failure: Failure) -> Self {
        Self {
            failure: Some(failure),
            ..Self::default()
        }
    }

    pub fn commands(&self) -> Vec<ToolCommand> {
        self.commands.lock().unwrap().clone()
    }

    pub fn manifests(&self) -> Vec<String> {
        self.manifests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(&self, command: &ToolCommand) -> Result<ToolOutput> {
        let position = {
            let mut commands = self.commands.lock().unwrap();
            commands.push(command.clone());
            commands.len() - 1
        };

        let args = command.get_args();
        if let Some(i) = args.iter().position(|a| a == "concat") {
            // -f concat -safe 0 -i MANIFEST
            let manifest = Path::new(&args[i + 4]);
            let contents = fs::read_to_string(manifest).unwrap_or_default();
            self.manifests.lock().unwrap().push(contents);
        }

        match self.failure {
            Some(Failure::Exit(n, code)) if n == position => {
                return Ok(ToolOutput {
                    code: Some(code),
                    stderr_tail: vec!["Invalid data found when processing input".to_string()],
                })
            }
            Some(Failure::Spawn(n)) if n == position => {
                return Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "No such file or directory",
                )))
            }
            Some(Failure::Interrupt(n)) if n == position => return Err(Error::Interrupted),
            _ => {}
        }

        if let Some(output) = command.output_arg() {
            fs::write(output, b"fake media").map_err(Error::Io)?;
        }
        Ok(ToolOutput::success())
    }
}

/// Number of entries directly under `dir`.
pub fn entries(dir: &Path) -> usize {
    fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}
