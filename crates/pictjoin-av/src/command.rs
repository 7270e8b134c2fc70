//! Builder for external tool invocations.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};

use serde::ser::{Serialize, SerializeStruct, Serializer};

/// A fully specified external tool invocation.
///
/// Building a command does not run it; hand it to a
/// [`CommandRunner`](crate::CommandRunner).
///
/// # Example
///
/// ```
/// use pictjoin_av::ToolCommand;
/// use std::path::PathBuf;
///
/// let mut cmd = ToolCommand::new(PathBuf::from("ffmpeg"));
/// cmd.args(["-hide_banner", "-i"]).arg("PICT0000.AVI").arg("out.mkv");
/// assert_eq!(cmd.to_string(), "ffmpeg -hide_banner -i PICT0000.AVI out.mkv");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<OsString>,
}

impl ToolCommand {
    /// Create a new command for the given program path.
    pub fn new(program: PathBuf) -> Self {
        Self {
            program,
            args: Vec::new(),
        }
    }

    /// Append a single argument.
    pub fn arg(&mut self, s: impl AsRef<OsStr>) -> &mut Self {
        self.args.push(s.as_ref().to_os_string());
        self
    }

    /// Append multiple arguments.
    pub fn args<I, S>(&mut self, iter: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(iter.into_iter().map(|s| s.as_ref().to_os_string()));
        self
    }

    /// The program to execute.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// The arguments, in order.
    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    /// Short program name for messages (file name without directories).
    pub fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }

    /// The last argument, which for ffmpeg is the output file.
    pub fn output_arg(&self) -> Option<&OsStr> {
        self.args.last().map(OsString::as_os_str)
    }
}

/// Renders the command as a copy-pasteable POSIX shell line.
impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&shell_quote(self.program.as_os_str()))?;
        for arg in &self.args {
            write!(f, " {}", shell_quote(arg))?;
        }
        Ok(())
    }
}

impl Serialize for ToolCommand {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let args: Vec<String> = self
            .args
            .iter()
            .map(|a| a.to_string_lossy().to_string())
            .collect();
        let mut state = serializer.serialize_struct("ToolCommand", 2)?;
        state.serialize_field("program", &self.program.to_string_lossy())?;
        state.serialize_field("args", &args)?;
        state.end()
    }
}

fn shell_quote(s: &OsStr) -> String {
    let s = s.to_string_lossy();
    let plain = !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=+,@%".contains(c));
    if plain {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', r"'\''"))
    }
}
