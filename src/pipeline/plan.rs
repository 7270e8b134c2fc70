//! What a join will run.

use crate::segments::{segment_filename, ResolvedSegments, SegmentFile, SegmentRange};
use pictjoin_av::actions::{concat_command, encode_command, normalize_command};
use pictjoin_av::{Container, EncodeSettings, Error, Result, ToolCommand};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Everything needed to produce one output file.
#[derive(Debug, Clone, Serialize)]
pub struct EncodeJob {
    pub range: SegmentRange,
    pub segments: Vec<SegmentFile>,
    pub output: PathBuf,
    pub container: Container,
    pub encoder: PathBuf,
    pub settings: EncodeSettings,
}

impl EncodeJob {
    /// Build a job, inferring the container from the output extension.
    pub fn new(
        resolved: ResolvedSegments,
        output: PathBuf,
        encoder: PathBuf,
        settings: EncodeSettings,
    ) -> Result<Self> {
        if resolved.files.is_empty() {
            return Err(Error::invalid_range(
                resolved.range.to_string(),
                "no segments selected",
            ));
        }
        let container = Container::from_path(&output)?;

        Ok(Self {
            range: resolved.range,
            segments: resolved.files,
            output,
            container,
            encoder,
            settings,
        })
    }
}

/// One stage of a join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", rename_all = "lowercase")]
pub enum Stage {
    /// Rewrite one segment into a lossless intermediate.
    Normalize { index: u32 },
    /// Join the intermediates.
    Concat,
    /// Compress the joined intermediate into the output.
    Encode,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Normalize { index } => write!(f, "normalize {}", segment_filename(*index)),
            Stage::Concat => f.write_str("concat"),
            Stage::Encode => f.write_str("encode"),
        }
    }
}

/// A stage and the command that performs it.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedStep {
    #[serde(flatten)]
    pub stage: Stage,
    pub command: ToolCommand,
}

/// The ordered commands of a join plus the concat manifest they rely on.
#[derive(Debug, Clone, Serialize)]
pub struct EncodePlan {
    pub manifest: PathBuf,
    pub intermediates: Vec<PathBuf>,
    pub joined: PathBuf,
    pub steps: Vec<PlannedStep>,
}

/// Lay out the commands for `job`.
///
/// Intermediates live in `work_dir`; the final encode writes to `target`.
/// Steps run in order: one normalize per segment, then concat, then encode.
pub fn plan(job: &EncodeJob, work_dir: &Path, target: &Path) -> EncodePlan {
    let ffmpeg = job.encoder.as_path();
    let mut steps = Vec::with_capacity(job.segments.len() + 2);
    let mut intermediates = Vec::with_capacity(job.segments.len());

    for (position, segment) in job.segments.iter().enumerate() {
        let intermediate = work_dir.join(format!("segment{position:03}.mkv"));
        steps.push(PlannedStep {
            stage: Stage::Normalize {
                index: segment.index,
            },
            command: normalize_command(ffmpeg, &segment.path, &intermediate, &job.settings),
        });
        intermediates.push(intermediate);
    }

    let manifest = work_dir.join("concat.txt");
    let joined = work_dir.join("concat.mkv");
    steps.push(PlannedStep {
        stage: Stage::Concat,
        command: concat_command(ffmpeg, &manifest, &joined),
    });
    steps.push(PlannedStep {
        stage: Stage::Encode,
        command: encode_command(ffmpeg, &joined, target, job.container, &job.settings),
    });

    EncodePlan {
        manifest,
        intermediates,
        joined,
        steps,
    }
}
