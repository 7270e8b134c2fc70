use clap::Parser;
use pictjoin_av::EncodeSettings;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pictjoin")]
#[command(
    author,
    version,
    about = "Join Eachine LCD5802D DVR recordings into one H.264/AAC video"
)]
pub struct Cli {
    /// Directory CONTAINING the DCIM folder where the DVR recordings are stored
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Range of recordings to include, e.g. 3:12 (leave a side empty for first/last)
    #[arg(value_name = "START:END", allow_hyphen_values = true)]
    pub range: String,

    /// Where to write the output file; its extension picks the container
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Path to the FFmpeg executable (default: ffmpeg from PATH)
    #[arg(long, value_name = "PATH")]
    pub ffmpeg_path: Option<PathBuf>,

    /// x264 constant rate factor (lower is better quality)
    #[arg(long, default_value_t = 23, value_parser = clap::value_parser!(u8).range(0..=51))]
    pub crf: u8,

    /// x264 preset
    #[arg(
        long,
        default_value = "medium",
        value_parser = [
            "ultrafast", "superfast", "veryfast", "faster", "fast",
            "medium", "slow", "slower", "veryslow", "placebo",
        ]
    )]
    pub preset: String,

    /// Cap each recording at this many seconds (0 keeps recordings whole)
    #[arg(long, value_name = "SECS", default_value_t = 300)]
    pub segment_length: u64,

    /// Directory for intermediate files (default: system temp directory)
    #[arg(long, value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Fail instead of replacing an existing output file
    #[arg(long)]
    pub no_overwrite: bool,

    /// Show what would be run without running it
    #[arg(long)]
    pub dry_run: bool,

    /// With --dry-run, print the job and plan as JSON
    #[arg(long, requires = "dry_run")]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Encoding parameters selected on the command line.
    pub fn settings(&self) -> EncodeSettings {
        EncodeSettings {
            preset: self.preset.clone(),
            crf: self.crf,
            segment_limit_secs: (self.segment_length > 0).then_some(self.segment_length),
            ..EncodeSettings::default()
        }
    }
}
