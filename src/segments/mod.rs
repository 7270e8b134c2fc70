//! Segment resolution: from a card directory and a `START:END` argument to
//! the ordered list of recordings to join.

mod range;
mod resolver;

pub use range::{RangeSpec, SegmentRange};
pub use resolver::{
    locate, segment_filename, SegmentDir, SegmentFile, DCIM_DIR, MISSING_LISTED, RECORDINGS_DIR,
};

use pictjoin_av::Result;
use std::path::Path;

/// Segments selected for one run.
#[derive(Debug, Clone)]
pub struct ResolvedSegments {
    pub range: SegmentRange,
    pub files: Vec<SegmentFile>,
}

/// Resolve `spec` against the card mounted at `input`.
///
/// A reversed closed range is rejected while parsing `spec`, before this
/// touches the filesystem.
pub fn resolve(input: &Path, spec: &RangeSpec) -> Result<ResolvedSegments> {
    let dir = SegmentDir::open(input)?;
    let range = dir.range(spec)?;
    let files = dir.resolve(range)?;

    tracing::info!(
        "Resolved {} of {} segment(s), range {}, in {}",
        files.len(),
        dir.len(),
        range,
        dir.path().display()
    );

    Ok(ResolvedSegments { range, files })
}
