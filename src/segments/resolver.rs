//! Finding DVR segment files on disk.

use super::{RangeSpec, SegmentRange};
use pictjoin_av::{Error, Result};
use regex::RegexBuilder;
use serde::Serialize;
use std::collections::btree_map::{BTreeMap, Entry};
use std::path::{Path, PathBuf};

/// How many absent file names a missing-segment error spells out.
pub const MISSING_LISTED: usize = 20;

/// Top-level folder the DVR writes to on its card.
pub const DCIM_DIR: &str = "DCIM";

/// Folder inside [`DCIM_DIR`] holding the recordings.
pub const RECORDINGS_DIR: &str = "100DSCIM";

/// Canonical file name of the segment with the given index.
pub fn segment_filename(index: u32) -> String {
    format!("PICT{index:04}.AVI")
}

/// One recording on the card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentFile {
    pub index: u32,
    pub path: PathBuf,
}

/// The recordings folder and every segment found in it.
#[derive(Debug, Clone)]
pub struct SegmentDir {
    path: PathBuf,
    files: BTreeMap<u32, PathBuf>,
}

impl SegmentDir {
    /// Scan the recordings folder under `input`, the directory containing
    /// the card's `DCIM` folder.
    pub fn open(input: &Path) -> Result<Self> {
        Self::scan(&locate(input)?)
    }

    /// Scan `dir` for files named `PICT<digits>.AVI` (any case).
    ///
    /// When two names map to one index, which can happen on case-sensitive
    /// filesystems, the canonical upper-case name wins, then the
    /// lexicographically smallest.
    pub fn scan(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(Error::directory_not_found(dir));
        }

        let pattern = RegexBuilder::new(r"^PICT(\d+)\.AVI$")
            .case_insensitive(true)
            .build()
            .map_err(std::io::Error::other)?;

        let mut files: BTreeMap<u32, PathBuf> = BTreeMap::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            let Some(caps) = pattern.captures(name) else {
                continue;
            };
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Ok(index) = caps[1].parse::<u32>() else {
                tracing::warn!("Ignoring {}: index out of range", name);
                continue;
            };

            match files.entry(index) {
                Entry::Vacant(slot) => {
                    slot.insert(path);
                }
                Entry::Occupied(mut slot) => {
                    let kept = file_name_of(slot.get());
                    if prefer(index, name, &kept) {
                        tracing::warn!("Duplicate segment {}: using {} over {}", index, name, kept);
                        slot.insert(path);
                    } else {
                        tracing::warn!("Duplicate segment {}: using {} over {}", index, kept, name);
                    }
                }
            }
        }

        tracing::debug!("Found {} segments in {}", files.len(), dir.display());

        Ok(Self {
            path: dir.to_path_buf(),
            files,
        })
    }

    /// The recordings folder.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of segments found.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Lowest segment index present.
    pub fn first_index(&self) -> Option<u32> {
        self.files.keys().next().copied()
    }

    /// Highest segment index present.
    pub fn last_index(&self) -> Option<u32> {
        self.files.keys().next_back().copied()
    }

    /// Turn a range argument into a concrete range, filling omitted bounds
    /// from the first and last recording present.
    pub fn range(&self, spec: &RangeSpec) -> Result<SegmentRange> {
        if let Some(range) = spec.bounded() {
            return range;
        }

        let (Some(first), Some(last)) = (self.first_index(), self.last_index()) else {
            return Err(Error::NoSegments {
                dir: self.path.clone(),
            });
        };

        let start = spec.start.unwrap_or(first);
        let end = spec.end.unwrap_or(last);
        SegmentRange::new(start, end).map_err(|_| {
            Error::invalid_range(
                spec.to_string(),
                format!("resolves to {start}:{end}, start index is after end index"),
            )
        })
    }

    /// Every segment in `range`, in ascending order.
    ///
    /// Fails with [`Error::SegmentMissing`] if any index in the range has no
    /// recording; nothing is returned partially. The error names the first
    /// [`MISSING_LISTED`] absent files and counts the rest.
    pub fn resolve(&self, range: SegmentRange) -> Result<Vec<SegmentFile>> {
        let present = self.files.range(range.indices()).count();
        let total = range.len() - present;

        if total > 0 {
            let missing = range
                .indices()
                .filter(|index| !self.files.contains_key(index))
                .take(MISSING_LISTED)
                .map(segment_filename)
                .collect();
            return Err(Error::SegmentMissing {
                dir: self.path.clone(),
                missing,
                total,
            });
        }

        Ok(self
            .files
            .range(range.indices())
            .map(|(&index, path)| SegmentFile {
                index,
                path: path.clone(),
            })
            .collect())
    }
}

/// Path of the recordings folder under `input`.
///
/// Every level must exist; the first one that does not is reported.
pub fn locate(input: &Path) -> Result<PathBuf> {
    let recordings = input.join(DCIM_DIR).join(RECORDINGS_DIR);
    for dir in [input.to_path_buf(), input.join(DCIM_DIR), recordings.clone()] {
        if !dir.is_dir() {
            return Err(Error::directory_not_found(dir));
        }
    }
    Ok(recordings)
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Whether `candidate` should replace `current` for the same index.
fn prefer(index: u32, candidate: &str, current: &str) -> bool {
    let canonical = segment_filename(index);
    match (candidate == canonical, current == canonical) {
        (true, false) => true,
        (false, true) => false,
        _ => candidate < current,
    }
}
