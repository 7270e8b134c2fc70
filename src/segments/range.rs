//! `START:END` ranges of segment indices.

use pictjoin_av::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// An inclusive, non-empty range of segment indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SegmentRange {
    start: u32,
    end: u32,
}

impl SegmentRange {
    /// Create a range, rejecting `start > end`.
    pub fn new(start: u32, end: u32) -> Result<Self> {
        if start > end {
            return Err(Error::invalid_range(
                format!("{start}:{end}"),
                "start index is after end index",
            ));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    /// Number of segments in the range.
    pub fn len(&self) -> usize {
        (self.end - self.start) as usize + 1
    }

    /// A range always holds at least one index.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Indices in ascending order.
    pub fn indices(&self) -> RangeInclusive<u32> {
        self.start..=self.end
    }
}

impl fmt::Display for SegmentRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

/// A parsed `START:END` argument.
///
/// Either bound may be omitted (`5:`, `:12`, `:`); an omitted bound stands
/// for the first or last recording on the card and is filled in by
/// [`SegmentDir::range`](super::SegmentDir::range).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RangeSpec {
    pub start: Option<u32>,
    pub end: Option<u32>,
}

impl RangeSpec {
    /// The range, if both bounds were given.
    pub fn bounded(&self) -> Option<Result<SegmentRange>> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some(SegmentRange::new(start, end)),
            _ => None,
        }
    }
}

impl fmt::Display for RangeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(start) = self.start {
            write!(f, "{start}")?;
        }
        f.write_str(":")?;
        if let Some(end) = self.end {
            write!(f, "{end}")?;
        }
        Ok(())
    }
}

impl FromStr for RangeSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (start, end) = s
            .split_once(':')
            .ok_or_else(|| Error::invalid_range(s, "expected START:END"))?;
        if end.contains(':') {
            return Err(Error::invalid_range(s, "expected exactly one ':'"));
        }

        let spec = Self {
            start: parse_bound(s, start, "start")?,
            end: parse_bound(s, end, "end")?,
        };

        // Reject reversed ranges before anything touches the filesystem.
        if let Some(Err(_)) = spec.bounded() {
            return Err(Error::invalid_range(s, "start index is after end index"));
        }

        Ok(spec)
    }
}

fn parse_bound(range: &str, bound: &str, which: &str) -> Result<Option<u32>> {
    let bound = bound.trim();
    if bound.is_empty() {
        return Ok(None);
    }
    if bound.starts_with('-') {
        return Err(Error::invalid_range(
            range,
            format!("{which} index must be non-negative"),
        ));
    }
    if !bound.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::invalid_range(
            range,
            format!("invalid {which} index '{bound}'"),
        ));
    }
    bound
        .parse()
        .map(Some)
        .map_err(|_| Error::invalid_range(range, format!("{which} index '{bound}' is too large")))
}
