//! Half-open genomic intervals and the per-sequence merge engine.
//!
//! All coordinates are 0-based, start inclusive and end exclusive. Two intervals
//! on the same sequence are merged when they overlap or are book-ended
//! (`next.start <= current.end`); a positive gap keeps them apart.

use rustc_hash::FxHashMap;
use std::cmp::max;
use std::collections::BTreeMap;
use std::fmt;
use std::io;

/// A `[start, end)` range on a single sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Interval {
    pub start: u64,
    pub end: u64,
}

impl Interval {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// An interval tagged with the sequence it lies on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub seq: String,
    pub interval: Interval,
}

impl Location {
    pub fn new(seq: impl Into<String>, start: u64, end: u64) -> Self {
        Self {
            seq: seq.into(),
            interval: Interval::new(start, end),
        }
    }

    pub fn start(&self) -> u64 {
        self.interval.start
    }

    pub fn end(&self) -> u64 {
        self.interval.end
    }

    pub fn len(&self) -> u64 {
        self.interval.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interval.is_empty()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.seq, self.interval.start, self.interval.end)
    }
}

/// Parse a location string in the format `seq_name:start-end`.
///
/// The sequence name may itself contain `:`; only the last one separates the range.
pub fn parse_location(location: &str) -> io::Result<Location> {
    let parts: Vec<&str> = location.rsplitn(2, ':').collect();
    if parts.len() != 2 || parts[1].is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Location '{location}' should be in the format `seq_name:start-end`"),
        ));
    }

    let (start, end) = parts[0].split_once('-').ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Range in '{location}' should be `start-end`"),
        )
    })?;
    let start = start.parse::<u64>().map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Invalid start value in '{location}'"),
        )
    })?;
    let end = end.parse::<u64>().map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Invalid end value in '{location}'"),
        )
    })?;
    if start >= end {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Start value must be less than end value in '{location}'"),
        ));
    }

    Ok(Location::new(parts[1], start, end))
}

/// Merge the intervals of a single sequence.
///
/// Returns disjoint, non-touching intervals sorted by start.
pub fn merge_intervals(mut intervals: Vec<Interval>) -> Vec<Interval> {
    if intervals.len() <= 1 {
        return intervals;
    }
    intervals.sort_unstable();

    let mut merged: Vec<Interval> = Vec::with_capacity(intervals.len());
    let mut current = intervals[0];
    for next in intervals.into_iter().skip(1) {
        if next.start <= current.end {
            current.end = max(current.end, next.end);
        } else {
            merged.push(current);
            current = next;
        }
    }
    merged.push(current);

    merged
}

/// Merge locations that may span several sequences.
///
/// Output is grouped by sequence (sequences in byte order), each group merged
/// with [`merge_intervals`].
pub fn merge_locations<'a, I>(locations: I) -> Vec<Location>
where
    I: IntoIterator<Item = &'a Location>,
{
    let mut by_seq: BTreeMap<&str, Vec<Interval>> = BTreeMap::new();
    for loc in locations {
        by_seq.entry(loc.seq.as_str()).or_default().push(loc.interval);
    }

    by_seq
        .into_iter()
        .flat_map(|(seq, intervals)| {
            merge_intervals(intervals)
                .into_iter()
                .map(move |interval| Location {
                    seq: seq.to_string(),
                    interval,
                })
        })
        .collect()
}

/// Sum of interval lengths per sequence.
///
/// Expects already merged locations; overlapping input is counted twice.
pub fn total_length<'a, I>(locations: I) -> FxHashMap<String, u64>
where
    I: IntoIterator<Item = &'a Location>,
{
    let mut totals: FxHashMap<String, u64> = FxHashMap::default();
    for loc in locations {
        *totals.entry(loc.seq.clone()).or_insert(0) += loc.len();
    }
    totals
}

/// Total covered length of a merged interval list.
pub fn covered_length(intervals: &[Interval]) -> u64 {
    intervals.iter().map(Interval::len).sum()
}
