//! Assembly-to-assembly alignment report parsing
//!
//! The report is tab-delimited and read in a single pass. Single-field lines carry
//! run metadata (`Query Assembly Name:`, `Sequence Name:`); every data row belongs
//! to the sequence named by the most recent `Sequence Name:` line. Data rows are
//! classified by their first field and their locations collected per outcome
//! category, unmerged and in file order.

use crate::input::open_text;
use crate::interval::Location;
use log::{debug, info, warn};
use rustc_hash::FxHashMap;
use std::fmt;
use std::io::{self, BufRead, Error as IoError};
use std::num::ParseIntError;
use std::path::Path;

pub const QUERY_ASSEMBLY_PREFIX: &str = "Query Assembly Name:";
pub const SEQUENCE_NAME_PREFIX: &str = "Sequence Name:";

const TYPE_COL: usize = 0;
const START_COL: usize = 1;
const END_COL: usize = 2;
const GAPPED_LEN_COL: usize = 3;
const UNGAPPED_LEN_COL: usize = 5;

/// Outcome type of a data row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeType {
    NoHit,
    /// `SP`: several query regions collapse onto one target region
    Collapse,
    /// `SP Only`: one query region expands onto several target regions
    Expansion,
    Inversion,
    Mix,
}

impl OutcomeType {
    pub const ALL: [OutcomeType; 5] = [
        OutcomeType::NoHit,
        OutcomeType::Collapse,
        OutcomeType::Expansion,
        OutcomeType::Inversion,
        OutcomeType::Mix,
    ];

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "NoHit" => Some(OutcomeType::NoHit),
            "SP" => Some(OutcomeType::Collapse),
            "SP Only" => Some(OutcomeType::Expansion),
            "Inv" => Some(OutcomeType::Inversion),
            "Mix" => Some(OutcomeType::Mix),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OutcomeType::NoHit => "NoHit",
            OutcomeType::Collapse => "SP",
            OutcomeType::Expansion => "SP Only",
            OutcomeType::Inversion => "Inv",
            OutcomeType::Mix => "Mix",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            OutcomeType::NoHit => 0,
            OutcomeType::Collapse => 1,
            OutcomeType::Expansion => 2,
            OutcomeType::Inversion => 3,
            OutcomeType::Mix => 4,
        }
    }
}

impl fmt::Display for OutcomeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug)]
pub enum ParseErr {
    IoError(IoError),
    NotEnoughFields { line: usize },
    InvalidField { line: usize, source: ParseIntError },
    InvalidInterval { line: usize, start: u64, end: u64 },
    MissingSequenceContext { line: usize },
    MissingQueryAssembly { line: usize },
    AssemblyMismatch { expected: String, found: String },
}

impl fmt::Display for ParseErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErr::IoError(e) => write!(f, "IO error: {}", e),
            ParseErr::NotEnoughFields { line } => write!(
                f,
                "Line {}: expected at least {} fields in data row",
                line,
                UNGAPPED_LEN_COL + 1
            ),
            ParseErr::InvalidField { line, source } => {
                write!(f, "Line {}: invalid field: {}", line, source)
            }
            ParseErr::InvalidInterval { line, start, end } => write!(
                f,
                "Line {}: invalid interval {}-{} (1-based start must be >= 1 and <= end)",
                line, start, end
            ),
            ParseErr::MissingSequenceContext { line } => write!(
                f,
                "Line {}: data row before any '{}' line",
                line, SEQUENCE_NAME_PREFIX
            ),
            ParseErr::MissingQueryAssembly { line } => write!(
                f,
                "Line {}: data row before the '{}' line",
                line, QUERY_ASSEMBLY_PREFIX
            ),
            ParseErr::AssemblyMismatch { expected, found } => write!(
                f,
                "Assembly name mismatch: report is for '{}', expected '{}'",
                found, expected
            ),
        }
    }
}

impl std::error::Error for ParseErr {}

/// Raw, unmerged per-sequence locations for each outcome category, plus the
/// summed no-hit lengths.
#[derive(Debug, Default, Clone)]
pub struct CategoryBuckets {
    buckets: [FxHashMap<String, Vec<Location>>; 5],
    pub gapped_no_hit: FxHashMap<String, u64>,
    pub ungapped_no_hit: FxHashMap<String, u64>,
}

impl CategoryBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, outcome: OutcomeType, location: Location) {
        self.buckets[outcome.index()]
            .entry(location.seq.clone())
            .or_default()
            .push(location);
    }

    pub fn add_no_hit(&mut self, seq: &str, gapped: u64, ungapped: u64) {
        *self.gapped_no_hit.entry(seq.to_string()).or_insert(0) += gapped;
        *self.ungapped_no_hit.entry(seq.to_string()).or_insert(0) += ungapped;
    }

    /// Locations of `seq` in `outcome`, in file order.
    pub fn locations(&self, outcome: OutcomeType, seq: &str) -> &[Location] {
        self.buckets[outcome.index()]
            .get(seq)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn bucket(&self, outcome: OutcomeType) -> &FxHashMap<String, Vec<Location>> {
        &self.buckets[outcome.index()]
    }

    pub fn no_hit_totals(&self, seq: &str) -> (u64, u64) {
        (
            self.gapped_no_hit.get(seq).copied().unwrap_or(0),
            self.ungapped_no_hit.get(seq).copied().unwrap_or(0),
        )
    }

    /// Every sequence that has at least one row in any category.
    pub fn sequences(&self) -> impl Iterator<Item = &str> {
        let mut seen: Vec<&str> = self
            .buckets
            .iter()
            .flat_map(|bucket| bucket.keys().map(String::as_str))
            .collect();
        seen.sort_unstable();
        seen.dedup();
        seen.into_iter()
    }

    pub fn row_count(&self) -> usize {
        self.buckets
            .iter()
            .flat_map(|bucket| bucket.values())
            .map(Vec::len)
            .sum()
    }
}

/// State carried from line to line while reading one report.
#[derive(Debug)]
pub struct ParserState<'a> {
    expected_assembly: &'a str,
    query_checked: bool,
    current_seq: Option<String>,
    line_no: usize,
    pub buckets: CategoryBuckets,
    pub unknown_rows: usize,
}

impl<'a> ParserState<'a> {
    pub fn new(expected_assembly: &'a str) -> Self {
        Self {
            expected_assembly,
            query_checked: false,
            current_seq: None,
            line_no: 0,
            buckets: CategoryBuckets::new(),
            unknown_rows: 0,
        }
    }

    pub fn current_sequence(&self) -> Option<&str> {
        self.current_seq.as_deref()
    }

    /// Feed the next line of the report.
    pub fn process_line(&mut self, line: &str) -> Result<(), ParseErr> {
        self.line_no += 1;
        let line = line.trim_end_matches(['\r', '\n']);

        if line.trim().is_empty() || line.starts_with('#') {
            return Ok(());
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() == 1 {
            self.process_metadata(fields[0])
        } else {
            self.process_row(&fields)
        }
    }

    pub fn finish(self) -> CategoryBuckets {
        self.buckets
    }

    fn process_metadata(&mut self, field: &str) -> Result<(), ParseErr> {
        if let Some(value) = metadata_value(field, QUERY_ASSEMBLY_PREFIX) {
            if value != self.expected_assembly {
                return Err(ParseErr::AssemblyMismatch {
                    expected: self.expected_assembly.to_string(),
                    found: value.to_string(),
                });
            }
            debug!("Query assembly {} confirmed", value);
            self.query_checked = true;
        } else if let Some(value) = metadata_value(field, SEQUENCE_NAME_PREFIX) {
            self.current_seq = Some(value.to_string());
        }
        Ok(())
    }

    fn process_row(&mut self, fields: &[&str]) -> Result<(), ParseErr> {
        let line = self.line_no;
        if !self.query_checked {
            return Err(ParseErr::MissingQueryAssembly { line });
        }
        let seq = self
            .current_seq
            .as_deref()
            .ok_or(ParseErr::MissingSequenceContext { line })?;
        if fields.len() <= UNGAPPED_LEN_COL {
            return Err(ParseErr::NotEnoughFields { line });
        }

        let parse = |col: usize| {
            fields[col]
                .trim()
                .parse::<u64>()
                .map_err(|source| ParseErr::InvalidField { line, source })
        };
        let start_1based = parse(START_COL)?;
        let end = parse(END_COL)?;
        let gapped = parse(GAPPED_LEN_COL)?;
        let ungapped = parse(UNGAPPED_LEN_COL)?;
        if start_1based == 0 || start_1based > end {
            return Err(ParseErr::InvalidInterval {
                line,
                start: start_1based,
                end,
            });
        }

        let Some(outcome) = OutcomeType::from_label(fields[TYPE_COL]) else {
            warn!(
                "Line {}: skipping row with unknown outcome type '{}'",
                line, fields[TYPE_COL]
            );
            self.unknown_rows += 1;
            return Ok(());
        };

        let location = Location::new(seq, start_1based - 1, end);
        if outcome == OutcomeType::NoHit {
            self.buckets.add_no_hit(seq, gapped, ungapped);
        }
        self.buckets.push(outcome, location);
        Ok(())
    }
}

// Value of a `Prefix: value` metadata field, up to any further ':'
fn metadata_value<'l>(field: &'l str, prefix: &str) -> Option<&'l str> {
    if !field.starts_with(prefix) {
        return None;
    }
    let value = field.split(':').nth(1).unwrap_or("");
    Some(value.trim())
}

/// Parse an alignment report whose query assembly must be `expected_assembly`.
pub fn parse_align_report<R: BufRead>(
    reader: R,
    expected_assembly: &str,
) -> Result<CategoryBuckets, ParseErr> {
    let mut state = ParserState::new(expected_assembly);
    for line_result in reader.lines() {
        let line = line_result.map_err(ParseErr::IoError)?;
        state.process_line(&line)?;
    }
    if state.unknown_rows > 0 {
        warn!(
            "{}: {} rows with unknown outcome types were skipped",
            expected_assembly, state.unknown_rows
        );
    }
    Ok(state.finish())
}

pub fn parse_align_report_file(path: &Path, expected_assembly: &str) -> io::Result<CategoryBuckets> {
    let reader = open_text(path)?;
    let buckets = parse_align_report(reader, expected_assembly).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Failed to parse alignment report {}: {}", path.display(), e),
        )
    })?;
    info!(
        "Parsed {}: {} classified rows",
        path.display(),
        buckets.row_count()
    );
    Ok(buckets)
}
