//! Per-assembly sequence inventory, read from an NCBI-style assembly report.

use crate::input::open_text;
use log::{info, warn};
use rustc_hash::FxHashMap;
use std::fmt;
use std::io::{self, BufRead};
use std::num::ParseIntError;
use std::path::Path;

pub const ASSEMBLY_NAME_PREFIX: &str = "# Assembly Name:";
pub const PRIMARY_ASSEMBLY_UNIT: &str = "Primary Assembly";

const NAME_COL: usize = 0;
const ROLE_COL: usize = 1;
const UNIT_COL: usize = 7;
const LENGTH_COL: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SequenceRole {
    AssembledMolecule,
    AltScaffold,
    UnlocalizedScaffold,
    UnplacedScaffold,
    Other(String),
}

impl SequenceRole {
    pub fn as_str(&self) -> &str {
        match self {
            SequenceRole::AssembledMolecule => "assembled-molecule",
            SequenceRole::AltScaffold => "alt-scaffold",
            SequenceRole::UnlocalizedScaffold => "unlocalized-scaffold",
            SequenceRole::UnplacedScaffold => "unplaced-scaffold",
            SequenceRole::Other(label) => label,
        }
    }
}

impl From<&str> for SequenceRole {
    fn from(s: &str) -> Self {
        match s {
            "assembled-molecule" => SequenceRole::AssembledMolecule,
            "alt-scaffold" => SequenceRole::AltScaffold,
            "unlocalized-scaffold" => SequenceRole::UnlocalizedScaffold,
            "unplaced-scaffold" => SequenceRole::UnplacedScaffold,
            other => SequenceRole::Other(other.to_string()),
        }
    }
}

impl fmt::Display for SequenceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One sequence of one assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceEntity {
    pub assembly: String,
    pub name: String,
    pub ref_acc: String,
    pub length: u64,
    pub role: SequenceRole,
    pub assembly_unit: String,
}

impl SequenceEntity {
    pub fn is_chromosome(&self, exclude_mt: bool) -> bool {
        self.role == SequenceRole::AssembledMolecule
            && (!exclude_mt || self.assembly_unit == PRIMARY_ASSEMBLY_UNIT)
    }
}

/// All sequences of one assembly keyed by name, plus its chromosomes in report order.
#[derive(Debug, Default, Clone)]
pub struct Inventory {
    pub assembly: String,
    pub accession: String,
    pub sequences: FxHashMap<String, SequenceEntity>,
    pub chromosomes: Vec<String>,
}

impl Inventory {
    pub fn new(assembly: &str, accession: &str) -> Self {
        Self {
            assembly: assembly.to_string(),
            accession: accession.to_string(),
            sequences: FxHashMap::default(),
            chromosomes: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&SequenceEntity> {
        self.sequences.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sequences.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sequences.keys().map(String::as_str)
    }

    pub fn insert(&mut self, entity: SequenceEntity, exclude_mt: bool) {
        if entity.is_chromosome(exclude_mt) && !self.sequences.contains_key(&entity.name) {
            self.chromosomes.push(entity.name.clone());
        }
        self.sequences.insert(entity.name.clone(), entity);
    }
}

#[derive(Debug)]
pub enum InventoryErr {
    IoError(io::Error),
    NotEnoughFields { line: usize },
    InvalidLength { line: usize, source: ParseIntError },
    AssemblyMismatch { expected: String, found: String },
}

impl fmt::Display for InventoryErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InventoryErr::IoError(e) => write!(f, "IO error: {}", e),
            InventoryErr::NotEnoughFields { line } => write!(
                f,
                "Line {}: expected at least {} columns in sequence report",
                line,
                LENGTH_COL + 1
            ),
            InventoryErr::InvalidLength { line, source } => {
                write!(f, "Line {}: invalid sequence length: {}", line, source)
            }
            InventoryErr::AssemblyMismatch { expected, found } => write!(
                f,
                "Wrong report, assembly name mismatch: expected '{}', found '{}'",
                expected, found
            ),
        }
    }
}

impl std::error::Error for InventoryErr {}

/// Read a sequence report for `assembly`.
///
/// When `exclude_mt` is set only primary-unit assembled molecules count as chromosomes.
pub fn parse_sequence_report<R: BufRead>(
    reader: R,
    assembly: &str,
    accession: &str,
    exclude_mt: bool,
) -> Result<Inventory, InventoryErr> {
    let mut inventory = Inventory::new(assembly, accession);

    for (idx, line_result) in reader.lines().enumerate() {
        let line = line_result.map_err(InventoryErr::IoError)?;
        let line = line.trim_end_matches('\r');
        let line_no = idx + 1;

        if line.trim().is_empty() {
            continue;
        }
        if let Some(declared) = line.strip_prefix(ASSEMBLY_NAME_PREFIX) {
            if !declared.contains(assembly) {
                return Err(InventoryErr::AssemblyMismatch {
                    expected: assembly.to_string(),
                    found: declared.trim().to_string(),
                });
            }
            continue;
        }
        if line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() <= LENGTH_COL {
            return Err(InventoryErr::NotEnoughFields { line: line_no });
        }
        let length = fields[LENGTH_COL]
            .trim()
            .parse::<u64>()
            .map_err(|source| InventoryErr::InvalidLength {
                line: line_no,
                source,
            })?;

        let role = SequenceRole::from(fields[ROLE_COL]);
        if let SequenceRole::Other(label) = &role {
            warn!(
                "{}: sequence {} has unrecognised role '{}'",
                assembly, fields[NAME_COL], label
            );
        }

        inventory.insert(
            SequenceEntity {
                assembly: assembly.to_string(),
                name: fields[NAME_COL].to_string(),
                ref_acc: accession.to_string(),
                length,
                role,
                assembly_unit: fields[UNIT_COL].to_string(),
            },
            exclude_mt,
        );
    }

    Ok(inventory)
}

pub fn parse_sequence_report_file(
    path: &Path,
    assembly: &str,
    accession: &str,
    exclude_mt: bool,
) -> io::Result<Inventory> {
    let reader = open_text(path)?;
    let inventory = parse_sequence_report(reader, assembly, accession, exclude_mt).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Failed to read sequence report {}: {}", path.display(), e),
        )
    })?;
    info!(
        "Read {}, sequences: {}, chromosomes: {}",
        assembly,
        inventory.len(),
        inventory.chromosomes.len()
    );
    Ok(inventory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufReader;

    const REPORT: &str = "# Assembly Name:  GRCh38.p2\n\
# Organism name:  Homo sapiens (human)\n\
#\n\
# Sequence-Name\tSequence-Role\tAssigned-Molecule\tAssigned-Molecule-Location/Type\tGenBank-Accn\tRelationship\tRefSeq-Accn\tAssembly-Unit\tSequence-Length\tUCSC-style-name\n\
1\tassembled-molecule\t1\tChromosome\tCM000663.2\t=\tNC_000001.11\tPrimary Assembly\t248956422\tchr1\n\
2\tassembled-molecule\t2\tChromosome\tCM000664.2\t=\tNC_000002.12\tPrimary Assembly\t242193529\tchr2\n\
\n\
MT\tassembled-molecule\tMT\tMitochondrion\tJ01415.2\t=\tNC_012920.1\tnon-nuclear\t16569\tchrM\n\
HSCHR1_CTG1_UNLOCALIZED\tunlocalized-scaffold\t1\tChromosome\tKI270706.1\t=\tNT_187361.1\tPrimary Assembly\t175055\tchr1_KI270706v1_random\n\
HSCHR6_MHC_APD_CTG1\talt-scaffold\t6\tChromosome\tGL000250.2\t=\tNT_167244.2\tALT_REF_LOCI_1\t4672374\tchr6_GL000250v2_alt\n";

    fn parse(report: &str, exclude_mt: bool) -> Result<Inventory, InventoryErr> {
        parse_sequence_report(
            BufReader::new(report.as_bytes()),
            "GRCh38.p2",
            "GCF_000001405.28",
            exclude_mt,
        )
    }

    #[test]
    fn test_parse_sequence_report() {
        let inventory = parse(REPORT, false).unwrap();
        assert_eq!(inventory.len(), 5);
        assert_eq!(inventory.chromosomes, vec!["1", "2", "MT"]);

        let one = inventory.get("1").unwrap();
        assert_eq!(one.length, 248956422);
        assert_eq!(one.role, SequenceRole::AssembledMolecule);
        assert_eq!(one.assembly_unit, PRIMARY_ASSEMBLY_UNIT);
        assert_eq!(one.ref_acc, "GCF_000001405.28");
        assert_eq!(one.assembly, "GRCh38.p2");

        let alt = inventory.get("HSCHR6_MHC_APD_CTG1").unwrap();
        assert_eq!(alt.role, SequenceRole::AltScaffold);
        assert_eq!(alt.assembly_unit, "ALT_REF_LOCI_1");
    }

    #[test]
    fn test_exclude_mt() {
        let inventory = parse(REPORT, true).unwrap();
        assert_eq!(inventory.len(), 5);
        assert_eq!(inventory.chromosomes, vec!["1", "2"]);
        assert!(inventory.contains("MT"));
    }

    #[test]
    fn test_assembly_name_mismatch() {
        let report = REPORT.replace("GRCh38.p2", "CHM1_1.1");
        assert!(matches!(
            parse(&report, false),
            Err(InventoryErr::AssemblyMismatch { .. })
        ));
    }

    #[test]
    fn test_malformed_rows() {
        let short = "1\tassembled-molecule\t1\n";
        assert!(matches!(
            parse(short, false),
            Err(InventoryErr::NotEnoughFields { line: 1 })
        ));

        let bad_len = "# Assembly Name: GRCh38.p2\n1\tassembled-molecule\t1\tChromosome\tx\t=\tx\tPrimary Assembly\tlong\tchr1\n";
        assert!(matches!(
            parse(bad_len, false),
            Err(InventoryErr::InvalidLength { line: 2, .. })
        ));
    }

    #[test]
    fn test_unknown_role_is_kept() {
        let report = "1\tfix-patch\t1\tChromosome\tx\t=\tx\tPATCHES\t1000\tna\n";
        let inventory = parse(report, false).unwrap();
        assert_eq!(
            inventory.get("1").unwrap().role,
            SequenceRole::Other("fix-patch".to_string())
        );
        assert!(inventory.chromosomes.is_empty());
    }
}
