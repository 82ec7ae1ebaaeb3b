//! Run configuration, read from a JSON file.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub input_files: InputFiles,
    #[serde(default)]
    pub output_files: OutputFiles,
    #[serde(default)]
    pub params: Params,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputFiles {
    pub assm1: AssemblyInput,
    pub assm2: AssemblyInput,
}

/// Identity and input reports of one assembly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyInput {
    pub name: String,
    pub acc: String,
    pub seq_rpt: PathBuf,
    pub align_rpt: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputFiles {
    #[serde(default)]
    pub assm1: AssemblyOutputs,
    #[serde(default)]
    pub assm2: AssemblyOutputs,
    #[serde(default)]
    pub comparison: ComparisonOutputs,
}

/// Output paths of one assembly; a missing path disables that output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssemblyOutputs {
    pub stats: Option<PathBuf>,
    pub no_hit_bed: Option<PathBuf>,
    pub collapse_bed: Option<PathBuf>,
    pub expand_bed: Option<PathBuf>,
    pub inv_bed: Option<PathBuf>,
    pub mix_bed: Option<PathBuf>,
}

/// Per-chromosome tables comparing the two assemblies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComparisonOutputs {
    pub both_collapse: Option<PathBuf>,
    pub both_expand: Option<PathBuf>,
    pub both_nohit: Option<PathBuf>,
    pub both_ungap_nohit: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Params {
    /// Only primary-unit assembled molecules count as chromosomes
    #[serde(default)]
    pub exclude_mt: bool,
    #[serde(default)]
    pub make_bed: bool,
    #[serde(default = "default_merge_no_hit")]
    pub merge_no_hit: bool,
}

fn default_merge_no_hit() -> bool {
    true
}

impl Default for Params {
    fn default() -> Self {
        Self {
            exclude_mt: false,
            make_bed: false,
            merge_no_hit: default_merge_no_hit(),
        }
    }
}

impl Params {
    /// Apply command-line switches; each one can only turn its behaviour on,
    /// never undo a setting made in the config file.
    pub fn apply_overrides(&mut self, exclude_mt: bool, make_bed: bool, no_merge_no_hit: bool) {
        self.exclude_mt |= exclude_mt;
        self.make_bed |= make_bed;
        if no_merge_no_hit {
            self.merge_no_hit = false;
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> io::Result<Self> {
        let file = File::open(path).map_err(|e| {
            io::Error::new(
                e.kind(),
                format!("Can't open config file {}: {}", path.display(), e),
            )
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid config file {}: {}", path.display(), e),
            )
        })
    }
}
