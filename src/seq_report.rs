//! Synthetic sequence reports for assemblies published without one.
//!
//! Every FASTA record becomes an `unlocalized-scaffold` of the primary assembly
//! unit, which is what a scaffold-level assembly without assigned molecules looks
//! like in an NCBI report.

use crate::input::open_text;
use crate::inventory::{ASSEMBLY_NAME_PREFIX, PRIMARY_ASSEMBLY_UNIT};
use bio::io::fasta;
use log::info;
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};

const REPORT_COLUMNS: &str = "#Sequence-name\tSequence-Role\tAssigned-Molecule\tAssigned-Molecule-Location/Type\tGenBank-Accn\tRelationship\tRefSeq-Accn\tAssembly-Unit\tSequence-Length\tUCSC-style-name";

/// Names and lengths of the records of a FASTA stream, in file order.
pub fn sequence_lengths<R: BufRead>(reader: R) -> io::Result<Vec<(String, u64)>> {
    let mut lengths = Vec::new();
    for record in fasta::Reader::from_bufread(reader).records() {
        let record = record.map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        lengths.push((record.id().to_string(), record.seq().len() as u64));
    }
    Ok(lengths)
}

pub fn write_seq_report<W: Write>(
    out: &mut W,
    assembly: &str,
    lengths: &[(String, u64)],
) -> io::Result<()> {
    writeln!(out, "{} {}", ASSEMBLY_NAME_PREFIX, assembly)?;
    writeln!(out, "# Synthetic assembly report, generated from FASTA")?;
    writeln!(out, "# Assumptions: scaffold-level assembly, primary unit only")?;
    writeln!(out, "{}", REPORT_COLUMNS)?;
    for (name, length) in lengths {
        writeln!(
            out,
            "{}\tunlocalized-scaffold\tna\tna\tna\tna\tna\t{}\t{}\tna",
            name, PRIMARY_ASSEMBLY_UNIT, length
        )?;
    }
    Ok(())
}

/// Write `<outdir>/<assembly>.assembly.txt` from `fasta_path` and return its path.
pub fn make_seq_report(fasta_path: &Path, assembly: &str, outdir: &Path) -> io::Result<PathBuf> {
    let lengths = sequence_lengths(open_text(fasta_path)?)?;

    std::fs::create_dir_all(outdir)?;
    let out_path = outdir.join(format!("{}.assembly.txt", assembly));
    let mut out = BufWriter::new(File::create(&out_path)?);
    write_seq_report(&mut out, assembly, &lengths)?;
    out.flush()?;

    info!(
        "Wrote {} sequences of {} to {}",
        lengths.len(),
        assembly,
        out_path.display()
    );
    Ok(out_path)
}
