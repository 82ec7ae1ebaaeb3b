//! Writers for the coverage table, per-category BED files and cross-assembly
//! comparison tables.

use crate::align_report::OutcomeType;
use crate::stats::AssemblyStats;
use log::{error, info};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

pub const STATS_HEADER: &str =
    "#Sequence\tNoHit\tUnGap_NoHit\tCollapse(SP)\tExpansion(SP Only)\tInversion\tMix";

/// Quantity compared across the two assemblies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonMetric {
    Collapse,
    Expansion,
    NoHit,
    UngappedNoHit,
}

impl ComparisonMetric {
    pub fn title(&self) -> &'static str {
        match self {
            ComparisonMetric::Collapse => "Collapse sequence",
            ComparisonMetric::Expansion => "Expanded sequence",
            ComparisonMetric::NoHit => "NoHit sequence",
            ComparisonMetric::UngappedNoHit => "Ungapped NoHit sequence",
        }
    }
}

fn create(path: &Path) -> io::Result<BufWriter<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path).map_err(|e| {
        io::Error::new(e.kind(), format!("Can't create {}: {}", path.display(), e))
    })?;
    Ok(BufWriter::new(file))
}

fn join_columns(columns: &[u64]) -> String {
    columns
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join("\t")
}

/// Write the per-sequence coverage table of `stats`, compared against `other_assembly`.
pub fn write_stats<W: Write>(
    out: &mut W,
    stats: &AssemblyStats,
    other_assembly: &str,
    date: &str,
) -> io::Result<()> {
    writeln!(
        out,
        "##{} vs {} assembly alignment report",
        stats.assembly, other_assembly
    )?;
    writeln!(out, "##{}", date)?;
    writeln!(out, "##Overall stats")?;
    writeln!(out, "{}", STATS_HEADER)?;
    for record in &stats.records {
        writeln!(out, "{}\t{}", record.sequence, join_columns(&record.columns()))?;
    }
    writeln!(out, "total\t{}", join_columns(&stats.totals.columns()))?;
    Ok(())
}

pub fn write_stats_file(
    path: &Path,
    stats: &AssemblyStats,
    other_assembly: &str,
    date: &str,
) -> io::Result<()> {
    info!("Writing stats file: {}", path.display());
    let mut out = create(path)?;
    write_stats(&mut out, stats, other_assembly, date)?;
    out.flush()
}

/// Write the merged intervals of one category as BED, sequences in report order.
pub fn write_bed<W: Write>(
    out: &mut W,
    track_name: &str,
    stats: &AssemblyStats,
    outcome: OutcomeType,
) -> io::Result<()> {
    writeln!(out, "track name={}", track_name)?;
    for record in &stats.records {
        for interval in record.intervals(outcome) {
            writeln!(
                out,
                "{}\t{}\t{}",
                record.sequence, interval.start, interval.end
            )?;
        }
    }
    Ok(())
}

pub fn write_bed_file(path: &Path, stats: &AssemblyStats, outcome: OutcomeType) -> io::Result<()> {
    let track_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .and_then(|s| s.split('.').next())
        .unwrap_or("");
    let mut out = create(path)?;
    write_bed(&mut out, track_name, stats, outcome)?;
    out.flush()
}

fn metric_value(stats: &AssemblyStats, sequence: &str, metric: ComparisonMetric) -> u64 {
    stats
        .get(sequence)
        .map(|record| match metric {
            ComparisonMetric::Collapse => record.length(OutcomeType::Collapse),
            ComparisonMetric::Expansion => record.length(OutcomeType::Expansion),
            ComparisonMetric::NoHit => record.no_hit_gapped,
            ComparisonMetric::UngappedNoHit => record.no_hit_ungapped,
        })
        .unwrap_or(0)
}

/// Write one row per chromosome of the first assembly with the metric for both.
///
/// Returns `Ok(false)` without writing anything when a chromosome of the first
/// assembly is not a chromosome of the second.
pub fn write_comparison<W: Write>(
    out: &mut W,
    chromosomes1: &[String],
    stats1: &AssemblyStats,
    chromosomes2: &[String],
    stats2: &AssemblyStats,
    metric: ComparisonMetric,
) -> io::Result<bool> {
    if let Some(missing) = chromosomes1.iter().find(|c| !chromosomes2.contains(*c)) {
        error!(
            "{} not in both chromosome lists, not making {} comparison",
            missing,
            metric.title()
        );
        return Ok(false);
    }

    writeln!(
        out,
        "##{}: {} and {}",
        metric.title(),
        stats1.assembly,
        stats2.assembly
    )?;
    writeln!(out, "#Sequence\t{}\t{}", stats1.assembly, stats2.assembly)?;
    for chrom in chromosomes1 {
        writeln!(
            out,
            "{}\t{}\t{}",
            chrom,
            metric_value(stats1, chrom, metric),
            metric_value(stats2, chrom, metric)
        )?;
    }
    Ok(true)
}

pub fn write_comparison_file(
    path: &Path,
    chromosomes1: &[String],
    stats1: &AssemblyStats,
    chromosomes2: &[String],
    stats2: &AssemblyStats,
    metric: ComparisonMetric,
) -> io::Result<()> {
    let mut buffer = Vec::new();
    if write_comparison(&mut buffer, chromosomes1, stats1, chromosomes2, stats2, metric)? {
        info!("Writing {} comparison: {}", metric.title(), path.display());
        let mut out = create(path)?;
        out.write_all(&buffer)?;
        out.flush()?;
    }
    Ok(())
}
