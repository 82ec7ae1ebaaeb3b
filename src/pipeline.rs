//! Per-assembly pipeline (sequence report -> alignment report -> coverage) and
//! the two-assembly run driven by a [`Config`].

use crate::align_report::{parse_align_report_file, OutcomeType};
use crate::config::{AssemblyInput, AssemblyOutputs, ComparisonOutputs, Config};
use crate::inventory::{parse_sequence_report_file, Inventory};
use crate::output::{write_bed_file, write_comparison_file, write_stats_file, ComparisonMetric};
use crate::stats::{aggregate, AggregateOptions, AssemblyStats};
use log::info;
use std::io;

/// Inventory and coverage of one assembly.
#[derive(Debug)]
pub struct AssemblyResult {
    pub inventory: Inventory,
    pub stats: AssemblyStats,
}

/// Run one assembly end to end. Owns all of its state, so separate assemblies
/// can run concurrently.
pub fn process_assembly(
    input: &AssemblyInput,
    exclude_mt: bool,
    options: AggregateOptions,
) -> io::Result<AssemblyResult> {
    let inventory =
        parse_sequence_report_file(&input.seq_rpt, &input.name, &input.acc, exclude_mt)?;
    info!("Processing {}", input.name);
    let buckets = parse_align_report_file(&input.align_rpt, &input.name)?;
    let stats = aggregate(&inventory, &buckets, options);
    Ok(AssemblyResult { inventory, stats })
}

fn write_assembly_outputs(
    result: &AssemblyResult,
    other_assembly: &str,
    outputs: &AssemblyOutputs,
    make_bed: bool,
    date: &str,
) -> io::Result<()> {
    if let Some(path) = &outputs.stats {
        write_stats_file(path, &result.stats, other_assembly, date)?;
    }
    if !make_bed {
        return Ok(());
    }

    info!("Making {} beds", result.stats.assembly);
    let beds = [
        (&outputs.no_hit_bed, OutcomeType::NoHit),
        (&outputs.collapse_bed, OutcomeType::Collapse),
        (&outputs.expand_bed, OutcomeType::Expansion),
        (&outputs.inv_bed, OutcomeType::Inversion),
        (&outputs.mix_bed, OutcomeType::Mix),
    ];
    for (path, outcome) in beds {
        if let Some(path) = path {
            write_bed_file(path, &result.stats, outcome)?;
        }
    }
    Ok(())
}

fn write_comparisons(
    first: &AssemblyResult,
    second: &AssemblyResult,
    outputs: &ComparisonOutputs,
) -> io::Result<()> {
    if first.inventory.chromosomes.is_empty() || second.inventory.chromosomes.is_empty() {
        info!("Skipping comparisons, at least one assembly has no chromosomes");
        return Ok(());
    }

    let comparisons = [
        (&outputs.both_collapse, ComparisonMetric::Collapse),
        (&outputs.both_expand, ComparisonMetric::Expansion),
        (&outputs.both_nohit, ComparisonMetric::NoHit),
        (&outputs.both_ungap_nohit, ComparisonMetric::UngappedNoHit),
    ];
    for (path, metric) in comparisons {
        if let Some(path) = path {
            write_comparison_file(
                path,
                &first.inventory.chromosomes,
                &first.stats,
                &second.inventory.chromosomes,
                &second.stats,
                metric,
            )?;
        }
    }
    Ok(())
}

/// Process both assemblies of `config` in parallel and write every configured output.
pub fn run(config: &Config, date: &str) -> io::Result<(AssemblyResult, AssemblyResult)> {
    let params = &config.params;
    let options = AggregateOptions {
        merge_no_hit: params.merge_no_hit,
    };
    let assm1 = &config.input_files.assm1;
    let assm2 = &config.input_files.assm2;

    let (first, second) = rayon::join(
        || process_assembly(assm1, params.exclude_mt, options),
        || process_assembly(assm2, params.exclude_mt, options),
    );
    let (first, second) = (first?, second?);

    let outputs = &config.output_files;
    write_assembly_outputs(&first, &assm2.name, &outputs.assm1, params.make_bed, date)?;
    write_assembly_outputs(&second, &assm1.name, &outputs.assm2, params.make_bed, date)?;
    write_comparisons(&first, &second, &outputs.comparison)?;

    Ok((first, second))
}
