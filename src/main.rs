use asmcov::config::Config;
use asmcov::pipeline;
use asmcov::seq_report::make_seq_report;
use clap::Parser;
use log::info;
use rayon::ThreadPoolBuilder;
use std::io;
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// Common options shared between all commands
#[derive(Parser, Debug)]
struct CommonOpts {
    /// Verbosity level (0 = error, 1 = info, 2 = debug)
    #[clap(short, long, default_value = "0")]
    verbose: u8,
}

/// Coverage statistics from NCBI assembly-assembly alignment reports.
#[derive(Parser, Debug)]
#[command(author, version, about, disable_help_subcommand = true)]
enum Args {
    /// Compute per-sequence coverage stats for both assemblies of a config file
    Stats {
        #[clap(flatten)]
        common: CommonOpts,

        /// Path to the JSON config file
        #[clap(short = 'c', long, value_parser)]
        config: PathBuf,

        /// Number of threads for parallel processing.
        #[clap(short = 't', long, value_parser, default_value_t = NonZeroUsize::new(2).unwrap())]
        num_threads: NonZeroUsize,

        /// Only count primary-unit assembled molecules as chromosomes
        #[clap(long, action)]
        exclude_mt: bool,

        /// Write per-category BED files
        #[clap(long, action)]
        make_bed: bool,

        /// Keep no-hit intervals as reported instead of merging them
        #[clap(long, action)]
        no_merge_no_hit: bool,
    },
    /// Write a sequence report for an assembly that only has a FASTA file
    SeqReport {
        #[clap(flatten)]
        common: CommonOpts,

        /// Path to the FASTA file
        #[clap(short = 'f', long, value_parser)]
        fasta: PathBuf,

        /// Assembly name
        #[clap(short = 'n', long, value_parser)]
        asm_name: String,

        /// Output directory
        #[clap(short = 'o', long, value_parser)]
        outdir: PathBuf,
    },
}

fn init_logger(common: &CommonOpts) {
    env_logger::Builder::new()
        .filter_level(match common.verbose {
            0 => log::LevelFilter::Error,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .init();
}

fn main() -> io::Result<()> {
    let args = Args::parse();

    match args {
        Args::Stats {
            common,
            config,
            num_threads,
            exclude_mt,
            make_bed,
            no_merge_no_hit,
        } => {
            init_logger(&common);
            ThreadPoolBuilder::new()
                .num_threads(num_threads.into())
                .build_global()
                .map_err(|e| io::Error::other(format!("Failed to build thread pool: {e}")))?;

            let mut cfg = Config::load(&config)?;
            cfg.params.apply_overrides(exclude_mt, make_bed, no_merge_no_hit);

            info!(
                "Comparing {} and {} (config {})",
                cfg.input_files.assm1.name,
                cfg.input_files.assm2.name,
                config.display()
            );
            let date = chrono::Local::now().format("%Y-%m-%d").to_string();
            pipeline::run(&cfg, &date)?;
        }
        Args::SeqReport {
            common,
            fasta,
            asm_name,
            outdir,
        } => {
            init_logger(&common);
            make_seq_report(&fasta, &asm_name, &outdir)?;
        }
    }

    Ok(())
}
