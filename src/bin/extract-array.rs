//! Extracts per-base measurements of resquiggled reads into a
//! reference-aligned matrix.
//!
//! ```shell
//! cargo run --release --bin=extract-array --features=binaries -- \
//!     --rna-name rna0 --fa rna0.fa --f5 reads/ --out out/rna0_dwell.dat --dwell
//! ```
//!
//! The output is a raw, row-major matrix of native-endian `f64` values with
//! one row per mapped read and one column per reference position.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use clap::ArgGroup;
use clap::Parser;
use clap_verbosity_flag::InfoLevel;
use clap_verbosity_flag::Verbosity;
use eventarray::Reference;
use eventarray::container::DEFAULT_ANALYSIS;
use eventarray::container::Layout;
use eventarray::container::hdf5::Opener;
use eventarray::extract;
use eventarray::record::Kind;
use tracing::info;
use tracing_log::AsTrace as _;
use tracing_subscriber::EnvFilter;

/// Assembles dwell times, currents, or current deviations of mapped reads
/// into a single matrix.
#[derive(Parser)]
#[command(group(
    ArgGroup::new("kind")
        .required(true)
        .multiple(false)
        .args(["dwell", "current", "stdev"]),
))]
struct Args {
    /// The name of the reference reads must be mapped to.
    #[arg(long)]
    rna_name: String,

    /// The reference sequence (a single FASTA record, optionally gzipped).
    #[arg(long)]
    fa: PathBuf,

    /// The root directory of the reads (one level of subfolders holding
    /// `.fast5` files).
    #[arg(long)]
    f5: PathBuf,

    /// The output matrix file.
    #[arg(long)]
    out: PathBuf,

    /// The maximum number of reads (rows) to extract.
    #[arg(long)]
    max_reads: Option<usize>,

    /// The maximum number of files to scan.
    #[arg(long)]
    max_files: Option<usize>,

    /// Orders rows by the read number of each read within its run.
    #[arg(long, default_value_t = false)]
    sort_reads: bool,

    /// Extracts dwell times.
    #[arg(long)]
    dwell: bool,

    /// Extracts normalized mean currents.
    #[arg(long)]
    current: bool,

    /// Extracts normalized current standard deviations.
    #[arg(long)]
    stdev: bool,

    /// Skips checking called bases against the reference.
    #[arg(long, default_value_t = false)]
    no_check_sequence: bool,

    /// The analysis group holding the resquiggled alignment and events.
    #[arg(long, default_value = DEFAULT_ANALYSIS)]
    analysis: String,

    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

impl Args {
    /// Turns the arguments into an extraction configuration.
    fn config(&self) -> Result<extract::Config> {
        let kind = Kind::from_flags(self.dwell, self.current, self.stdev)?;

        Ok(extract::Config::new(
            self.rna_name.clone(),
            self.f5.clone(),
            self.out.clone(),
            kind,
        )
        .with_max_reads(self.max_reads)
        .with_max_files(self.max_files)
        .with_ordered(self.sort_reads)
        .with_check_sequence(!self.no_check_sequence)
        .with_layout(Layout::new(self.analysis.clone())))
    }
}

fn run(args: &Args) -> Result<()> {
    let config = args.config().context("configuring the extraction")?;

    let reference = Reference::from_path(&args.fa)
        .with_context(|| format!("reading reference: {}", args.fa.display()))?;

    if let Some(parent) = config.output().parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory: {}", parent.display()))?;
    }

    let summary = extract::run(&config, &reference, &Opener)
        .with_context(|| format!("extracting {} from {}", config.kind(), args.f5.display()))?;

    info!(
        "wrote {} rows of {} columns to {}",
        summary.written(),
        reference.len(),
        config.output().display()
    );
    info!("successfully extracted data for reads in {}", args.f5.display());

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    match std::env::var("RUST_LOG") {
        Ok(_) => tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .init(),
        Err(_) => tracing_subscriber::fmt()
            .with_max_level(args.verbose.log_level_filter().as_trace())
            .init(),
    };

    run(&args)
}
