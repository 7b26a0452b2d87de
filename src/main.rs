use clap::Parser;
use log::info;
use pdbdisorder::annotation::ss_dis::SsDisCollection;
use pdbdisorder::config::EngineConfig;
use pdbdisorder::data_sources::sifts::read_sifts_file;
use pdbdisorder::errors::CompositeError;
use pdbdisorder::output::writer::write_all;
use pdbdisorder::pipeline::{LogObserver, Pipeline, PipelineObserver, ProgressBarObserver};
use pdbdisorder::protein::fasta::ProteinSequenceCollection;
use std::path::PathBuf;
use std::time::Instant;

/// Builds per-protein disorder composites from PDB chain annotations.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// ss_dis.txt with sequence, secstr and disorder tracks per chain
    #[arg(long)]
    ss_dis: PathBuf,

    /// Filtered pdb_chain_uniprot.tsv with the chain to protein intervals
    #[arg(long)]
    intervals: PathBuf,

    /// Fasta with the full-length protein sequences
    #[arg(long)]
    fasta: PathBuf,

    /// Directory the result tables are written to
    #[arg(long)]
    out_dir: PathBuf,

    /// Optional JSON engine config
    #[arg(long)]
    config: Option<PathBuf>,

    /// Chains that must show disorder for a region to be kept
    #[arg(long)]
    threshold: Option<usize>,

    /// Minimum distinct chains per protein
    #[arg(long)]
    min_chains: Option<usize>,

    /// Process proteins in parallel
    #[arg(long)]
    parallel: bool,

    /// Draw a progress bar instead of logging per protein
    #[arg(long)]
    progress: bool,
}

impl Cli {
    fn engine_config(&self) -> Result<EngineConfig, CompositeError> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::from_json_file(path)?,
            None => EngineConfig::default(),
        };
        if let Some(threshold) = self.threshold {
            config.corroboration_threshold = threshold;
        }
        if let Some(min_chains) = self.min_chains {
            config.min_chains_per_protein = min_chains;
        }
        if self.parallel {
            config.parallel = true;
        }
        Ok(config)
    }
}

fn main() -> std::result::Result<(), CompositeError> {
    // Initialize logging
    env_logger::init();
    let args = Cli::parse();
    let config = args.engine_config()?;
    info!("Running with {:?}", config);

    let start = Instant::now();
    let annotations = SsDisCollection::from_ss_dis_file(&args.ss_dis)?;
    let proteins = ProteinSequenceCollection::from_fasta_file(&args.fasta)?;
    let records = read_sifts_file(&args.intervals)?;
    info!("Loading inputs took {:?}", start.elapsed());

    let observer: Box<dyn PipelineObserver> = if args.progress {
        Box::new(ProgressBarObserver::new())
    } else {
        Box::new(LogObserver)
    };
    let pipeline = Pipeline::new(&annotations, &proteins, config, observer.as_ref());
    let output = pipeline.run(&records)?;

    for (class, count) in output.class_counts() {
        info!("{:>10}: {}", class.as_str(), count);
    }
    if !output.failures.is_empty() {
        log::warn!("{} proteins failed", output.failures.len());
        for failure in &output.failures {
            log::warn!("  {}", failure);
        }
    }

    write_all(&args.out_dir, &output.chain_composites, &output.reports)?;
    Ok(())
}
