use crate::annotation::ss_dis::AnnotationSource;
use crate::composite::classify::RegionClassifier;
use crate::composite::consensus::build_protein_composite;
use crate::composite::remap::build_chain_composite;
use crate::config::EngineConfig;
use crate::data_sources::sifts::{group_chain_intervals, ChainIntervals, SiftsRecord};
use crate::errors::{CompositeError, Result};
use crate::models::{ChainComposite, DisorderClass, ProteinReport};
use crate::protein::fasta::SequenceLengths;
use indicatif::{ProgressBar, ProgressStyle};
use log::*;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

/// All chains that map onto one protein.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProteinChains {
    pub protein: Arc<str>,
    pub chains: Vec<ChainIntervals>,
}

/// A protein whose processing was aborted. Nothing of it reaches the output.
#[derive(Debug)]
pub struct ProteinFailure {
    pub protein: String,
    pub chain: Option<String>,
    pub error: CompositeError,
}

impl std::fmt::Display for ProteinFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.chain {
            Some(chain) => write!(f, "{} (chain {}): {}", self.protein, chain, self.error),
            None => write!(f, "{}: {}", self.protein, self.error),
        }
    }
}

/// Progress hooks. Every method defaults to doing nothing.
pub trait PipelineObserver: Send + Sync {
    fn on_start(&self, _total_proteins: usize) {}
    fn on_chain_skipped(&self, _protein: &str, _chain_id: &str) {}
    fn on_protein_done(&self, _report: &ProteinReport) {}
    fn on_protein_failed(&self, _failure: &ProteinFailure) {}
    fn on_finish(&self, _succeeded: usize, _failed: usize) {}
}

#[derive(Debug, Default)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

/// Sends progress through the `log` facade.
#[derive(Debug, Default)]
pub struct LogObserver;

impl PipelineObserver for LogObserver {
    fn on_start(&self, total_proteins: usize) {
        info!("Processing {} proteins", total_proteins);
    }

    fn on_chain_skipped(&self, protein: &str, chain_id: &str) {
        warn!("No annotation for chain {}, dropping it from {}", chain_id, protein);
    }

    fn on_protein_done(&self, report: &ProteinReport) {
        debug!(
            "{}: {} chains, {} disorder regions",
            report.protein(),
            report.chain_ids.len(),
            report.regions.len()
        );
    }

    fn on_protein_failed(&self, failure: &ProteinFailure) {
        error!("Aborted {}", failure);
    }

    fn on_finish(&self, succeeded: usize, failed: usize) {
        info!("Done: {} proteins processed, {} failed", succeeded, failed);
    }
}

/// Draws an indicatif bar over the proteins.
pub struct ProgressBarObserver {
    bar: ProgressBar,
}

impl Default for ProgressBarObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressBarObserver {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        if let Ok(style) = ProgressStyle::with_template(
            "[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}",
        ) {
            bar.set_style(style.progress_chars("##-"));
        }
        Self { bar }
    }
}

impl PipelineObserver for ProgressBarObserver {
    fn on_start(&self, total_proteins: usize) {
        self.bar.set_length(total_proteins as u64);
        self.bar.set_message("building composites");
    }

    fn on_protein_done(&self, _report: &ProteinReport) {
        self.bar.inc(1);
    }

    fn on_protein_failed(&self, failure: &ProteinFailure) {
        self.bar.println(format!("failed: {}", failure));
        self.bar.inc(1);
    }

    fn on_finish(&self, succeeded: usize, failed: usize) {
        self.bar
            .finish_with_message(format!("{} done, {} failed", succeeded, failed));
    }
}

/// What one run produces.
#[derive(Debug, Default)]
pub struct PipelineOutput {
    pub chain_composites: Vec<ChainComposite>,
    pub reports: Vec<ProteinReport>,
    pub failures: Vec<ProteinFailure>,
    /// Proteins left out for having too few distinct chains.
    pub skipped_proteins: Vec<String>,
}

impl PipelineOutput {
    pub fn class_counts(&self) -> BTreeMap<DisorderClass, usize> {
        let mut counts = BTreeMap::new();
        for region in self.reports.iter().flat_map(|r| r.regions.iter()) {
            *counts.entry(region.class).or_insert(0) += 1;
        }
        counts
    }
}

/// Groups chains by protein, dropping proteins with fewer than `min_chains`
/// distinct chains. Both lists keep first-seen order.
pub fn group_by_protein(
    chains: Vec<ChainIntervals>,
    min_chains: usize,
) -> (Vec<ProteinChains>, Vec<String>) {
    let mut index: HashMap<Arc<str>, usize> = HashMap::new();
    let mut groups: Vec<ProteinChains> = Vec::new();
    for chain in chains {
        match index.get(&chain.protein) {
            Some(&i) => groups[i].chains.push(chain),
            None => {
                index.insert(chain.protein.clone(), groups.len());
                groups.push(ProteinChains {
                    protein: chain.protein.clone(),
                    chains: vec![chain],
                });
            }
        }
    }

    let (kept, dropped): (Vec<_>, Vec<_>) = groups.into_iter().partition(|g| {
        let distinct: HashSet<&str> = g.chains.iter().map(|c| c.chain_id.as_str()).collect();
        distinct.len() >= min_chains
    });
    let dropped: Vec<String> = dropped.into_iter().map(|g| g.protein.to_string()).collect();
    if !dropped.is_empty() {
        info!(
            "Skipping {} proteins with fewer than {} chains",
            dropped.len(),
            min_chains
        );
    }
    (kept, dropped)
}

/// Every report's protein must be unique and must match the chain composites
/// that went into the output.
pub fn validate_reports(reports: &[ProteinReport], chains: &[ChainComposite]) -> Result<()> {
    let mut seen = HashSet::new();
    for report in reports {
        if !seen.insert(report.protein()) {
            return Err(CompositeError::InvalidAnnotation {
                chain: report.chain_ids.join(","),
                reason: format!("protein {} reported twice", report.protein()),
            });
        }
    }
    let from_chains: HashSet<&str> = chains.iter().map(|c| c.protein.as_ref()).collect();
    if let Some(orphan) = from_chains.symmetric_difference(&seen).next() {
        return Err(CompositeError::MissingProtein {
            protein: orphan.to_string(),
        });
    }
    Ok(())
}

struct ProteinOutcome {
    chains: Vec<ChainComposite>,
    report: ProteinReport,
}

/// Runs remap, consensus and classification for every protein.
pub struct Pipeline<'a, A, L> {
    annotations: &'a A,
    lengths: &'a L,
    config: EngineConfig,
    classifier: RegionClassifier,
    observer: &'a dyn PipelineObserver,
}

impl<'a, A, L> Pipeline<'a, A, L>
where
    A: AnnotationSource + Sync,
    L: SequenceLengths + Sync,
{
    pub fn new(
        annotations: &'a A,
        lengths: &'a L,
        config: EngineConfig,
        observer: &'a dyn PipelineObserver,
    ) -> Self {
        let classifier = config.classifier();
        Self {
            annotations,
            lengths,
            config,
            classifier,
            observer,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Groups the rows and runs every protein.
    pub fn run(&self, records: &[SiftsRecord]) -> Result<PipelineOutput> {
        let chains = group_chain_intervals(records);
        let (groups, skipped) = group_by_protein(chains, self.config.min_chains_per_protein);
        let mut output = self.run_grouped(&groups)?;
        output.skipped_proteins = skipped;
        Ok(output)
    }

    pub fn run_grouped(&self, groups: &[ProteinChains]) -> Result<PipelineOutput> {
        let st = Instant::now();
        self.observer.on_start(groups.len());

        let outcomes: Vec<std::result::Result<ProteinOutcome, ProteinFailure>> =
            if self.config.parallel {
                groups.par_iter().map(|g| self.process_protein(g)).collect()
            } else {
                groups.iter().map(|g| self.process_protein(g)).collect()
            };

        let mut output = PipelineOutput::default();
        for outcome in outcomes {
            match outcome {
                Ok(outcome) => {
                    output.chain_composites.extend(outcome.chains);
                    output.reports.push(outcome.report);
                }
                Err(failure) => output.failures.push(failure),
            }
        }
        validate_reports(&output.reports, &output.chain_composites)?;

        self.observer
            .on_finish(output.reports.len(), output.failures.len());
        info!(
            "Composite synthesis took {:?} for {} proteins",
            st.elapsed(),
            groups.len()
        );
        Ok(output)
    }

    fn process_protein(
        &self,
        group: &ProteinChains,
    ) -> std::result::Result<ProteinOutcome, ProteinFailure> {
        let out = self.try_process_protein(group);
        match &out {
            Ok(outcome) => self.observer.on_protein_done(&outcome.report),
            Err(failure) => self.observer.on_protein_failed(failure),
        }
        out
    }

    fn try_process_protein(
        &self,
        group: &ProteinChains,
    ) -> std::result::Result<ProteinOutcome, ProteinFailure> {
        let protein = group.protein.as_ref();
        let fail = |chain: Option<&str>, error: CompositeError| ProteinFailure {
            protein: protein.to_string(),
            chain: chain.map(str::to_string),
            error,
        };

        let length = self.lengths.sequence_length(protein).ok_or_else(|| {
            fail(
                None,
                CompositeError::MissingProtein {
                    protein: protein.to_string(),
                },
            )
        })?;

        let mut composites = Vec::with_capacity(group.chains.len());
        for chain in &group.chains {
            let Some(annotation) = self.annotations.get_annotation(&chain.chain_id) else {
                self.observer.on_chain_skipped(protein, &chain.chain_id);
                continue;
            };
            let composite =
                build_chain_composite(annotation, group.protein.clone(), &chain.intervals, length)
                    .map_err(|e| fail(Some(chain.chain_id.as_str()), e))?;
            composites.push(composite);
        }

        let composite =
            build_protein_composite(protein, &composites, self.config.min_chains_per_protein)
                .map_err(|e| fail(None, e))?;
        let regions = self
            .classifier
            .classify_chains(&composite.structure, &composites)
            .map_err(|e| fail(None, e))?;

        let chain_ids = composites.iter().map(|c| c.chain_id.clone()).collect();
        Ok(ProteinOutcome {
            chains: composites,
            report: ProteinReport {
                composite,
                regions,
                chain_ids,
            },
        })
    }
}
