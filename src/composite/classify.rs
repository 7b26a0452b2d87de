use crate::errors::{CompositeError, Result};
use crate::models::{ChainComposite, DisorderClass, DisorderRegion, DISORDER, GAP};
use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

pub const DEFAULT_CORROBORATION_THRESHOLD: usize = 2;

fn disorder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new("X+").expect("disorder run pattern is valid"))
}

/// Half-open spans of every maximal `X` run, left to right.
pub fn find_disorder_spans(consensus: &str) -> Vec<Range<usize>> {
    disorder_pattern()
        .find_iter(consensus)
        .map(|m| m.range())
        .collect()
}

// A chain that reports structure over the whole span: no disorder, no gap.
fn is_conflict(slices: &[&str]) -> bool {
    slices
        .iter()
        .any(|s| !s.bytes().any(|c| c == DISORDER || c == GAP))
}

fn is_corroborated(slices: &[&str], threshold: usize) -> bool {
    slices
        .iter()
        .filter(|s| s.bytes().any(|c| c == DISORDER))
        .count()
        >= threshold
}

fn is_fully_disordered(slice: &str) -> bool {
    !slice.is_empty() && slice.bytes().all(|c| c == DISORDER)
}

fn is_conserved(slices: &[&str]) -> bool {
    slices.iter().all(|s| is_fully_disordered(s))
}

fn is_contained(slices: &[&str]) -> bool {
    slices.iter().any(|s| is_fully_disordered(s))
}

/// Classifies consensus disorder runs against the chains behind them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionClassifier {
    /// Chains that must show at least one `X` before a run is kept.
    pub corroboration_threshold: usize,
}

impl Default for RegionClassifier {
    fn default() -> Self {
        Self {
            corroboration_threshold: DEFAULT_CORROBORATION_THRESHOLD,
        }
    }
}

impl RegionClassifier {
    pub fn new(corroboration_threshold: usize) -> Self {
        Self {
            corroboration_threshold,
        }
    }

    /// Decision tree over the evidence slices of one span. First match wins:
    /// conflict, discarded, conserved, contained, overlap.
    pub fn classify(&self, slices: &[&str]) -> DisorderClass {
        if is_conflict(slices) {
            DisorderClass::Conflict
        } else if !is_corroborated(slices, self.corroboration_threshold) {
            DisorderClass::Discarded
        } else if is_conserved(slices) {
            DisorderClass::Conserved
        } else if is_contained(slices) {
            DisorderClass::Contained
        } else {
            DisorderClass::Overlap
        }
    }

    /// Segments `consensus` into disorder runs and classifies each one.
    ///
    /// Every chain string must have the consensus length. Runs come back in
    /// left-to-right order, one region per run.
    pub fn segment_and_classify<S: AsRef<str>>(
        &self,
        consensus: &str,
        chains: &[S],
    ) -> Result<Vec<DisorderRegion>> {
        for (i, chain) in chains.iter().enumerate() {
            let found = chain.as_ref().len();
            if found != consensus.len() {
                return Err(CompositeError::length_mismatch(
                    format!("chain composite {} vs consensus", i),
                    consensus.len(),
                    found,
                ));
            }
        }

        find_disorder_spans(consensus)
            .into_iter()
            .map(|span| {
                let slices = chains
                    .iter()
                    .map(|chain| {
                        chain
                            .as_ref()
                            .get(span.clone())
                            .filter(|s| s.len() == span.len())
                            .ok_or_else(|| {
                                CompositeError::length_mismatch(
                                    format!("evidence slice {:?}", span),
                                    span.len(),
                                    chain.as_ref().len().saturating_sub(span.start),
                                )
                            })
                    })
                    .collect::<Result<Vec<&str>>>()?;
                Ok(DisorderRegion {
                    class: self.classify(&slices),
                    span,
                })
            })
            .collect()
    }

    /// Same as [`segment_and_classify`](Self::segment_and_classify) over chain
    /// composites, naming the offending chain when a length is off.
    pub fn classify_chains(
        &self,
        consensus: &str,
        chains: &[ChainComposite],
    ) -> Result<Vec<DisorderRegion>> {
        if let Some(chain) = chains.iter().find(|c| c.len() != consensus.len()) {
            return Err(CompositeError::length_mismatch(
                format!("chain composite {} vs consensus", chain.chain_id),
                consensus.len(),
                chain.len(),
            ));
        }
        let structures: Vec<&str> = chains.iter().map(|c| c.structure.as_str()).collect();
        self.segment_and_classify(consensus, &structures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_disorder_spans() {
        assert_eq!(find_disorder_spans("--XXX--"), vec![2..5]);
        assert_eq!(
            find_disorder_spans("XX-OO-XOX"),
            vec![0..2, 6..7, 8..9]
        );
        assert!(find_disorder_spans("--OOO--").is_empty());
        assert!(find_disorder_spans("").is_empty());
    }

    #[test]
    fn test_spans_cover_exactly_the_disorder() {
        let consensus = "X-XXOOX--XXXXO-X";
        let spans = find_disorder_spans(consensus);
        let mut covered = vec![false; consensus.len()];
        let mut last_end = 0;
        for span in &spans {
            assert!(span.start >= last_end);
            last_end = span.end;
            for k in span.clone() {
                covered[k] = true;
            }
        }
        for (k, c) in consensus.bytes().enumerate() {
            assert_eq!(covered[k], c == DISORDER, "position {}", k);
        }
    }

    #[test]
    fn test_classify_examples() {
        let classifier = RegionClassifier::default();
        assert_eq!(classifier.classify(&["XXX", "XXX"]), DisorderClass::Conserved);
        assert_eq!(classifier.classify(&["XXX", "XPP"]), DisorderClass::Contained);
        assert_eq!(classifier.classify(&["XPX", "PPP"]), DisorderClass::Conflict);
        assert_eq!(classifier.classify(&["X--"]), DisorderClass::Discarded);
        assert_eq!(classifier.classify(&["X--", "---"]), DisorderClass::Discarded);
        assert_eq!(classifier.classify(&["XXP", "PXX"]), DisorderClass::Overlap);
    }

    #[test]
    fn test_conflict_takes_precedence() {
        let classifier = RegionClassifier::default();
        // Fully disordered in two chains, but one chain resolves the span.
        assert_eq!(
            classifier.classify(&["XXX", "XXX", "HHE"]),
            DisorderClass::Conflict
        );
        // A gap anywhere in the slice means the chain does not contradict.
        assert_eq!(
            classifier.classify(&["XXX", "XXX", "-HE"]),
            DisorderClass::Contained
        );
    }

    #[test]
    fn test_configurable_threshold() {
        let lenient = RegionClassifier::new(1);
        assert_eq!(lenient.classify(&["XXX", "---"]), DisorderClass::Contained);
        assert_eq!(lenient.classify(&["XXX"]), DisorderClass::Conserved);

        let strict = RegionClassifier::new(3);
        assert_eq!(
            strict.classify(&["XXX", "XXX"]),
            DisorderClass::Discarded
        );
    }

    #[test]
    fn test_classification_is_deterministic() {
        let classifier = RegionClassifier::default();
        let slices = ["XXP", "XXP", "XPP", "XXX", "-XP", "-PP"];
        let first = classifier.classify(&slices);
        for _ in 0..10 {
            assert_eq!(classifier.classify(&slices), first);
        }
        assert_eq!(first, DisorderClass::Contained);
    }

    #[test]
    fn test_segment_and_classify() {
        let classifier = RegionClassifier::default();
        let chains = ["--XXX--X-PPXX", "PPXXX--X--PXP"];
        let consensus = "OOXXX--X-OOXX";
        let regions = classifier.segment_and_classify(consensus, &chains).unwrap();
        assert_eq!(
            regions,
            vec![
                DisorderRegion {
                    class: DisorderClass::Conserved,
                    span: 2..5
                },
                DisorderRegion {
                    class: DisorderClass::Conserved,
                    span: 7..8
                },
                DisorderRegion {
                    class: DisorderClass::Contained,
                    span: 11..13
                },
            ]
        );
    }

    #[test]
    fn test_segment_without_disorder_is_empty() {
        let classifier = RegionClassifier::default();
        let regions = classifier
            .segment_and_classify("OO--", &["PP--", "HH--"])
            .unwrap();
        assert!(regions.is_empty());
    }

    #[test]
    fn test_segment_rejects_uneven_chains() {
        let classifier = RegionClassifier::default();
        let out = classifier.segment_and_classify("XX--", &["XX--", "XX-"]);
        assert!(matches!(out, Err(CompositeError::LengthMismatch { .. })));
    }

    #[test]
    fn test_classify_chains_names_the_short_chain() {
        let chain = |id: &str, structure: &str| ChainComposite {
            chain_id: id.to_string(),
            protein: std::sync::Arc::from("P11111"),
            structure: structure.to_string(),
        };
        let classifier = RegionClassifier::default();
        let chains = vec![chain("1AAA_A", "XXHH"), chain("2BBB_A", "XXH")];
        match classifier.classify_chains("XXOO", &chains) {
            Err(CompositeError::LengthMismatch { context, .. }) => {
                assert!(context.contains("2BBB_A"), "{}", context)
            }
            other => panic!("unexpected {:?}", other),
        }

        let chains = vec![chain("1AAA_A", "XXHH"), chain("2BBB_A", "XXP-")];
        let regions = classifier.classify_chains("XXOO", &chains).unwrap();
        assert_eq!(regions[0].class, DisorderClass::Conserved);
    }
}
