use super::models::{ProteinSequence, ProteinSequenceBuilder};
use crate::errors::{CompositeError, Result};
use log::*;
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

/// Lookup of full-length protein sequence lengths by accession.
pub trait SequenceLengths {
    fn sequence_length(&self, protein: &str) -> Option<usize>;
}

impl SequenceLengths for HashMap<String, usize> {
    fn sequence_length(&self, protein: &str) -> Option<usize> {
        self.get(protein).copied()
    }
}

#[derive(Debug)]
pub struct ProteinSequenceCollection {
    pub sequences: Vec<ProteinSequence>,
    by_accession: HashMap<String, usize>,
}

impl ProteinSequenceCollection {
    pub fn new(sequences: Vec<ProteinSequence>) -> Self {
        let mut by_accession = HashMap::with_capacity(sequences.len());
        for (i, sequence) in sequences.iter().enumerate() {
            if let Some(prev) = by_accession.insert(sequence.accession.to_string(), i) {
                warn!(
                    "Accession {} appears more than once, keeping '{}' over '{}'",
                    sequence.accession, sequence.description, sequences[prev].description
                );
            }
        }
        Self {
            sequences,
            by_accession,
        }
    }

    pub fn from_fasta(fasta: &str) -> Result<ProteinSequenceCollection> {
        let st = Instant::now();
        let mut sequences = vec![];
        let mut current_sequence = ProteinSequenceBuilder::new();
        for (i, line) in fasta.lines().enumerate() {
            if line.starts_with('>') {
                if current_sequence.has_description() {
                    sequences.extend(current_sequence.build());
                }
                let description = line.trim_start_matches('>').trim();
                current_sequence = ProteinSequenceBuilder::new().with_description(description);
            } else if !line.trim().is_empty() {
                if !current_sequence.has_description() {
                    return Err(CompositeError::parse(i + 1, "sequence before any header"));
                }
                current_sequence = current_sequence.append_sequence(line.trim());
            }
        }
        sequences.extend(current_sequence.build());
        info!("Read {} protein sequences in {:?}", sequences.len(), st.elapsed());
        Ok(Self::new(sequences))
    }

    pub fn from_fasta_file<P: AsRef<Path>>(file: P) -> Result<ProteinSequenceCollection> {
        let fasta = std::fs::read_to_string(file)?;
        Self::from_fasta(&fasta)
    }

    pub fn get(&self, accession: &str) -> Option<&ProteinSequence> {
        self.by_accession
            .get(accession)
            .and_then(|&i| self.sequences.get(i))
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}

impl SequenceLengths for ProteinSequenceCollection {
    fn sequence_length(&self, protein: &str) -> Option<usize> {
        self.get(protein).map(|s| s.len())
    }
}

// Tests ...
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fasta_parsing() {
        let dummy_fasta_string = r#">sp|P12345|COOL_HUMAN mysupercoolprotein
PEPTIDEPINK
PEPTIDEPINKPEPTIDEPINK
PEPTIDEPINK

> Q99999 mysupercoolprotein2
PEPTIDEPLNK
PEPTIDEPLNK

"#;
        let fasta = ProteinSequenceCollection::from_fasta(dummy_fasta_string).unwrap();
        assert_eq!(fasta.len(), 2);
        assert_eq!(
            fasta.sequences[0].sequence.as_ref(),
            "PEPTIDEPINKPEPTIDEPINKPEPTIDEPINKPEPTIDEPINK"
        );
        assert_eq!(fasta.sequences[1].sequence.as_ref(), "PEPTIDEPLNKPEPTIDEPLNK");
        assert_eq!(fasta.sequences[0].accession.as_ref(), "P12345");
        assert_eq!(fasta.sequences[1].accession.as_ref(), "Q99999");
        assert_eq!(fasta.sequences[1].description, "Q99999 mysupercoolprotein2");

        assert_eq!(fasta.sequence_length("P12345"), Some(44));
        assert_eq!(fasta.sequence_length("Q99999"), Some(22));
        assert_eq!(fasta.sequence_length("O00000"), None);
    }

    #[test]
    fn test_fasta_rejects_headless_sequence() {
        let out = ProteinSequenceCollection::from_fasta("PEPTIDE\n>sp|P1|X\nMK\n");
        assert!(matches!(out, Err(CompositeError::Parse { line: 1, .. })));
    }

    #[test]
    fn test_empty_fasta() {
        let fasta = ProteinSequenceCollection::from_fasta("").unwrap();
        assert!(fasta.is_empty());
    }

    #[test]
    fn test_duplicate_accession_keeps_last() {
        let fasta = ">sp|P12345|OLD first\nMK\n>sp|P12345|NEW second\nMKVL\n";
        let collection = ProteinSequenceCollection::from_fasta(fasta).unwrap();
        assert_eq!(collection.len(), 2);
        let kept = collection.get("P12345").unwrap();
        assert_eq!(kept.description, "sp|P12345|NEW second");
        assert_eq!(collection.sequence_length("P12345"), Some(4));
    }
}
