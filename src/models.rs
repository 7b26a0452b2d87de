use crate::errors::{CompositeError, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::ops::Range;
use std::sync::Arc;

/// Residue flagged as lacking stable structure.
pub const DISORDER: u8 = b'X';
/// "Not disordered" in a raw disorder track, "no data" in every derived string.
pub const GAP: u8 = b'-';
/// Covered by an interval but carrying neither a structure code nor a disorder mark.
pub const PLACEHOLDER: u8 = b'P';
/// Consensus only: covered by at least one chain, disordered in none.
pub const ORDERED: u8 = b'O';
/// Unassigned secondary structure.
pub const BLANK: u8 = b' ';

/// One aligned block between a chain's local numbering and the protein numbering.
///
/// Both ranges are 1-indexed and inclusive, the way SIFTS reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinateIntervalPair {
    pub chain_begin: usize,
    pub chain_end: usize,
    pub protein_begin: usize,
    pub protein_end: usize,
}

impl CoordinateIntervalPair {
    pub fn new(chain_begin: usize, chain_end: usize, protein_begin: usize, protein_end: usize) -> Self {
        Self {
            chain_begin,
            chain_end,
            protein_begin,
            protein_end,
        }
    }

    /// Additive offset taking a chain index to a protein index.
    pub fn offset(&self) -> isize {
        self.protein_begin as isize - self.chain_begin as isize
    }

    /// Zero-based chain-local indices covered by this pair.
    pub fn chain_indices(&self) -> Range<usize> {
        (self.chain_begin - 1)..self.chain_end
    }

    /// Checks the pair against the chain track length and the protein length.
    ///
    /// Everything the remapper indexes must be in bounds once this passes.
    pub fn validate(&self, chain: &str, track_len: usize, protein_len: usize) -> Result<()> {
        let fail = |reason: String| CompositeError::InvalidInterval {
            chain: chain.to_string(),
            interval: self.to_string(),
            reason,
        };
        if self.chain_begin == 0 || self.protein_begin == 0 {
            return Err(fail("interval bounds are 1-indexed".into()));
        }
        if self.chain_end < self.chain_begin || self.protein_end < self.protein_begin {
            return Err(fail("interval end precedes its begin".into()));
        }
        if self.chain_end - self.chain_begin != self.protein_end - self.protein_begin {
            return Err(fail("chain and protein ranges differ in length".into()));
        }
        if self.chain_end > track_len {
            return Err(fail(format!(
                "chain range exceeds annotation length {}",
                track_len
            )));
        }
        if self.protein_end > protein_len {
            return Err(fail(format!(
                "protein range exceeds sequence length {}",
                protein_len
            )));
        }
        Ok(())
    }
}

impl Display for CoordinateIntervalPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {}] -> [{}, {}]",
            self.chain_begin, self.chain_end, self.protein_begin, self.protein_end
        )
    }
}

/// Raw per-chain annotation: sequence, secondary structure and disorder tracks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainAnnotation {
    pub chain_id: String,
    pub sequence: String,
    pub secstr: String,
    pub disorder: String,
}

impl ChainAnnotation {
    pub fn new(chain_id: String, sequence: String, secstr: String, disorder: String) -> Result<Self> {
        let expected = sequence.len();
        for (name, track) in [("secstr", &secstr), ("disorder", &disorder)] {
            if track.len() != expected {
                return Err(CompositeError::length_mismatch(
                    format!("{} track of {}", name, chain_id),
                    expected,
                    track.len(),
                ));
            }
        }
        if !(sequence.is_ascii() && secstr.is_ascii() && disorder.is_ascii()) {
            return Err(CompositeError::InvalidAnnotation {
                chain: chain_id,
                reason: "annotation tracks must be ASCII".into(),
            });
        }
        Ok(Self {
            chain_id,
            sequence,
            secstr,
            disorder,
        })
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

/// One chain's annotation folded onto its protein's coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainComposite {
    #[serde(rename = "PDB_CHAIN")]
    pub chain_id: String,
    #[serde(rename = "SP_PRIMARY", serialize_with = "serialize_arc_str")]
    pub protein: Arc<str>,
    #[serde(rename = "SEC_STRUCT")]
    pub structure: String,
}

impl ChainComposite {
    pub fn len(&self) -> usize {
        self.structure.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structure.is_empty()
    }
}

fn serialize_arc_str<S>(value: &Arc<str>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(value.as_ref())
}

/// Per-protein consensus over the `{X, O, -}` alphabet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProteinComposite {
    pub protein: String,
    pub structure: String,
}

/// The five mutually exclusive outcomes for a disorder region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisorderClass {
    Conflict,
    Discarded,
    Conserved,
    Contained,
    Overlap,
}

impl DisorderClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisorderClass::Conflict => "conflict",
            DisorderClass::Discarded => "discarded",
            DisorderClass::Conserved => "conserved",
            DisorderClass::Contained => "contained",
            DisorderClass::Overlap => "overlap",
        }
    }
}

impl Display for DisorderClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A maximal run of `X` in a consensus, with its half-open span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisorderRegion {
    pub class: DisorderClass,
    pub span: Range<usize>,
}

// Written as `["conserved", [0, 10]]` so downstream tables keep the old layout.
impl Serialize for DisorderRegion {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        (self.class, (self.span.start, self.span.end)).serialize(serializer)
    }
}

/// Everything the engine produces for one protein.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProteinReport {
    pub composite: ProteinComposite,
    pub regions: Vec<DisorderRegion>,
    pub chain_ids: Vec<String>,
}

impl ProteinReport {
    pub fn protein(&self) -> &str {
        &self.composite.protein
    }
}
