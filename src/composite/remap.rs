use crate::errors::{CompositeError, Result};
use crate::models::{
    ChainAnnotation, ChainComposite, CoordinateIntervalPair, BLANK, GAP, PLACEHOLDER,
};
use std::sync::Arc;

/// Folds one chain's local tracks onto a protein-length string.
///
/// The output starts as all `-`. For every interval pair, each chain index
/// `i` is moved by the pair's offset to protein index `j` and then:
///
/// 1. a non-blank structure code at `i` is written to `j`,
/// 2. a disorder mark at `i` overwrites it,
/// 3. if `j` is still `-`, it becomes the placeholder `P`.
///
/// Intervals are applied in the order given. Where two of them hit the same
/// protein position the later one wins for whatever it contributes.
///
/// Example:
/// ```
/// use pdbdisorder::composite::remap::remap;
/// use pdbdisorder::models::CoordinateIntervalPair;
/// let intervals = [CoordinateIntervalPair::new(1, 4, 3, 6)];
/// let out = remap("1ABC_A", &intervals, "XX--", "  HH", 8).unwrap();
/// assert_eq!(out, "--XXHH--");
/// ```
pub fn remap(
    chain_id: &str,
    intervals: &[CoordinateIntervalPair],
    disorder_track: &str,
    structure_track: &str,
    protein_length: usize,
) -> Result<String> {
    if intervals.is_empty() {
        return Err(CompositeError::EmptyInput(format!(
            "no intervals for chain {}",
            chain_id
        )));
    }
    if disorder_track.len() != structure_track.len() {
        return Err(CompositeError::length_mismatch(
            format!("disorder vs secstr track of {}", chain_id),
            structure_track.len(),
            disorder_track.len(),
        ));
    }
    if !disorder_track.is_ascii() || !structure_track.is_ascii() {
        return Err(CompositeError::InvalidAnnotation {
            chain: chain_id.to_string(),
            reason: "annotation tracks must be ASCII".into(),
        });
    }
    for interval in intervals {
        interval.validate(chain_id, disorder_track.len(), protein_length)?;
    }

    let disorder = disorder_track.as_bytes();
    let ss = structure_track.as_bytes();
    let mut structure = vec![GAP; protein_length];

    for interval in intervals {
        let offset = interval.offset();
        for i in interval.chain_indices() {
            // validate() keeps i + offset inside [0, protein_length)
            let j = (i as isize + offset) as usize;
            if ss[i] != BLANK {
                structure[j] = ss[i];
            }
            if disorder[i] != GAP {
                structure[j] = disorder[i];
            }
            if structure[j] == GAP {
                structure[j] = PLACEHOLDER;
            }
        }
    }

    if let Some(pos) = structure.iter().position(|&c| c == BLANK) {
        return Err(CompositeError::InvalidAnnotation {
            chain: chain_id.to_string(),
            reason: format!("blank code left at protein position {}", pos),
        });
    }
    debug_assert_eq!(structure.len(), protein_length);
    Ok(structure.into_iter().map(char::from).collect())
}

/// Remaps a full annotation record and tags the result with its ids.
pub fn build_chain_composite(
    annotation: &ChainAnnotation,
    protein: Arc<str>,
    intervals: &[CoordinateIntervalPair],
    protein_length: usize,
) -> Result<ChainComposite> {
    let structure = remap(
        &annotation.chain_id,
        intervals,
        &annotation.disorder,
        &annotation.secstr,
        protein_length,
    )?;
    Ok(ChainComposite {
        chain_id: annotation.chain_id.clone(),
        protein,
        structure,
    })
}
