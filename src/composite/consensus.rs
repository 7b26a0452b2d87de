use crate::errors::{CompositeError, Result};
use crate::models::{ChainComposite, ProteinComposite, DISORDER, GAP, ORDERED};

/// Collapses one column of chain composites into a consensus code.
///
/// Any `X` makes the column `X`, an all-`-` column stays `-`, everything
/// else is `O`.
fn eval_column(column: impl Iterator<Item = u8>) -> u8 {
    let mut all_gap = true;
    for c in column {
        if c == DISORDER {
            return DISORDER;
        }
        if c != GAP {
            all_gap = false;
        }
    }
    if all_gap {
        GAP
    } else {
        ORDERED
    }
}

/// Builds the per-position consensus over equal-length composite strings.
pub fn build_consensus<S: AsRef<str>>(structures: &[S]) -> Result<String> {
    let first = structures
        .first()
        .ok_or_else(|| CompositeError::EmptyInput("no structures to merge".into()))?;
    let expected = first.as_ref().len();
    for (i, structure) in structures.iter().enumerate() {
        let found = structure.as_ref().len();
        if found != expected {
            return Err(CompositeError::length_mismatch(
                format!("composite structure {} of consensus input", i),
                expected,
                found,
            ));
        }
    }

    let rows: Vec<&[u8]> = structures.iter().map(|s| s.as_ref().as_bytes()).collect();
    let consensus = (0..expected)
        .map(|k| char::from(eval_column(rows.iter().map(|row| row[k]))))
        .collect::<String>();
    Ok(consensus)
}

/// Merges every chain composite of one protein into its consensus.
///
/// All chains must belong to `protein` and there must be at least
/// `min_chains` of them.
pub fn build_protein_composite(
    protein: &str,
    chains: &[ChainComposite],
    min_chains: usize,
) -> Result<ProteinComposite> {
    if chains.len() < min_chains.max(1) {
        return Err(CompositeError::TooFewChains {
            protein: protein.to_string(),
            found: chains.len(),
            required: min_chains,
        });
    }
    if let Some(stray) = chains.iter().find(|c| c.protein.as_ref() != protein) {
        return Err(CompositeError::InvalidAnnotation {
            chain: stray.chain_id.clone(),
            reason: format!(
                "chain maps to {} but was grouped under {}",
                stray.protein, protein
            ),
        });
    }
    let expected = chains[0].len();
    if let Some(uneven) = chains.iter().find(|c| c.len() != expected) {
        return Err(CompositeError::length_mismatch(
            format!("chain composite {} of {}", uneven.chain_id, protein),
            expected,
            uneven.len(),
        ));
    }
    let structures: Vec<&str> = chains.iter().map(|c| c.structure.as_str()).collect();
    let structure = build_consensus(&structures)?;
    Ok(ProteinComposite {
        protein: protein.to_string(),
        structure,
    })
}
