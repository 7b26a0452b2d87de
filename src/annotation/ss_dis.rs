use crate::errors::{CompositeError, Result};
use crate::models::ChainAnnotation;
use log::*;
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

/// Where chain annotations come from.
///
/// A `None` means the chain is unknown; callers skip it.
pub trait AnnotationSource {
    fn get_annotation(&self, chain_id: &str) -> Option<&ChainAnnotation>;
}

impl AnnotationSource for HashMap<String, ChainAnnotation> {
    fn get_annotation(&self, chain_id: &str) -> Option<&ChainAnnotation> {
        self.get(chain_id)
    }
}

#[derive(Debug, Default)]
struct TrackBuilder {
    sequence: Option<String>,
    secstr: Option<String>,
    disorder: Option<String>,
}

impl TrackBuilder {
    fn is_track_kind(kind: &str) -> bool {
        matches!(kind, "sequence" | "secstr" | "disorder")
    }

    fn slot(&mut self, kind: &str) -> Option<&mut Option<String>> {
        match kind {
            "sequence" => Some(&mut self.sequence),
            "secstr" => Some(&mut self.secstr),
            "disorder" => Some(&mut self.disorder),
            _ => None,
        }
    }

    fn build(self, chain_id: String) -> Result<ChainAnnotation> {
        let missing = |kind: &str| CompositeError::InvalidAnnotation {
            chain: chain_id.clone(),
            reason: format!("no {} track", kind),
        };
        let sequence = self.sequence.ok_or_else(|| missing("sequence"))?;
        let secstr = self.secstr.ok_or_else(|| missing("secstr"))?;
        let disorder = self.disorder.ok_or_else(|| missing("disorder"))?;
        ChainAnnotation::new(chain_id, sequence, secstr, disorder)
    }
}

/// Chain annotations parsed from the RCSB `ss_dis.txt` layout.
///
/// Records look like:
///
/// ```text
/// >101M:A:sequence
/// MVLSEGEWQLVLHVWAKVEAD
/// >101M:A:secstr
///     HHHHHHHHHHHHHHGGG
/// >101M:A:disorder
/// XX-------------------
/// ```
///
/// Body lines are concatenated with only the line ending removed; leading
/// and trailing spaces in a secstr line are unassigned residues.
#[derive(Debug, Default)]
pub struct SsDisCollection {
    annotations: HashMap<String, ChainAnnotation>,
}

/// A header whose body is still being read.
struct PendingTrack {
    chain_id: String,
    kind: String,
    line_num: usize,
    body: String,
}

impl PendingTrack {
    fn flush(self, builders: &mut HashMap<String, TrackBuilder>) {
        if !TrackBuilder::is_track_kind(&self.kind) {
            warn!(
                "Line {}: unknown track kind '{}' for {}, ignoring it",
                self.line_num, self.kind, self.chain_id
            );
            return;
        }
        let builder = builders.entry(self.chain_id.clone()).or_default();
        if let Some(slot) = builder.slot(&self.kind) {
            if slot.is_some() {
                warn!(
                    "Line {}: duplicate {} track for {}, keeping the last one",
                    self.line_num, self.kind, self.chain_id
                );
            }
            *slot = Some(self.body);
        }
    }
}

impl SsDisCollection {
    /// Parses an `ss_dis.txt` text.
    ///
    /// Only a broken layout (malformed header, body before any header) fails
    /// the whole text. A record that is incomplete or has tracks of unequal
    /// length is logged and left out, so lookups for that chain miss.
    pub fn from_ss_dis(text: &str) -> Result<Self> {
        let st = Instant::now();
        let mut builders: HashMap<String, TrackBuilder> = HashMap::new();
        let mut current: Option<PendingTrack> = None;

        for (i, raw_line) in text.split('\n').enumerate() {
            let line_num = i + 1;
            let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);
            if let Some(header) = line.strip_prefix('>') {
                if let Some(track) = current.take() {
                    track.flush(&mut builders);
                }
                let mut fields = header.split(':');
                let (pdb, chain, kind) = match (fields.next(), fields.next(), fields.next()) {
                    (Some(pdb), Some(chain), Some(kind)) if !pdb.is_empty() => {
                        (pdb, chain, kind.trim_end())
                    }
                    _ => {
                        return Err(CompositeError::parse(
                            line_num,
                            format!("malformed header '{}'", line),
                        ))
                    }
                };
                current = Some(PendingTrack {
                    chain_id: format!("{}_{}", pdb.to_uppercase(), chain),
                    kind: kind.to_string(),
                    line_num,
                    body: String::new(),
                });
            } else if let Some(track) = current.as_mut() {
                track.body.push_str(line);
            } else if !line.trim().is_empty() {
                return Err(CompositeError::parse(line_num, "track data before any header"));
            }
        }
        if let Some(track) = current.take() {
            track.flush(&mut builders);
        }

        let mut annotations = HashMap::with_capacity(builders.len());
        let mut rejected = 0;
        for (chain_id, builder) in builders {
            match builder.build(chain_id.clone()) {
                Ok(annotation) => {
                    annotations.insert(chain_id, annotation);
                }
                Err(e) => {
                    warn!("Skipping annotation of {}: {}", chain_id, e);
                    rejected += 1;
                }
            }
        }

        info!(
            "Parsed {} chain annotations ({} rejected) in {:?}",
            annotations.len(),
            rejected,
            st.elapsed()
        );
        Ok(Self { annotations })
    }

    pub fn from_ss_dis_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let text = std::fs::read_to_string(file)?;
        Self::from_ss_dis(&text)
    }

    pub fn insert(&mut self, annotation: ChainAnnotation) {
        self.annotations
            .insert(annotation.chain_id.clone(), annotation);
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }
}

impl AnnotationSource for SsDisCollection {
    fn get_annotation(&self, chain_id: &str) -> Option<&ChainAnnotation> {
        self.annotations.get(chain_id)
    }
}

impl FromIterator<ChainAnnotation> for SsDisCollection {
    fn from_iter<I: IntoIterator<Item = ChainAnnotation>>(iter: I) -> Self {
        let mut collection = Self::default();
        for annotation in iter {
            collection.insert(annotation);
        }
        collection
    }
}
