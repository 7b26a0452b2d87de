use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct ProteinSequence {
    pub accession: Arc<str>,
    pub description: String,
    pub sequence: Arc<str>,
}

impl ProteinSequence {
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

/// Pulls the accession out of a fasta description.
///
/// UniProt headers (`sp|P69905|HBA_HUMAN ...`, `tr|...`) give the second
/// field, anything else gives the first whitespace-delimited token.
pub fn parse_accession(description: &str) -> &str {
    let first = description.split_whitespace().next().unwrap_or("");
    let mut fields = first.split('|');
    match (fields.next(), fields.next()) {
        (Some("sp" | "tr"), Some(accession)) if !accession.is_empty() => accession,
        _ => first,
    }
}

#[derive(Debug, Default)]
pub struct ProteinSequenceBuilder {
    pub description: Option<String>,
    pub sequence: String,
}

impl ProteinSequenceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_description(&self) -> bool {
        self.description.is_some()
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn append_sequence(mut self, sequence: &str) -> Self {
        self.sequence.push_str(sequence);
        self
    }

    /// `None` if no header was ever attached.
    pub fn build(self) -> Option<ProteinSequence> {
        let description = self.description?;
        let accession: Arc<str> = parse_accession(&description).into();
        Some(ProteinSequence {
            accession,
            description,
            sequence: self.sequence.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accession() {
        assert_eq!(parse_accession("sp|P69905|HBA_HUMAN Hemoglobin"), "P69905");
        assert_eq!(parse_accession("tr|A0A024R161|A0A024R161_HUMAN"), "A0A024R161");
        assert_eq!(parse_accession("Q3E840 some protein"), "Q3E840");
        assert_eq!(parse_accession("gi|1234|ref"), "gi|1234|ref");
        assert_eq!(parse_accession(""), "");
    }

    #[test]
    fn test_builder_requires_description() {
        let built = ProteinSequenceBuilder::new().append_sequence("MKV").build();
        assert!(built.is_none());

        let built = ProteinSequenceBuilder::new()
            .with_description("sp|P12345|TEST")
            .append_sequence("MKV")
            .append_sequence("LL")
            .build()
            .unwrap();
        assert_eq!(built.accession.as_ref(), "P12345");
        assert_eq!(built.len(), 5);
        assert_eq!(built.description, "sp|P12345|TEST");
    }
}
