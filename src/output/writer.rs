use crate::errors::Result;
use crate::models::{ChainComposite, DisorderRegion, ProteinReport};
use csv::WriterBuilder;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

pub const CHAIN_COMPOSITE_FILE: &str = "chain_composite.tsv";
pub const PROTEIN_COMPOSITE_TSV: &str = "uni_composite.tsv";
pub const PROTEIN_COMPOSITE_JSON: &str = "uni_composite.json";

#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    #[serde(rename = "SP_PRIMARY")]
    protein: &'a str,
    #[serde(rename = "STRUCT")]
    structure: &'a str,
    /// JSON list of `[class, [start, end]]` pairs.
    #[serde(rename = "MISSING")]
    missing: String,
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    protein: &'a str,
    structure: &'a str,
    chains: &'a [String],
    regions: &'a [DisorderRegion],
}

pub fn write_chain_composites<W: Write>(chains: &[ChainComposite], out: W) -> Result<()> {
    let mut writer = WriterBuilder::new().delimiter(b'\t').from_writer(out);
    for chain in chains {
        writer.serialize(chain)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_reports_tsv<W: Write>(reports: &[ProteinReport], out: W) -> Result<()> {
    let mut writer = WriterBuilder::new().delimiter(b'\t').from_writer(out);
    for report in reports {
        writer.serialize(ReportRow {
            protein: report.protein(),
            structure: &report.composite.structure,
            missing: serde_json::to_string(&report.regions)?,
        })?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_reports_json<W: Write>(reports: &[ProteinReport], out: W) -> Result<()> {
    let rows: Vec<JsonReport> = reports
        .iter()
        .map(|r| JsonReport {
            protein: r.protein(),
            structure: &r.composite.structure,
            chains: &r.chain_ids,
            regions: &r.regions,
        })
        .collect();
    serde_json::to_writer_pretty(out, &rows)?;
    Ok(())
}

/// Writes the three result files into `out_dir`, creating it if needed.
pub fn write_all<P: AsRef<Path>>(
    out_dir: P,
    chains: &[ChainComposite],
    reports: &[ProteinReport],
) -> Result<()> {
    let start = Instant::now();
    let out_dir = out_dir.as_ref();
    std::fs::create_dir_all(out_dir)?;

    let create = |name: &str| -> Result<std::io::BufWriter<std::fs::File>> {
        Ok(std::io::BufWriter::new(std::fs::File::create(
            out_dir.join(name),
        )?))
    };
    write_chain_composites(chains, create(CHAIN_COMPOSITE_FILE)?)?;
    write_reports_tsv(reports, create(PROTEIN_COMPOSITE_TSV)?)?;
    let mut json_out = create(PROTEIN_COMPOSITE_JSON)?;
    write_reports_json(reports, &mut json_out)?;
    json_out.flush()?;

    log::info!("Writing took {:?} -> {:?}", start.elapsed(), out_dir);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DisorderClass, ProteinComposite};
    use std::sync::Arc;

    fn report() -> ProteinReport {
        ProteinReport {
            composite: ProteinComposite {
                protein: "P11111".into(),
                structure: "XXOO--".into(),
            },
            regions: vec![DisorderRegion {
                class: DisorderClass::Conserved,
                span: 0..2,
            }],
            chain_ids: vec!["1AAA_A".into(), "2BBB_A".into()],
        }
    }

    #[test]
    fn test_write_chain_composites() {
        let chains = vec![ChainComposite {
            chain_id: "1AAA_A".into(),
            protein: Arc::from("P11111"),
            structure: "XXHP--".into(),
        }];
        let mut out = Vec::new();
        write_chain_composites(&chains, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "PDB_CHAIN\tSP_PRIMARY\tSEC_STRUCT\n1AAA_A\tP11111\tXXHP--\n"
        );
    }

    #[test]
    fn test_write_reports_tsv() {
        let mut out = Vec::new();
        write_reports_tsv(&[report()], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("SP_PRIMARY\tSTRUCT\tMISSING"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("P11111\tXXOO--\t"));
        assert!(row.contains("conserved"));
    }

    #[test]
    fn test_write_all() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("results");
        write_all(&out_dir, &[], &[report()]).unwrap();

        for name in [CHAIN_COMPOSITE_FILE, PROTEIN_COMPOSITE_TSV, PROTEIN_COMPOSITE_JSON] {
            assert!(out_dir.join(name).exists(), "{} missing", name);
        }
        let json = std::fs::read_to_string(out_dir.join(PROTEIN_COMPOSITE_JSON)).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["protein"], "P11111");
        assert_eq!(parsed[0]["regions"][0][0], "conserved");
        assert_eq!(parsed[0]["regions"][0][1][1], 2);
    }
}
