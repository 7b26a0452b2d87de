use crate::errors::Result;
use crate::models::CoordinateIntervalPair;
use log::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

/// One row of a (pre-filtered) `pdb_chain_uniprot.tsv` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct SiftsRecord {
    pub pdb: String,
    pub chain: String,
    pub sp_primary: String,
    pub res_beg: usize,
    pub res_end: usize,
    // Author numbering, may carry insertion codes. Unused here.
    #[serde(default)]
    pub pdb_beg: Option<String>,
    #[serde(default)]
    pub pdb_end: Option<String>,
    pub sp_beg: usize,
    pub sp_end: usize,
}

impl SiftsRecord {
    pub fn chain_id(&self) -> String {
        format!("{}_{}", self.pdb.to_uppercase(), self.chain)
    }

    pub fn interval(&self) -> CoordinateIntervalPair {
        CoordinateIntervalPair::new(self.res_beg, self.res_end, self.sp_beg, self.sp_end)
    }
}

/// Every interval pair of one (chain, protein) combination, in file order.
///
/// One chain can map onto several proteins, so the chain id alone is not a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainIntervals {
    pub chain_id: String,
    pub protein: Arc<str>,
    pub intervals: Vec<CoordinateIntervalPair>,
}

pub fn read_sifts_records<R: Read>(reader: R) -> Result<Vec<SiftsRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(reader);
    let records = rdr
        .deserialize::<SiftsRecord>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(records)
}

pub fn read_sifts_file<P: AsRef<Path>>(path: P) -> Result<Vec<SiftsRecord>> {
    let file = std::fs::File::open(path.as_ref())?;
    let records = read_sifts_records(std::io::BufReader::new(file))?;
    info!(
        "Read {} interval rows from {:?}",
        records.len(),
        path.as_ref()
    );
    Ok(records)
}

/// Groups rows by (chain, protein), keeping first-seen key order and row order.
pub fn group_chain_intervals(records: &[SiftsRecord]) -> Vec<ChainIntervals> {
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    let mut proteins: HashMap<String, Arc<str>> = HashMap::new();
    let mut out: Vec<ChainIntervals> = Vec::new();

    for record in records {
        let chain_id = record.chain_id();
        let key = (chain_id.clone(), record.sp_primary.clone());
        match index.get(&key) {
            Some(&i) => out[i].intervals.push(record.interval()),
            None => {
                let protein = proteins
                    .entry(record.sp_primary.clone())
                    .or_insert_with(|| Arc::from(record.sp_primary.as_str()))
                    .clone();
                index.insert(key, out.len());
                out.push(ChainIntervals {
                    chain_id,
                    protein,
                    intervals: vec![record.interval()],
                });
            }
        }
    }
    debug!("Grouped {} rows into {} chains", records.len(), out.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIFTS: &str = "# 2015/11/28 - 14:24 | PDB: 47.15 | UniProt: 2015.11
PDB\tCHAIN\tSP_PRIMARY\tRES_BEG\tRES_END\tPDB_BEG\tPDB_END\tSP_BEG\tSP_END
11bg\tA\tQ3E840\t1\t124\t1\t124\t27\t150
11bg\tB\tQ3E840\t1\t124\t1\t124\t27\t150
1abc\tA\tP12345\t3\t197\t3\t197\t296\t490
1abc\tA\tP12345\t200\t367\t200A\t367\t765\t932
1abc\tA\tQ99999\t1\t10\t1\t10\t1\t10
";

    #[test]
    fn test_read_sifts_records() {
        let records = read_sifts_records(SIFTS.as_bytes()).unwrap();
        assert_eq!(records.len(), 5);
        assert_eq!(records[0].chain_id(), "11BG_A");
        assert_eq!(records[0].sp_primary, "Q3E840");
        assert_eq!(
            records[0].interval(),
            CoordinateIntervalPair::new(1, 124, 27, 150)
        );
        assert_eq!(records[3].pdb_beg.as_deref(), Some("200A"));
    }

    #[test]
    fn test_group_chain_intervals() {
        let records = read_sifts_records(SIFTS.as_bytes()).unwrap();
        let chains = group_chain_intervals(&records);
        assert_eq!(chains.len(), 4);

        assert_eq!(chains[2].chain_id, "1ABC_A");
        assert_eq!(chains[2].protein.as_ref(), "P12345");
        assert_eq!(
            chains[2].intervals,
            vec![
                CoordinateIntervalPair::new(3, 197, 296, 490),
                CoordinateIntervalPair::new(200, 367, 765, 932),
            ]
        );

        // Same chain, different protein: separate entry.
        assert_eq!(chains[3].chain_id, "1ABC_A");
        assert_eq!(chains[3].protein.as_ref(), "Q99999");
        assert!(Arc::ptr_eq(&chains[0].protein, &chains[1].protein));
    }

    #[test]
    fn test_bad_row_is_an_error() {
        let bad = "PDB\tCHAIN\tSP_PRIMARY\tRES_BEG\tRES_END\tPDB_BEG\tPDB_END\tSP_BEG\tSP_END
1abc\tA\tP12345\tone\t10\t1\t10\t1\t10
";
        assert!(read_sifts_records(bad.as_bytes()).is_err());
    }
}
