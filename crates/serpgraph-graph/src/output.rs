//! Run artifacts: the nested graph JSON and the duplicate-frequency CSV.

use std::fs;
use std::path::Path;

use serpgraph_core::{Error, Result};

use crate::builder::ExpansionOutcome;

pub const MAP_FILE: &str = "semantic_map.json";
pub const DUPLICATES_FILE: &str = "duplicates.csv";

/// Write both artifacts into `dir`, creating it if needed.
pub fn write_artifacts(outcome: &ExpansionOutcome, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| Error::Storage(e.to_string()))?;

    let map = serde_json::to_vec_pretty(&outcome.tree.to_json())
        .map_err(|e| Error::Storage(e.to_string()))?;
    fs::write(dir.join(MAP_FILE), map).map_err(|e| Error::Storage(e.to_string()))?;

    fs::write(dir.join(DUPLICATES_FILE), duplicates_csv(outcome))
        .map_err(|e| Error::Storage(e.to_string()))
}

/// Keyword frequencies, most frequent first. Equal counts keep keyword order.
fn duplicates_csv(outcome: &ExpansionOutcome) -> String {
    let mut rows: Vec<(&String, &u64)> = outcome.duplicates.iter().collect();
    rows.sort_by(|a, b| b.1.cmp(a.1));

    let mut csv = String::from("Keyword,Frequency\n");
    for (keyword, count) in rows {
        csv.push_str(&csv_field(keyword));
        csv.push(',');
        csv.push_str(&count.to_string());
        csv.push('\n');
    }
    csv
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
