use std::path::Path;

use anyhow::{Context, Result};

use super::model::{KeyedTable, RowKey, Table};

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Load one of the source tables from a CSV file with a header row.
///
/// Column interpretation follows the key type's schema: identifier columns
/// are kept as text, date columns are parsed, everything else is guessed as
/// integer, float or text. Empty fields become nulls.
pub fn load_table<K: RowKey>(path: &Path) -> Result<KeyedTable<K>> {
    let schema = K::SCHEMA;
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening {} CSV {}", schema.name, path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("{} CSV row {row_no}", schema.name))?;
        rows.push(record.iter().map(|f| f.to_string()).collect());
    }

    let table = Table::from_raw(&schema, headers, rows)
        .with_context(|| format!("parsing {}", path.display()))?;
    let keyed = KeyedTable::<K>::new(table)?;

    log::info!(
        "Loaded {} table: {} rows, columns {:?} from {}",
        schema.name,
        keyed.len(),
        keyed.table().columns,
        path.display()
    );
    Ok(keyed)
}
