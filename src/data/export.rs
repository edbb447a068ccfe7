use std::path::Path;

use anyhow::{Context, Result};

use super::model::Table;

/// Serialize a table as CSV: a header row in column order, then one line per row.
pub fn to_csv_bytes(table: &Table) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(&table.columns)
        .context("writing CSV header")?;
    for row in &table.rows {
        writer
            .write_record(row.iter().map(|cell| cell.to_string()))
            .context("writing CSV row")?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing CSV buffer: {e}"))
}

pub fn write_csv(table: &Table, path: &Path) -> Result<()> {
    let bytes = to_csv_bytes(table)?;
    std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
    log::info!("Exported {} rows to {}", table.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::data::model::CellValue;

    fn sample() -> Table {
        Table {
            columns: vec!["Date".into(), "SKU".into(), "Forecast_Units".into()],
            rows: vec![
                vec![
                    CellValue::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
                    CellValue::Text("S1, S2".into()),
                    CellValue::Float(10.5),
                ],
                vec![
                    CellValue::Date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()),
                    CellValue::Text("S3".into()),
                    CellValue::Null,
                ],
            ],
        }
    }

    #[test]
    fn header_follows_column_order() {
        let text = String::from_utf8(to_csv_bytes(&sample()).unwrap()).unwrap();
        assert_eq!(
            text,
            "Date,SKU,Forecast_Units\n2024-01-01,\"S1, S2\",10.5\n2024-01-02,S3,\n"
        );
    }

    #[test]
    fn empty_view_exports_header_only() {
        let table = Table {
            columns: vec!["Vendor".into(), "MOQ".into()],
            rows: Vec::new(),
        };
        assert_eq!(to_csv_bytes(&table).unwrap(), b"Vendor,MOQ\n");
    }

    #[test]
    fn writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filtered_forecast.csv");
        write_csv(&sample(), &path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().starts_with("Date,SKU"));
    }
}
