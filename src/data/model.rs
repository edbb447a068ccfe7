use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;

use super::error::SchemaError;

// ---------------------------------------------------------------------------
// Column names shared by the three source tables
// ---------------------------------------------------------------------------

pub const SKU: &str = "SKU";
pub const DATE: &str = "Date";
pub const FORECAST_UNITS: &str = "Forecast_Units";
pub const VENDOR: &str = "Vendor";
pub const ALLOCATED_QTY: &str = "Allocated_Qty";
pub const MOQ: &str = "MOQ";
pub const SKUS: &str = "SKUs";
pub const FABRIC_TYPE: &str = "Fabric_Type";
pub const TOTAL_FABRIC_REQUIRED: &str = "Total_Fabric_Required";
pub const TOTAL_UNITS: &str = "Total_Units";

/// Pandas writes the frame index under this header when saved with `index=True`.
pub const INDEX_COLUMN: &str = "Unnamed: 0";
pub const MAX_SUPPLY: &str = "Max_Supply";

/// Separator used inside the FabricSummary `SKUs` cell.
pub const SKU_LIST_SEPARATOR: &str = ", ";

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

// ---------------------------------------------------------------------------
// CellValue – a single cell of a table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value.
/// Used as a `BTreeSet` key by the colour maps, so it must be `Ord`.
#[derive(Debug, Clone)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Date(NaiveDate),
    Null,
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Integer(_) => 1,
                Float(_) => 2,
                Date(_) => 3,
                Text(_) => 4,
            }
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => discriminant(self).cmp(&discriminant(other)),
        }
    }
}

impl fmt::Display for CellValue {
    /// Writes the cell the way it appears in an exported CSV field.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    /// Parse a raw CSV field according to the column kind.
    fn parse(raw: &str, kind: ColumnKind) -> Result<Self, String> {
        if raw.is_empty() {
            return Ok(CellValue::Null);
        }
        match kind {
            ColumnKind::Text => Ok(CellValue::Text(raw.to_string())),
            ColumnKind::Date => parse_date(raw)
                .map(CellValue::Date)
                .ok_or_else(|| raw.to_string()),
            ColumnKind::Auto => Ok(guess_type(raw)),
        }
    }

    /// Numeric view of the cell, used by charts.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

fn guess_type(s: &str) -> CellValue {
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    CellValue::Text(s.to_string())
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS.iter().find_map(|fmt| {
        NaiveDate::parse_from_str(s, fmt).ok().or_else(|| {
            chrono::NaiveDateTime::parse_from_str(s, fmt)
                .ok()
                .map(|dt| dt.date())
        })
    })
}

/// Decode the FabricSummary `SKUs` cell into its SKU tokens.
/// Empty tokens are discarded, so an empty cell yields an empty list.
pub fn split_sku_list(field: &str) -> Vec<String> {
    field
        .split(SKU_LIST_SEPARATOR)
        .filter(|tok| !tok.is_empty())
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// TableSchema – how raw fields of a given table are interpreted
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Kept verbatim (identifiers are opaque strings).
    Text,
    /// Parsed as a calendar date.
    Date,
    /// Integer, float or text, whichever parses first.
    Auto,
}

#[derive(Debug, Clone, Copy)]
pub struct TableSchema {
    pub name: &'static str,
    pub required: &'static [&'static str],
    pub text_columns: &'static [&'static str],
    pub date_columns: &'static [&'static str],
    /// Columns dropped from every view of this table.
    pub presentational: &'static [&'static str],
}

impl TableSchema {
    pub fn kind_of(&self, column: &str) -> ColumnKind {
        if self.date_columns.contains(&column) {
            ColumnKind::Date
        } else if self.text_columns.contains(&column) {
            ColumnKind::Text
        } else {
            ColumnKind::Auto
        }
    }
}

pub const FORECAST_SCHEMA: TableSchema = TableSchema {
    name: "Forecast",
    required: &[SKU, DATE, FORECAST_UNITS],
    text_columns: &[SKU],
    date_columns: &[DATE],
    presentational: &[],
};

pub const ALLOCATION_SCHEMA: TableSchema = TableSchema {
    name: "Allocation",
    required: &[SKU, VENDOR, ALLOCATED_QTY, MOQ],
    text_columns: &[SKU, VENDOR],
    date_columns: &[],
    presentational: &[INDEX_COLUMN, MAX_SUPPLY],
};

pub const FABRIC_SCHEMA: TableSchema = TableSchema {
    name: "FabricSummary",
    required: &[VENDOR, SKUS, FABRIC_TYPE, TOTAL_FABRIC_REQUIRED, TOTAL_UNITS],
    text_columns: &[VENDOR, SKUS, FABRIC_TYPE],
    date_columns: &[],
    presentational: &[INDEX_COLUMN],
};

// ---------------------------------------------------------------------------
// Table – ordered columns and rows of cells
// ---------------------------------------------------------------------------

/// A rectangular table. Column order is the source file's order and is
/// preserved by every derived table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Build a table from raw string fields, interpreting each column per `schema`.
    pub fn from_raw(
        schema: &TableSchema,
        columns: Vec<String>,
        raw_rows: Vec<Vec<String>>,
    ) -> Result<Self, SchemaError> {
        for &required in schema.required {
            if !columns.iter().any(|c| c == required) {
                return Err(SchemaError::MissingColumn {
                    table: schema.name,
                    column: required,
                });
            }
        }

        let kinds: Vec<ColumnKind> = columns.iter().map(|c| schema.kind_of(c)).collect();
        let mut rows = Vec::with_capacity(raw_rows.len());

        for (row_no, raw) in raw_rows.into_iter().enumerate() {
            if raw.len() != columns.len() {
                return Err(SchemaError::RaggedRow {
                    table: schema.name,
                    row: row_no,
                    expected: columns.len(),
                    found: raw.len(),
                });
            }
            let row = raw
                .iter()
                .zip(&kinds)
                .zip(&columns)
                .map(|((field, &kind), column)| {
                    CellValue::parse(field, kind).map_err(|value| SchemaError::InvalidDate {
                        table: schema.name,
                        column: column.clone(),
                        row: row_no,
                        value,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(row);
        }

        Ok(Table { columns, rows })
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Copy of the table restricted to the given row indices (in order).
    fn select_rows(&self, indices: &[usize]) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }

    /// Drop the named columns where present. Absent names are ignored.
    pub fn without_columns(mut self, names: &[&str]) -> Table {
        let keep: Vec<bool> = self
            .columns
            .iter()
            .map(|c| !names.contains(&c.as_str()))
            .collect();
        if keep.iter().all(|&k| k) {
            return self;
        }
        self.columns = retain_by_mask(std::mem::take(&mut self.columns), &keep);
        self.rows = std::mem::take(&mut self.rows)
            .into_iter()
            .map(|row| retain_by_mask(row, &keep))
            .collect();
        self
    }
}

fn retain_by_mask<T>(items: Vec<T>, keep: &[bool]) -> Vec<T> {
    items
        .into_iter()
        .zip(keep)
        .filter_map(|(item, &k)| k.then_some(item))
        .collect()
}

fn require(table: &Table, schema: &TableSchema, column: &'static str) -> Result<usize, SchemaError> {
    table.column_index(column).ok_or(SchemaError::MissingColumn {
        table: schema.name,
        column,
    })
}

fn text_at(row: &[CellValue], idx: usize) -> String {
    row[idx].as_text().map(str::to_string).unwrap_or_else(|| row[idx].to_string())
}

// ---------------------------------------------------------------------------
// Row keys – the decoded filter-relevant part of each row
// ---------------------------------------------------------------------------

/// The filter-relevant fields of one row, decoded once when a table is built.
pub trait RowKey: Clone + fmt::Debug + PartialEq {
    const SCHEMA: TableSchema;

    fn extract_all(table: &Table) -> Result<Vec<Self>, SchemaError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastKey {
    pub sku: String,
    /// `None` when the cell was empty; such rows never fall in a date range.
    pub date: Option<NaiveDate>,
}

impl RowKey for ForecastKey {
    const SCHEMA: TableSchema = FORECAST_SCHEMA;

    fn extract_all(table: &Table) -> Result<Vec<Self>, SchemaError> {
        let sku = require(table, &Self::SCHEMA, SKU)?;
        let date = require(table, &Self::SCHEMA, DATE)?;
        Ok(table
            .rows
            .iter()
            .map(|row| ForecastKey {
                sku: text_at(row, sku),
                date: match row[date] {
                    CellValue::Date(d) => Some(d),
                    _ => None,
                },
            })
            .collect())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AllocationKey {
    pub sku: String,
    pub vendor: String,
}

impl RowKey for AllocationKey {
    const SCHEMA: TableSchema = ALLOCATION_SCHEMA;

    fn extract_all(table: &Table) -> Result<Vec<Self>, SchemaError> {
        let sku = require(table, &Self::SCHEMA, SKU)?;
        let vendor = require(table, &Self::SCHEMA, VENDOR)?;
        Ok(table
            .rows
            .iter()
            .map(|row| AllocationKey {
                sku: text_at(row, sku),
                vendor: text_at(row, vendor),
            })
            .collect())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FabricKey {
    pub vendor: String,
    /// Decoded `SKUs` cell.
    pub skus: Vec<String>,
}

impl RowKey for FabricKey {
    const SCHEMA: TableSchema = FABRIC_SCHEMA;

    fn extract_all(table: &Table) -> Result<Vec<Self>, SchemaError> {
        let vendor = require(table, &Self::SCHEMA, VENDOR)?;
        let skus = require(table, &Self::SCHEMA, SKUS)?;
        Ok(table
            .rows
            .iter()
            .map(|row| FabricKey {
                vendor: text_at(row, vendor),
                skus: split_sku_list(row[skus].as_text().unwrap_or_default()),
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// KeyedTable – a table with its decoded row keys
// ---------------------------------------------------------------------------

/// A source dataset or a view of one: the table plus one key per row.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedTable<K> {
    table: Table,
    keys: Vec<K>,
}

pub type ForecastTable = KeyedTable<ForecastKey>;
pub type AllocationTable = KeyedTable<AllocationKey>;
pub type FabricTable = KeyedTable<FabricKey>;

impl<K: RowKey> KeyedTable<K> {
    pub fn new(table: Table) -> Result<Self, SchemaError> {
        let keys = K::extract_all(&table)?;
        Ok(KeyedTable { table, keys })
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Derive a copy holding only the rows whose key satisfies `keep`.
    pub fn retain(&self, keep: impl Fn(&K) -> bool) -> Self {
        let indices: Vec<usize> = self
            .keys
            .iter()
            .enumerate()
            .filter(|(_, k)| keep(k))
            .map(|(i, _)| i)
            .collect();
        KeyedTable {
            table: self.table.select_rows(&indices),
            keys: indices.iter().map(|&i| self.keys[i].clone()).collect(),
        }
    }

    /// Drop the schema's presentational columns. Keys are unaffected.
    pub fn without_presentational(self) -> Self {
        KeyedTable {
            table: self.table.without_columns(K::SCHEMA.presentational),
            keys: self.keys,
        }
    }
}

impl ForecastTable {
    /// Sorted unique SKUs, the option universe of the SKU control.
    pub fn sku_options(&self) -> BTreeSet<String> {
        self.keys.iter().map(|k| k.sku.clone()).collect()
    }

    /// Earliest and latest forecast date.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.keys.iter().filter_map(|k| k.date);
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }
}

impl AllocationTable {
    /// Sorted unique vendors, the option universe of the Vendor control.
    pub fn vendor_options(&self) -> BTreeSet<String> {
        self.keys.iter().map(|k| k.vendor.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn split_sku_list_uses_comma_space() {
        assert_eq!(split_sku_list("A, B, C"), vec!["A", "B", "C"]);
        assert_eq!(split_sku_list("A,B"), vec!["A,B"]);
        assert!(split_sku_list("").is_empty());
    }

    #[test]
    fn identifier_columns_stay_text() {
        let table = Table::from_raw(
            &ALLOCATION_SCHEMA,
            cols(&[SKU, VENDOR, ALLOCATED_QTY, MOQ]),
            raw(&[&["1001", "042", "120", "50.5"]]),
        )
        .unwrap();
        assert_eq!(table.rows[0][0], CellValue::Text("1001".into()));
        assert_eq!(table.rows[0][1], CellValue::Text("042".into()));
        assert_eq!(table.rows[0][2], CellValue::Integer(120));
        assert_eq!(table.rows[0][3], CellValue::Float(50.5));
    }

    #[test]
    fn forecast_dates_are_parsed() {
        let table = Table::from_raw(
            &FORECAST_SCHEMA,
            cols(&[SKU, DATE, FORECAST_UNITS]),
            raw(&[&["S1", "2024-01-01", "10"], &["S1", "2024-01-02 00:00:00", "7"]]),
        )
        .unwrap();
        let forecast = ForecastTable::new(table).unwrap();
        let d1 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(forecast.keys()[1].date, Some(d2));
        assert_eq!(forecast.date_bounds(), Some((d1, d2)));
    }

    #[test]
    fn bad_date_is_reported_with_position() {
        let err = Table::from_raw(
            &FORECAST_SCHEMA,
            cols(&[SKU, DATE, FORECAST_UNITS]),
            raw(&[&["S1", "tomorrow", "10"]]),
        )
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::InvalidDate {
                table: "Forecast",
                column: DATE.into(),
                row: 0,
                value: "tomorrow".into(),
            }
        );
    }

    #[test]
    fn missing_required_column_is_rejected() {
        let err = Table::from_raw(&FABRIC_SCHEMA, cols(&[VENDOR, SKUS]), Vec::new()).unwrap_err();
        assert!(matches!(err, SchemaError::MissingColumn { column: FABRIC_TYPE, .. }));
    }

    #[test]
    fn fabric_keys_decode_sku_lists() {
        let table = Table::from_raw(
            &FABRIC_SCHEMA,
            cols(&[VENDOR, SKUS, FABRIC_TYPE, TOTAL_FABRIC_REQUIRED, TOTAL_UNITS]),
            raw(&[&["V1", "S1, S2", "Cotton", "100", "40"], &["V2", "", "Linen", "3.5", "2"]]),
        )
        .unwrap();
        let fabric = FabricTable::new(table).unwrap();
        assert_eq!(fabric.keys()[0].skus, vec!["S1", "S2"]);
        assert!(fabric.keys()[1].skus.is_empty());
    }

    #[test]
    fn without_columns_ignores_absent_names() {
        let table = Table {
            columns: cols(&["a", "b"]),
            rows: vec![vec![CellValue::Integer(1), CellValue::Integer(2)]],
        };
        let dropped = table.clone().without_columns(&["b", "zzz"]);
        assert_eq!(dropped.columns, cols(&["a"]));
        assert_eq!(dropped.rows, vec![vec![CellValue::Integer(1)]]);
        assert_eq!(table.clone().without_columns(&["zzz"]), table);
    }
}
