use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised by the filter engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// The date range has its start after its end.
    #[error("Start date must be before or equal to end date ({start} > {end}).")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

/// Errors raised while turning a raw CSV table into a typed dataset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("{table} table is missing required column '{column}'")]
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },

    #[error("{table} table, row {row}: '{value}' in column '{column}' is not a date")]
    InvalidDate {
        table: &'static str,
        column: String,
        row: usize,
        value: String,
    },

    #[error("{table} table, row {row}: expected {expected} fields, found {found}")]
    RaggedRow {
        table: &'static str,
        row: usize,
        expected: usize,
        found: usize,
    },
}
