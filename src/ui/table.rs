use eframe::egui::{self, Ui};

use crate::data::model::{CellValue, Table, ALLOCATED_QTY, MOQ, TOTAL_FABRIC_REQUIRED, TOTAL_UNITS};

// ---------------------------------------------------------------------------
// Data tables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberFormat {
    Plain,
    /// Thousands separators: `12,500`.
    Grouped,
    /// Thousands separators and two decimals: `1,234.50`.
    GroupedFixed2,
}

pub fn column_format(column: &str) -> NumberFormat {
    match column {
        ALLOCATED_QTY | MOQ | TOTAL_UNITS => NumberFormat::Grouped,
        TOTAL_FABRIC_REQUIRED => NumberFormat::GroupedFixed2,
        _ => NumberFormat::Plain,
    }
}

/// Render a view as a striped grid with a header row.
pub fn data_table(ui: &mut Ui, id: &str, table: &Table) {
    let formats: Vec<NumberFormat> = table.columns.iter().map(|c| column_format(c)).collect();

    egui::ScrollArea::horizontal()
        .id_salt(id)
        .max_height(360.0)
        .show(ui, |ui: &mut Ui| {
            egui::Grid::new((id, "grid")).striped(true).show(ui, |ui: &mut Ui| {
                for column in &table.columns {
                    ui.strong(column);
                }
                ui.end_row();

                for row in &table.rows {
                    for (cell, &format) in row.iter().zip(&formats) {
                        ui.label(format_cell(cell, format));
                    }
                    ui.end_row();
                }
            });
        });
    if table.is_empty() {
        ui.label("No rows match the current filters.");
    } else {
        ui.label(format!("{} rows", table.len()));
    }
}

pub fn format_cell(cell: &CellValue, format: NumberFormat) -> String {
    match (cell, format) {
        (CellValue::Integer(i), NumberFormat::Grouped) => group_thousands(&i.to_string()),
        (CellValue::Float(v), NumberFormat::Grouped) => group_thousands(&v.to_string()),
        (CellValue::Integer(_) | CellValue::Float(_), NumberFormat::GroupedFixed2) => {
            let v = cell.as_f64().unwrap_or_default();
            group_thousands(&format!("{v:.2}"))
        }
        _ => cell.to_string(),
    }
}

/// Insert `,` every three digits of the integer part of a formatted number.
fn group_thousands(number: &str) -> String {
    let (sign, unsigned) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };
    let (int_part, frac_part) = match unsigned.find('.') {
        Some(dot) => unsigned.split_at(dot),
        None => (unsigned, ""),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped}{frac_part}")
}
