use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};
use eframe::egui::{RichText, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoints, Points};

use crate::color::ColorMap;
use crate::data::filter::ForecastView;
use crate::data::model::{Table, FORECAST_UNITS};

const PLOT_HEIGHT: f32 = 400.0;

// ---------------------------------------------------------------------------
// Forecast line chart
// ---------------------------------------------------------------------------

fn date_to_x(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

fn x_to_date(x: f64) -> Option<NaiveDate> {
    if (x - x.round()).abs() > 1e-6 {
        return None;
    }
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
}

/// One `(day, units)` polyline per SKU, sorted by date.
pub fn forecast_series(view: &ForecastView) -> BTreeMap<String, Vec<[f64; 2]>> {
    let mut series: BTreeMap<String, Vec<[f64; 2]>> = BTreeMap::new();
    let Some(units_col) = view.table().column_index(FORECAST_UNITS) else {
        return series;
    };
    for (key, row) in view.keys().iter().zip(&view.table().rows) {
        let (Some(date), Some(units)) = (key.date, row[units_col].as_f64()) else {
            continue;
        };
        series
            .entry(key.sku.clone())
            .or_default()
            .push([date_to_x(date), units]);
    }
    for points in series.values_mut() {
        points.sort_by(|a, b| a[0].total_cmp(&b[0]));
    }
    series
}

/// Render forecast units over time, one coloured line per SKU.
pub fn forecast_plot(ui: &mut Ui, view: &ForecastView, colors: &ColorMap) {
    ui.label(RichText::new("Forecast Units Over Time").strong());
    let series = forecast_series(view);

    Plot::new("forecast_plot")
        .legend(Legend::default())
        .height(PLOT_HEIGHT)
        .x_axis_label("Date")
        .y_axis_label("Forecast_Units")
        .x_axis_formatter(|mark: GridMark, _range: &RangeInclusive<f64>| {
            x_to_date(mark.value)
                .map(|d| d.format("%b %d").to_string())
                .unwrap_or_default()
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (sku, points) in &series {
                let color = colors.color_for(sku);
                plot_ui.line(
                    Line::new(PlotPoints::from(points.clone()))
                        .name(sku)
                        .color(color)
                        .width(1.5),
                );
                plot_ui.points(Points::new(points.clone()).name(sku).color(color).radius(3.0));
            }
        });
}

// ---------------------------------------------------------------------------
// Grouped bar charts
// ---------------------------------------------------------------------------

/// Bars laid out by category (x axis) and series (colour).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedBars {
    /// Sorted category labels; a bar's x position is its category index.
    pub categories: Vec<String>,
    /// Series name → `(category index, summed value)`.
    pub series: BTreeMap<String, Vec<(usize, f64)>>,
}

/// Sum `value` per (`series`, `category`) over the rows of a view.
/// Empty when any of the columns is missing.
pub fn grouped_bars(table: &Table, category: &str, series: &str, value: &str) -> GroupedBars {
    let (Some(cat_col), Some(series_col), Some(value_col)) = (
        table.column_index(category),
        table.column_index(series),
        table.column_index(value),
    ) else {
        return GroupedBars::default();
    };

    let categories: Vec<String> = table
        .rows
        .iter()
        .map(|row| row[cat_col].to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut sums: BTreeMap<String, BTreeMap<usize, f64>> = BTreeMap::new();
    for row in &table.rows {
        let label = row[cat_col].to_string();
        let Ok(idx) = categories.binary_search(&label) else {
            continue;
        };
        *sums
            .entry(row[series_col].to_string())
            .or_default()
            .entry(idx)
            .or_default() += row[value_col].as_f64().unwrap_or_default();
    }

    GroupedBars {
        categories,
        series: sums
            .into_iter()
            .map(|(name, by_cat)| (name, by_cat.into_iter().collect()))
            .collect(),
    }
}

/// Render grouped bars: one colour per series, side by side within a category.
pub fn grouped_bar_plot(ui: &mut Ui, id: &str, title: &str, bars: &GroupedBars, colors: &ColorMap) {
    ui.label(RichText::new(title).strong());

    let slot = 0.8 / bars.series.len().max(1) as f64;
    let categories = bars.categories.clone();

    Plot::new(id)
        .legend(Legend::default())
        .height(PLOT_HEIGHT)
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            if (mark.value - mark.value.round()).abs() > 1e-6 || mark.value < 0.0 {
                return String::new();
            }
            categories
                .get(mark.value.round() as usize)
                .cloned()
                .unwrap_or_default()
        })
        .allow_drag(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (i, (name, points)) in bars.series.iter().enumerate() {
                let offset = -0.4 + slot * (i as f64 + 0.5);
                let chart_bars: Vec<Bar> = points
                    .iter()
                    .map(|&(cat, value)| Bar::new(cat as f64 + offset, value).width(slot * 0.95))
                    .collect();
                plot_ui.bar_chart(
                    BarChart::new(chart_bars)
                        .name(name)
                        .color(colors.color_for(name)),
                );
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::ForecastView;
    use crate::data::model::{CellValue, FORECAST_SCHEMA};

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.into())
    }

    #[test]
    fn dates_round_trip_through_axis() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(x_to_date(date_to_x(d)), Some(d));
        assert_eq!(x_to_date(date_to_x(d) + 0.5), None);
    }

    #[test]
    fn forecast_series_groups_by_sku_in_date_order() {
        let table = Table::from_raw(
            &FORECAST_SCHEMA,
            vec!["SKU".into(), "Date".into(), "Forecast_Units".into()],
            vec![
                vec!["S1".into(), "2024-01-02".into(), "4".into()],
                vec!["S2".into(), "2024-01-01".into(), "9".into()],
                vec!["S1".into(), "2024-01-01".into(), "3".into()],
            ],
        )
        .unwrap();
        let view = ForecastView::new(table).unwrap();
        let series = forecast_series(&view);
        let d1 = date_to_x(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(series["S1"], vec![[d1, 3.0], [d1 + 1.0, 4.0]]);
        assert_eq!(series["S2"], vec![[d1, 9.0]]);
    }

    #[test]
    fn grouped_bars_sum_per_category_and_series() {
        let table = Table {
            columns: vec!["Vendor".into(), "SKU".into(), "Allocated_Qty".into()],
            rows: vec![
                vec![text("V2"), text("S1"), CellValue::Integer(10)],
                vec![text("V1"), text("S1"), CellValue::Integer(5)],
                vec![text("V1"), text("S1"), CellValue::Float(2.5)],
                vec![text("V1"), text("S2"), CellValue::Integer(1)],
            ],
        };
        let bars = grouped_bars(&table, "Vendor", "SKU", "Allocated_Qty");
        assert_eq!(bars.categories, vec!["V1", "V2"]);
        assert_eq!(bars.series["S1"], vec![(0, 7.5), (1, 10.0)]);
        assert_eq!(bars.series["S2"], vec![(0, 1.0)]);
    }

    #[test]
    fn grouped_bars_tolerate_missing_columns() {
        let table = Table {
            columns: vec!["Vendor".into()],
            rows: vec![vec![text("V1")]],
        };
        assert_eq!(grouped_bars(&table, "Vendor", "SKU", "MOQ"), GroupedBars::default());
    }
}
