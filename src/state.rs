use std::path::PathBuf;

use crate::color::ColorMap;
use crate::config::DashboardConfig;
use crate::data::cache::DatasetCache;
use crate::data::filter::{apply, FilteredViews};
use crate::data::selection::{DateRange, MultiChoice, Selection};
use crate::data::Datasets;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Forecast,
    Allocations,
    FabricUsage,
    Recommendations,
}

/// The two multi-select controls of the side panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Skus,
    Vendors,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Parsed tables keyed by path; survives reloads.
    cache: DatasetCache,

    /// Loaded datasets (None until a load succeeds).
    pub datasets: Option<Datasets>,

    /// Current SKU / vendor / date choices.
    pub selection: Option<Selection>,

    /// Views for the current selection (cached until the selection changes).
    pub views: Option<FilteredViews>,

    pub sku_colors: ColorMap,
    pub vendor_colors: ColorMap,

    pub active_tab: Tab,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let mut state = Self {
            config,
            cache: DatasetCache::default(),
            datasets: None,
            selection: None,
            views: None,
            sku_colors: ColorMap::default(),
            vendor_colors: ColorMap::default(),
            active_tab: Tab::default(),
            status_message: None,
        };
        state.reload();
        state
    }

    /// (Re)load the datasets named by the config. Unchanged files come from the cache.
    pub fn reload(&mut self) {
        match self.cache.load(&self.config) {
            Ok(datasets) => self.set_datasets(datasets),
            Err(e) => {
                log::error!("Failed to load data: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    pub fn set_data_dir(&mut self, dir: PathBuf) {
        self.config.data_dir = dir;
        self.reload();
    }

    /// Ingest freshly loaded datasets, keeping the user's choices where they still apply.
    fn set_datasets(&mut self, datasets: Datasets) {
        let selection = match &self.selection {
            Some(old) => old.rebase(&datasets.forecast, &datasets.allocation),
            None => Selection::select_everything(&datasets.forecast, &datasets.allocation),
        };
        self.sku_colors = ColorMap::new(selection.skus.options());
        self.vendor_colors = ColorMap::new(selection.vendors.options());
        self.selection = Some(selection);
        self.datasets = Some(datasets);
        self.status_message = None;
        self.refilter();
    }

    /// Recompute the views after a selection change.
    pub fn refilter(&mut self) {
        if let (Some(datasets), Some(selection)) = (&self.datasets, &self.selection) {
            let views = apply(datasets, selection);
            if let Err(e) = &views.forecast {
                log::warn!("{e}");
            }
            self.views = Some(views);
        }
    }

    fn choice_mut(&mut self, control: Control) -> Option<&mut MultiChoice> {
        let selection = self.selection.as_mut()?;
        Some(match control {
            Control::Skus => &mut selection.skus,
            Control::Vendors => &mut selection.vendors,
        })
    }

    /// Toggle a single value of a multi-select control.
    pub fn toggle(&mut self, control: Control, value: &str) {
        if let Some(choice) = self.choice_mut(control) {
            choice.toggle(value);
            self.refilter();
        }
    }

    pub fn select_all(&mut self, control: Control) {
        if let Some(choice) = self.choice_mut(control) {
            choice.select_all();
            self.refilter();
        }
    }

    pub fn select_none(&mut self, control: Control) {
        if let Some(choice) = self.choice_mut(control) {
            choice.select_none();
            self.refilter();
        }
    }

    pub fn set_range(&mut self, range: DateRange) {
        if let Some(selection) = self.selection.as_mut() {
            if selection.range != range {
                selection.range = range;
                self.refilter();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn data_dir() -> (tempfile::TempDir, DashboardConfig) {
        let dir = tempfile::tempdir().unwrap();
        let config = DashboardConfig {
            data_dir: dir.path().to_path_buf(),
            ..DashboardConfig::default()
        };
        std::fs::write(
            config.forecast_path(),
            "SKU,Date,Forecast_Units\nS1,2024-01-01,10\nS2,2024-01-02,5\nS1,2024-01-03,7\n",
        )
        .unwrap();
        std::fs::write(
            config.allocation_path(),
            "Unnamed: 0,SKU,Vendor,Allocated_Qty,MOQ,Max_Supply\n0,S1,V1,10,5,99\n1,S2,V2,4,2,99\n",
        )
        .unwrap();
        std::fs::write(
            config.fabric_path(),
            "Unnamed: 0,Vendor,SKUs,Fabric_Type,Total_Fabric_Required,Total_Units\n\
             0,V1,\"S1, S2\",Cotton,2.5,10\n1,V2,S2,Linen,1.25,4\n",
        )
        .unwrap();
        (dir, config)
    }

    fn counts(state: &AppState) -> (Option<usize>, usize, usize) {
        let views = state.views.as_ref().unwrap();
        (
            views.forecast.as_ref().ok().map(|v| v.len()),
            views.allocation.len(),
            views.fabric.len(),
        )
    }

    #[test]
    fn starts_with_everything_selected() {
        let (_dir, config) = data_dir();
        let state = AppState::new(config);
        let selection = state.selection.as_ref().unwrap();
        assert!(selection.skus.covers_all());
        assert_eq!(selection.range, DateRange::new(date(2024, 1, 1), date(2024, 1, 3)));
        assert_eq!(counts(&state), (Some(3), 2, 2));
        assert!(state.status_message.is_none());
    }

    #[test]
    fn toggling_a_sku_refilters() {
        let (_dir, config) = data_dir();
        let mut state = AppState::new(config);
        state.toggle(Control::Skus, "S2");
        assert_eq!(counts(&state), (Some(2), 1, 1));
        state.select_none(Control::Vendors);
        assert_eq!(counts(&state), (Some(2), 0, 0));
        state.select_all(Control::Vendors);
        assert_eq!(counts(&state), (Some(2), 1, 1));
    }

    #[test]
    fn inverted_range_only_blanks_the_forecast() {
        let (_dir, config) = data_dir();
        let mut state = AppState::new(config);
        state.set_range(DateRange::new(date(2024, 1, 3), date(2024, 1, 1)));
        assert_eq!(counts(&state), (None, 2, 2));
    }

    #[test]
    fn reload_keeps_narrowed_selection() {
        let (_dir, config) = data_dir();
        let mut state = AppState::new(config);
        state.toggle(Control::Vendors, "V2");
        state.reload();
        let vendors = state.selection.as_ref().unwrap().vendors.selected().clone();
        assert_eq!(vendors.into_iter().collect::<Vec<_>>(), vec!["V1"]);
    }

    #[test]
    fn missing_data_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(DashboardConfig {
            data_dir: dir.path().to_path_buf(),
            ..DashboardConfig::default()
        });
        assert!(state.datasets.is_none());
        assert!(state.views.is_none());
        assert!(state.status_message.as_deref().unwrap().starts_with("Error:"));
    }
}
