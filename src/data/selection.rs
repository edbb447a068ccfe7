use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::error::FilterError;
use super::model::{AllocationTable, ForecastTable};

// ---------------------------------------------------------------------------
// MultiChoice – one multi-select control
// ---------------------------------------------------------------------------

/// The option universe of a multi-select control and the chosen subset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MultiChoice {
    options: BTreeSet<String>,
    selected: BTreeSet<String>,
}

impl MultiChoice {
    /// Every option selected.
    pub fn all(options: BTreeSet<String>) -> Self {
        MultiChoice {
            selected: options.clone(),
            options,
        }
    }

    pub fn with_selected(options: BTreeSet<String>, selected: BTreeSet<String>) -> Self {
        MultiChoice { options, selected }
    }

    pub fn options(&self) -> &BTreeSet<String> {
        &self.options
    }

    pub fn selected(&self) -> &BTreeSet<String> {
        &self.selected
    }

    pub fn contains(&self, value: &str) -> bool {
        self.selected.contains(value)
    }

    /// True when the selection is non-empty and includes every option, i.e.
    /// the control does not narrow anything.
    pub fn covers_all(&self) -> bool {
        !self.selected.is_empty() && self.options.is_subset(&self.selected)
    }

    pub fn toggle(&mut self, value: &str) {
        if !self.selected.remove(value) {
            self.selected.insert(value.to_string());
        }
    }

    pub fn select_all(&mut self) {
        self.selected = self.options.clone();
    }

    pub fn select_none(&mut self) {
        self.selected.clear();
    }
}

// ---------------------------------------------------------------------------
// DateRange
// ---------------------------------------------------------------------------

/// Inclusive date range as picked in the UI. Not validated on construction:
/// the pickers can momentarily hold `start > end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    pub fn validate(&self) -> Result<(), FilterError> {
        if self.start > self.end {
            return Err(FilterError::InvalidRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub skus: MultiChoice,
    pub vendors: MultiChoice,
    pub range: DateRange,
}

impl Selection {
    /// Everything selected and the full forecast date span.
    pub fn select_everything(forecast: &ForecastTable, allocation: &AllocationTable) -> Self {
        let (start, end) = forecast
            .date_bounds()
            .unwrap_or_else(|| {
                let today = chrono::Local::now().date_naive();
                (today, today)
            });
        Selection {
            skus: MultiChoice::all(forecast.sku_options()),
            vendors: MultiChoice::all(allocation.vendor_options()),
            range: DateRange::new(start, end),
        }
    }

    /// Carry the user's choices over to freshly loaded data. Selected values
    /// that no longer exist are dropped; the range is clamped only when it no
    /// longer overlaps the data at all.
    pub fn rebase(&self, forecast: &ForecastTable, allocation: &AllocationTable) -> Self {
        let fresh = Selection::select_everything(forecast, allocation);
        let keep = |old: &MultiChoice, new: MultiChoice| {
            if old.covers_all() {
                return new;
            }
            let selected = old
                .selected
                .intersection(new.options())
                .cloned()
                .collect();
            MultiChoice::with_selected(new.options, selected)
        };
        let overlaps = self.range.start <= fresh.range.end && fresh.range.start <= self.range.end;
        Selection {
            skus: keep(&self.skus, fresh.skus),
            vendors: keep(&self.vendors, fresh.vendors),
            range: if overlaps { self.range } else { fresh.range },
        }
    }
}
