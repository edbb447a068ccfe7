use super::error::FilterError;
use super::model::{AllocationTable, FabricTable, ForecastTable};
use super::selection::Selection;
use super::Datasets;

// ---------------------------------------------------------------------------
// Views: filtered copies of the source tables
// ---------------------------------------------------------------------------

pub type ForecastView = ForecastTable;
pub type AllocationView = AllocationTable;
pub type FabricView = FabricTable;

/// The three views for one selection.
#[derive(Debug, Clone)]
pub struct FilteredViews {
    /// `Err` when the selected date range is inverted; no forecast is shown then.
    pub forecast: Result<ForecastView, FilterError>,
    pub allocation: AllocationView,
    pub fabric: FabricView,
}

/// Run all three filters against the loaded datasets.
pub fn apply(datasets: &Datasets, selection: &Selection) -> FilteredViews {
    let views = FilteredViews {
        forecast: filter_forecast(&datasets.forecast, selection),
        allocation: filter_allocation(&datasets.allocation, selection),
        fabric: filter_fabric(&datasets.fabric, selection),
    };
    log::debug!(
        "refiltered: forecast={:?} allocation={} fabric={}",
        views.forecast.as_ref().map(|v| v.len()).ok(),
        views.allocation.len(),
        views.fabric.len()
    );
    views
}

/// Forecast rows whose SKU is selected and whose date lies in the range
/// (both ends inclusive).
pub fn filter_forecast(
    forecasts: &ForecastTable,
    selection: &Selection,
) -> Result<ForecastView, FilterError> {
    selection.range.validate()?;

    let range = selection.range;
    Ok(forecasts.retain(|key| {
        selection.skus.contains(&key.sku) && key.date.is_some_and(|d| range.contains(d))
    }))
}

/// Allocation rows whose SKU and vendor are both selected, with the
/// presentational columns dropped.
pub fn filter_allocation(allocations: &AllocationTable, selection: &Selection) -> AllocationView {
    allocations
        .retain(|key| selection.skus.contains(&key.sku) && selection.vendors.contains(&key.vendor))
        .without_presentational()
}

/// Fabric rows whose vendor is selected and whose SKU list shares at least
/// one SKU with the selection.
///
/// When the SKU control covers every option the SKU test is skipped, so rows
/// with an empty or unknown SKU list survive as well.
pub fn filter_fabric(fabric: &FabricTable, selection: &Selection) -> FabricView {
    let sku_filter_off = selection.skus.covers_all();
    fabric
        .retain(|key| {
            selection.vendors.contains(&key.vendor)
                && (sku_filter_off || key.skus.iter().any(|sku| selection.skus.contains(sku)))
        })
        .without_presentational()
}
