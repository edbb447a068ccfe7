//! Data layer: core types, loading, filtering and export.
//!
//! Architecture:
//! ```text
//!  forecast.csv   allocation.csv   fabric_summary.csv
//!        │               │                 │
//!        ▼               ▼                 ▼
//!   ┌─────────────────────────────────────────┐
//!   │  cache / loader   parse once per path   │
//!   └─────────────────────────────────────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ Datasets  │  three KeyedTables, shared read-only
//!   └──────────┘
//!        │   + Selection (SKUs, Vendors, DateRange)
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  → ForecastView / AllocationView / FabricView
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  export   │  view → CSV bytes
//!   └──────────┘
//! ```
pub mod cache;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod selection;

use std::sync::Arc;

use model::{AllocationTable, FabricTable, ForecastTable};

/// The three source tables of one session.
#[derive(Debug, Clone)]
pub struct Datasets {
    pub forecast: Arc<ForecastTable>,
    pub allocation: Arc<AllocationTable>,
    pub fabric: Arc<FabricTable>,
}
