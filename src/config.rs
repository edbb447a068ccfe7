use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};

/// Config file picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "dashboard.json";

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "fabric-dashboard")]
#[command(version, about = "Sales forecast, vendor allocation and fabric usage dashboard")]
pub struct Cli {
    /// JSON config file (defaults to ./dashboard.json when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory holding the three input CSV files
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// Where the input tables live. Every field has a default so a partial
/// JSON file is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_dir: PathBuf,
    pub forecast_file: String,
    pub allocation_file: String,
    pub fabric_file: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("prediction_data"),
            forecast_file: "next_30_day_forecast.csv".to_string(),
            allocation_file: "final_allocation.csv".to_string(),
            fabric_file: "filtered_fabric_summary.csv".to_string(),
        }
    }
}

impl DashboardConfig {
    /// Resolve the configuration from the command line.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::from_file(fallback)?
                } else {
                    Self::default()
                }
            }
        };
        if let Some(dir) = &cli.data_dir {
            config.data_dir = dir.clone();
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        log::info!("Using config {}", path.display());
        Ok(config)
    }

    pub fn forecast_path(&self) -> PathBuf {
        self.data_dir.join(&self.forecast_file)
    }

    pub fn allocation_path(&self) -> PathBuf {
        self.data_dir.join(&self.allocation_file)
    }

    pub fn fabric_path(&self) -> PathBuf {
        self.data_dir.join(&self.fabric_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.json");
        std::fs::write(&path, r#"{ "data_dir": "/srv/forecasts" }"#).unwrap();

        let config = DashboardConfig::from_file(&path).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/forecasts"));
        assert_eq!(
            config.forecast_path(),
            PathBuf::from("/srv/forecasts/next_30_day_forecast.csv")
        );
    }

    #[test]
    fn data_dir_flag_overrides_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.json");
        std::fs::write(&path, r#"{ "data_dir": "a", "fabric_file": "fabric.csv" }"#).unwrap();

        let cli = Cli::parse_from([
            "fabric-dashboard",
            "--config",
            path.to_str().unwrap(),
            "--data-dir",
            "b",
        ]);
        let config = DashboardConfig::from_cli(&cli).unwrap();
        assert_eq!(config.fabric_path(), PathBuf::from("b/fabric.csv"));
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(DashboardConfig::from_file(&path).is_err());
    }
}
