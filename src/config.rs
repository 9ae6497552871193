//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.picklist.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".picklist.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Header names of the required input columns.
    #[serde(default)]
    pub columns: ColumnsConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Field delimiter of the input export (`","`, `";"`, `"tab"`, ...).
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            delimiter: default_delimiter(),
        }
    }
}

fn default_delimiter() -> String {
    ",".to_string()
}

/// Header text of each column the aggregator reads.
///
/// Matching against the export is case-insensitive and ignores
/// surrounding whitespace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnsConfig {
    #[serde(default = "default_item_column")]
    pub item: String,

    #[serde(default = "default_qty_column")]
    pub qty: String,

    #[serde(default = "default_despatched_column")]
    pub despatched: String,

    #[serde(default = "default_first_name_column")]
    pub first_name: String,

    #[serde(default = "default_last_name_column")]
    pub last_name: String,

    #[serde(default = "default_postage_column")]
    pub postage: String,

    #[serde(default = "default_purchase_date_column")]
    pub purchase_date: String,

    #[serde(default = "default_order_number_column")]
    pub order_number: String,
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        Self {
            item: default_item_column(),
            qty: default_qty_column(),
            despatched: default_despatched_column(),
            first_name: default_first_name_column(),
            last_name: default_last_name_column(),
            postage: default_postage_column(),
            purchase_date: default_purchase_date_column(),
            order_number: default_order_number_column(),
        }
    }
}

fn default_item_column() -> String {
    "Item".to_string()
}

fn default_qty_column() -> String {
    "QTY".to_string()
}

fn default_despatched_column() -> String {
    "Date Despatched".to_string()
}

fn default_first_name_column() -> String {
    "First Name".to_string()
}

fn default_last_name_column() -> String {
    "Last Name".to_string()
}

fn default_postage_column() -> String {
    "Postage".to_string()
}

fn default_purchase_date_column() -> String {
    "Purchase Date".to_string()
}

fn default_order_number_column() -> String {
    "Web Order Number".to_string()
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Report title.
    #[serde(default = "default_title")]
    pub title: String,

    /// Include the per-order section.
    #[serde(default = "default_true")]
    pub include_orders: bool,

    /// Include the row warnings section.
    #[serde(default = "default_true")]
    pub include_warnings: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            include_orders: true,
            include_warnings: true,
        }
    }
}

fn default_title() -> String {
    "Pick List".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref delimiter) = args.delimiter {
            self.general.delimiter = delimiter.clone();
        }

        if let Some(ref title) = args.title {
            self.report.title = title.clone();
        }

        if args.no_orders {
            self.report.include_orders = false;
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
