//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// Picklist - turn an order export into a warehouse pick list
///
/// Reads open (not yet despatched) orders from a CSV/TSV export, totals
/// every SKU, and groups the items by web order. Markdown/JSON/CSV output.
///
/// Examples:
///   picklist --input orders.csv
///   picklist --input orders.csv --output picklist.md
///   picklist --input orders.tsv --delimiter tab --format json
///   picklist --input orders.csv --dry-run
///   picklist --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Order export to read (`-` for stdin)
    #[arg(short, long, value_name = "FILE", required_unless_present = "init_config")]
    pub input: Option<PathBuf>,

    /// Output file path for the report
    ///
    /// The report is printed to stdout when omitted.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json, csv)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Path to configuration file
    ///
    /// If not specified, looks for .picklist.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Field delimiter of the export
    ///
    /// A single character, or "tab" for tab-separated exports.
    #[arg(long, value_name = "CHAR", env = "PICKLIST_DELIMITER")]
    pub delimiter: Option<String>,

    /// Report title
    #[arg(long, value_name = "TITLE")]
    pub title: Option<String>,

    /// Leave the per-order section out of the report
    #[arg(long)]
    pub no_orders: bool,

    /// Exit with code 2 if any row produced a warning
    ///
    /// Useful for scheduled jobs that should flag malformed exports.
    #[arg(long)]
    pub fail_on_warnings: bool,

    /// Dry run: validate the header and count rows without writing a report
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .picklist.toml configuration file
    #[arg(long)]
    pub init_config: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
    /// CSV pick list and order table
    Csv,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the input path (validated to be present unless --init-config).
    pub fn input_path(&self) -> PathBuf {
        self.input.clone().unwrap_or_else(|| PathBuf::from("-"))
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref input) = self.input {
            if input.as_os_str() != "-" {
                if !input.exists() {
                    return Err(format!("Input file does not exist: {}", input.display()));
                }
                if !input.is_file() {
                    return Err(format!("Input path is not a file: {}", input.display()));
                }
            }
        }

        if let Some(ref delimiter) = self.delimiter {
            if delimiter.is_empty() {
                return Err("Delimiter must not be empty".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
