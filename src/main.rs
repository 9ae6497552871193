//! Picklist - order export to warehouse pick list
//!
//! A CLI tool that reads an order export, totals every open SKU, and
//! groups the ordered items by web order.
//!
//! Exit codes:
//!   0 - Success (no warnings, or no --fail-on-warnings set)
//!   1 - Runtime or configuration error (missing column, unreadable file, etc.)
//!   2 - Row warnings recorded and --fail-on-warnings set

mod analysis;
mod cli;
mod config;
mod error;
mod models;
mod report;
mod source;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use error::ConfigurationError;
use source::{ColumnNames, SourceOptions};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Load configuration before logging so its verbose flag applies
    let config = match load_config(&args) {
        Ok(mut config) => {
            config.merge_with_args(&args);
            config
        }
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    init_logging(&args, &config);

    info!("Picklist v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    debug!("Configuration: {:?}", config);

    match run(args, config) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            if let Some(config_error) = e.downcast_ref::<ConfigurationError>() {
                error!("Configuration error: {}", config_error);
                eprintln!("\n❌ Configuration error: {}", config_error);
            } else {
                error!("Pick list failed: {:#}", e);
                eprintln!("\n❌ Error: {:#}", e);
            }
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .picklist.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to rename input columns or change report sections.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so the report can be piped from stdout.
fn init_logging(args: &Args, config: &Config) {
    let level = if config.general.verbose && !args.quiet {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete pick-list workflow. Returns exit code (0 or 2).
fn run(args: Args, config: Config) -> Result<i32> {
    let start_time = Instant::now();

    let names = ColumnNames::from(&config.columns);
    let options = SourceOptions::from_delimiter(&config.general.delimiter)?;
    let input = args.input_path();
    let source_name = if input.as_os_str() == "-" {
        "stdin".to_string()
    } else {
        input.display().to_string()
    };

    // Step 1: Read and validate the export
    let rows = source::load_order_rows(&input, &names, &options)?;

    if args.dry_run {
        return handle_dry_run(&source_name, &rows);
    }

    // Step 2: Aggregate
    let aggregation = analysis::aggregate(&rows);
    if !aggregation.warnings.is_empty() {
        warn!(
            "{} row warning(s) recorded; see the report for details",
            aggregation.warnings.len()
        );
    }

    // Step 3: Build and render the report
    let report = report::build_report(aggregation, &source_name, Utc::now());

    let output = match args.format {
        OutputFormat::Markdown => report::generate_markdown_report(&report, &config.report),
        OutputFormat::Json => report::generate_json_report(&report, &config.report)?,
        OutputFormat::Csv => report::generate_csv_report(&report, &config.report)?,
    };

    match args.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            info!("Report saved to: {}", path.display());
        }
        None => print!("{}", output),
    }

    // Print summary
    if !args.quiet {
        let duration = start_time.elapsed().as_secs_f64();
        eprintln!("\n📦 Pick List Summary:");
        eprintln!("   Rows read: {}", report.metadata.rows_read);
        eprintln!("   Already despatched: {}", report.metadata.rows_despatched);
        eprintln!("   Open orders: {}", report.metadata.order_count);
        eprintln!(
            "   SKUs: {} | Items: {}",
            report.sku_totals.len(),
            report.total_quantity
        );
        eprintln!("   Warnings: {}", report.metadata.warning_count);
        eprintln!("   Duration: {:.2}s", duration);
    }

    if args.fail_on_warnings && !report.warnings.is_empty() {
        eprintln!(
            "\n⛔ {} row warning(s) recorded. Failing (exit code 2).",
            report.warnings.len()
        );
        return Ok(2);
    }

    Ok(0)
}

/// Handle --dry-run: the header already validated, report row counts and exit.
fn handle_dry_run(source_name: &str, rows: &[models::OrderRow]) -> Result<i32> {
    let despatched = rows.iter().filter(|r| r.is_despatched()).count();

    println!("\n🔍 Dry run: {} (no report written)\n", source_name);
    println!("   Header: all required columns present");
    println!("   Rows: {}", rows.len());
    println!("   Already despatched: {}", despatched);
    println!("   To aggregate: {}", rows.len() - despatched);

    println!("\n✅ Dry run complete.");
    Ok(0)
}

/// Load configuration from file or use defaults.
///
/// Runs before logging is initialized, so problems go straight to stderr.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    // Try default location; a broken default file is reported, not fatal
    match Config::load_default() {
        Ok(Some(config)) => Ok(config),
        Ok(None) => Ok(Config::default()),
        Err(e) => {
            eprintln!("⚠️  Ignoring {}: {:#}", CONFIG_FILE_NAME, e);
            Ok(Config::default())
        }
    }
}
