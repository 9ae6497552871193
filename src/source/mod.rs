//! Tabular order source.
//!
//! This module reads a delimited order export, validates its header
//! against the required columns, and decodes each record into an
//! [`OrderRow`].

use crate::error::ConfigurationError;
use crate::models::OrderRow;
use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::{debug, info};

/// Header text expected for each logical column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnNames {
    pub item: String,
    pub qty: String,
    pub despatched: String,
    pub first_name: String,
    pub last_name: String,
    pub postage: String,
    pub purchase_date: String,
    pub order_number: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self::from(&crate::config::ColumnsConfig::default())
    }
}

impl From<&crate::config::ColumnsConfig> for ColumnNames {
    fn from(config: &crate::config::ColumnsConfig) -> Self {
        Self {
            item: config.item.clone(),
            qty: config.qty.clone(),
            despatched: config.despatched.clone(),
            first_name: config.first_name.clone(),
            last_name: config.last_name.clone(),
            postage: config.postage.clone(),
            purchase_date: config.purchase_date.clone(),
            order_number: config.order_number.clone(),
        }
    }
}

/// Validated header positions of every required column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub item: usize,
    pub qty: usize,
    pub despatched: usize,
    pub first_name: usize,
    pub last_name: usize,
    pub postage: usize,
    pub purchase_date: usize,
    pub order_number: usize,
}

impl ColumnMap {
    /// Locate every required column in a header row.
    ///
    /// Matching ignores case and surrounding whitespace; the first
    /// matching header wins. All missing columns are reported together.
    pub fn from_headers<S: AsRef<str>>(
        headers: &[S],
        names: &ColumnNames,
    ) -> Result<Self, ConfigurationError> {
        if headers.iter().all(|h| h.as_ref().trim().is_empty()) {
            return Err(ConfigurationError::EmptyHeader);
        }

        let normalized: Vec<String> = headers
            .iter()
            .map(|h| h.as_ref().trim().to_lowercase())
            .collect();
        let mut missing = Vec::new();
        let mut find = |name: &str| {
            let wanted = name.trim().to_lowercase();
            let index = normalized.iter().position(|h| *h == wanted);
            if index.is_none() {
                missing.push(name.to_string());
            }
            index
        };

        let item = find(names.item.as_str());
        let qty = find(names.qty.as_str());
        let despatched = find(names.despatched.as_str());
        let first_name = find(names.first_name.as_str());
        let last_name = find(names.last_name.as_str());
        let postage = find(names.postage.as_str());
        let purchase_date = find(names.purchase_date.as_str());
        let order_number = find(names.order_number.as_str());

        match (
            item,
            qty,
            despatched,
            first_name,
            last_name,
            postage,
            purchase_date,
            order_number,
        ) {
            (
                Some(item),
                Some(qty),
                Some(despatched),
                Some(first_name),
                Some(last_name),
                Some(postage),
                Some(purchase_date),
                Some(order_number),
            ) => Ok(Self {
                item,
                qty,
                despatched,
                first_name,
                last_name,
                postage,
                purchase_date,
                order_number,
            }),
            _ => Err(ConfigurationError::MissingColumns(missing)),
        }
    }

    /// Decode one record. Fields past the end of a short record are blank.
    pub fn decode(&self, record: &StringRecord, row_number: usize) -> OrderRow {
        let field = |index: usize| record.get(index).unwrap_or("").trim().to_string();

        OrderRow {
            row_number,
            items_raw: field(self.item),
            qty_raw: field(self.qty),
            despatched: field(self.despatched),
            first_name: field(self.first_name),
            last_name: field(self.last_name),
            postage: field(self.postage),
            purchase_date: field(self.purchase_date),
            order_number: field(self.order_number),
        }
    }
}

/// Options for reading the export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceOptions {
    /// Field delimiter.
    pub delimiter: u8,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl SourceOptions {
    /// Build options from a delimiter setting such as `","`, `";"` or `"tab"`.
    pub fn from_delimiter(delimiter: &str) -> Result<Self, ConfigurationError> {
        let byte = match delimiter {
            "tab" | "\\t" | "\t" => b'\t',
            d if d.len() == 1 && d.is_ascii() => d.as_bytes()[0],
            other => return Err(ConfigurationError::InvalidDelimiter(other.to_string())),
        };
        Ok(Self { delimiter: byte })
    }
}

/// Read and validate order rows from any reader.
///
/// The header is validated before any record is decoded. Fully blank
/// records are skipped but still occupy a sheet row number.
pub fn read_order_rows<R: Read>(
    reader: R,
    names: &ColumnNames,
    options: &SourceOptions,
) -> Result<Vec<OrderRow>> {
    let mut csv_reader = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()
        .context("Failed to read header row")?
        .iter()
        .map(String::from)
        .collect();
    debug!("Header row: {:?}", headers);

    let columns = ColumnMap::from_headers(&headers, names)?;

    let mut rows = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        // Header is sheet row 1.
        let row_number = index + 2;
        let record = record.with_context(|| format!("Failed to read row {}", row_number))?;

        if record.iter().all(|f| f.trim().is_empty()) {
            debug!("Row {}: blank, skipping", row_number);
            continue;
        }

        rows.push(columns.decode(&record, row_number));
    }

    Ok(rows)
}

/// Read order rows from a file path, or stdin when the path is `-`.
pub fn load_order_rows(
    path: &Path,
    names: &ColumnNames,
    options: &SourceOptions,
) -> Result<Vec<OrderRow>> {
    let rows = if path.as_os_str() == "-" {
        info!("Reading orders from stdin");
        read_order_rows(io::stdin().lock(), names, options)?
    } else {
        info!("Reading orders from: {}", path.display());
        let file = File::open(path)
            .with_context(|| format!("Failed to open input file: {}", path.display()))?;
        read_order_rows(file, names, options)?
    };

    info!("Read {} order row(s)", rows.len());
    Ok(rows)
}
