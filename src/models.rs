//! Data models for the pick-list aggregator.
//!
//! This module contains the core data structures used throughout
//! the application for representing order rows, line items, orders,
//! and the finished report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single record read from the order export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRow {
    /// Sheet row number of the record (1-indexed, header is row 1).
    pub row_number: usize,
    /// Raw "Item" text containing the embedded `SKU:` tokens.
    pub items_raw: String,
    /// Raw "QTY" text, comma-separated quantities.
    pub qty_raw: String,
    /// Raw "Date Despatched" cell.
    pub despatched: String,
    /// Customer first name.
    pub first_name: String,
    /// Customer last name.
    pub last_name: String,
    /// Postage method.
    pub postage: String,
    /// Purchase date as exported.
    pub purchase_date: String,
    /// Web order number (grouping key).
    pub order_number: String,
}

impl OrderRow {
    /// Returns true if the row has already been despatched.
    ///
    /// The cell is falsy when blank, `0`, `false` or `no`; anything else
    /// (usually a despatch date) marks the row as fulfilled.
    pub fn is_despatched(&self) -> bool {
        let value = self.despatched.trim();
        if value.is_empty() {
            return false;
        }
        !matches!(value.to_lowercase().as_str(), "0" | "false" | "no")
    }
}

/// One SKU and the quantity ordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Stock-keeping unit.
    pub sku: String,
    /// Quantity, always at least 1.
    pub quantity: u32,
}

impl LineItem {
    pub fn new(sku: impl Into<String>, quantity: u32) -> Self {
        Self {
            sku: sku.into(),
            quantity: quantity.max(1),
        }
    }
}

/// All line items of one web order, with the order metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    /// Web order number.
    pub order_number: String,
    /// Customer first name.
    pub first_name: String,
    /// Customer last name.
    pub last_name: String,
    /// Postage method.
    pub postage: String,
    /// Purchase date as exported.
    pub purchase_date: String,
    /// Line items in row encounter order.
    pub items: Vec<LineItem>,
}

impl OrderSummary {
    /// Creates an empty order from the metadata of its first row.
    pub fn from_row(row: &OrderRow) -> Self {
        Self {
            order_number: row.order_number.clone(),
            first_name: row.first_name.clone(),
            last_name: row.last_name.clone(),
            postage: row.postage.clone(),
            purchase_date: row.purchase_date.clone(),
            items: Vec::new(),
        }
    }

    /// Returns "First Last", skipping whichever part is blank.
    pub fn customer_name(&self) -> String {
        [self.first_name.trim(), self.last_name.trim()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Total quantity across the order's line items.
    pub fn subtotal(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }
}

/// Aggregate quantity of one SKU across all orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkuTotal {
    pub sku: String,
    pub quantity: u64,
}

/// Recoverable problem found while processing a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowWarning {
    /// The item text has no recognizable `SKU:` marker; the row was skipped.
    SkuNotFound {
        row_number: usize,
        order_number: String,
        items_raw: String,
    },
    /// SKU and quantity counts differ; missing quantities defaulted to 1.
    CountMismatch {
        row_number: usize,
        order_number: String,
        sku_count: usize,
        quantity_count: usize,
    },
}

impl fmt::Display for RowWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowWarning::SkuNotFound {
                row_number,
                order_number,
                items_raw,
            } => write!(
                f,
                "Row {} (order {}): no SKU found in item text {:?}",
                row_number, order_number, items_raw
            ),
            RowWarning::CountMismatch {
                row_number,
                order_number,
                sku_count,
                quantity_count,
            } => write!(
                f,
                "Row {} (order {}): {} SKU(s) but {} quantity value(s)",
                row_number, order_number, sku_count, quantity_count
            ),
        }
    }
}

/// Metadata about the pick-list report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Name of the input the rows were read from.
    pub source: String,
    /// Date and time the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Number of data rows read.
    pub rows_read: usize,
    /// Rows skipped because they were already despatched.
    pub rows_despatched: usize,
    /// Rows skipped because no SKU could be parsed.
    pub rows_skipped: usize,
    /// Number of distinct orders in the report.
    pub order_count: usize,
    /// Number of recorded warnings.
    pub warning_count: usize,
}

/// The complete pick-list report handed to the renderers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Metadata about the report.
    pub metadata: ReportMetadata,
    /// SKU totals sorted by SKU.
    pub sku_totals: Vec<SkuTotal>,
    /// Sum of all SKU totals.
    pub total_quantity: u64,
    /// Orders in first-seen order.
    pub orders: Vec<OrderSummary>,
    /// Row warnings collected during aggregation.
    pub warnings: Vec<RowWarning>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_with_despatch(value: &str) -> OrderRow {
        OrderRow {
            despatched: value.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_despatch_flag_truthiness() {
        assert!(!row_with_despatch("").is_despatched());
        assert!(!row_with_despatch("   ").is_despatched());
        assert!(!row_with_despatch("0").is_despatched());
        assert!(!row_with_despatch("FALSE").is_despatched());
        assert!(!row_with_despatch("no").is_despatched());
        assert!(row_with_despatch("12/03/2024").is_despatched());
        assert!(row_with_despatch("TRUE").is_despatched());
        assert!(row_with_despatch("x").is_despatched());
    }

    #[test]
    fn test_line_item_quantity_floor() {
        assert_eq!(LineItem::new("A1", 0).quantity, 1);
        assert_eq!(LineItem::new("A1", 7).quantity, 7);
    }

    #[test]
    fn test_customer_name() {
        let mut order = OrderSummary::from_row(&OrderRow {
            first_name: " Ada ".to_string(),
            last_name: "Lovelace".to_string(),
            ..Default::default()
        });
        assert_eq!(order.customer_name(), "Ada Lovelace");

        order.last_name = String::new();
        assert_eq!(order.customer_name(), "Ada");
    }

    #[test]
    fn test_order_subtotal() {
        let mut order = OrderSummary::from_row(&OrderRow::default());
        order.items.push(LineItem::new("A1", 3));
        order.items.push(LineItem::new("B2", 2));
        assert_eq!(order.subtotal(), 5);
    }

    #[test]
    fn test_warning_display() {
        let warning = RowWarning::CountMismatch {
            row_number: 4,
            order_number: "1001".to_string(),
            sku_count: 3,
            quantity_count: 1,
        };
        assert_eq!(
            warning.to_string(),
            "Row 4 (order 1001): 3 SKU(s) but 1 quantity value(s)"
        );
    }
}
