//! Order aggregation and pick-list totals.
//!
//! This module groups parsed line items by web order and accumulates
//! the per-SKU quantities needed to pick every open order.

use crate::analysis::parser::{pair_line_items, parse_quantities, parse_skus};
use crate::models::{OrderRow, OrderSummary, RowWarning, SkuTotal};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Result of one aggregation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregation {
    /// SKU totals sorted by SKU.
    pub sku_totals: Vec<SkuTotal>,
    /// Orders in first-seen order.
    pub orders: Vec<OrderSummary>,
    /// Sum of all SKU totals.
    pub total_quantity: u64,
    /// Warnings recorded for individual rows.
    pub warnings: Vec<RowWarning>,
    /// Rows handed to the aggregator.
    pub rows_read: usize,
    /// Rows skipped because they were already despatched.
    pub rows_despatched: usize,
    /// Rows skipped because no SKU could be parsed.
    pub rows_skipped: usize,
}

/// Accumulates order rows into SKU totals and per-order summaries.
///
/// State lives only as long as one aggregation; call [`finish`] to get
/// the result.
///
/// [`finish`]: OrderAggregator::finish
#[derive(Debug, Default)]
pub struct OrderAggregator {
    totals: BTreeMap<String, u64>,
    orders: Vec<OrderSummary>,
    order_index: HashMap<String, usize>,
    warnings: Vec<RowWarning>,
    rows_read: usize,
    rows_despatched: usize,
    rows_skipped: usize,
}

impl OrderAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one row to the aggregation.
    pub fn push(&mut self, row: &OrderRow) {
        self.rows_read += 1;

        if row.is_despatched() {
            debug!("Row {}: already despatched, skipping", row.row_number);
            self.rows_despatched += 1;
            return;
        }

        let Some(skus) = parse_skus(&row.items_raw) else {
            let warning = RowWarning::SkuNotFound {
                row_number: row.row_number,
                order_number: row.order_number.clone(),
                items_raw: row.items_raw.clone(),
            };
            warn!("{}", warning);
            self.warnings.push(warning);
            self.rows_skipped += 1;
            return;
        };

        let quantities = parse_quantities(&row.qty_raw);
        if skus.len() != quantities.len() {
            let warning = RowWarning::CountMismatch {
                row_number: row.row_number,
                order_number: row.order_number.clone(),
                sku_count: skus.len(),
                quantity_count: quantities.len(),
            };
            warn!("{}", warning);
            self.warnings.push(warning);
        }

        let items = pair_line_items(&skus, &quantities);
        for item in &items {
            *self.totals.entry(item.sku.clone()).or_insert(0) += u64::from(item.quantity);
        }

        let index = match self.order_index.get(&row.order_number) {
            Some(&index) => index,
            None => {
                self.orders.push(OrderSummary::from_row(row));
                let index = self.orders.len() - 1;
                self.order_index.insert(row.order_number.clone(), index);
                index
            }
        };
        self.orders[index].items.extend(items);
    }

    /// Consume the aggregator and produce the sorted result.
    pub fn finish(self) -> Aggregation {
        let sku_totals: Vec<SkuTotal> = self
            .totals
            .into_iter()
            .map(|(sku, quantity)| SkuTotal { sku, quantity })
            .collect();
        let total_quantity = sku_totals.iter().map(|t| t.quantity).sum();

        debug!(
            "Aggregated {} SKU(s) across {} order(s), {} item(s) in total",
            sku_totals.len(),
            self.orders.len(),
            total_quantity
        );

        Aggregation {
            sku_totals,
            orders: self.orders,
            total_quantity,
            warnings: self.warnings,
            rows_read: self.rows_read,
            rows_despatched: self.rows_despatched,
            rows_skipped: self.rows_skipped,
        }
    }
}

/// Aggregate a full sequence of rows in one pass.
pub fn aggregate<'a, I>(rows: I) -> Aggregation
where
    I: IntoIterator<Item = &'a OrderRow>,
{
    let mut aggregator = OrderAggregator::new();
    for row in rows {
        aggregator.push(row);
    }
    aggregator.finish()
}

/// Identify the orders with the most items picked (by subtotal).
pub fn largest_orders(orders: &[OrderSummary], n: usize) -> Vec<(&OrderSummary, u64)> {
    let mut by_size: Vec<_> = orders.iter().map(|o| (o, o.subtotal())).collect();

    by_size.sort_by_key(|(_, subtotal)| std::cmp::Reverse(*subtotal));
    by_size.truncate(n);

    by_size
}

/// Count orders per postage method.
pub fn postage_distribution(orders: &[OrderSummary]) -> HashMap<String, usize> {
    let mut dist: HashMap<String, usize> = HashMap::new();

    for order in orders {
        let postage = order.postage.trim();
        let key = if postage.is_empty() { "Unspecified" } else { postage };
        *dist.entry(key.to_string()).or_default() += 1;
    }

    dist
}
