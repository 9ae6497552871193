//! Report assembly and rendering.
//!
//! This module turns an [`Aggregation`] into a [`Report`] and renders it
//! as Markdown, JSON, or CSV.

use crate::analysis::{largest_orders, postage_distribution, Aggregation};
use crate::config::ReportConfig;
use crate::models::{LineItem, OrderSummary, Report, ReportMetadata, RowWarning, SkuTotal};
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;

/// JSON shape of one order, with the derived customer name and subtotal.
#[derive(Debug, Serialize)]
struct OrderView<'a> {
    order_number: &'a str,
    customer_name: String,
    first_name: &'a str,
    last_name: &'a str,
    postage: &'a str,
    purchase_date: &'a str,
    items: &'a [LineItem],
    subtotal: u64,
}

impl<'a> From<&'a OrderSummary> for OrderView<'a> {
    fn from(order: &'a OrderSummary) -> Self {
        Self {
            order_number: &order.order_number,
            customer_name: order.customer_name(),
            first_name: &order.first_name,
            last_name: &order.last_name,
            postage: &order.postage,
            purchase_date: &order.purchase_date,
            items: &order.items,
            subtotal: order.subtotal(),
        }
    }
}

/// Build the report value from a finished aggregation.
pub fn build_report(aggregation: Aggregation, source: &str, generated_at: DateTime<Utc>) -> Report {
    let metadata = ReportMetadata {
        source: source.to_string(),
        generated_at,
        rows_read: aggregation.rows_read,
        rows_despatched: aggregation.rows_despatched,
        rows_skipped: aggregation.rows_skipped,
        order_count: aggregation.orders.len(),
        warning_count: aggregation.warnings.len(),
    };

    Report {
        metadata,
        sku_totals: aggregation.sku_totals,
        total_quantity: aggregation.total_quantity,
        orders: aggregation.orders,
        warnings: aggregation.warnings,
    }
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report, options: &ReportConfig) -> String {
    let mut output = String::new();

    // Title
    output.push_str(&format!("# {}\n\n", options.title));

    output.push_str(&generate_metadata_section(&report.metadata, report.total_quantity));
    output.push_str(&generate_pick_list_section(
        &report.sku_totals,
        report.total_quantity,
    ));

    if options.include_orders {
        output.push_str(&generate_summary_section(&report.orders));
        output.push_str(&generate_orders_section(&report.orders));
    }

    if options.include_warnings {
        output.push_str(&generate_warnings_section(&report.warnings));
    }

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata, total_quantity: u64) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** {}\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Rows Read:** {}\n", metadata.rows_read));
    if metadata.rows_despatched > 0 {
        section.push_str(&format!(
            "- **Already Despatched:** {}\n",
            metadata.rows_despatched
        ));
    }
    if metadata.rows_skipped > 0 {
        section.push_str(&format!(
            "- **Rows Without SKU:** {}\n",
            metadata.rows_skipped
        ));
    }
    section.push_str(&format!("- **Open Orders:** {}\n", metadata.order_count));
    section.push_str(&format!("- **Total Items:** {}\n", total_quantity));
    section.push('\n');

    section
}

/// Generate the SKU pick-list table.
fn generate_pick_list_section(totals: &[SkuTotal], total_quantity: u64) -> String {
    let mut section = String::new();

    section.push_str("## Pick List\n\n");

    if totals.is_empty() {
        section.push_str("Nothing to pick.\n\n");
        return section;
    }

    section.push_str("| SKU | Quantity |\n");
    section.push_str("|:---|---:|\n");
    for total in totals {
        section.push_str(&format!(
            "| {} | {} |\n",
            escape_cell(&total.sku),
            total.quantity
        ));
    }
    section.push_str(&format!("| **Total** | **{}** |\n\n", total_quantity));

    section
}

/// Generate postage and order-size breakdowns.
fn generate_summary_section(orders: &[OrderSummary]) -> String {
    if orders.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Summary\n\n");

    let dist = postage_distribution(orders);
    section.push_str("### Orders by Postage\n\n");
    section.push_str("| Postage | Orders |\n");
    section.push_str("|:---|:---:|\n");

    let mut postage: Vec<_> = dist.iter().collect();
    postage.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    for (method, count) in postage {
        section.push_str(&format!("| {} | {} |\n", escape_cell(method), count));
    }
    section.push('\n');

    section.push_str("### Largest Orders\n\n");
    section.push_str("| Order | Customer | Items |\n");
    section.push_str("|:---|:---|:---:|\n");
    for (order, subtotal) in largest_orders(orders, 5) {
        section.push_str(&format!(
            "| {} | {} | {} |\n",
            escape_cell(&order.order_number),
            escape_cell(&order.customer_name()),
            subtotal
        ));
    }
    section.push('\n');

    section
}

/// Generate the per-order section.
fn generate_orders_section(orders: &[OrderSummary]) -> String {
    let mut section = String::new();

    section.push_str("## Orders\n\n");

    if orders.is_empty() {
        section.push_str("No open orders.\n\n");
        return section;
    }

    for order in orders {
        section.push_str(&generate_order_block(order));
    }

    section
}

/// Generate a single order block.
fn generate_order_block(order: &OrderSummary) -> String {
    let mut block = String::new();

    block.push_str(&format!("### Order {}\n\n", order.order_number));
    block.push_str(&format!("- **Customer:** {}\n", order.customer_name()));
    block.push_str(&format!("- **Postage:** {}\n", order.postage));
    block.push_str(&format!("- **Purchase Date:** {}\n\n", order.purchase_date));

    block.push_str("| SKU | Quantity |\n");
    block.push_str("|:---|---:|\n");
    for item in &order.items {
        block.push_str(&format!(
            "| {} | {} |\n",
            escape_cell(&item.sku),
            item.quantity
        ));
    }
    block.push_str(&format!("| **Subtotal** | **{}** |\n\n", order.subtotal()));

    block
}

/// Generate the warnings section.
fn generate_warnings_section(warnings: &[RowWarning]) -> String {
    if warnings.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Warnings\n\n");
    for warning in warnings {
        section.push_str(&format!("- {}\n", warning));
    }
    section.push('\n');

    section
}

fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|")
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report, options: &ReportConfig) -> Result<String> {
    let mut value = serde_json::to_value(report)?;

    if let Some(object) = value.as_object_mut() {
        if options.include_orders {
            let orders: Vec<OrderView<'_>> = report.orders.iter().map(OrderView::from).collect();
            object.insert("orders".to_string(), serde_json::to_value(orders)?);
        } else {
            object.remove("orders");
        }
        if !options.include_warnings {
            object.remove("warnings");
        }
    }

    serde_json::to_string_pretty(&value).map_err(Into::into)
}

/// Generate a CSV report: the pick list, then the order lines.
pub fn generate_csv_report(report: &Report, options: &ReportConfig) -> Result<String> {
    let mut pick_list = WriterBuilder::new().from_writer(Vec::new());
    pick_list.write_record(["SKU", "Quantity"])?;
    for total in &report.sku_totals {
        let quantity = total.quantity.to_string();
        pick_list.write_record([total.sku.as_str(), quantity.as_str()])?;
    }
    let grand_total = report.total_quantity.to_string();
    pick_list.write_record(["TOTAL", grand_total.as_str()])?;
    let mut buffer = pick_list
        .into_inner()
        .map_err(|e| anyhow!("Failed to flush pick list CSV: {}", e.error()))?;

    if options.include_orders {
        buffer.push(b'\n');

        let mut orders = WriterBuilder::new().from_writer(buffer);
        orders.write_record([
            "Order Number",
            "Customer",
            "Postage",
            "Purchase Date",
            "SKU",
            "Quantity",
        ])?;
        for order in &report.orders {
            let customer = order.customer_name();
            for item in &order.items {
                let quantity = item.quantity.to_string();
                orders.write_record([
                    order.order_number.as_str(),
                    customer.as_str(),
                    order.postage.as_str(),
                    order.purchase_date.as_str(),
                    item.sku.as_str(),
                    quantity.as_str(),
                ])?;
            }
        }
        buffer = orders
            .into_inner()
            .map_err(|e| anyhow!("Failed to flush order CSV: {}", e.error()))?;
    }

    String::from_utf8(buffer).context("CSV output is not valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::aggregate;
    use crate::models::OrderRow;

    fn create_test_row(row_number: usize, order: &str, items: &str, qty: &str) -> OrderRow {
        OrderRow {
            row_number,
            items_raw: items.to_string(),
            qty_raw: qty.to_string(),
            despatched: String::new(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            postage: "Tracked 24".to_string(),
            purchase_date: "2024-03-01".to_string(),
            order_number: order.to_string(),
        }
    }

    fn create_test_report() -> Report {
        let rows = vec![
            create_test_row(2, "1001", "SKU: MUG-01, TEE-M / Blue", "2,1"),
            create_test_row(3, "1002", "SKU: MUG-01", "3"),
            create_test_row(4, "1003", "Gift wrap", "1"),
        ];
        build_report(aggregate(&rows), "orders.csv", Utc::now())
    }

    #[test]
    fn test_build_report_metadata() {
        let report = create_test_report();

        assert_eq!(report.metadata.source, "orders.csv");
        assert_eq!(report.metadata.rows_read, 3);
        assert_eq!(report.metadata.rows_skipped, 1);
        assert_eq!(report.metadata.order_count, 2);
        assert_eq!(report.metadata.warning_count, 1);
        assert_eq!(report.total_quantity, 6);
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = create_test_report();
        let markdown = generate_markdown_report(&report, &ReportConfig::default());

        assert!(markdown.contains("# Pick List"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("| MUG-01 | 5 |"));
        assert!(markdown.contains("| **Total** | **6** |"));
        assert!(markdown.contains("### Order 1001"));
        assert!(markdown.contains("- **Customer:** Jane Doe"));
        assert!(markdown.contains("| **Subtotal** | **3** |"));
        assert!(markdown.contains("## Warnings"));
        assert!(markdown.contains("no SKU found"));
    }

    #[test]
    fn test_markdown_respects_options() {
        let report = create_test_report();
        let options = ReportConfig {
            title: "Morning Pick".to_string(),
            include_orders: false,
            include_warnings: false,
        };
        let markdown = generate_markdown_report(&report, &options);

        assert!(markdown.starts_with("# Morning Pick"));
        assert!(markdown.contains("## Pick List"));
        assert!(!markdown.contains("## Orders"));
        assert!(!markdown.contains("## Warnings"));
    }

    #[test]
    fn test_empty_pick_list() {
        let report = build_report(Aggregation::default(), "empty.csv", Utc::now());
        let markdown = generate_markdown_report(&report, &ReportConfig::default());

        assert!(markdown.contains("Nothing to pick."));
        assert!(markdown.contains("No open orders."));
    }

    #[test]
    fn test_escape_cell() {
        assert_eq!(escape_cell("A|B"), "A\\|B");
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report();
        let json = generate_json_report(&report, &ReportConfig::default()).unwrap();

        assert!(json.contains("\"generated_at\""));
        assert!(json.contains("\"sku_totals\""));
        assert!(json.contains("\"orders\""));
        assert!(json.contains("\"kind\": \"sku_not_found\""));

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        let first = &parsed["orders"][0];
        assert_eq!(first["order_number"], "1001");
        assert_eq!(first["customer_name"], "Jane Doe");
        assert_eq!(first["subtotal"], 3);
        assert_eq!(first["items"][0]["sku"], "MUG-01");
        assert_eq!(parsed["orders"][1]["subtotal"], 3);

        let options = ReportConfig {
            include_orders: false,
            ..ReportConfig::default()
        };
        let json = generate_json_report(&report, &options).unwrap();
        assert!(!json.contains("\"orders\""));
    }

    #[test]
    fn test_generate_csv_report() {
        let report = create_test_report();
        let csv = generate_csv_report(&report, &ReportConfig::default()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "SKU,Quantity");
        assert_eq!(lines[1], "MUG-01,5");
        assert_eq!(lines[2], "TEE-M,1");
        assert_eq!(lines[3], "TOTAL,6");
        assert_eq!(lines[4], "");
        assert_eq!(
            lines[5],
            "Order Number,Customer,Postage,Purchase Date,SKU,Quantity"
        );
        assert_eq!(lines[6], "1001,Jane Doe,Tracked 24,2024-03-01,MUG-01,2");
        assert_eq!(lines.len(), 9);
    }
}
