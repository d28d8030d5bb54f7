//! CSV export of orders for spreadsheets and bookkeeping.
//!
//! ```text
//! Table,Items,Status,Created At,Completed At
//! 5,2x Burger (no onions); Coke,completed,2024-05-17T12:05:00+00:00,2024-05-17T12:15:00+00:00
//! 3,Salad,pending,2024-05-17T12:40:00+00:00,N/A
//! ```

use crate::analytics::ReportRange;
use crate::model::{Order, OrderStatus};
use serde::Serialize;
use std::io;

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    table: &'a str,
    items: String,
    status: &'static str,
    created_at: String,
    completed_at: String,
}

impl<'a> From<&'a Order> for CsvRow<'a> {
    fn from(order: &'a Order) -> Self {
        Self {
            table: &order.table,
            items: order
                .items
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; "),
            status: match order.status {
                OrderStatus::Pending => "pending",
                OrderStatus::Completed { .. } => "completed",
            },
            created_at: order.created_at.to_rfc3339(),
            completed_at: order
                .completed_at()
                .map_or_else(|| "N/A".to_string(), |at| at.to_rfc3339()),
        }
    }
}

/// Writes the orders created within `range` as CSV, oldest first, and returns how many
/// rows were written. The header is written even when no order matches.
pub fn write_csv<W: io::Write>(
    orders: &[Order],
    range: &ReportRange,
    out: W,
) -> Result<usize, csv::Error> {
    let mut selected: Vec<&Order> = orders
        .iter()
        .filter(|order| range.contains(order.created_at.date_naive()))
        .collect();
    selected.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(out);
    writer.write_record(["Table", "Items", "Status", "Created At", "Completed At"])?;
    for order in &selected {
        writer.serialize(CsvRow::from(*order))?;
    }
    writer.flush()?;
    Ok(selected.len())
}
