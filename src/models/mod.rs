//! Core data model for container landed-cost calculation.
//!
//! All document bytes and catalog rows are handed in fully materialized;
//! nothing in here performs I/O. Types that cross the boundary to the
//! environment (UI, exports, persisted settings) derive serde with
//! camelCase field names.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single cell of a raw tabular document, as delivered by the
/// environment's spreadsheet/CSV reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    Empty,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }

    /// Cell content as display text. Empty cells yield an empty string.
    pub fn as_text(&self) -> String {
        match self {
            Cell::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            Cell::Text(s) => s.clone(),
            Cell::Empty => String::new(),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        if s.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

/// A raw row/cell grid, the parser-facing view of one uploaded document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Grid {
    pub rows: Vec<Vec<Cell>>,
}

impl Grid {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Flatten one row into a single space-joined string, skipping empties.
    pub fn row_text(&self, idx: usize) -> String {
        self.rows
            .get(idx)
            .map(|row| join_cells(row))
            .unwrap_or_default()
    }

    /// Flatten the whole grid for format sniffing.
    pub fn full_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| join_cells(row))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn join_cells(row: &[Cell]) -> String {
    row.iter()
        .filter(|c| !c.is_empty())
        .map(|c| c.as_text())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Which kind of supplier document a grid represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocKind {
    /// Commercial Invoice: has prices, lacks volume.
    CommercialInvoice,
    /// Packing List: has volume, lacks prices.
    PackingList,
}

/// One row of the canonical product catalog (the "Motherbase").
/// Immutable once loaded; the matcher consumes it by reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    /// 13-digit numeric string, the canonical key.
    pub ean: String,
    pub internal_code: String,
    pub external_code: String,
    pub simplified_id: String,
    pub title: String,
    pub category: String,
    pub supplier: String,
    /// Unit volume in cubic meters.
    pub cbm: f64,
    /// Units per carton.
    pub box_amount: u32,
}

/// The catalog itself: a read-only sequence loaded once per session.
/// Iteration order is load order; the matcher's tie-breaking depends on it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&CatalogEntry> {
        self.entries.get(idx)
    }
}

/// A line item extracted from a supplier document.
///
/// Lifecycle: created by a document parser, volume filled in by the CI/PL
/// merge, EAN/category filled in by the product matcher, consumed by the
/// allocator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// The supplier's own identifier, pre-matching.
    pub product_code: String,
    pub description: String,
    pub quantity: u32,
    pub unit_price_usd: f64,
    /// Volume for the whole quantity group. Zero until merged from the PL.
    pub cbm: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cartons: Option<u32>,
    /// Filled in by matching; unmatched items carry no EAN.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ean: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// One payment against a supplier order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub amount: PaymentAmount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

/// Payment denomination. USD payments carry the USD→EUR rate applied by the
/// bank; there is no other currency handling in the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase", tag = "currency")]
pub enum PaymentAmount {
    Eur { amount_eur: f64 },
    Usd { amount_usd: f64, fx_rate: f64 },
}

impl Payment {
    pub fn eur(amount_eur: f64) -> Self {
        Self {
            amount: PaymentAmount::Eur { amount_eur },
            date: None,
        }
    }

    pub fn usd(amount_usd: f64, fx_rate: f64) -> Self {
        Self {
            amount: PaymentAmount::Usd {
                amount_usd,
                fx_rate,
            },
            date: None,
        }
    }

    /// Amount converted to EUR.
    pub fn in_eur(&self) -> f64 {
        match self.amount {
            PaymentAmount::Eur { amount_eur } => amount_eur,
            PaymentAmount::Usd {
                amount_usd,
                fx_rate,
            } => amount_usd * fx_rate,
        }
    }
}

/// One supplier order inside a container: paperwork identity, up to two
/// payments (deposit and balance), and the extracted line items.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierOrder {
    pub supplier_name: String,
    pub order_number: String,
    #[serde(default)]
    pub payments: Vec<Payment>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

impl SupplierOrder {
    /// Total paid for this order in EUR, across all payments.
    pub fn total_paid_eur(&self) -> f64 {
        self.payments.iter().map(Payment::in_eur).sum()
    }

    /// Total USD value of quantity-positive line items.
    pub fn total_value_usd(&self) -> f64 {
        self.line_items
            .iter()
            .filter(|i| i.quantity > 0)
            .map(|i| i.quantity as f64 * i.unit_price_usd)
            .sum()
    }
}

/// Container-level freight and volume totals.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerInfo {
    pub container_id: String,
    pub total_freight_eur: f64,
    /// If zero, the allocator derives it from the line items' CBM sum.
    pub total_cbm: f64,
}

/// One output row of the landed-cost report, per matched line item.
/// Per-unit figures are rounded to 4 decimals, totals to 2.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostRow {
    pub ean: String,
    pub product: String,
    pub supplier: String,
    pub order_number: String,
    pub category: String,
    pub quantity: u32,
    pub cbm: f64,
    pub unit_price_usd: f64,
    pub product_cost_per_unit_eur: f64,
    pub shipping_cost_per_unit_eur: f64,
    pub duty_rate_percent: f64,
    pub import_duty_per_unit_eur: f64,
    pub landed_cost_per_unit_eur: f64,
    pub total_value_eur: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_text_roundtrip() {
        assert_eq!(Cell::from("TP-MA4U4E").as_text(), "TP-MA4U4E");
        assert_eq!(Cell::Number(1800.0).as_text(), "1800");
        assert_eq!(Cell::Number(4.25).as_text(), "4.25");
        assert_eq!(Cell::Empty.as_text(), "");
        assert!(Cell::from("   ").is_empty());
    }

    #[test]
    fn test_grid_row_text_skips_empties() {
        let grid = Grid::new(vec![vec![
            Cell::from("TP-MA4U4E"),
            Cell::Empty,
            Cell::Number(1800.0),
        ]]);
        assert_eq!(grid.row_text(0), "TP-MA4U4E 1800");
        assert_eq!(grid.row_text(5), "");
    }

    #[test]
    fn test_payment_conversion() {
        assert_eq!(Payment::eur(900.0).in_eur(), 900.0);
        let usd = Payment::usd(1000.0, 0.92);
        assert!((usd.in_eur() - 920.0).abs() < 1e-9);
    }

    #[test]
    fn test_order_totals_skip_zero_quantity() {
        let order = SupplierOrder {
            supplier_name: "Toporek".into(),
            order_number: "PO-1".into(),
            payments: vec![Payment::eur(450.0), Payment::eur(450.0)],
            line_items: vec![
                LineItem {
                    product_code: "TP-A".into(),
                    quantity: 100,
                    unit_price_usd: 5.0,
                    ..Default::default()
                },
                LineItem {
                    product_code: "TP-B".into(),
                    quantity: 0,
                    unit_price_usd: 99.0,
                    ..Default::default()
                },
            ],
        };
        assert_eq!(order.total_paid_eur(), 900.0);
        assert_eq!(order.total_value_usd(), 500.0);
    }
}
