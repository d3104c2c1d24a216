//! Toporek / Ainisi document parser.
//!
//! Their CI carries a real header row with named columns, so columns are
//! mapped by header token. Their PL repeats the product code only on the
//! first of several color sub-rows; the code carries forward until the next
//! explicit one.

use super::{find_color, find_header_row, is_total_row, SupplierFormat, SupplierParser};
use crate::classify::{clean_number, row_numbers, BandSet, FillOrder, Keep, NumberBand, Shape};
use crate::models::{Cell, Grid, LineItem};
use once_cell::sync::Lazy;
use regex::Regex;

static PRODUCT_CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)TP-[A-Z0-9-]+").unwrap());

/// Packing-list magnitude bands, filled largest-first.
const PL_BANDS: BandSet = BandSet::new(
    FillOrder::LargestFirst,
    &[
        NumberBand::new("qty", 10.0, 50000.0, Shape::Integral, Keep::First),
        NumberBand::new("cartons", 1.0, 1000.0, Shape::Integral, Keep::First),
        NumberBand::new("cbm", 0.0, 100.0, Shape::Fractional, Keep::First),
    ],
);

/// Column roles found in the CI header row.
#[derive(Debug, Default)]
struct CiColumns {
    description: Option<usize>,
    qty: Option<usize>,
    unit_price: Option<usize>,
    amount: Option<usize>,
}

impl CiColumns {
    fn from_header(header: &[Cell]) -> Self {
        let mut cols = Self::default();
        for (i, cell) in header.iter().enumerate() {
            let h = cell.as_text().to_lowercase();
            if h.contains("description") {
                cols.description.get_or_insert(i);
            } else if h.contains("qty") {
                cols.qty.get_or_insert(i);
            } else if h.contains("unit") && h.contains("price") {
                cols.unit_price.get_or_insert(i);
            } else if h.contains("amount") {
                cols.amount.get_or_insert(i);
            }
        }
        cols
    }
}

pub struct ToporekParser;

impl SupplierParser for ToporekParser {
    fn format(&self) -> SupplierFormat {
        SupplierFormat::Toporek
    }

    fn parse_ci(&self, grid: &Grid) -> Vec<LineItem> {
        let mut items = Vec::new();

        let Some(header_row) =
            find_header_row(grid, |t| t.contains("description") && t.contains("qty"))
        else {
            return items;
        };

        let cols = CiColumns::from_header(&grid.rows[header_row]);

        for idx in (header_row + 1)..grid.rows.len() {
            let row = &grid.rows[idx];
            if is_total_row(&grid.row_text(idx)) {
                continue;
            }

            let cell_at = |col: Option<usize>| col.and_then(|i| row.get(i));
            let desc = cell_at(cols.description)
                .map(|c| c.as_text().trim().to_string())
                .filter(|s| !s.is_empty());
            let qty = cell_at(cols.qty).and_then(clean_number);
            let mut unit_price = cell_at(cols.unit_price).and_then(clean_number);
            let amount = cell_at(cols.amount).and_then(clean_number);

            let (Some(desc), Some(qty)) = (desc, qty) else {
                continue;
            };
            if qty <= 0.0 {
                continue;
            }

            // No unit price column: derive from amount
            if unit_price.is_none() || unit_price == Some(0.0) {
                unit_price = amount.map(|a| a / qty);
            }

            items.push(LineItem {
                product_code: desc.clone(),
                description: desc,
                quantity: qty as u32,
                unit_price_usd: unit_price.unwrap_or(0.0),
                cbm: 0.0, // volume arrives only from the PL
                ..Default::default()
            });
        }

        items
    }

    fn parse_pl(&self, grid: &Grid) -> Vec<LineItem> {
        let mut items = Vec::new();

        let Some(header_row) =
            find_header_row(grid, |t| t.contains("description") || t.contains("carton"))
        else {
            return items;
        };

        let mut current_product: Option<String> = None;

        for idx in (header_row + 1)..grid.rows.len() {
            let row = &grid.rows[idx];
            let row_text = grid.row_text(idx);
            if is_total_row(&row_text) {
                continue;
            }

            if let Some(m) = PRODUCT_CODE_RE.find(&row_text) {
                current_product = Some(m.as_str().to_string());
            }

            let color = find_color(&row_text);
            let slots = PL_BANDS.classify(&row_numbers(row));

            let (Some(product), Some(qty)) = (current_product.clone(), slots.get_u32("qty"))
            else {
                continue;
            };

            let description = match &color {
                Some(c) => format!("{} {}", product, c),
                None => product.clone(),
            };

            items.push(LineItem {
                product_code: product,
                description,
                quantity: qty,
                unit_price_usd: 0.0, // price arrives only from the CI
                cbm: slots.get("cbm").unwrap_or(0.0),
                color,
                cartons: slots.get_u32("cartons"),
                ..Default::default()
            });
        }

        items
    }
}
