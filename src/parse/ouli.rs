//! Ouli / Ouliyo document parser.
//!
//! Their documents have no reliable column positions at all, so both CI and
//! PL work purely from pattern-extracted product codes plus magnitude-band
//! number classification. The CI classifies candidates in row order, the PL
//! largest-first; the two orders come from the real documents and are kept
//! separate on purpose.

use super::{find_header_row, is_total_row, SupplierFormat, SupplierParser};
use crate::classify::{row_numbers, BandSet, FillOrder, Keep, NumberBand, Shape};
use crate::models::{Grid, LineItem};
use once_cell::sync::Lazy;
use regex::Regex;

static CI_CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)OL-[A-Z0-9-]+").unwrap());
static CI_VOOMY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)V[YX]\d+").unwrap());
static PL_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(OL-[A-Z0-9-]+|Y\d{3}/OL-[A-Z0-9]+)").unwrap());

/// CI bands, row order: quantity keeps the largest integral candidate, unit
/// price the last candidate under 100.
const CI_BANDS: BandSet = BandSet::new(
    FillOrder::RowOrder,
    &[
        NumberBand::new("qty", 1.0, 50000.0, Shape::Integral, Keep::Largest),
        NumberBand::new("unit_price", 0.0, 100.0, Shape::Any, Keep::Last),
    ],
);

/// PL bands, largest-first. Tighter carton and volume ceilings than Toporek.
const PL_BANDS: BandSet = BandSet::new(
    FillOrder::LargestFirst,
    &[
        NumberBand::new("qty", 10.0, 50000.0, Shape::Integral, Keep::First),
        NumberBand::new("cartons", 1.0, 500.0, Shape::Integral, Keep::First),
        NumberBand::new("cbm", 0.0, 50.0, Shape::Fractional, Keep::First),
    ],
);

pub struct OuliParser;

impl SupplierParser for OuliParser {
    fn format(&self) -> SupplierFormat {
        SupplierFormat::Ouli
    }

    fn parse_ci(&self, grid: &Grid) -> Vec<LineItem> {
        let mut items = Vec::new();

        let Some(header_row) = find_header_row(grid, |t| {
            t.contains("item") && (t.contains("qty") || t.contains("quantity"))
        }) else {
            return items;
        };

        for idx in (header_row + 1)..grid.rows.len() {
            let row_text = grid.row_text(idx);
            if is_total_row(&row_text) {
                continue;
            }

            let product_code = CI_CODE_RE
                .find(&row_text)
                .or_else(|| CI_VOOMY_RE.find(&row_text))
                .map(|m| m.as_str().to_string());
            let Some(product_code) = product_code else {
                continue;
            };

            let slots = CI_BANDS.classify(&row_numbers(&grid.rows[idx]));
            let Some(qty) = slots.get_u32("qty") else {
                continue;
            };

            items.push(LineItem {
                product_code: product_code.clone(),
                description: product_code,
                quantity: qty,
                unit_price_usd: slots.get("unit_price").unwrap_or(0.0),
                cbm: 0.0,
                ..Default::default()
            });
        }

        items
    }

    fn parse_pl(&self, grid: &Grid) -> Vec<LineItem> {
        let mut items = Vec::new();

        let Some(header_row) =
            find_header_row(grid, |t| t.contains("item") || t.contains("model"))
        else {
            return items;
        };

        for idx in (header_row + 1)..grid.rows.len() {
            let row_text = grid.row_text(idx);
            if is_total_row(&row_text) {
                continue;
            }

            let Some(m) = PL_CODE_RE.find(&row_text) else {
                continue;
            };
            let product_code = m.as_str().to_string();

            let slots = PL_BANDS.classify(&row_numbers(&grid.rows[idx]));
            let Some(qty) = slots.get_u32("qty") else {
                continue;
            };

            items.push(LineItem {
                product_code: product_code.clone(),
                description: product_code,
                quantity: qty,
                unit_price_usd: 0.0,
                cbm: slots.get("cbm").unwrap_or(0.0),
                cartons: slots.get_u32("cartons"),
                ..Default::default()
            });
        }

        items
    }
}
