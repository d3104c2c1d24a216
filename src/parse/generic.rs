//! Generic fallback parser for unknown supplier formats.
//!
//! No header detection: every row is tried against a priority-ordered list
//! of product-code regexes, and the largest whole number under the quantity
//! ceiling becomes the quantity. Rows without a recognizable code or
//! quantity are skipped silently.

use super::{SupplierFormat, SupplierParser};
use crate::classify::{row_numbers, BandSet, FillOrder, Keep, NumberBand, Shape};
use crate::models::{Grid, LineItem};
use once_cell::sync::Lazy;
use regex::Regex;

/// Candidate product-code patterns, tried in priority order.
static CODE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)TP-[A-Z0-9-]+",
        r"(?i)OL-[A-Z0-9-]+",
        r"(?i)V[XSTC]\d{4}",
        r"(?i)[A-Z]{2,4}-[A-Z0-9]{4,}",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Words that mark header/footer/boilerplate rows.
const SKIP_MARKERS: &[&str] = &["total", "invoice", "date", "address", "bank"];

const BANDS: BandSet = BandSet::new(
    FillOrder::RowOrder,
    &[NumberBand::new(
        "qty",
        0.0,
        50000.0,
        Shape::Integral,
        Keep::Largest,
    )],
);

pub struct GenericParser;

impl GenericParser {
    fn parse_any(&self, grid: &Grid) -> Vec<LineItem> {
        let mut items = Vec::new();

        for idx in 0..grid.rows.len() {
            let row_text = grid.row_text(idx);
            let lower = row_text.to_lowercase();
            if SKIP_MARKERS.iter().any(|m| lower.contains(m)) {
                continue;
            }

            let product_code = CODE_PATTERNS
                .iter()
                .find_map(|re| re.find(&row_text))
                .map(|m| m.as_str().to_string());
            let Some(product_code) = product_code else {
                continue;
            };

            let slots = BANDS.classify(&row_numbers(&grid.rows[idx]));
            let Some(qty) = slots.get_u32("qty") else {
                continue;
            };
            if qty == 0 {
                continue;
            }

            items.push(LineItem {
                product_code: product_code.clone(),
                description: product_code,
                quantity: qty,
                unit_price_usd: 0.0,
                cbm: 0.0,
                ..Default::default()
            });
        }

        items
    }
}

impl SupplierParser for GenericParser {
    fn format(&self) -> SupplierFormat {
        SupplierFormat::Generic
    }

    // The generic strategy has no notion of CI vs PL columns; both document
    // kinds go through the same code-plus-quantity extraction.
    fn parse_ci(&self, grid: &Grid) -> Vec<LineItem> {
        self.parse_any(grid)
    }

    fn parse_pl(&self, grid: &Grid) -> Vec<LineItem> {
        self.parse_any(grid)
    }
}
