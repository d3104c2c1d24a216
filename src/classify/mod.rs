//! Heuristic number classification for loosely formatted document rows.
//!
//! Supplier exports put quantity, carton count, unit price and volume in
//! columns whose position varies per document. Instead of trusting column
//! positions, each parser declares an ordered table of magnitude bands and
//! this module assigns the row's numeric candidates to slots.
//!
//! The assignment is heuristic by design: a value can satisfy two bands, and
//! a slot is not reassigned once taken (except where a band explicitly keeps
//! the largest/last candidate). Ambiguous rows can misclassify; that is an
//! accepted limitation of the source documents, not something to paper over.

use crate::models::Cell;
use std::collections::HashMap;

/// Extract a numeric value from a raw cell, stripping thousands separators,
/// currency symbols and stray encoding artifacts. Unparseable cells yield
/// `None` and drop out of the candidate pool.
pub fn clean_number(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number(n) => Some(*n),
        Cell::Empty => None,
        Cell::Text(s) => {
            // "â‚¬" is the euro sign seen through a wrong-codepage export
            let cleaned: String = s
                .trim()
                .replace("â‚¬", "")
                .chars()
                .filter(|c| !matches!(c, ',' | '$' | '€'))
                .collect();
            cleaned.trim().parse::<f64>().ok()
        }
    }
}

/// All positive numeric candidates of a row, in cell order.
pub fn row_numbers(row: &[Cell]) -> Vec<f64> {
    row.iter()
        .filter_map(clean_number)
        .filter(|n| *n > 0.0)
        .collect()
}

/// Integer-vs-decimal shape requirement for a band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Whole numbers only (quantities, carton counts).
    Integral,
    /// Must carry a fractional part (volumes).
    Fractional,
    /// No shape requirement (unit prices).
    Any,
}

impl Shape {
    fn accepts(&self, n: f64) -> bool {
        match self {
            Shape::Integral => n.fract() == 0.0,
            Shape::Fractional => n.fract() != 0.0,
            Shape::Any => true,
        }
    }
}

/// Which candidate wins when several fall into the same band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keep {
    /// First qualifying candidate in iteration order; slot never reassigned.
    First,
    /// Largest qualifying candidate seen across the row.
    Largest,
    /// Last qualifying candidate in iteration order.
    Last,
}

/// Candidate iteration order over the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillOrder {
    /// Candidates as they appear in the row.
    RowOrder,
    /// Candidates sorted descending, largest first.
    LargestFirst,
}

/// One magnitude band: open interval plus a shape requirement.
#[derive(Debug, Clone, Copy)]
pub struct NumberBand {
    pub slot: &'static str,
    pub min: f64,
    pub max: f64,
    pub shape: Shape,
    pub keep: Keep,
}

impl NumberBand {
    pub const fn new(slot: &'static str, min: f64, max: f64, shape: Shape, keep: Keep) -> Self {
        Self {
            slot,
            min,
            max,
            shape,
            keep,
        }
    }

    fn accepts(&self, n: f64) -> bool {
        n > self.min && n < self.max && self.shape.accepts(n)
    }
}

/// An ordered band table owned by one parser strategy.
#[derive(Debug, Clone, Copy)]
pub struct BandSet {
    pub order: FillOrder,
    pub bands: &'static [NumberBand],
}

impl BandSet {
    pub const fn new(order: FillOrder, bands: &'static [NumberBand]) -> Self {
        Self { order, bands }
    }

    /// Assign the row's candidates to slots. Each candidate goes to the
    /// first band (in declaration order) that accepts it and whose slot is
    /// still open under the band's `Keep` rule.
    pub fn classify(&self, numbers: &[f64]) -> Slots {
        let mut candidates = numbers.to_vec();
        if self.order == FillOrder::LargestFirst {
            candidates.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
        }

        let mut slots: HashMap<&'static str, f64> = HashMap::new();
        for &n in &candidates {
            for band in self.bands {
                if !band.accepts(n) {
                    continue;
                }
                match (band.keep, slots.get(band.slot)) {
                    (_, None) => {
                        slots.insert(band.slot, n);
                    }
                    (Keep::First, Some(_)) => continue, // taken, try next band
                    (Keep::Largest, Some(&prev)) => {
                        if n > prev {
                            slots.insert(band.slot, n);
                        }
                    }
                    (Keep::Last, Some(_)) => {
                        slots.insert(band.slot, n);
                    }
                }
                break;
            }
        }
        Slots(slots)
    }
}

/// Classified slot values for one row.
#[derive(Debug, Clone, Default)]
pub struct Slots(HashMap<&'static str, f64>);

impl Slots {
    pub fn get(&self, slot: &str) -> Option<f64> {
        self.0.get(slot).copied()
    }

    pub fn get_u32(&self, slot: &str) -> Option<u32> {
        self.get(slot).map(|n| n as u32)
    }
}
