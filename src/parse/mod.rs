//! Document parsers for supplier CI and PL formats.
//!
//! Each known supplier layout gets its own strategy implementing
//! [`SupplierParser`]; a new supplier format means a new strategy, never a
//! branch inside an existing one. The format is sniffed from the document's
//! flattened text, and unknown layouts fall back to the generic parser.

pub mod generic;
pub mod merge;
pub mod ouli;
pub mod toporek;

pub use merge::merge_ci_pl;

use crate::models::{DocKind, Grid, LineItem};

/// Known supplier layouts plus the generic fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupplierFormat {
    /// Toporek / Ainisi documents.
    Toporek,
    /// Ouli / Ouliyo documents.
    Ouli,
    /// Youji / Guangzhou documents. Recognized, but no dedicated column
    /// heuristics exist yet; parsing goes through the generic strategy.
    Youji,
    Generic,
}

/// One parser strategy: shared input/output contract, own column-role
/// heuristics and regex vocabulary.
pub trait SupplierParser {
    fn format(&self) -> SupplierFormat;

    /// Parse a Commercial Invoice: prices present, volume absent.
    fn parse_ci(&self, grid: &Grid) -> Vec<LineItem>;

    /// Parse a Packing List: volume present, prices absent.
    fn parse_pl(&self, grid: &Grid) -> Vec<LineItem>;

    fn parse(&self, grid: &Grid, kind: DocKind) -> Vec<LineItem> {
        match kind {
            DocKind::CommercialInvoice => self.parse_ci(grid),
            DocKind::PackingList => self.parse_pl(grid),
        }
    }
}

/// Classify a document into a supplier format by keyword sniffing over its
/// full flattened text.
pub fn detect_supplier_format(grid: &Grid) -> SupplierFormat {
    let text = grid.full_text().to_lowercase();

    if text.contains("ainisi") || text.contains("toporek") {
        SupplierFormat::Toporek
    } else if text.contains("ouli") || text.contains("ouliyo") {
        SupplierFormat::Ouli
    } else if text.contains("youji") || text.contains("guangzhou") {
        SupplierFormat::Youji
    } else {
        SupplierFormat::Generic
    }
}

/// Resolve a format to its parser strategy.
pub fn parser_for(format: SupplierFormat) -> Box<dyn SupplierParser> {
    match format {
        SupplierFormat::Toporek => Box::new(toporek::ToporekParser),
        SupplierFormat::Ouli => Box::new(ouli::OuliParser),
        // No dedicated Youji heuristics yet; generic handles it.
        SupplierFormat::Youji | SupplierFormat::Generic => Box::new(generic::GenericParser),
    }
}

/// Detect the format and parse in one step.
pub fn parse_document(grid: &Grid, kind: DocKind) -> Vec<LineItem> {
    let format = detect_supplier_format(grid);
    log::debug!("detected supplier format {:?}", format);
    parser_for(format).parse(grid, kind)
}

/// Fixed color vocabulary seen on packing lists (English and Dutch).
pub(crate) const COLORS: &[&str] = &["Black", "White", "Grey", "Zwart", "Wit", "Grijs"];

/// First color from the vocabulary contained in the row text, if any.
pub(crate) fn find_color(row_text: &str) -> Option<String> {
    let lower = row_text.to_lowercase();
    COLORS
        .iter()
        .find(|c| lower.contains(&c.to_lowercase()))
        .map(|c| c.to_string())
}

/// Scan rows top-down for the first one whose lowercased flattened text
/// satisfies the predicate. Absence means the parser emits nothing.
pub(crate) fn find_header_row(grid: &Grid, pred: impl Fn(&str) -> bool) -> Option<usize> {
    (0..grid.rows.len()).find(|&idx| pred(&grid.row_text(idx).to_lowercase()))
}

/// Rows carrying a "total" marker are summary rows, never line items.
pub(crate) fn is_total_row(row_text: &str) -> bool {
    row_text.to_lowercase().contains("total")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Cell;

    fn grid_with(text: &str) -> Grid {
        Grid::new(vec![vec![Cell::from(text)]])
    }

    #[test]
    fn test_detect_supplier_format() {
        assert_eq!(
            detect_supplier_format(&grid_with("AINISI ELECTRONICS CO LTD")),
            SupplierFormat::Toporek
        );
        assert_eq!(
            detect_supplier_format(&grid_with("Shenzhen Ouliyo Trading")),
            SupplierFormat::Ouli
        );
        assert_eq!(
            detect_supplier_format(&grid_with("Guangzhou Youji Imports")),
            SupplierFormat::Youji
        );
        assert_eq!(
            detect_supplier_format(&grid_with("Some Unknown Supplier")),
            SupplierFormat::Generic
        );
    }

    #[test]
    fn test_find_color_fixed_order() {
        assert_eq!(find_color("TP-MA4U4E zwart 1800"), Some("Zwart".into()));
        assert_eq!(find_color("something WHITE"), Some("White".into()));
        assert_eq!(find_color("no color here"), None);
    }

    #[test]
    fn test_header_row_first_match_wins() {
        let grid = Grid::new(vec![
            vec![Cell::from("Commercial Invoice")],
            vec![Cell::from("Description"), Cell::from("QTY")],
            vec![Cell::from("Description"), Cell::from("QTY")],
        ]);
        let idx = find_header_row(&grid, |t| t.contains("description") && t.contains("qty"));
        assert_eq!(idx, Some(1));
    }

    #[test]
    fn test_total_row_marker() {
        assert!(is_total_row("TOTAL 5600 23.8"));
        assert!(!is_total_row("TP-MA4U4E Black 1800"));
    }
}
