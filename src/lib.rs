//! Landed-cost core for multi-supplier ocean freight containers.
//!
//! Computes a per-unit landed cost (product cost + allocated shipping +
//! import duty) for each product in a container, reconciling heterogeneous
//! supplier paperwork (Commercial Invoices, Packing Lists) against a
//! canonical product catalog.
//!
//! Pipeline: raw row/cell grid → format detection → supplier parser → CI/PL
//! merge → product matching against the catalog → landed-cost allocation.
//!
//! The core is synchronous and does no I/O: catalogs, documents, duty
//! settings and container metadata are handed in fully materialized, and
//! the environment owns files, persistence and presentation. On dirty input
//! the core degrades gracefully — unparseable rows are skipped, unmatched
//! items come back as `None`, and division guards replace every zero
//! denominator.

pub mod allocate;
pub mod classify;
pub mod duty;
pub mod matcher;
pub mod models;
pub mod normalize;
pub mod parse;

pub use allocate::allocate;
pub use duty::{DutyRate, DutyTable};
pub use matcher::{MatchMethod, MatchResult, MatchSummary, ProductMatcher};
pub use models::{
    Catalog, CatalogEntry, Cell, ContainerInfo, CostRow, DocKind, Grid, LineItem, Payment,
    SupplierOrder,
};
pub use parse::{detect_supplier_format, merge_ci_pl, parse_document, SupplierFormat};

use thiserror::Error as ThisError;

/// Errors at the library boundary. The core itself favors graceful
/// degradation; the only hard failure is operator misuse.
#[derive(Debug, ThisError)]
pub enum Error {
    /// A manual EAN override named an EAN the catalog does not contain.
    #[error("EAN {0} not present in catalog")]
    UnknownEan(String),
}
