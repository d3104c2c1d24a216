//! Product matching engine linking supplier paperwork to catalog EANs.
//!
//! A fixed-priority strategy cascade with per-strategy confidence scores,
//! evaluated first-success-wins:
//!
//! 0. Mapped alias (free-text name table)     0.9
//! 1. Exact EAN                               1.0
//! 2. Exact external code                     0.95
//! 3. Exact internal code                     0.95
//! 4. Partial external code                   0.8
//! 5. Simplified-ID similarity / containment  0.75 / 0.7
//! 6. Title similarity, full catalog scan     up to 0.7
//!
//! Lookup indices are built once per catalog load and reused across every
//! match call in the session. Ties within one strategy level resolve by
//! catalog iteration order, except the title scan which tracks the maximum
//! score across the whole catalog.

use crate::models::{Catalog, CatalogEntry, LineItem};
use crate::normalize::{normalize, LevenshteinScorer, SimilarityScorer};
use crate::Error;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which strategy produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    MappedInternalCode,
    ExactEan,
    ExactExternalCode,
    ExactInternalCode,
    PartialExternalCode,
    SimplifiedId,
    PartialSimplifiedId,
    TitleSimilarity,
    /// Operator resolved the item by hand; re-enters the flow as a full
    /// match with confidence 1.0.
    Manual,
}

impl MatchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MappedInternalCode => "mapped_internal_code",
            Self::ExactEan => "exact_ean",
            Self::ExactExternalCode => "exact_external_code",
            Self::ExactInternalCode => "exact_internal_code",
            Self::PartialExternalCode => "partial_external_code",
            Self::SimplifiedId => "simplified_id",
            Self::PartialSimplifiedId => "partial_simplified_id",
            Self::TitleSimilarity => "title_similarity",
            Self::Manual => "manual",
        }
    }
}

/// Ephemeral output of one match call; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub ean: String,
    pub title: String,
    pub category: String,
    pub supplier: String,
    pub internal_code: String,
    pub external_code: String,
    pub cbm: f64,
    pub box_amount: u32,
    pub confidence: f64,
    pub match_method: MatchMethod,
}

impl MatchResult {
    fn from_entry(entry: &CatalogEntry, confidence: f64, method: MatchMethod) -> Self {
        Self {
            ean: entry.ean.clone(),
            title: entry.title.clone(),
            category: entry.category.clone(),
            supplier: entry.supplier.clone(),
            internal_code: entry.internal_code.clone(),
            external_code: entry.external_code.clone(),
            cbm: entry.cbm,
            box_amount: entry.box_amount,
            confidence,
            match_method: method,
        }
    }

    /// Carry the match over onto a line item (EAN and category).
    pub fn apply_to(&self, item: &mut LineItem) {
        item.ean = Some(self.ean.clone());
        item.category = Some(self.category.clone());
    }
}

/// Aggregate statistics over one batch of match results. Purely
/// descriptive, no side effects.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSummary {
    pub total: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub match_rate: f64,
    pub high_confidence_rate: f64,
    pub by_method: HashMap<MatchMethod, usize>,
}

impl MatchSummary {
    pub fn from_results(results: &[(&LineItem, Option<MatchResult>)]) -> Self {
        let total = results.len();
        let matched = results.iter().filter(|(_, m)| m.is_some()).count();
        let high_confidence = results
            .iter()
            .filter(|(_, m)| m.as_ref().is_some_and(|m| m.confidence >= 0.8))
            .count();

        let mut by_method: HashMap<MatchMethod, usize> = HashMap::new();
        for (_, m) in results {
            if let Some(m) = m {
                *by_method.entry(m.match_method).or_insert(0) += 1;
            }
        }

        Self {
            total,
            matched,
            unmatched: total - matched,
            match_rate: if total > 0 {
                matched as f64 / total as f64
            } else {
                0.0
            },
            high_confidence_rate: if total > 0 {
                high_confidence as f64 / total as f64
            } else {
                0.0
            },
            by_method,
        }
    }
}

/// Free-text product names seen on supplier paperwork, mapped to internal
/// codes. Order matters: earlier entries win when one name prefixes another.
const ALIAS_TABLE: &[(&str, &str)] = &[
    ("power s7", "VS0711"),
    ("power s8", "VS0811"),
    ("power s9", "VS0911"),
    ("power s12", "VS1211"),
    ("power s12c", "VS12C"),
    ("power s65", "VS6511"),
    ("power s100", "VS10011"),
    ("power cube s5", "VS0511"),
    ("power cube s6", "VS0611"),
    ("power cube s6-w", "VS0621"),
    ("power cube s6-5m", "VS0651"),
    ("power cube s6-3m", "VS0631"),
    ("split x2", "VX0212"),
    ("split x3", "VX0312"),
    ("split x4", "VX0412"),
    ("split x7", "VX0712"),
    ("power s2", "VS0211"),
    ("office t3", "VT0311"),
    ("travel y711", "VY711"),
    ("travel y712", "VY712"),
    ("travel y713", "VY713"),
    ("travel y714", "VY714"),
];

/// Dutch/English color name pairs swapped during search-text expansion.
const COLOR_SWAPS: &[(&str, &str)] = &[
    ("zwart", "black"),
    ("wit", "white"),
    ("grijs", "grey"),
    ("zilver", "silver"),
];

/// Expand free-form search text into alias-mapped codes and locale color
/// variants. The original text itself is not part of the expansion; exact
/// code hits belong to the later cascade levels with their own confidences.
pub fn expand_search_text(text: &str) -> Vec<String> {
    let lower = text.trim().to_lowercase();
    let mut terms = Vec::new();

    for (name, code) in ALIAS_TABLE {
        if lower.contains(name) {
            terms.push((*code).to_string());
        }
    }

    for (nl, en) in COLOR_SWAPS {
        if lower.contains(nl) {
            terms.push(lower.replace(nl, en));
        }
        if lower.contains(en) {
            terms.push(lower.replace(en, nl));
        }
    }

    terms
}

/// The matching engine. Holds the catalog by reference plus lookup indices
/// built once at construction; rebuilding per call is disallowed.
pub struct ProductMatcher<'a, S: SimilarityScorer = LevenshteinScorer> {
    catalog: &'a Catalog,
    scorer: S,
    ean_index: IndexMap<String, usize>,
    external_code_index: IndexMap<String, usize>,
    internal_code_index: IndexMap<String, usize>,
    simplified_id_index: IndexMap<String, usize>,
}

impl<'a> ProductMatcher<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self::with_scorer(catalog, LevenshteinScorer)
    }
}

impl<'a, S: SimilarityScorer> ProductMatcher<'a, S> {
    pub fn with_scorer(catalog: &'a Catalog, scorer: S) -> Self {
        let mut ean_index = IndexMap::new();
        let mut external_code_index = IndexMap::new();
        let mut internal_code_index = IndexMap::new();
        let mut simplified_id_index = IndexMap::new();

        for (idx, entry) in catalog.entries().iter().enumerate() {
            let ean = entry.ean.trim();
            if !ean.is_empty() {
                ean_index.insert(ean.to_string(), idx);
            }
            let ext = normalize(&entry.external_code);
            if !ext.is_empty() {
                external_code_index.insert(ext, idx);
            }
            let int = normalize(&entry.internal_code);
            if !int.is_empty() {
                internal_code_index.insert(int, idx);
            }
            let simp = normalize(&entry.simplified_id);
            if !simp.is_empty() {
                simplified_id_index.insert(simp, idx);
            }
        }

        Self {
            catalog,
            scorer,
            ean_index,
            external_code_index,
            internal_code_index,
            simplified_id_index,
        }
    }

    fn result(&self, idx: usize, confidence: f64, method: MatchMethod) -> Option<MatchResult> {
        let entry = self.catalog.get(idx)?;
        log::debug!(
            "matched {:?} via {} (confidence {})",
            entry.ean,
            method.as_str(),
            confidence
        );
        Some(MatchResult::from_entry(entry, confidence, method))
    }

    /// Find the best catalog entry for a free-text search key. `None` means
    /// unmatched, a recoverable state for manual resolution.
    pub fn match_product(
        &self,
        search_text: &str,
        supplier_hint: Option<&str>,
    ) -> Option<MatchResult> {
        let search_text = search_text.trim();
        if search_text.is_empty() {
            return None;
        }
        let search_normalized = normalize(search_text);

        // Strategy 0: mapped aliases and locale color swaps
        for term in expand_search_text(search_text) {
            if let Some(&idx) = self.internal_code_index.get(&normalize(&term)) {
                return self.result(idx, 0.9, MatchMethod::MappedInternalCode);
            }
        }

        // Strategy 1: exact EAN
        if search_text.len() == 13 && search_text.chars().all(|c| c.is_ascii_digit()) {
            if let Some(&idx) = self.ean_index.get(search_text) {
                return self.result(idx, 1.0, MatchMethod::ExactEan);
            }
        }

        // An all-punctuation key normalizes to nothing and would
        // containment-match every code below
        if search_normalized.is_empty() {
            return self.match_by_title(search_text, supplier_hint);
        }

        // Strategy 2: exact external code
        if let Some(&idx) = self.external_code_index.get(&search_normalized) {
            return self.result(idx, 0.95, MatchMethod::ExactExternalCode);
        }

        // Strategy 3: exact internal code
        if let Some(&idx) = self.internal_code_index.get(&search_normalized) {
            return self.result(idx, 0.95, MatchMethod::ExactInternalCode);
        }

        // Strategy 4: partial external code, supplier-filtered when hinted
        for (ext_code, &idx) in &self.external_code_index {
            if search_normalized.contains(ext_code.as_str())
                || ext_code.contains(&search_normalized)
            {
                if let Some(hint) = supplier_hint {
                    let supplier = self
                        .catalog
                        .get(idx)
                        .map(|e| e.supplier.to_lowercase())
                        .unwrap_or_default();
                    if !supplier.contains(&hint.to_lowercase()) {
                        continue;
                    }
                }
                return self.result(idx, 0.8, MatchMethod::PartialExternalCode);
            }
        }

        // Strategy 5: simplified-ID similarity, then containment
        for (simp_id, &idx) in &self.simplified_id_index {
            if self.scorer.ratio(&search_normalized, simp_id) > 0.8 {
                return self.result(idx, 0.75, MatchMethod::SimplifiedId);
            }
            if search_normalized.contains(simp_id.as_str()) {
                return self.result(idx, 0.7, MatchMethod::PartialSimplifiedId);
            }
        }

        // Strategy 6: title similarity, last resort
        self.match_by_title(search_text, supplier_hint)
    }

    /// Full-catalog title scan. O(catalog size) per call; accepted cost for
    /// the recall it buys on free-text descriptions.
    fn match_by_title(&self, search_text: &str, supplier_hint: Option<&str>) -> Option<MatchResult> {
        let mut best: Option<usize> = None;
        let mut best_score = 0.5; // minimum threshold

        for (idx, entry) in self.catalog.entries().iter().enumerate() {
            let mut score = self.scorer.ratio(search_text, &entry.title);

            if let Some(hint) = supplier_hint {
                if entry.supplier.to_lowercase().contains(&hint.to_lowercase()) {
                    score += 0.1;
                }
            }

            if score > best_score {
                best_score = score;
                best = Some(idx);
            }
        }

        best.and_then(|idx| self.result(idx, best_score.min(0.7), MatchMethod::TitleSimilarity))
    }

    /// Match a batch of line items independently; results stay paired with
    /// their input item. Product code is the search key, falling back to the
    /// description when the code is blank.
    pub fn match_batch<'b>(
        &self,
        items: &'b [LineItem],
        supplier_hint: Option<&str>,
    ) -> Vec<(&'b LineItem, Option<MatchResult>)> {
        items
            .iter()
            .map(|item| {
                let search_text = if item.product_code.trim().is_empty() {
                    item.description.as_str()
                } else {
                    item.product_code.as_str()
                };
                (item, self.match_product(search_text, supplier_hint))
            })
            .collect()
    }

    /// Operator override for an unmatched item: resolve by EAN directly.
    pub fn manual(&self, ean: &str) -> Result<MatchResult, Error> {
        let idx = self
            .ean_index
            .get(ean.trim())
            .copied()
            .ok_or_else(|| Error::UnknownEan(ean.trim().to_string()))?;
        let entry = self.catalog.get(idx).ok_or_else(|| Error::UnknownEan(ean.to_string()))?;
        Ok(MatchResult::from_entry(entry, 1.0, MatchMethod::Manual))
    }
}
