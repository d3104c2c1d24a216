//! Import duty configuration per product category.
//!
//! The allocator reads a snapshot of this table; it never mutates one. The
//! environment's settings editor owns persistence and hands a fresh snapshot
//! in after operator edits.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Duty rate and HS code for one category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DutyRate {
    /// Percentage in [0, 100].
    pub duty_rate: f64,
    pub hs_code: String,
}

impl DutyRate {
    pub fn new(duty_rate: f64, hs_code: &str) -> Self {
        Self {
            duty_rate,
            hs_code: hs_code.to_string(),
        }
    }
}

/// Built-in defaults used when no external configuration is supplied.
const DEFAULT_CATEGORIES: &[(&str, f64, &str)] = &[
    ("Stekkerdoos", 2.7, "8536690000"),
    ("Verdeelstekker", 2.7, "8536690000"),
    ("Reisstekker", 2.7, "8536690000"),
    ("Laptop Stand", 6.0, "7616999000"),
    ("Kabel", 0.0, "8544429000"),
    ("Powerbank", 0.0, "8507600000"),
    ("Snellader", 0.0, "8504409000"),
    ("Hub", 0.0, "8471800000"),
    ("Draadloze oplader", 0.0, "8504409000"),
    ("Other", 0.0, ""),
];

/// Category → duty configuration mapping. Insertion-ordered so the settings
/// view lists categories stably.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DutyTable {
    categories: IndexMap<String, DutyRate>,
}

impl Default for DutyTable {
    fn default() -> Self {
        let categories = DEFAULT_CATEGORIES
            .iter()
            .map(|(name, rate, hs)| (name.to_string(), DutyRate::new(*rate, hs)))
            .collect();
        Self { categories }
    }
}

impl DutyTable {
    pub fn empty() -> Self {
        Self {
            categories: IndexMap::new(),
        }
    }

    pub fn get(&self, category: &str) -> Option<&DutyRate> {
        self.categories.get(category)
    }

    /// Duty percentage for a category; unknown categories pay nothing.
    pub fn rate_percent(&self, category: &str) -> f64 {
        self.get(category).map(|r| r.duty_rate).unwrap_or(0.0)
    }

    pub fn set(&mut self, category: &str, rate: DutyRate) {
        self.categories.insert(category.to_string(), rate);
    }

    pub fn remove(&mut self, category: &str) -> Option<DutyRate> {
        self.categories.shift_remove(category)
    }

    /// Add zero-rate entries for catalog categories the table does not know
    /// yet, so the operator sees every category in the settings view.
    pub fn ensure_categories<'a>(&mut self, categories: impl IntoIterator<Item = &'a str>) {
        for cat in categories {
            if !cat.is_empty() && !self.categories.contains_key(cat) {
                self.categories
                    .insert(cat.to_string(), DutyRate::default());
            }
        }
    }

    pub fn categories(&self) -> impl Iterator<Item = (&str, &DutyRate)> {
        self.categories.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let table = DutyTable::default();
        assert_eq!(table.rate_percent("Stekkerdoos"), 2.7);
        assert_eq!(table.rate_percent("Laptop Stand"), 6.0);
        assert_eq!(table.get("Laptop Stand").unwrap().hs_code, "7616999000");
        assert_eq!(table.rate_percent("Other"), 0.0);
        assert_eq!(table.categories().count(), 10);
    }

    #[test]
    fn test_unknown_category_pays_nothing() {
        assert_eq!(DutyTable::default().rate_percent("Mystery"), 0.0);
    }

    #[test]
    fn test_ensure_categories_adds_zero_rate() {
        let mut table = DutyTable::default();
        table.ensure_categories(["Adapters", "Stekkerdoos", ""]);
        assert_eq!(table.rate_percent("Adapters"), 0.0);
        // Existing entries keep their configured rate
        assert_eq!(table.rate_percent("Stekkerdoos"), 2.7);
        assert_eq!(table.categories().count(), 11);
    }

    #[test]
    fn test_json_roundtrip() {
        let table = DutyTable::default();
        let json = serde_json::to_string(&table).unwrap();
        let back: DutyTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
    }
}
