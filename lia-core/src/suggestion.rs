//! Land improvement suggestions.
//!
//! A fixed rule table evaluated in priority order; the first rule whose
//! condition holds wins. Every `(label, greenness)` pair matches exactly one
//! rule because the last one is unconditional.
//!
//! The suggestion list and the cost list of a rule are sized independently
//! (the forest rule has two suggestions but a single cost). Consumers that
//! need them side by side use [`SuggestionSet::pairs`], which truncates to
//! the shorter list.

use serde::{Deserialize, Serialize};

/// Below this greenness the land is treated as arid regardless of label.
pub const ARID_GREENNESS: f64 = 0.1;
/// Above this greenness the land is treated as cropland (after the forest check).
pub const CROPLAND_GREENNESS: f64 = 0.3;

/// An estimated line item: (item name, cost in rupees).
pub type CostItem = (String, u32);

/// Suggestions and cost estimates for one analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionSet {
    pub suggestions: Vec<String>,
    pub costs: Vec<CostItem>,
}

impl SuggestionSet {
    /// Suggestions paired positionally with cost items, stopping at the
    /// shorter of the two lists.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &CostItem)> {
        self.suggestions
            .iter()
            .map(String::as_str)
            .zip(self.costs.iter())
    }
}

/// The rules of the suggestion table, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Label mentions "desert", or greenness below [`ARID_GREENNESS`]
    Arid,
    /// Label mentions "forest"
    Forest,
    /// Label mentions "field" or "farm", or greenness above [`CROPLAND_GREENNESS`]
    Cropland,
    /// Anything else
    Fallback,
}

impl Rule {
    /// Find the first rule matching a classifier label and greenness index.
    ///
    /// Label matching is a case-sensitive substring test. A NaN greenness
    /// fails both threshold comparisons, so only the label decides.
    pub fn matching(label: &str, greenness: f64) -> Rule {
        if label.contains("desert") || greenness < ARID_GREENNESS {
            Rule::Arid
        } else if label.contains("forest") {
            Rule::Forest
        } else if label.contains("field") || label.contains("farm") || greenness > CROPLAND_GREENNESS
        {
            Rule::Cropland
        } else {
            Rule::Fallback
        }
    }

    fn suggestions(self) -> &'static [&'static str] {
        match self {
            Rule::Arid => &["Drought-resistant plants", "Rainwater harvesting", "Solar panels"],
            Rule::Forest => &["Agroforestry", "Conserve biodiversity"],
            Rule::Cropland => &["Crop rotation", "Drip irrigation", "Organic compost"],
            Rule::Fallback => &["Solar power setup", "Recharge pit"],
        }
    }

    fn costs(self) -> &'static [(&'static str, u32)] {
        match self {
            Rule::Arid => &[("Rainwater Tank", 2500), ("Solar Panels per acre", 500000)],
            Rule::Forest => &[("Agroforestry Setup", 2500)],
            Rule::Cropland => &[("Drip Irrigation", 1000), ("Compost", 800)],
            Rule::Fallback => &[("Solar Setup", 450000), ("Water Pit", 2000)],
        }
    }

    /// The suggestions and cost estimates this rule produces.
    pub fn suggestion_set(self) -> SuggestionSet {
        SuggestionSet {
            suggestions: self.suggestions().iter().map(|s| s.to_string()).collect(),
            costs: self
                .costs()
                .iter()
                .map(|(item, cost)| (item.to_string(), *cost))
                .collect(),
        }
    }
}

/// Map a land type label and greenness index to suggestions and costs.
pub fn suggest(label: &str, greenness: f64) -> SuggestionSet {
    Rule::matching(label, greenness).suggestion_set()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desert_label_low_greenness() {
        let set = suggest("desert_sand", 0.05);
        assert_eq!(
            set.suggestions,
            vec!["Drought-resistant plants", "Rainwater harvesting", "Solar panels"]
        );
        assert_eq!(
            set.costs,
            vec![
                ("Rainwater Tank".to_string(), 2500),
                ("Solar Panels per acre".to_string(), 500000)
            ]
        );
    }

    #[test]
    fn test_farm_field_high_greenness() {
        let set = suggest("farm_field", 0.4);
        assert_eq!(
            set.suggestions,
            vec!["Crop rotation", "Drip irrigation", "Organic compost"]
        );
        assert_eq!(set.costs.len(), 2);
    }

    #[test]
    fn test_lake_mid_greenness_falls_back() {
        let set = suggest("lake", 0.2);
        assert_eq!(set.suggestions, vec!["Solar power setup", "Recharge pit"]);
        assert_eq!(
            set.costs,
            vec![("Solar Setup".to_string(), 450000), ("Water Pit".to_string(), 2000)]
        );
    }

    #[test]
    fn test_rule_priority() {
        // Low greenness beats a forest label
        assert_eq!(Rule::matching("rainforest", 0.0), Rule::Arid);
        // Forest label beats high greenness
        assert_eq!(Rule::matching("rainforest", 0.9), Rule::Forest);
        // Desert label beats high greenness
        assert_eq!(Rule::matching("desert_farm", 0.9), Rule::Arid);
        // Greenness alone selects cropland
        assert_eq!(Rule::matching("alp", 0.31), Rule::Cropland);
    }

    #[test]
    fn test_thresholds_are_strict() {
        assert_eq!(Rule::matching("lake", ARID_GREENNESS), Rule::Fallback);
        assert_eq!(Rule::matching("lake", CROPLAND_GREENNESS), Rule::Fallback);
    }

    #[test]
    fn test_label_match_is_case_sensitive() {
        assert_eq!(Rule::matching("Desert", 0.2), Rule::Fallback);
        assert_eq!(Rule::matching("cornfield", 0.2), Rule::Cropland);
    }

    #[test]
    fn test_nan_greenness_uses_label_only() {
        assert_eq!(Rule::matching("lake", f64::NAN), Rule::Fallback);
        assert_eq!(Rule::matching("forest_path", f64::NAN), Rule::Forest);
    }

    #[test]
    fn test_deterministic() {
        for (label, greenness) in [("desert", 0.5), ("forest", 0.2), ("farm", 0.2), ("x", 0.2)] {
            assert_eq!(suggest(label, greenness), suggest(label, greenness));
        }
    }

    #[test]
    fn test_pairs_truncate_to_shorter_list() {
        let forest = suggest("forest", 0.2);
        let pairs: Vec<_> = forest.pairs().collect();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0, "Agroforestry");
        assert_eq!(pairs[0].1, &("Agroforestry Setup".to_string(), 2500));

        let arid = suggest("desert", 0.0);
        assert_eq!(arid.pairs().count(), 2);
    }
}
