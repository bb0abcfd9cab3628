//! Keyword and pattern heuristics that turn free text into tender fields.
//!
//! Everything here is pure: the same input always yields the same output and
//! nothing touches the network. Matching is case-insensitive substring
//! containment, never word-boundary matching, so a keyword embedded in a
//! longer word still hits (`"it"` matches `"kitchen"`).
//!
//! The keyword tables are injected at construction through
//! [`KeywordTables`], so tests and deployments can substitute their own.

use crate::config::KeywordTables;
use crate::models::{Category, Location};
use crate::utils::title_case;
use once_cell::sync::Lazy;
use regex::Regex;

static CRORE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*cr").unwrap());
static LAKH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*lakh").unwrap());
static BARE_AMOUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:₹|rs\.?|inr)?\s*(\d{5,})").unwrap());

const CRORE: f64 = 10_000_000.0;
const LAKH: f64 = 100_000.0;

/// Text classifiers built over a fixed set of keyword tables.
#[derive(Debug, Clone)]
pub struct Classifiers {
    categories: Vec<(Category, Vec<String>)>,
    regions: Vec<(String, Vec<String>)>,
    default_location: String,
}

impl Default for Classifiers {
    fn default() -> Self {
        Self::new(&KeywordTables::default())
    }
}

impl Classifiers {
    /// Builds classifiers from keyword tables.
    ///
    /// # Arguments
    ///
    /// * `tables` - Category rules, region table and default location
    ///
    /// # Returns
    ///
    /// Classifiers holding lower-cased copies of every keyword, so later
    /// matching only lower-cases the input text.
    pub fn new(tables: &KeywordTables) -> Self {
        let lower = |list: &[String]| list.iter().map(|k| k.to_lowercase()).collect::<Vec<_>>();
        Self {
            categories: tables
                .categories
                .iter()
                .map(|rule| (rule.category, lower(&rule.keywords)))
                .collect(),
            regions: tables
                .regions
                .iter()
                .map(|rule| (rule.region.clone(), lower(&rule.cities)))
                .collect(),
            default_location: tables.default_location.clone(),
        }
    }

    /// The location reported when nothing more specific is known.
    pub fn default_location(&self) -> &str {
        &self.default_location
    }

    /// Classify a title into a [`Category`].
    ///
    /// Rules are tried in table order (Civil, Electrical, Transport, IT by
    /// default); the first rule with any keyword present wins.
    pub fn classify_category(&self, title: &str) -> Category {
        let t = title.to_lowercase();
        self.categories
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| t.contains(k.as_str())))
            .map(|(category, _)| *category)
            .unwrap_or(Category::General)
    }

    /// Find the first region whose city keyword appears in `text`.
    pub fn match_location(&self, text: &str) -> Option<Location> {
        let t = text.to_lowercase();
        self.regions.iter().find_map(|(region, cities)| {
            cities.iter().find(|c| t.contains(c.as_str())).map(|city| {
                let city = title_case(city);
                Location {
                    display: format!("{}, {}", city, region),
                    district: city,
                }
            })
        })
    }

    /// Like [`Self::match_location`] but falls back to the default location,
    /// which then also acts as its own district.
    pub fn detect_location(&self, text: &str) -> Location {
        self.match_location(text).unwrap_or_else(|| self.default_loc())
    }

    pub(crate) fn default_loc(&self) -> Location {
        Location {
            display: self.default_location.clone(),
            district: self.default_location.clone(),
        }
    }

    /// Build the one-line summary shown for a tender.
    pub fn build_summary(&self, category: Category, location: &str) -> String {
        if location.is_empty() || location == self.default_location {
            format!(
                "New {} tender published in {}; exact location not specified.",
                category, self.default_location
            )
        } else {
            format!("{} tender issued in {}.", category, location)
        }
    }
}

/// Extract a normalized monetary value from free text.
///
/// Patterns are tried in order over lower-cased, comma-stripped text:
/// an explicit crore figure, an explicit lakh figure, then a bare integer of
/// at least five digits normalized by magnitude.
pub fn extract_monetary_value(text: &str) -> Option<String> {
    let t = text.to_lowercase().replace(',', "");

    if let Some(caps) = CRORE_RE.captures(&t) {
        return Some(format!("{} Cr", &caps[1]));
    }
    if let Some(caps) = LAKH_RE.captures(&t) {
        return Some(format!("{} Lakh", &caps[1]));
    }

    let caps = BARE_AMOUNT_RE.captures(&t)?;
    let digits = &caps[1];
    let amount: f64 = digits.parse().ok()?;
    let value = if amount >= CRORE {
        format!("{} Cr", round2(amount / CRORE))
    } else if amount >= LAKH {
        format!("{} Lakh", round2(amount / LAKH))
    } else {
        format!("₹{}", digits)
    };
    Some(value)
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CategoryRule, RegionRule};

    #[test]
    fn test_category_keywords() {
        let c = Classifiers::default();
        assert_eq!(c.classify_category("Construction of RCC drain"), Category::Civil);
        assert_eq!(c.classify_category("Supply of 250 KVA Transformer"), Category::Electrical);
        assert_eq!(c.classify_category("Hiring of BUS for staff"), Category::Transport);
        assert_eq!(c.classify_category("Procurement of computer peripherals"), Category::IT);
        assert_eq!(c.classify_category("Supply of stationery"), Category::General);
    }

    #[test]
    fn test_category_priority_tie_break() {
        let c = Classifiers::default();
        assert_eq!(c.classify_category("Civil electric wiring work"), Category::Civil);
    }

    #[test]
    fn test_category_substring_not_word_boundary() {
        let c = Classifiers::default();
        // "kitchen" contains "it"
        assert_eq!(c.classify_category("Supply of kitchen utensils"), Category::IT);
    }

    #[test]
    fn test_detect_location_city() {
        let c = Classifiers::default();
        let loc = c.detect_location("Repair of school at PUNE district");
        assert_eq!(loc.display, "Pune, Maharashtra");
        assert_eq!(loc.district, "Pune");
    }

    #[test]
    fn test_detect_location_embedded_in_word() {
        let c = Classifiers::default();
        let loc = c.detect_location("https://example.com/thanecorp/tender/1");
        assert_eq!(loc.district, "Thane");
    }

    #[test]
    fn test_detect_location_default() {
        let c = Classifiers::default();
        let loc = c.detect_location("Supply of stationery items");
        assert_eq!(loc.display, "India");
        assert_eq!(loc.district, "India");
        assert!(c.match_location("Supply of stationery items").is_none());
    }

    #[test]
    fn test_detect_location_region_order() {
        let c = Classifiers::default();
        // Maharashtra is listed before Gujarat
        let loc = c.detect_location("Road works Surat and Nagpur");
        assert_eq!(loc.display, "Nagpur, Maharashtra");
    }

    #[test]
    fn test_injected_tables() {
        let tables = KeywordTables {
            categories: vec![CategoryRule {
                category: Category::Transport,
                keywords: vec!["Ferry".to_string()],
            }],
            regions: vec![RegionRule {
                region: "Kerala".to_string(),
                cities: vec!["Kochi".to_string()],
            }],
            default_location: "Kerala".to_string(),
        };
        let c = Classifiers::new(&tables);
        assert_eq!(c.classify_category("ferry terminal at kochi"), Category::Transport);
        assert_eq!(c.classify_category("Road repair"), Category::General);
        assert_eq!(c.detect_location("ferry terminal at kochi").display, "Kochi, Kerala");
        assert_eq!(c.detect_location("Mumbai").display, "Kerala");
    }

    #[test]
    fn test_classification_is_idempotent() {
        let c = Classifiers::default();
        let title = "Electric lighting at Nashik bus depot worth Rs 4,50,000";
        for _ in 0..3 {
            assert_eq!(c.classify_category(title), Category::Electrical);
            assert_eq!(c.detect_location(title).display, "Nashik, Maharashtra");
            assert_eq!(extract_monetary_value(title).as_deref(), Some("4.5 Lakh"));
        }
    }

    #[test]
    fn test_monetary_magnitude_normalization() {
        assert_eq!(extract_monetary_value("₹12345678").as_deref(), Some("1.23 Cr"));
        assert_eq!(extract_monetary_value("₹150000").as_deref(), Some("1.5 Lakh"));
        assert_eq!(extract_monetary_value("Estimated cost 45000").as_deref(), Some("₹45000"));
        assert_eq!(extract_monetary_value("no numbers here"), None);
    }

    #[test]
    fn test_monetary_word_patterns_first() {
        assert_eq!(extract_monetary_value("Value ₹1.5 cr").as_deref(), Some("1.5 Cr"));
        assert_eq!(extract_monetary_value("2.75 Crore road").as_deref(), Some("2.75 Cr"));
        assert_eq!(extract_monetary_value("Rs 12 LAKH only").as_deref(), Some("12 Lakh"));
        assert_eq!(
            extract_monetary_value("tender 1234567 worth 3 lakh").as_deref(),
            Some("3 Lakh")
        );
    }

    #[test]
    fn test_monetary_commas_stripped() {
        assert_eq!(extract_monetary_value("Rs. 2,50,00,000").as_deref(), Some("2.5 Cr"));
        assert_eq!(extract_monetary_value("INR 1,00,000").as_deref(), Some("1 Lakh"));
    }

    #[test]
    fn test_short_numbers_ignored() {
        assert_eq!(extract_monetary_value("Tender 2024 ref 1234"), None);
    }

    #[test]
    fn test_summary_shapes_differ() {
        let c = Classifiers::default();
        let specific = c.build_summary(Category::Civil, "Pune, Maharashtra");
        let unknown = c.build_summary(Category::Civil, "India");
        assert_eq!(specific, "Civil tender issued in Pune, Maharashtra.");
        assert!(unknown.contains("exact location not specified"));
        assert_ne!(specific, unknown);
    }
}
