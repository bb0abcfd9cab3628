//! Runtime configuration loaded from an optional YAML file.
//!
//! Every field has a default, so a config file only needs to name what it
//! overrides:
//!
//! ```yaml
//! min_yield: 10
//! feed:
//!   queries: ["mahatenders.gov.in tender"]
//! keywords:
//!   default_location: Maharashtra
//! ```

use crate::models::Category;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{info, instrument};

/// Errors raised while loading a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// The document parsed but a value is out of range.
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Largest accepted `expiry_days`, roughly ten years.
pub const MAX_EXPIRY_DAYS: u64 = 3_650;

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Titles shorter than this are treated as navigation noise.
    pub min_title_len: usize,
    /// Case-insensitive substrings that reject a title outright.
    pub blocked_words: Vec<String>,
    /// Raw candidate count at which lower tiers are skipped.
    pub min_yield: usize,
    /// Days between `published` and `expiry`, at most [`MAX_EXPIRY_DAYS`].
    pub expiry_days: u64,
    /// Fetch detail pages and linked documents for each tender.
    pub enrich: bool,
    pub enrich_concurrency: usize,
    /// Characters of extracted PDF text to scan.
    pub pdf_max_chars: usize,
    /// Link suffixes that mark an embedded tender document.
    pub document_extensions: Vec<String>,
    pub portal: PortalConfig,
    pub marketplace: MarketplaceConfig,
    pub feed: FeedConfig,
    pub keywords: KeywordTables,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0".to_string(),
            timeout_secs: 30,
            min_title_len: 15,
            blocked_words: vec![
                "corrigendum".to_string(),
                "cancelled".to_string(),
                "extension".to_string(),
            ],
            min_yield: 5,
            expiry_days: 15,
            enrich: true,
            enrich_concurrency: 4,
            pdf_max_chars: 8_000,
            document_extensions: vec![".pdf".to_string()],
            portal: PortalConfig::default(),
            marketplace: MarketplaceConfig::default(),
            feed: FeedConfig::default(),
            keywords: KeywordTables::default(),
        }
    }
}

impl Config {
    /// Load a config file, falling back to defaults for missing fields.
    ///
    /// # Arguments
    ///
    /// * `path` - YAML file to read
    ///
    /// # Returns
    ///
    /// The validated configuration, or a [`ConfigError`] if the file cannot
    /// be read, does not parse, or holds an out-of-range value.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::parse(&raw, &path.display().to_string())?;
        info!(min_yield = config.min_yield, enrich = config.enrich, "Loaded configuration");
        Ok(config)
    }

    /// Parse and validate an in-memory YAML document.
    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        Self::parse(raw, "<inline>")
    }

    fn parse(raw: &str, origin: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to an empty mapping.
        let config: Self = if raw.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(raw).map_err(|source| ConfigError::Parse {
                path: origin.to_string(),
                source,
            })?
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values that parse but cannot drive a run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.expiry_days > MAX_EXPIRY_DAYS {
            return Err(ConfigError::Invalid {
                field: "expiry_days",
                reason: format!("must be at most {MAX_EXPIRY_DAYS}, got {}", self.expiry_days),
            });
        }
        Ok(())
    }
}

/// Government portal listing pages (primary tier).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Base URL used to resolve relative links.
    pub base_url: String,
    pub listing_urls: Vec<String>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: "https://mahatenders.gov.in".to_string(),
            listing_urls: vec![
                "https://mahatenders.gov.in/nicgep/app?page=FrontEndTendersByOrganisation&service=page"
                    .to_string(),
                "https://mahatenders.gov.in/nicgep/app?page=FrontEndLatestActiveTenders&service=page"
                    .to_string(),
            ],
        }
    }
}

/// Marketplace search page (secondary tier).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MarketplaceConfig {
    pub url: String,
    /// Line marker that starts a bid record.
    pub marker: String,
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            url: "https://bidplus.gem.gov.in/all-bids".to_string(),
            marker: "bid no".to_string(),
        }
    }
}

/// News-feed searches (tertiary tier).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FeedConfig {
    pub queries: Vec<String>,
    /// Items taken from the top of each feed.
    pub max_items: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            queries: vec![
                "mahatenders.gov.in tender".to_string(),
                "gem bid tender maharashtra".to_string(),
            ],
            max_items: 10,
        }
    }
}

/// One category and the substrings that select it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CategoryRule {
    pub category: Category,
    pub keywords: Vec<String>,
}

/// One region and its city/locality keywords, in match order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RegionRule {
    pub region: String,
    pub cities: Vec<String>,
}

/// Immutable keyword tables consumed by [`crate::classify::Classifiers`].
///
/// Rule order is match priority: the first rule that hits wins.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct KeywordTables {
    pub categories: Vec<CategoryRule>,
    pub regions: Vec<RegionRule>,
    /// Location reported when no city matches.
    pub default_location: String,
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for KeywordTables {
    fn default() -> Self {
        Self {
            categories: vec![
                CategoryRule {
                    category: Category::Civil,
                    keywords: words(&["road", "civil", "construction", "building"]),
                },
                CategoryRule {
                    category: Category::Electrical,
                    keywords: words(&["electric", "transformer", "lighting", "wiring"]),
                },
                CategoryRule {
                    category: Category::Transport,
                    keywords: words(&["vehicle", "bus", "transport"]),
                },
                CategoryRule {
                    category: Category::IT,
                    keywords: words(&["computer", "software", "it"]),
                },
            ],
            regions: vec![
                RegionRule {
                    region: "Maharashtra".to_string(),
                    cities: words(&[
                        "mumbai",
                        "pune",
                        "nagpur",
                        "nashik",
                        "thane",
                        "aurangabad",
                        "solapur",
                        "kolhapur",
                        "amravati",
                        "nanded",
                    ]),
                },
                RegionRule {
                    region: "Gujarat".to_string(),
                    cities: words(&["ahmedabad", "surat", "vadodara", "rajkot"]),
                },
                RegionRule {
                    region: "Karnataka".to_string(),
                    cities: words(&["bengaluru", "bangalore", "mysuru", "hubli"]),
                },
                RegionRule {
                    region: "Delhi".to_string(),
                    cities: words(&["new delhi", "delhi"]),
                },
            ],
            default_location: "India".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_is_default() {
        let config = Config::from_yaml("").unwrap();
        assert_eq!(config.min_yield, 5);
        assert_eq!(config.expiry_days, 15);
        assert_eq!(config.keywords, KeywordTables::default());
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let raw = r#"
min_yield: 10
feed:
  max_items: 3
keywords:
  default_location: Maharashtra
"#;
        let config = Config::from_yaml(raw).unwrap();
        assert_eq!(config.min_yield, 10);
        assert_eq!(config.feed.max_items, 3);
        assert_eq!(config.feed.queries, FeedConfig::default().queries);
        assert_eq!(config.keywords.default_location, "Maharashtra");
        assert_eq!(config.keywords.categories.len(), 4);
        assert_eq!(config.user_agent, "Mozilla/5.0");
    }

    #[test]
    fn test_category_rules_round_trip_through_yaml() {
        let raw = r#"
keywords:
  categories:
    - category: IT
      keywords: [software]
"#;
        let config = Config::from_yaml(raw).unwrap();
        assert_eq!(config.keywords.categories[0].category, Category::IT);
        assert!(config.keywords.regions.len() >= 1);
    }

    #[test]
    fn test_invalid_yaml_is_rejected() {
        let err = Config::from_yaml("min_yield: [not, a, number]").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_expiry_days_out_of_range_is_rejected() {
        let err = Config::from_yaml("expiry_days: 100000000").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "expiry_days", .. }));
        assert!(Config::from_yaml("expiry_days: 3650").is_ok());
    }

    #[test]
    fn test_negative_expiry_days_is_rejected() {
        let err = Config::from_yaml("expiry_days: -3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_missing_file_errors() {
        let err = Config::load("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
