use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::core::families::{default_property_type_families, CompatibilityTable};
use crate::core::{CompatibilityScorer, MatchError, PartialCredit};
use crate::models::ScoringWeights;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub ranking: RankingSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
    #[serde(default)]
    pub partial_credit: PartialCreditConfig,
    /// Preferred type -> listed types earning partial credit
    #[serde(default = "default_type_families")]
    pub type_families: HashMap<String, Vec<String>>,
    /// Cities that earn partial location credit for each other
    #[serde(default)]
    pub location_groups: Vec<Vec<String>>,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            weights: WeightsConfig::default(),
            partial_credit: PartialCreditConfig::default(),
            type_families: default_type_families(),
            location_groups: Vec::new(),
        }
    }
}

impl ScoringSettings {
    /// Build the scorer, rejecting weight tables that do not sum to 100
    pub fn build_scorer(&self) -> Result<CompatibilityScorer, MatchError> {
        let weights = ScoringWeights {
            location: self.weights.location,
            budget: self.weights.budget,
            property_type: self.weights.property_type,
            bedrooms: self.weights.bedrooms,
            bathrooms: self.weights.bathrooms,
            facilities: self.weights.facilities,
        };

        let partial = PartialCredit {
            property_type_family: self.partial_credit.property_type_family,
            location_group: self.partial_credit.location_group,
        };

        CompatibilityScorer::new(
            weights,
            partial,
            CompatibilityTable::from_map(&self.type_families),
            CompatibilityTable::from_groups(&self.location_groups),
        )
    }
}

fn default_type_families() -> HashMap<String, Vec<String>> {
    default_property_type_families().into_iter().collect()
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_location_weight")]
    pub location: f64,
    #[serde(default = "default_budget_weight")]
    pub budget: f64,
    #[serde(default = "default_property_type_weight")]
    pub property_type: f64,
    #[serde(default = "default_bedrooms_weight")]
    pub bedrooms: f64,
    #[serde(default = "default_bathrooms_weight")]
    pub bathrooms: f64,
    #[serde(default = "default_facilities_weight")]
    pub facilities: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            location: default_location_weight(),
            budget: default_budget_weight(),
            property_type: default_property_type_weight(),
            bedrooms: default_bedrooms_weight(),
            bathrooms: default_bathrooms_weight(),
            facilities: default_facilities_weight(),
        }
    }
}

fn default_location_weight() -> f64 { 20.0 }
fn default_budget_weight() -> f64 { 20.0 }
fn default_property_type_weight() -> f64 { 15.0 }
fn default_bedrooms_weight() -> f64 { 10.0 }
fn default_bathrooms_weight() -> f64 { 10.0 }
fn default_facilities_weight() -> f64 { 25.0 }

#[derive(Debug, Clone, Deserialize)]
pub struct PartialCreditConfig {
    #[serde(default = "default_type_family_credit")]
    pub property_type_family: f64,
    #[serde(default = "default_location_group_credit")]
    pub location_group: f64,
}

impl Default for PartialCreditConfig {
    fn default() -> Self {
        Self {
            property_type_family: default_type_family_credit(),
            location_group: default_location_group_credit(),
        }
    }
}

fn default_type_family_credit() -> f64 { 10.0 }
fn default_location_group_credit() -> f64 { 16.0 }

#[derive(Debug, Clone, Deserialize)]
pub struct RankingSettings {
    #[serde(default = "default_recommendation_limit")]
    pub recommendation_limit: usize,
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self {
            recommendation_limit: default_recommendation_limit(),
        }
    }
}

fn default_recommendation_limit() -> usize { 5 }

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,
    #[serde(default = "default_cache_capacity")]
    pub capacity: u64,
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            capacity: default_cache_capacity(),
            ttl_secs: default_cache_ttl(),
        }
    }
}

fn default_cache_enabled() -> bool { true }
fn default_cache_capacity() -> u64 { 10_000 }
fn default_cache_ttl() -> u64 { 300 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with ESTATE__)
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., ESTATE__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("ESTATE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("ESTATE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
