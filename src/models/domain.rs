use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::core::error::MatchError;

/// Nearby amenity tracked on both listings and preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Facility {
    Gym,
    Market,
    School,
    Hospital,
    Park,
    Restaurant,
    MetroStation,
}

impl Facility {
    pub const ALL: [Facility; 7] = [
        Facility::Gym,
        Facility::Market,
        Facility::School,
        Facility::Hospital,
        Facility::Park,
        Facility::Restaurant,
        Facility::MetroStation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Facility::Gym => "gym",
            Facility::Market => "market",
            Facility::School => "school",
            Facility::Hospital => "hospital",
            Facility::Park => "park",
            Facility::Restaurant => "restaurant",
            Facility::MetroStation => "metroStation",
        }
    }
}

impl fmt::Display for Facility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Facility flags. Missing keys deserialize as `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Facilities {
    pub gym: bool,
    pub market: bool,
    pub school: bool,
    pub hospital: bool,
    pub park: bool,
    pub restaurant: bool,
    pub metro_station: bool,
}

impl Facilities {
    pub fn has(&self, facility: Facility) -> bool {
        match facility {
            Facility::Gym => self.gym,
            Facility::Market => self.market,
            Facility::School => self.school,
            Facility::Hospital => self.hospital,
            Facility::Park => self.park,
            Facility::Restaurant => self.restaurant,
            Facility::MetroStation => self.metro_station,
        }
    }

    pub fn set(&mut self, facility: Facility, value: bool) {
        let flag = match facility {
            Facility::Gym => &mut self.gym,
            Facility::Market => &mut self.market,
            Facility::School => &mut self.school,
            Facility::Hospital => &mut self.hospital,
            Facility::Park => &mut self.park,
            Facility::Restaurant => &mut self.restaurant,
            Facility::MetroStation => &mut self.metro_station,
        };
        *flag = value;
    }

    /// Build a flag set with exactly the given facilities enabled
    pub fn with(facilities: &[Facility]) -> Self {
        let mut flags = Self::default();
        for facility in facilities {
            flags.set(*facility, true);
        }
        flags
    }

    /// Facilities flagged `true`, in declaration order
    pub fn enabled(&self) -> impl Iterator<Item = Facility> + '_ {
        Facility::ALL.into_iter().filter(move |f| self.has(*f))
    }

    pub fn is_empty(&self) -> bool {
        self.enabled().next().is_none()
    }
}

/// Property listing as supplied by the listing store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub location: String,
    pub property_type: String,
    pub bedrooms: u32,
    pub bathrooms: f64,
    pub area: f64,
    #[serde(default)]
    pub nearby_facilities: Facilities,
    #[serde(default)]
    pub features: Vec<String>,
    pub listed_at: DateTime<Utc>,
}

impl Listing {
    /// Reject records outside the documented domain
    pub fn validate(&self) -> Result<(), MatchError> {
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(MatchError::invalid(format!(
                "listing {}: price must be positive, got {}",
                self.id, self.price
            )));
        }
        if !self.area.is_finite() || self.area <= 0.0 {
            return Err(MatchError::invalid(format!(
                "listing {}: area must be positive, got {}",
                self.id, self.area
            )));
        }
        if !self.bathrooms.is_finite() || self.bathrooms < 0.0 {
            return Err(MatchError::invalid(format!(
                "listing {}: bathrooms must be non-negative, got {}",
                self.id, self.bathrooms
            )));
        }
        Ok(())
    }

    /// Content version over every field the scorer reads
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.id.hash(&mut hasher);
        self.price.to_bits().hash(&mut hasher);
        self.location.hash(&mut hasher);
        self.property_type.hash(&mut hasher);
        self.bedrooms.hash(&mut hasher);
        self.bathrooms.to_bits().hash(&mut hasher);
        self.area.to_bits().hash(&mut hasher);
        self.nearby_facilities.hash(&mut hasher);
        hasher.finish()
    }
}

/// A user's stated preferences. Zero/empty fields mean "no preference".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreferenceSet {
    pub location: String,
    pub budget: f64,
    pub property_type: String,
    pub bedrooms: u32,
    pub bathrooms: f64,
    pub facilities: Facilities,
}

impl PreferenceSet {
    pub fn validate(&self) -> Result<(), MatchError> {
        if !self.budget.is_finite() || self.budget < 0.0 {
            return Err(MatchError::invalid(format!(
                "budget must be non-negative, got {}",
                self.budget
            )));
        }
        if !self.bathrooms.is_finite() || self.bathrooms < 0.0 {
            return Err(MatchError::invalid(format!(
                "preferred bathrooms must be non-negative, got {}",
                self.bathrooms
            )));
        }
        Ok(())
    }

    /// True when no field expresses a preference
    pub fn is_empty(&self) -> bool {
        self.location.is_empty()
            && self.budget == 0.0
            && self.property_type.is_empty()
            && self.bedrooms == 0
            && self.bathrooms == 0.0
            && self.facilities.is_empty()
    }

    /// Content version; a wholesale overwrite yields a new fingerprint
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.location.hash(&mut hasher);
        self.budget.to_bits().hash(&mut hasher);
        self.property_type.hash(&mut hasher);
        self.bedrooms.hash(&mut hasher);
        self.bathrooms.to_bits().hash(&mut hasher);
        self.facilities.hash(&mut hasher);
        hasher.finish()
    }
}

/// Listing with its derived compatibility score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredListing {
    #[serde(flatten)]
    pub listing: Listing,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub compatibility_score: Option<u8>,
}

/// Recommended listing with advisory reasoning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub property_id: String,
    pub compatibility_score: u8,
    pub reasoning: Vec<String>,
}

/// Ranking sort order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    PriceAsc,
    PriceDesc,
    Match,
    Recent,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::PriceAsc => "price-asc",
            SortKey::PriceDesc => "price-desc",
            SortKey::Match => "match",
            SortKey::Recent => "recent",
        }
    }
}

impl FromStr for SortKey {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "price-asc" => Ok(SortKey::PriceAsc),
            "price-desc" => Ok(SortKey::PriceDesc),
            "match" => Ok(SortKey::Match),
            "recent" => Ok(SortKey::Recent),
            other => Err(MatchError::invalid(format!(
                "unknown sort key '{}', expected one of: price-asc, price-desc, match, recent",
                other
            ))),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scored aspect of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Location,
    Budget,
    PropertyType,
    Bedrooms,
    Bathrooms,
    Facilities,
}

/// Maximum weight per dimension, in points out of 100
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub location: f64,
    pub budget: f64,
    pub property_type: f64,
    pub bedrooms: f64,
    pub bathrooms: f64,
    pub facilities: f64,
}

impl ScoringWeights {
    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Location => self.location,
            Dimension::Budget => self.budget,
            Dimension::PropertyType => self.property_type,
            Dimension::Bedrooms => self.bedrooms,
            Dimension::Bathrooms => self.bathrooms,
            Dimension::Facilities => self.facilities,
        }
    }

    pub fn total(&self) -> f64 {
        self.location
            + self.budget
            + self.property_type
            + self.bedrooms
            + self.bathrooms
            + self.facilities
    }

    /// Weights must be finite, non-negative and sum to 100
    pub fn validate(&self) -> Result<(), MatchError> {
        let all = [
            self.location,
            self.budget,
            self.property_type,
            self.bedrooms,
            self.bathrooms,
            self.facilities,
        ];
        if all.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(MatchError::invalid(format!(
                "scoring weights must be finite and non-negative: {:?}",
                self
            )));
        }
        let total = self.total();
        if (total - 100.0).abs() > 1e-9 {
            return Err(MatchError::invalid(format!(
                "scoring weights must sum to 100, got {}",
                total
            )));
        }
        Ok(())
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            location: 20.0,
            budget: 20.0,
            property_type: 15.0,
            bedrooms: 10.0,
            bathrooms: 10.0,
            facilities: 25.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_100() {
        let weights = ScoringWeights::default();
        assert_eq!(weights.total(), 100.0);
        assert!(weights.validate().is_ok());
    }

    #[test]
    fn test_weights_reject_bad_total() {
        let weights = ScoringWeights {
            facilities: 30.0,
            ..ScoringWeights::default()
        };
        assert!(weights.validate().is_err());
    }

    #[test]
    fn test_facilities_missing_keys_default_false() {
        let flags: Facilities = serde_json::from_str(r#"{"gym": true, "metroStation": true}"#).unwrap();
        assert!(flags.gym);
        assert!(flags.metro_station);
        assert!(!flags.park);
        assert_eq!(
            flags.enabled().collect::<Vec<_>>(),
            vec![Facility::Gym, Facility::MetroStation]
        );
    }

    #[test]
    fn test_sort_key_parsing() {
        assert_eq!("recent".parse::<SortKey>().unwrap(), SortKey::Recent);
        assert_eq!("price-desc".parse::<SortKey>().unwrap(), SortKey::PriceDesc);
        assert!(matches!(
            "cheapest".parse::<SortKey>(),
            Err(MatchError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_empty_preferences() {
        assert!(PreferenceSet::default().is_empty());

        let prefs = PreferenceSet {
            facilities: Facilities::with(&[Facility::Park]),
            ..PreferenceSet::default()
        };
        assert!(!prefs.is_empty());
    }

    #[test]
    fn test_negative_budget_rejected() {
        let prefs = PreferenceSet {
            budget: -1.0,
            ..PreferenceSet::default()
        };
        assert!(prefs.validate().is_err());
    }

    #[test]
    fn test_scored_listing_flattens() {
        let listing = Listing {
            id: "1".to_string(),
            title: "Loft".to_string(),
            description: String::new(),
            price: 100.0,
            location: "Pune".to_string(),
            property_type: "Loft".to_string(),
            bedrooms: 1,
            bathrooms: 1.0,
            area: 500.0,
            nearby_facilities: Facilities::default(),
            features: vec![],
            listed_at: Utc::now(),
        };

        let unscored = serde_json::to_value(ScoredListing {
            listing: listing.clone(),
            compatibility_score: None,
        })
        .unwrap();
        assert_eq!(unscored["propertyType"], "Loft");
        assert!(unscored.get("compatibilityScore").is_none());

        let scored = serde_json::to_value(ScoredListing {
            listing,
            compatibility_score: Some(72),
        })
        .unwrap();
        assert_eq!(scored["compatibilityScore"], 72);
    }
}
