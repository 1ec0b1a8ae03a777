use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::core::error::MatchError;
use crate::core::families::CompatibilityTable;
use crate::models::{Dimension, Listing, PreferenceSet, ScoringWeights};

/// Score returned when no dimension is applicable
pub const NEUTRAL_SCORE: u8 = 50;

/// Absorbs float noise so an exact `.5` always rounds up
const ROUNDING_EPSILON: f64 = 1e-9;

/// Earned points for one dimension, given its maximum weight.
/// `None` means the dimension does not apply to these preferences.
type Rule = fn(&CompatibilityScorer, &Listing, &PreferenceSet, f64) -> Option<f64>;

/// Dimension -> rule. Weights come from [`ScoringWeights`].
const RULES: [(Dimension, Rule); 6] = [
    (Dimension::Location, location_points),
    (Dimension::Budget, budget_points),
    (Dimension::PropertyType, property_type_points),
    (Dimension::Bedrooms, bedroom_points),
    (Dimension::Bathrooms, bathroom_points),
    (Dimension::Facilities, facility_points),
];

/// Points awarded for a near miss, capped at the dimension weight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartialCredit {
    /// Listed type is in the preferred type's family
    pub property_type_family: f64,
    /// Listed city shares a configured group with the preferred city
    pub location_group: f64,
}

impl Default for PartialCredit {
    fn default() -> Self {
        Self {
            property_type_family: 10.0,
            location_group: 16.0,
        }
    }
}

/// Contribution of a single dimension
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionScore {
    pub dimension: Dimension,
    pub earned: f64,
    pub possible: f64,
}

/// Per-dimension detail behind a compatibility score
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScoreBreakdown {
    pub dimensions: Vec<DimensionScore>,
}

impl ScoreBreakdown {
    pub fn earned(&self) -> f64 {
        self.dimensions.iter().map(|d| d.earned).sum()
    }

    pub fn total(&self) -> f64 {
        self.dimensions.iter().map(|d| d.possible).sum()
    }

    /// Final percentage, rounded half-up; neutral when nothing applied
    pub fn score(&self) -> u8 {
        let total = self.total();
        if total <= 0.0 {
            return NEUTRAL_SCORE;
        }
        round_half_up(100.0 * self.earned() / total)
    }
}

/// Rule-based compatibility scorer
///
/// Six dimensions are scored with partial credit and combined as
/// `round(100 * earned / total)`, where `total` only counts dimensions the
/// preferences actually set:
///
/// | Dimension     | Weight | Credit                                          |
/// |---------------|--------|-------------------------------------------------|
/// | Location      | 20     | exact city match (or configured city group)     |
/// | Budget        | 20     | 100/75/50% within 10/20/30% of budget           |
/// | Property type | 15     | case-insensitive match, or family partial credit|
/// | Bedrooms      | 10     | exact, or half for a difference of one          |
/// | Bathrooms     | 10     | 100/80/60/30% for diff 0, <=0.5, <=1, more      |
/// | Facilities    | 25     | split evenly over the requested facilities      |
#[derive(Debug, Clone)]
pub struct CompatibilityScorer {
    weights: ScoringWeights,
    partial: PartialCredit,
    type_families: CompatibilityTable,
    location_groups: CompatibilityTable,
    fingerprint: u64,
}

impl CompatibilityScorer {
    pub fn new(
        weights: ScoringWeights,
        partial: PartialCredit,
        type_families: CompatibilityTable,
        location_groups: CompatibilityTable,
    ) -> Result<Self, MatchError> {
        weights.validate()?;

        if !(0.0..=weights.property_type).contains(&partial.property_type_family) {
            return Err(MatchError::invalid(format!(
                "property type family credit must be within 0..={}, got {}",
                weights.property_type, partial.property_type_family
            )));
        }
        if !(0.0..=weights.location).contains(&partial.location_group) {
            return Err(MatchError::invalid(format!(
                "location group credit must be within 0..={}, got {}",
                weights.location, partial.location_group
            )));
        }

        Ok(Self::assemble(weights, partial, type_families, location_groups))
    }

    /// Default weights, default type families, no city groups
    pub fn with_default_weights() -> Self {
        Self::assemble(
            ScoringWeights::default(),
            PartialCredit::default(),
            CompatibilityTable::default_property_types(),
            CompatibilityTable::new(),
        )
    }

    fn assemble(
        weights: ScoringWeights,
        partial: PartialCredit,
        type_families: CompatibilityTable,
        location_groups: CompatibilityTable,
    ) -> Self {
        let mut hasher = DefaultHasher::new();
        for (dimension, _) in RULES.iter() {
            dimension.hash(&mut hasher);
            weights.get(*dimension).to_bits().hash(&mut hasher);
        }
        partial.property_type_family.to_bits().hash(&mut hasher);
        partial.location_group.to_bits().hash(&mut hasher);
        type_families.hash(&mut hasher);
        location_groups.hash(&mut hasher);

        Self {
            weights,
            partial,
            type_families,
            location_groups,
            fingerprint: hasher.finish(),
        }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Version of the scoring configuration; equal configurations agree
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Compatibility score (0-100) of `listing` against `preferences`
    pub fn score(&self, listing: &Listing, preferences: &PreferenceSet) -> Result<u8, MatchError> {
        listing.validate()?;
        preferences.validate()?;
        Ok(self.breakdown(listing, preferences).score())
    }

    /// Per-dimension earned/possible points. Inputs are not validated.
    pub fn breakdown(&self, listing: &Listing, preferences: &PreferenceSet) -> ScoreBreakdown {
        let dimensions = RULES
            .iter()
            .filter_map(|(dimension, rule)| {
                let possible = self.weights.get(*dimension);
                rule(self, listing, preferences, possible).map(|earned| DimensionScore {
                    dimension: *dimension,
                    earned,
                    possible,
                })
            })
            .collect();

        ScoreBreakdown { dimensions }
    }
}

impl Default for CompatibilityScorer {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

/// Relative distance between price and budget; `None` when budget is unset
#[inline]
pub(crate) fn budget_deviation(price: f64, budget: f64) -> Option<f64> {
    if budget <= 0.0 {
        return None;
    }
    Some((price - budget).abs() / budget)
}

#[inline]
pub(crate) fn same_property_type(listed: &str, preferred: &str) -> bool {
    listed.to_lowercase() == preferred.to_lowercase()
}

fn location_points(
    scorer: &CompatibilityScorer,
    listing: &Listing,
    preferences: &PreferenceSet,
    max: f64,
) -> Option<f64> {
    if preferences.location.is_empty() {
        return None;
    }
    if listing.location == preferences.location {
        Some(max)
    } else if scorer
        .location_groups
        .is_compatible(&preferences.location, &listing.location)
    {
        Some(scorer.partial.location_group.min(max))
    } else {
        Some(0.0)
    }
}

fn budget_points(
    _scorer: &CompatibilityScorer,
    listing: &Listing,
    preferences: &PreferenceSet,
    max: f64,
) -> Option<f64> {
    let deviation = budget_deviation(listing.price, preferences.budget)?;

    let fraction = if deviation <= 0.10 {
        1.0
    } else if deviation <= 0.20 {
        0.75
    } else if deviation <= 0.30 {
        0.5
    } else {
        0.0
    };

    Some(max * fraction)
}

fn property_type_points(
    scorer: &CompatibilityScorer,
    listing: &Listing,
    preferences: &PreferenceSet,
    max: f64,
) -> Option<f64> {
    if preferences.property_type.is_empty() {
        return None;
    }
    if same_property_type(&listing.property_type, &preferences.property_type) {
        Some(max)
    } else if scorer
        .type_families
        .is_compatible(&preferences.property_type, &listing.property_type)
    {
        Some(scorer.partial.property_type_family.min(max))
    } else {
        Some(0.0)
    }
}

fn bedroom_points(
    _scorer: &CompatibilityScorer,
    listing: &Listing,
    preferences: &PreferenceSet,
    max: f64,
) -> Option<f64> {
    if preferences.bedrooms == 0 {
        return None;
    }
    let fraction = match listing.bedrooms.abs_diff(preferences.bedrooms) {
        0 => 1.0,
        1 => 0.5,
        _ => 0.0,
    };
    Some(max * fraction)
}

fn bathroom_points(
    _scorer: &CompatibilityScorer,
    listing: &Listing,
    preferences: &PreferenceSet,
    max: f64,
) -> Option<f64> {
    if preferences.bathrooms == 0.0 {
        return None;
    }
    let diff = (listing.bathrooms - preferences.bathrooms).abs();
    let fraction = if diff == 0.0 {
        1.0
    } else if diff <= 0.5 {
        0.8
    } else if diff <= 1.0 {
        0.6
    } else {
        0.3
    };
    Some(max * fraction)
}

/// Every requested facility counts toward the total whether or not the
/// listing has it; unrequested facilities are ignored entirely.
fn facility_points(
    _scorer: &CompatibilityScorer,
    listing: &Listing,
    preferences: &PreferenceSet,
    max: f64,
) -> Option<f64> {
    let requested = preferences.facilities.enabled().count();
    if requested == 0 {
        return None;
    }

    let per_item = max / requested as f64;
    let matched = preferences
        .facilities
        .enabled()
        .filter(|f| listing.nearby_facilities.has(*f))
        .count();

    Some(per_item * matched as f64)
}

/// Round to the nearest integer, halves away from zero, clamped to 0..=100
#[inline]
pub(crate) fn round_half_up(value: f64) -> u8 {
    (value + 0.5 + ROUNDING_EPSILON).floor().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Facilities, Facility};
    use chrono::Utc;

    fn create_test_listing() -> Listing {
        Listing {
            id: "1".to_string(),
            title: "Modern Apartment".to_string(),
            description: "Bright two bedroom flat".to_string(),
            price: 4_500_000.0,
            location: "Mumbai".to_string(),
            property_type: "Apartment".to_string(),
            bedrooms: 2,
            bathrooms: 2.0,
            area: 1200.0,
            nearby_facilities: Facilities::with(&[Facility::Gym, Facility::Park, Facility::School]),
            features: vec![],
            listed_at: Utc::now(),
        }
    }

    fn create_test_preferences() -> PreferenceSet {
        PreferenceSet {
            location: "Mumbai".to_string(),
            budget: 4_500_000.0,
            property_type: "Apartment".to_string(),
            bedrooms: 2,
            bathrooms: 2.0,
            facilities: Facilities::with(&[Facility::Gym, Facility::Park]),
        }
    }

    #[test]
    fn test_perfect_match() {
        let scorer = CompatibilityScorer::with_default_weights();
        let score = scorer
            .score(&create_test_listing(), &create_test_preferences())
            .unwrap();
        assert_eq!(score, 100);
    }

    #[test]
    fn test_budget_tiers() {
        let scorer = CompatibilityScorer::with_default_weights();
        let prefs = PreferenceSet {
            budget: 100.0,
            ..PreferenceSet::default()
        };
        let mut listing = create_test_listing();

        let cases = [(110.0, 20.0), (90.0, 20.0), (120.0, 15.0), (130.0, 10.0), (131.0, 0.0)];
        for (price, expected) in cases {
            listing.price = price;
            let earned = budget_points(&scorer, &listing, &prefs, 20.0);
            assert_eq!(earned, Some(expected), "price {}", price);
        }
    }

    #[test]
    fn test_budget_skipped_when_unset() {
        let scorer = CompatibilityScorer::with_default_weights();
        let prefs = PreferenceSet {
            location: "Mumbai".to_string(),
            ..PreferenceSet::default()
        };

        let breakdown = scorer.breakdown(&create_test_listing(), &prefs);
        assert_eq!(breakdown.total(), 20.0);
        assert!(breakdown
            .dimensions
            .iter()
            .all(|d| d.dimension != Dimension::Budget));
    }

    #[test]
    fn test_property_type_family_credit() {
        let scorer = CompatibilityScorer::with_default_weights();
        let prefs = create_test_preferences();
        let mut listing = create_test_listing();

        listing.property_type = "APARTMENT".to_string();
        assert_eq!(property_type_points(&scorer, &listing, &prefs, 15.0), Some(15.0));

        listing.property_type = "Condo".to_string();
        assert_eq!(property_type_points(&scorer, &listing, &prefs, 15.0), Some(10.0));

        listing.property_type = "Villa".to_string();
        assert_eq!(property_type_points(&scorer, &listing, &prefs, 15.0), Some(0.0));
    }

    #[test]
    fn test_bedroom_points() {
        let scorer = CompatibilityScorer::with_default_weights();
        let prefs = create_test_preferences();
        let mut listing = create_test_listing();

        for (bedrooms, expected) in [(2, 10.0), (1, 5.0), (3, 5.0), (4, 0.0), (0, 0.0)] {
            listing.bedrooms = bedrooms;
            assert_eq!(bedroom_points(&scorer, &listing, &prefs, 10.0), Some(expected));
        }
    }

    #[test]
    fn test_bathroom_points_decrease_with_difference() {
        let scorer = CompatibilityScorer::with_default_weights();
        let prefs = create_test_preferences();
        let mut listing = create_test_listing();

        for (bathrooms, expected) in [(2.0, 10.0), (2.5, 8.0), (1.5, 8.0), (3.0, 6.0), (3.5, 3.0), (0.0, 3.0)] {
            listing.bathrooms = bathrooms;
            assert_eq!(bathroom_points(&scorer, &listing, &prefs, 10.0), Some(expected));
        }
    }

    #[test]
    fn test_facility_weight_split() {
        let scorer = CompatibilityScorer::with_default_weights();
        let prefs = create_test_preferences();
        let mut listing = create_test_listing();
        listing.nearby_facilities = Facilities::with(&[Facility::Gym]);

        assert_eq!(facility_points(&scorer, &listing, &prefs, 25.0), Some(12.5));

        let no_facilities = PreferenceSet {
            facilities: Facilities::default(),
            ..create_test_preferences()
        };
        assert_eq!(facility_points(&scorer, &listing, &no_facilities, 25.0), None);
    }

    #[test]
    fn test_location_groups() {
        let scorer = CompatibilityScorer::new(
            ScoringWeights::default(),
            PartialCredit::default(),
            CompatibilityTable::default_property_types(),
            CompatibilityTable::from_groups([vec!["Mumbai", "Thane"]]),
        )
        .unwrap();
        let prefs = create_test_preferences();
        let mut listing = create_test_listing();

        listing.location = "Thane".to_string();
        assert_eq!(location_points(&scorer, &listing, &prefs, 20.0), Some(16.0));

        listing.location = "Pune".to_string();
        assert_eq!(location_points(&scorer, &listing, &prefs, 20.0), Some(0.0));

        // Exact match is case-sensitive; a grouped city's case variant earns group credit
        listing.location = "mumbai".to_string();
        assert_eq!(location_points(&scorer, &listing, &prefs, 20.0), Some(16.0));
    }

    #[test]
    fn test_fingerprint_tracks_configuration() {
        let default = CompatibilityScorer::with_default_weights();
        let rebuilt = CompatibilityScorer::new(
            ScoringWeights::default(),
            PartialCredit::default(),
            CompatibilityTable::default_property_types(),
            CompatibilityTable::new(),
        )
        .unwrap();
        let grouped = CompatibilityScorer::new(
            ScoringWeights::default(),
            PartialCredit::default(),
            CompatibilityTable::default_property_types(),
            CompatibilityTable::from_groups([vec!["Mumbai", "Thane"]]),
        )
        .unwrap();
        let reweighted = CompatibilityScorer::new(
            ScoringWeights {
                location: 25.0,
                facilities: 20.0,
                ..ScoringWeights::default()
            },
            PartialCredit::default(),
            CompatibilityTable::default_property_types(),
            CompatibilityTable::new(),
        )
        .unwrap();

        assert_eq!(default.fingerprint(), rebuilt.fingerprint());
        assert_ne!(default.fingerprint(), grouped.fingerprint());
        assert_ne!(default.fingerprint(), reweighted.fingerprint());
    }

    #[test]
    fn test_neutral_score_without_preferences() {
        let scorer = CompatibilityScorer::with_default_weights();
        let score = scorer
            .score(&create_test_listing(), &PreferenceSet::default())
            .unwrap();
        assert_eq!(score, NEUTRAL_SCORE);
    }

    #[test]
    fn test_rejects_invalid_configuration() {
        let too_generous = PartialCredit {
            property_type_family: 20.0,
            ..PartialCredit::default()
        };
        assert!(CompatibilityScorer::new(
            ScoringWeights::default(),
            too_generous,
            CompatibilityTable::new(),
            CompatibilityTable::new(),
        )
        .is_err());
    }

    #[test]
    fn test_rejects_invalid_listing() {
        let scorer = CompatibilityScorer::with_default_weights();
        let mut listing = create_test_listing();
        listing.price = -5.0;

        let result = scorer.score(&listing, &create_test_preferences());
        assert!(matches!(result, Err(MatchError::InvalidArgument(_))));
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(82.5), 83);
        assert_eq!(round_half_up(87.5), 88);
        assert_eq!(round_half_up(82.4999), 82);
        assert_eq!(round_half_up(0.0), 0);
        assert_eq!(round_half_up(100.0), 100);
    }
}
