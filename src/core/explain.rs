use crate::core::scoring::{budget_deviation, same_property_type, CompatibilityScorer};
use crate::models::{Facility, Listing, PreferenceSet};

/// Facilities the user asked for that the listing has nearby
pub fn matching_facilities(listing: &Listing, preferences: &PreferenceSet) -> Vec<Facility> {
    preferences
        .facilities
        .enabled()
        .filter(|f| listing.nearby_facilities.has(*f))
        .collect()
}

impl CompatibilityScorer {
    /// Short human-readable reasons a listing suits the preferences.
    ///
    /// Reasons are re-derived independently of the numeric score, in the fixed
    /// order budget, location, property type, bedrooms, facilities. They are
    /// advisory and may not line up exactly with `score`.
    pub fn explain(&self, listing: &Listing, preferences: &PreferenceSet, score: u8) -> Vec<String> {
        let mut reasons = Vec::new();

        if let Some(deviation) = budget_deviation(listing.price, preferences.budget) {
            if deviation < 0.1 {
                reasons.push("Perfect budget match".to_string());
            } else if deviation < 0.2 {
                reasons.push("Good budget fit".to_string());
            }
        }

        if !preferences.location.is_empty() && listing.location == preferences.location {
            reasons.push("Exact location match".to_string());
        }

        if !preferences.property_type.is_empty()
            && same_property_type(&listing.property_type, &preferences.property_type)
        {
            reasons.push("Property type matches preference".to_string());
        }

        if preferences.bedrooms > 0 && listing.bedrooms == preferences.bedrooms {
            reasons.push("Ideal bedroom count".to_string());
        }

        match matching_facilities(listing, preferences).len() {
            0 => {}
            1 => reasons.push("1 preferred facility nearby".to_string()),
            n => reasons.push(format!("{} preferred facilities nearby", n)),
        }

        tracing::trace!(
            "Explained listing {} (score {}): {} reasons",
            listing.id,
            score,
            reasons.len()
        );

        reasons
    }
}
