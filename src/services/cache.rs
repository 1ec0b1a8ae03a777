use moka::sync::Cache;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::error::MatchError;
use crate::core::scoring::CompatibilityScorer;
use crate::models::{Listing, PreferenceSet};

/// Cache key: versions of the scoring configuration, the listing and the
/// preference set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScoreKey {
    pub scorer_version: u64,
    pub listing_version: u64,
    pub preferences_version: u64,
}

impl ScoreKey {
    pub fn new(scorer: &CompatibilityScorer, listing: &Listing, preferences: &PreferenceSet) -> Self {
        Self {
            scorer_version: scorer.fingerprint(),
            listing_version: listing.fingerprint(),
            preferences_version: preferences.fingerprint(),
        }
    }
}

/// In-memory memo of compatibility scores
///
/// Never authoritative: a miss recomputes and stores the fresh score, and a
/// changed listing, preference set or scorer configuration produces a
/// different key. Rankers with different weights may share one cache.
pub struct ScoreCache {
    scores: Cache<ScoreKey, u8>,
}

impl ScoreCache {
    pub fn new(capacity: u64, ttl_secs: u64) -> Self {
        let scores = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { scores }
    }

    /// Cached score, or compute and store it
    pub fn get_or_compute<F>(
        &self,
        scorer: &CompatibilityScorer,
        listing: &Listing,
        preferences: &PreferenceSet,
        compute: F,
    ) -> Result<u8, MatchError>
    where
        F: FnOnce() -> Result<u8, MatchError>,
    {
        let key = ScoreKey::new(scorer, listing, preferences);

        if let Some(score) = self.scores.get(&key) {
            tracing::trace!("Score cache hit: listing {}", listing.id);
            return Ok(score);
        }

        let score = compute()?;
        self.scores.insert(key, score);
        tracing::trace!("Score cache miss: listing {}", listing.id);
        Ok(score)
    }

    pub fn invalidate_all(&self) {
        self.scores.invalidate_all();
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        self.scores.run_pending_tasks();
        CacheStats {
            entry_count: self.scores.entry_count(),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub entry_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CompatibilityTable, PartialCredit};
    use crate::models::{Facilities, ScoringWeights};
    use chrono::Utc;
    use std::cell::Cell;

    fn create_test_listing() -> Listing {
        Listing {
            id: "1".to_string(),
            title: "Loft".to_string(),
            description: String::new(),
            price: 250_000.0,
            location: "Delhi".to_string(),
            property_type: "Loft".to_string(),
            bedrooms: 1,
            bathrooms: 1.0,
            area: 700.0,
            nearby_facilities: Facilities::default(),
            features: vec![],
            listed_at: Utc::now(),
        }
    }

    #[test]
    fn test_hit_skips_compute() {
        let cache = ScoreCache::new(100, 60);
        let scorer = CompatibilityScorer::with_default_weights();
        let listing = create_test_listing();
        let prefs = PreferenceSet::default();
        let calls = Cell::new(0);

        let compute = || {
            calls.set(calls.get() + 1);
            Ok(42)
        };

        assert_eq!(cache.get_or_compute(&scorer, &listing, &prefs, compute).unwrap(), 42);
        assert_eq!(cache.get_or_compute(&scorer, &listing, &prefs, compute).unwrap(), 42);
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.stats().entry_count, 1);
    }

    #[test]
    fn test_changed_listing_misses() {
        let cache = ScoreCache::new(100, 60);
        let scorer = CompatibilityScorer::with_default_weights();
        let mut listing = create_test_listing();
        let prefs = PreferenceSet::default();

        cache.get_or_compute(&scorer, &listing, &prefs, || Ok(10)).unwrap();
        listing.price = 260_000.0;
        let score = cache.get_or_compute(&scorer, &listing, &prefs, || Ok(20)).unwrap();

        assert_eq!(score, 20);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let cache = ScoreCache::new(100, 60);
        let scorer = CompatibilityScorer::with_default_weights();
        let listing = create_test_listing();
        let prefs = PreferenceSet::default();

        let failed = cache.get_or_compute(&scorer, &listing, &prefs, || {
            Err(MatchError::InvalidArgument("bad".to_string()))
        });
        assert!(failed.is_err());

        let score = cache.get_or_compute(&scorer, &listing, &prefs, || Ok(55)).unwrap();
        assert_eq!(score, 55);
    }

    #[test]
    fn test_scorer_configuration_is_part_of_key() {
        let cache = ScoreCache::new(100, 60);
        let listing = create_test_listing();
        let prefs = PreferenceSet::default();
        let plain = CompatibilityScorer::with_default_weights();
        let grouped = CompatibilityScorer::new(
            ScoringWeights::default(),
            PartialCredit::default(),
            CompatibilityTable::default_property_types(),
            CompatibilityTable::from_groups([vec!["Delhi", "Noida"]]),
        )
        .unwrap();

        cache.get_or_compute(&plain, &listing, &prefs, || Ok(10)).unwrap();
        let score = cache.get_or_compute(&grouped, &listing, &prefs, || Ok(30)).unwrap();

        assert_eq!(score, 30);
        assert_eq!(cache.stats().entry_count, 2);
    }
}
