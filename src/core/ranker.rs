use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use crate::core::error::MatchError;
use crate::core::filters::{matches_search_query, select_base_set};
use crate::core::scoring::CompatibilityScorer;
use crate::models::{Listing, PreferenceSet, Recommendation, ScoredListing, SortKey};
use crate::services::ScoreCache;

/// Filter and sort directives for a ranking call
#[derive(Debug, Clone)]
pub struct RankOptions {
    pub preferences: Option<PreferenceSet>,
    pub location_filter: Option<String>,
    pub search_query: Option<String>,
    pub sort_by: SortKey,
    pub saved_ids: Option<HashSet<String>>,
    pub saved_only: bool,
}

impl RankOptions {
    /// No filters, no preferences
    pub fn sorted_by(sort_by: SortKey) -> Self {
        Self {
            preferences: None,
            location_filter: None,
            search_query: None,
            sort_by,
            saved_ids: None,
            saved_only: false,
        }
    }
}

/// Ranking orchestrator - implements the listing presentation pipeline
///
/// # Pipeline Stages
/// 1. Base-set selection (saved bookmarks or location)
/// 2. Text search
/// 3. Compatibility scoring
/// 4. Stable sort
#[derive(Clone)]
pub struct PropertyRanker {
    scorer: CompatibilityScorer,
    cache: Option<Arc<ScoreCache>>,
}

impl PropertyRanker {
    pub fn new(scorer: CompatibilityScorer) -> Self {
        Self {
            scorer,
            cache: None,
        }
    }

    pub fn with_default_weights() -> Self {
        Self::new(CompatibilityScorer::with_default_weights())
    }

    /// Memoize scores in `cache`
    pub fn with_cache(mut self, cache: Arc<ScoreCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn scorer(&self) -> &CompatibilityScorer {
        &self.scorer
    }

    /// Produce the filtered, ordered view of `listings`.
    ///
    /// Nothing is retained between calls; an empty input yields an empty
    /// output.
    pub fn rank(
        &self,
        listings: &[Listing],
        options: &RankOptions,
    ) -> Result<Vec<ScoredListing>, MatchError> {
        for listing in listings {
            listing.validate()?;
        }

        // Stage 1: Base set
        let base = select_base_set(
            listings,
            options.location_filter.as_deref(),
            options.saved_ids.as_ref(),
            options.saved_only,
        );

        // Stage 2: Text search
        let query = options
            .search_query
            .as_deref()
            .unwrap_or_default()
            .to_lowercase();

        let filtered: Vec<&Listing> = base
            .into_iter()
            .filter(|listing| matches_search_query(listing, &query))
            .collect();

        tracing::debug!(
            "Ranking {} of {} listings by {}",
            filtered.len(),
            listings.len(),
            options.sort_by
        );

        // Stage 3: Scoring, only when there is something to score against
        let preferences = options.preferences.as_ref().filter(|p| !p.is_empty());
        if let Some(prefs) = preferences {
            prefs.validate()?;
        }

        let mut ranked = filtered
            .into_iter()
            .map(|listing| {
                let compatibility_score = match preferences {
                    Some(prefs) => Some(self.score_listing(listing, prefs)?),
                    None => None,
                };
                Ok(ScoredListing {
                    listing: listing.clone(),
                    compatibility_score,
                })
            })
            .collect::<Result<Vec<_>, MatchError>>()?;

        // Stage 4: Stable sort, ties keep input order
        ranked.sort_by(|a, b| compare(a, b, options.sort_by));

        Ok(ranked)
    }

    /// Top `limit` listings by compatibility, each with advisory reasoning
    pub fn recommend(
        &self,
        listings: &[Listing],
        preferences: &PreferenceSet,
        limit: usize,
    ) -> Result<Vec<Recommendation>, MatchError> {
        if limit == 0 {
            return Err(MatchError::invalid("recommendation limit must be at least 1"));
        }
        preferences.validate()?;

        let mut recommendations = listings
            .iter()
            .map(|listing| {
                let score = self.score_listing(listing, preferences)?;
                Ok(Recommendation {
                    property_id: listing.id.clone(),
                    compatibility_score: score,
                    reasoning: self.scorer.explain(listing, preferences, score),
                })
            })
            .collect::<Result<Vec<_>, MatchError>>()?;

        recommendations.sort_by(|a, b| b.compatibility_score.cmp(&a.compatibility_score));
        recommendations.truncate(limit);

        Ok(recommendations)
    }

    fn score_listing(&self, listing: &Listing, preferences: &PreferenceSet) -> Result<u8, MatchError> {
        match &self.cache {
            Some(cache) => cache.get_or_compute(&self.scorer, listing, preferences, || {
                self.scorer.score(listing, preferences)
            }),
            None => self.scorer.score(listing, preferences),
        }
    }
}

impl Default for PropertyRanker {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

fn compare(a: &ScoredListing, b: &ScoredListing, sort_by: SortKey) -> Ordering {
    match sort_by {
        SortKey::PriceAsc => a.listing.price.total_cmp(&b.listing.price),
        SortKey::PriceDesc => b.listing.price.total_cmp(&a.listing.price),
        SortKey::Match => b
            .compatibility_score
            .unwrap_or(0)
            .cmp(&a.compatibility_score.unwrap_or(0)),
        SortKey::Recent => b.listing.listed_at.cmp(&a.listing.listed_at),
    }
}
