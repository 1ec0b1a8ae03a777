//! Estate Match - compatibility scoring and ranking for property listings
//!
//! This library scores how well a listing matches a user's stated
//! preferences and builds the filtered, sorted listing views on top of that
//! score.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{CompatibilityScorer, MatchError, PropertyRanker, RankOptions};
pub use models::{Facilities, Facility, Listing, PreferenceSet, Recommendation, ScoredListing, ScoringWeights, SortKey};
