// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Dimension, Facilities, Facility, Listing, PreferenceSet, Recommendation, ScoredListing, ScoringWeights, SortKey};
pub use requests::{RankListingsRequest, RecommendRequest, ScoreListingRequest};
pub use responses::{ErrorResponse, HealthResponse, RankListingsResponse, RecommendResponse, ScoreListingResponse};
