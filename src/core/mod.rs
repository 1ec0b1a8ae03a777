// Core algorithm exports
pub mod error;
pub mod explain;
pub mod families;
pub mod filters;
pub mod ranker;
pub mod scoring;

pub use error::MatchError;
pub use explain::matching_facilities;
pub use families::CompatibilityTable;
pub use filters::{matches_search_query, select_base_set, ALL_LOCATIONS};
pub use ranker::{PropertyRanker, RankOptions};
pub use scoring::{CompatibilityScorer, DimensionScore, PartialCredit, ScoreBreakdown, NEUTRAL_SCORE};
