use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use validator::Validate;

use crate::models::domain::{Listing, PreferenceSet};

/// Request to score a single listing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreListingRequest {
    pub listing: Listing,
    pub preferences: PreferenceSet,
}

/// Request to rank a listing collection
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RankListingsRequest {
    #[validate(length(max = 10000))]
    pub listings: Vec<Listing>,
    #[serde(default)]
    pub preferences: Option<PreferenceSet>,
    #[serde(default)]
    pub location_filter: Option<String>,
    #[serde(default)]
    #[validate(length(max = 256))]
    pub search_query: Option<String>,
    #[validate(length(min = 1))]
    pub sort_by: String,
    #[serde(default)]
    pub saved_ids: Option<HashSet<String>>,
    #[serde(default)]
    pub saved_only: bool,
}

/// Request for top-N recommendations
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecommendRequest {
    #[validate(length(max = 10000))]
    pub listings: Vec<Listing>,
    pub preferences: PreferenceSet,
    #[serde(default)]
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u16>,
}
