use serde::{Deserialize, Serialize};
use crate::models::domain::{Recommendation, ScoredListing};

/// Response for the score endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreListingResponse {
    pub listing_id: String,
    pub compatibility_score: u8,
    pub reasoning: Vec<String>,
}

/// Response for the rank endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankListingsResponse {
    pub request_id: String,
    pub listings: Vec<ScoredListing>,
    pub total_results: usize,
}

/// Response for the recommendations endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendResponse {
    pub request_id: String,
    pub recommendations: Vec<Recommendation>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
