use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::core::{MatchError, PropertyRanker, RankOptions};
use crate::models::{
    ErrorResponse, HealthResponse, RankListingsRequest, RankListingsResponse, RecommendRequest,
    RecommendResponse, ScoreListingRequest, ScoreListingResponse, SortKey,
};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub ranker: PropertyRanker,
    pub recommendation_limit: usize,
}

/// Configure all listing-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/listings/score", web::post().to(score_listing))
        .route("/listings/rank", web::post().to(rank_listings))
        .route("/recommendations", web::post().to(recommend));
}

fn bad_request(error: &str, message: impl ToString) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: error.to_string(),
        message: message.to_string(),
        status_code: 400,
    })
}

fn match_error_response(err: MatchError) -> HttpResponse {
    match err {
        MatchError::InvalidArgument(message) => bad_request("Invalid argument", message),
    }
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Score a single listing
///
/// POST /api/v1/listings/score
///
/// Request body:
/// ```json
/// {
///   "listing": { "id": "1", "price": 4500000, "location": "Mumbai", ... },
///   "preferences": { "location": "Mumbai", "budget": 4500000, ... }
/// }
/// ```
async fn score_listing(
    state: web::Data<AppState>,
    req: web::Json<ScoreListingRequest>,
) -> impl Responder {
    let scorer = state.ranker.scorer();

    let score = match scorer.score(&req.listing, &req.preferences) {
        Ok(score) => score,
        Err(e) => {
            tracing::info!("Rejected score request for listing {}: {}", req.listing.id, e);
            return match_error_response(e);
        }
    };

    let reasoning = scorer.explain(&req.listing, &req.preferences, score);

    tracing::debug!("Scored listing {}: {}", req.listing.id, score);

    HttpResponse::Ok().json(ScoreListingResponse {
        listing_id: req.listing.id.clone(),
        compatibility_score: score,
        reasoning,
    })
}

/// Rank a listing collection
///
/// POST /api/v1/listings/rank
///
/// Request body:
/// ```json
/// {
///   "listings": [ ... ],
///   "preferences": { ... },
///   "locationFilter": "Pune",
///   "searchQuery": "garden",
///   "sortBy": "match|recent|price-asc|price-desc",
///   "savedIds": ["1", "2"],
///   "savedOnly": false
/// }
/// ```
async fn rank_listings(
    state: web::Data<AppState>,
    req: web::Json<RankListingsRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for rank request: field_errors={:?}", errors);
        return bad_request("Validation failed", errors);
    }

    let sort_by = match req.sort_by.parse::<SortKey>() {
        Ok(sort_by) => sort_by,
        Err(e) => return match_error_response(e),
    };

    let req = req.into_inner();
    let total_listings = req.listings.len();
    let options = RankOptions {
        preferences: req.preferences,
        location_filter: req.location_filter,
        search_query: req.search_query,
        sort_by,
        saved_ids: req.saved_ids,
        saved_only: req.saved_only,
    };

    let listings = match state.ranker.rank(&req.listings, &options) {
        Ok(listings) => listings,
        Err(e) => {
            tracing::info!("Rejected rank request: {}", e);
            return match_error_response(e);
        }
    };

    tracing::info!(
        "Returning {} listings (from {}) sorted by {}",
        listings.len(),
        total_listings,
        sort_by
    );

    HttpResponse::Ok().json(RankListingsResponse {
        request_id: uuid::Uuid::new_v4().to_string(),
        total_results: listings.len(),
        listings,
    })
}

/// Top recommendations with reasoning
///
/// POST /api/v1/recommendations
///
/// Request body:
/// ```json
/// {
///   "listings": [ ... ],
///   "preferences": { ... },
///   "limit": 5
/// }
/// ```
async fn recommend(
    state: web::Data<AppState>,
    req: web::Json<RecommendRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for recommend request: field_errors={:?}", errors);
        return bad_request("Validation failed", errors);
    }

    let limit = req
        .limit
        .map(usize::from)
        .unwrap_or(state.recommendation_limit);

    match state.ranker.recommend(&req.listings, &req.preferences, limit) {
        Ok(recommendations) => {
            tracing::info!(
                "Returning {} recommendations (from {} listings)",
                recommendations.len(),
                req.listings.len()
            );
            HttpResponse::Ok().json(RecommendResponse {
                request_id: uuid::Uuid::new_v4().to_string(),
                recommendations,
            })
        }
        Err(e) => {
            tracing::info!("Rejected recommend request: {}", e);
            match_error_response(e)
        }
    }
}
