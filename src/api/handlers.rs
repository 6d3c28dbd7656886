use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::middleware::RequestId;
use crate::models::{
    ItemId, ModelStats, Movie, Rating, RatingRequest, RecommendationQuery, UserId,
};

use super::AppState;

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Ranked item ids for a user
pub async fn get_recommendations(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(user_id): Path<i64>,
    Query(query): Query<RecommendationQuery>,
) -> AppResult<Json<Vec<ItemId>>> {
    let limits = state.limits;
    let top_n = query.top_n.unwrap_or(limits.default_top_n);

    // Validate the requested size
    if top_n == 0 || top_n > limits.max_top_n {
        return Err(AppError::InvalidInput(format!(
            "top_n must be between 1 and {}",
            limits.max_top_n
        )));
    }

    let items = state.recommender.recommend(UserId(user_id), top_n).await;

    tracing::info!(
        request_id = %request_id,
        user_id,
        top_n,
        returned = items.len(),
        "Recommendations served"
    );

    Ok(Json(items))
}

/// Records one rating and patches the model
///
/// The rating only lives in the in-memory model. It is not written back to
/// the ratings table, so a restart or a cold rebuild from the database drops
/// it. A `204` means the model was patched, not that the rating was stored.
pub async fn submit_rating(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RatingRequest>,
) -> AppResult<StatusCode> {
    let limits = state.limits;

    // Reject scores outside the configured scale
    if !request.score.is_finite()
        || request.score < limits.min_score
        || request.score > limits.max_score
    {
        return Err(AppError::InvalidInput(format!(
            "score must be between {} and {}",
            limits.min_score, limits.max_score
        )));
    }

    // Patch the live model
    let rating = Rating::from(request);
    state.recommender.apply_rating(&rating).await;

    tracing::info!(
        request_id = %request_id,
        user_id = %rating.user_id,
        item_id = %rating.item_id,
        "Rating applied"
    );

    Ok(StatusCode::NO_CONTENT)
}

/// Full movie catalogue
pub async fn get_movies(State(state): State<AppState>) -> AppResult<Json<Vec<Movie>>> {
    let movies = state.catalog.load_items().await?;
    Ok(Json(movies))
}

/// Size of the live model
pub async fn get_model_stats(State(state): State<AppState>) -> Json<ModelStats> {
    Json(state.recommender.stats().await)
}
