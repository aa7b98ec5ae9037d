use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use trendpulse_db::{KeywordBucketRow, NewsContentRow, VideoContentRow};

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct BucketsQuery {
    pub country: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct LimitQuery {
    pub limit: Option<i64>,
}

/// Blank filters mean "all countries".
fn country_filter(raw: Option<&str>) -> Option<String> {
    raw.map(trendpulse_core::normalize_country)
        .filter(|c| !c.is_empty())
}

pub(super) async fn list_buckets(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<BucketsQuery>,
) -> Result<Json<ApiResponse<Vec<KeywordBucketRow>>>, ApiError> {
    let country = country_filter(query.country.as_deref());
    let rows = trendpulse_db::list_buckets(
        &state.pool,
        country.as_deref(),
        normalize_limit(query.limit),
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_bucket(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<KeywordBucketRow>>, ApiError> {
    let row = trendpulse_db::get_bucket(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: row,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn list_bucket_videos(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<ApiResponse<Vec<VideoContentRow>>>, ApiError> {
    // 404 for an unknown bucket rather than an empty list.
    trendpulse_db::get_bucket(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let rows = trendpulse_db::list_videos_by_bucket(&state.pool, id, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn list_bucket_news(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<ApiResponse<Vec<NewsContentRow>>>, ApiError> {
    trendpulse_db::get_bucket(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let rows = trendpulse_db::list_news_by_bucket(&state.pool, id, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows,
        meta: ResponseMeta::new(req_id.0),
    }))
}
