use axum::{
    extract::{Path, State},
    Extension, Json,
};
use trendpulse_collector::{
    run_recorded_collection, CollectError, RecordedCollection, RecordedRunError,
};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

/// `POST /api/v1/trends/{country}/collect`: one recorded collection run.
pub(super) async fn collect_country(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(country): Path<String>,
) -> Result<Json<ApiResponse<RecordedCollection>>, ApiError> {
    let recorded = run_recorded_collection(&state.pool, &*state.collector, &country, "api")
        .await
        .map_err(|e| map_collect_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: recorded,
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn map_collect_error(request_id: String, error: &RecordedRunError) -> ApiError {
    match error {
        RecordedRunError::Collect(CollectError::EmptyCountry) => {
            ApiError::new(request_id, "bad_request", "country code must not be empty")
        }
        RecordedRunError::Collect(e @ CollectError::BucketResolution { .. }) => {
            tracing::error!(error = %e, "collection failed");
            ApiError::new(request_id, "internal_error", "failed to resolve keyword bucket")
        }
        RecordedRunError::Db(e) => map_db_error(request_id, e),
    }
}
