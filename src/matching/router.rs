use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{CandidateId, JobId, MatchId};
use super::providers::ProviderError;
use super::ranking::BrowseFilters;
use super::service::{MatchingError, MatchingService};
use super::status::{Actor, MatchStatus};
use super::store::StoreError;

/// Router builder exposing the matching operations over HTTP.
pub fn matching_router(service: Arc<MatchingService>) -> Router {
    Router::new()
        .route(
            "/api/v1/candidates/:candidate_id/jobs/:job_id/score",
            get(compute_handler),
        )
        .route("/api/v1/candidates/:candidate_id/jobs", get(browse_handler))
        .route(
            "/api/v1/jobs/:job_id/matches",
            post(calculate_handler).get(job_candidates_handler),
        )
        .route("/api/v1/matches/:match_id/status", patch(status_handler))
        .route("/api/v1/matches/:match_id/view", post(view_handler))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusUpdateRequest {
    pub(crate) status: MatchStatus,
    pub(crate) actor: Actor,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ViewRequest {
    pub(crate) actor: Actor,
}

pub(crate) async fn compute_handler(
    State(service): State<Arc<MatchingService>>,
    Path((candidate_id, job_id)): Path<(String, String)>,
) -> Response {
    match service.compute_match(&CandidateId(candidate_id), &JobId(job_id)) {
        Ok(score) => (StatusCode::OK, Json(score)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn browse_handler(
    State(service): State<Arc<MatchingService>>,
    Path(candidate_id): Path<String>,
    Query(filters): Query<BrowseFilters>,
) -> Response {
    match service
        .browse_jobs_for_candidate(&CandidateId(candidate_id), &filters)
        .await
    {
        Ok(results) => (StatusCode::OK, Json(results)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn calculate_handler(
    State(service): State<Arc<MatchingService>>,
    Path(job_id): Path<String>,
) -> Response {
    match service.calculate_job_matches(&JobId(job_id)).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn job_candidates_handler(
    State(service): State<Arc<MatchingService>>,
    Path(job_id): Path<String>,
) -> Response {
    match service.get_job_candidates(&JobId(job_id)) {
        Ok(matches) => (StatusCode::OK, Json(matches)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn status_handler(
    State(service): State<Arc<MatchingService>>,
    Path(match_id): Path<String>,
    Json(request): Json<StatusUpdateRequest>,
) -> Response {
    match service.update_match_status(&MatchId(match_id), request.status, &request.actor) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn view_handler(
    State(service): State<Arc<MatchingService>>,
    Path(match_id): Path<String>,
    Json(request): Json<ViewRequest>,
) -> Response {
    match service.view_match(&MatchId(match_id), &request.actor) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(err) => err.into_response(),
    }
}

impl IntoResponse for MatchingError {
    fn into_response(self) -> Response {
        let status = match &self {
            MatchingError::JobNotFound(_)
            | MatchingError::CandidateNotFound(_)
            | MatchingError::MatchNotFound(_)
            | MatchingError::Provider(ProviderError::NotFound(_))
            | MatchingError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
            MatchingError::JobNotActive { .. }
            | MatchingError::InvalidStatusTransition { .. }
            | MatchingError::Store(StoreError::StatusConflict { .. }) => StatusCode::CONFLICT,
            MatchingError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            MatchingError::Provider(_) | MatchingError::Store(StoreError::Unavailable(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            MatchingError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            MatchingError::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = match &self {
            MatchingError::InvalidStatusTransition {
                match_id,
                current,
                requested,
            } => json!({
                "error": self.to_string(),
                "match_id": match_id,
                "status": current.label(),
                "requested": requested.label(),
            }),
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(payload)).into_response()
    }
}
