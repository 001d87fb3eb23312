use super::common::*;
use crate::matching::domain::{JobId, MatchId};
use crate::matching::providers::MatchingProviders;
use crate::matching::router::{compute_handler, matching_router};
use crate::matching::scoring::ScoringConfig;
use crate::matching::service::{BatchSettings, MatchingService};
use crate::matching::store::{InMemoryMatchStore, MatchStore};
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}

async fn seeded_match(
    service: &Arc<MatchingService>,
    store: &Arc<InMemoryMatchStore>,
) -> MatchId {
    let job_id = JobId::new("job-data");
    service
        .calculate_job_matches(&job_id)
        .await
        .expect("batch succeeds");
    store.for_job(&job_id).expect("list")[0].match_id.clone()
}

#[tokio::test]
async fn compute_handler_returns_score_payload() {
    let (service, _) = build_service(seeded_directory());

    let response = compute_handler(
        State(service),
        Path(("cand-a".to_string(), "job-data".to_string())),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["candidate_id"], "cand-a");
    assert_eq!(payload["qualified"], true);
    assert_eq!(payload["required_skills_met"], 2);
}

#[tokio::test]
async fn score_route_returns_not_found_for_unknown_job() {
    let (service, _) = build_service(seeded_directory());
    let router = matching_router(service);

    let response = router
        .oneshot(get("/api/v1/candidates/cand-a/jobs/job-nope/score"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .expect("error message")
        .contains("job-nope"));
}

#[tokio::test]
async fn calculate_route_returns_batch_outcome() {
    let (service, _) = build_service(seeded_directory());
    let router = matching_router(service);

    let response = router
        .oneshot(json_request(
            Method::POST,
            "/api/v1/jobs/job-data/matches",
            json!({}),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["match_count"], 2);
    assert_eq!(payload["skipped_count"], 0);
}

#[tokio::test]
async fn calculate_route_rejects_inactive_job_with_conflict() {
    let directory = seeded_directory();
    directory.set_job_status("job-data", crate::matching::JobStatus::Closed);
    let (service, _) = build_service(directory);

    let response = matching_router(service)
        .oneshot(json_request(
            Method::POST,
            "/api/v1/jobs/job-data/matches",
            json!({}),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn job_matches_route_lists_ranked_candidates() {
    let (service, store) = build_service(seeded_directory());
    seeded_match(&service, &store).await;

    let response = matching_router(service)
        .oneshot(get("/api/v1/jobs/job-data/matches"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let rows = payload.as_array().expect("array payload");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["rank"], 1);
    assert_eq!(rows[0]["candidate_id"], "cand-a");
    assert_eq!(rows[1]["status"], "matched");
}

#[tokio::test]
async fn browse_route_applies_query_filters() {
    let (service, _) = build_service(seeded_directory());

    let response = matching_router(service)
        .oneshot(get(
            "/api/v1/candidates/cand-c/jobs?qualified_only=true&sort=recent",
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload, json!([]));
}

#[tokio::test]
async fn browse_route_lists_unqualified_jobs_by_default() {
    let (service, _) = build_service(seeded_directory());

    let response = matching_router(service)
        .oneshot(get("/api/v1/candidates/cand-c/jobs"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let rows = payload.as_array().expect("array payload");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["score"]["qualified"], false);
    assert!(rows[0].get("rank").is_none());
}

#[tokio::test]
async fn status_route_rejects_skipping_ahead() {
    let (service, store) = build_service(seeded_directory());
    let match_id = seeded_match(&service, &store).await;

    let response = matching_router(service)
        .oneshot(json_request(
            Method::PATCH,
            &format!("/api/v1/matches/{match_id}/status"),
            json!({ "status": "hired", "actor": { "id": "emp-1", "role": "employer" } }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let payload = read_json_body(response).await;
    assert_eq!(payload["status"], "matched");
    assert_eq!(payload["requested"], "hired");
}

#[tokio::test]
async fn status_route_applies_forward_transition() {
    let (service, store) = build_service(seeded_directory());
    let match_id = seeded_match(&service, &store).await;
    let router = matching_router(service);

    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/matches/{match_id}/view"),
            json!({ "actor": { "id": "emp-1", "role": "employer" } }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["status"], "viewed");
    assert!(payload["reviewed_at"].is_string());

    let response = router
        .oneshot(json_request(
            Method::PATCH,
            &format!("/api/v1/matches/{match_id}/status"),
            json!({ "status": "contacted", "actor": { "id": "emp-1", "role": "employer" } }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["status"], "contacted");
    assert_eq!(payload["history"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn status_route_returns_not_found_for_unknown_match() {
    let (service, _) = build_service(seeded_directory());

    let response = matching_router(service)
        .oneshot(json_request(
            Method::PATCH,
            "/api/v1/matches/match-missing/status",
            json!({ "status": "viewed", "actor": { "id": "emp-1", "role": "employer" } }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_requirement_data_is_unprocessable() {
    let mut job = data_job();
    job.requirements[1].minimum_score = 140.0;
    let directory = MemoryDirectory::with_job(job);
    directory.put_candidate(candidate("cand-a", vec![skill("python", 85.0)]));
    let (service, _) = build_service(directory);

    let response = matching_router(service)
        .oneshot(get("/api/v1/candidates/cand-a/jobs/job-data/score"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn provider_outage_maps_to_service_unavailable() {
    let directory = seeded_directory();
    let providers = MatchingProviders {
        skills: directory.clone(),
        profiles: directory,
        jobs: Arc::new(UnavailableJobs),
    };
    let service = Arc::new(MatchingService::new(
        providers,
        Arc::new(InMemoryMatchStore::default()),
        ScoringConfig::default(),
        BatchSettings::default(),
    ));

    let response = matching_router(service)
        .oneshot(get("/api/v1/jobs/job-data/matches"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
