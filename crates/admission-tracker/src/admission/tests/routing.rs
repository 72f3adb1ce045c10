use super::common::*;
use crate::admission::{admission_router, AdmissionTrackerService};
use crate::admission::rules::CompetitionRules;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn json_request(method: Method, uri: &str, payload: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("request")
}

fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

async fn create_program(router: &Router, seats: u32, participant_id: &str) -> String {
    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/universities",
            json!({ "name": "State Technical University" }),
        ))
        .await
        .expect("router response");
    assert_eq!(response.status(), StatusCode::CREATED);
    let university = read_json_body(response).await;

    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/programs",
            json!({
                "university_id": university["id"],
                "name": "Applied Mathematics",
                "budget_seats": seats,
                "participant_id": participant_id,
            }),
        ))
        .await
        .expect("router response");
    assert_eq!(response.status(), StatusCode::CREATED);
    let program = read_json_body(response).await;
    program["id"].as_str().expect("program id").to_string()
}

#[tokio::test]
async fn position_endpoint_ranks_pasted_list() {
    let (service, _) = build_service();
    let router = admission_router_with_service(service);

    let response = router
        .oneshot(json_request(
            Method::POST,
            "/api/v1/admission/position",
            json!({
                "raw_list": ranked_list(),
                "participant_id": "P-05",
                "budget_seats": 2,
            }),
        ))
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["entries_parsed"], 10);
    assert_eq!(payload["position"]["general_position"], 5);
    assert_eq!(payload["position"]["admission_chance"], 40);
    assert_eq!(payload["band"], "medium");
}

#[tokio::test]
async fn position_endpoint_returns_null_for_absent_participant() {
    let (service, _) = build_service();
    let router = admission_router_with_service(service);

    let response = router
        .oneshot(json_request(
            Method::POST,
            "/api/v1/admission/position",
            json!({
                "raw_list": ranked_list(),
                "participant_id": "P-99",
                "budget_seats": 2,
            }),
        ))
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert!(payload["position"].is_null());
    assert!(payload["band"].is_null());
}

#[tokio::test]
async fn program_for_unknown_university_is_not_found() {
    let (service, _) = build_service();
    let router = admission_router_with_service(service);

    let response = router
        .oneshot(json_request(
            Method::POST,
            "/api/v1/programs",
            json!({
                "university_id": "uni-missing",
                "name": "Physics",
                "budget_seats": 5,
                "participant_id": "P-1",
            }),
        ))
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], "university uni-missing is not registered");
}

#[tokio::test]
async fn blank_university_name_is_rejected() {
    let (service, _) = build_service();
    let router = admission_router_with_service(service);

    let response = router
        .oneshot(json_request(
            Method::POST,
            "/api/v1/universities",
            json!({ "name": "  " }),
        ))
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn import_then_history_and_program_view() {
    let (service, _) = build_service();
    let router = admission_router_with_service(service);
    let program_id = create_program(&router, 5, "P-05").await;

    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/programs/{program_id}/imports"),
            json!({ "raw_list": ranked_list(), "recorded_on": "2025-07-20" }),
        ))
        .await
        .expect("router response");
    assert_eq!(response.status(), StatusCode::OK);
    let outcome = read_json_body(response).await;
    assert_eq!(outcome["position"]["admission_chance"], 100);
    assert_eq!(outcome["band"], "high");

    let response = router
        .clone()
        .oneshot(empty_request(
            Method::GET,
            &format!("/api/v1/programs/{program_id}/history"),
        ))
        .await
        .expect("router response");
    assert_eq!(response.status(), StatusCode::OK);
    let history = read_json_body(response).await;
    let snapshots = history.as_array().expect("history array");
    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0]["recorded_on"], "2025-07-20");

    let response = router
        .oneshot(empty_request(
            Method::GET,
            &format!("/api/v1/programs/{program_id}"),
        ))
        .await
        .expect("router response");
    assert_eq!(response.status(), StatusCode::OK);
    let view = read_json_body(response).await;
    assert_eq!(view["program"]["id"], program_id.as_str());
    assert_eq!(view["latest"]["result"]["general_position"], 5);
    assert!(view["change"].is_null());
}

#[tokio::test]
async fn summary_counts_tracked_programs() {
    let (service, _) = build_service();
    let router = admission_router_with_service(service);
    let tracked = create_program(&router, 2, "P-05").await;
    create_program(&router, 2, "P-01").await;

    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/programs/{tracked}/imports"),
            json!({ "raw_list": ranked_list() }),
        ))
        .await
        .expect("router response");
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .oneshot(empty_request(Method::GET, "/api/v1/summary"))
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::OK);
    let summary = read_json_body(response).await;
    assert_eq!(summary["programs"], 2);
    assert_eq!(summary["tracked"], 1);
    assert_eq!(summary["medium"], 1);
    assert_eq!(summary["average_chance"], 40.0);
}

#[tokio::test]
async fn unknown_program_routes_are_not_found() {
    let (service, _) = build_service();
    let router = admission_router_with_service(service);

    let response = router
        .clone()
        .oneshot(empty_request(Method::GET, "/api/v1/programs/prog-missing"))
        .await
        .expect("router response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = router
        .oneshot(json_request(
            Method::POST,
            "/api/v1/programs/prog-missing/imports",
            json!({ "raw_list": ranked_list() }),
        ))
        .await
        .expect("router response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_program_returns_no_content() {
    let (service, _) = build_service();
    let router = admission_router_with_service(service);
    let program_id = create_program(&router, 5, "P-05").await;

    let response = router
        .clone()
        .oneshot(empty_request(
            Method::DELETE,
            &format!("/api/v1/programs/{program_id}"),
        ))
        .await
        .expect("router response");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = router
        .oneshot(empty_request(
            Method::GET,
            &format!("/api/v1/programs/{program_id}"),
        ))
        .await
        .expect("router response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn repository_outage_surfaces_as_server_error() {
    let service = AdmissionTrackerService::new(
        Arc::new(UnavailableRepository),
        CompetitionRules::default(),
    );
    let router = admission_router(Arc::new(service));

    let response = router
        .oneshot(empty_request(Method::GET, "/api/v1/summary"))
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], "repository unavailable: database offline");
}
