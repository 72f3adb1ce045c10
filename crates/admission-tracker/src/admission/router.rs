use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{
    ChanceBand, NewProgram, NewUniversity, PositionResult, PositionSnapshot, Program, ProgramId,
    UniversityId,
};
use super::parser::{parse_admission_list_with_diagnostics, SkippedRow};
use super::position::calculate_position_with;
use super::repository::{RepositoryError, TrackerRepository};
use super::service::{AdmissionTrackerService, TrackerServiceError};

/// Router builder exposing the calculator and the tracker service over HTTP.
pub fn admission_router<R>(service: Arc<AdmissionTrackerService<R>>) -> Router
where
    R: TrackerRepository + 'static,
{
    Router::new()
        .route("/api/v1/admission/position", post(position_handler::<R>))
        .route("/api/v1/universities", post(create_university_handler::<R>))
        .route(
            "/api/v1/universities/:university_id",
            axum::routing::delete(delete_university_handler::<R>),
        )
        .route("/api/v1/programs", post(create_program_handler::<R>))
        .route(
            "/api/v1/programs/:program_id",
            get(program_handler::<R>).delete(delete_program_handler::<R>),
        )
        .route(
            "/api/v1/programs/:program_id/imports",
            post(import_handler::<R>),
        )
        .route(
            "/api/v1/programs/:program_id/history",
            get(history_handler::<R>),
        )
        .route("/api/v1/summary", get(summary_handler::<R>))
        .with_state(service)
}

/// One-off calculation over a pasted list; nothing is stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionRequest {
    pub raw_list: String,
    pub participant_id: String,
    pub budget_seats: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionResponse {
    pub entries_parsed: usize,
    pub skipped_rows: Vec<SkippedRow>,
    pub position: Option<PositionResult>,
    pub band: Option<ChanceBand>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRequest {
    pub raw_list: String,
    /// Defaults to the server's current local time.
    #[serde(default)]
    pub recorded_on: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgramView {
    pub program: Program,
    pub latest: Option<PositionSnapshot>,
    pub change: Option<i16>,
}

pub(crate) async fn position_handler<R>(
    State(service): State<Arc<AdmissionTrackerService<R>>>,
    axum::Json(request): axum::Json<PositionRequest>,
) -> Response
where
    R: TrackerRepository + 'static,
{
    let parsed = parse_admission_list_with_diagnostics(&request.raw_list);
    let position = calculate_position_with(
        service.rules(),
        &parsed.entries,
        &request.participant_id,
        request.budget_seats,
    );

    let response = PositionResponse {
        entries_parsed: parsed.entries.len(),
        skipped_rows: parsed.skipped,
        band: position.map(|result| result.band()),
        position,
    };
    (StatusCode::OK, axum::Json(response)).into_response()
}

pub(crate) async fn create_university_handler<R>(
    State(service): State<Arc<AdmissionTrackerService<R>>>,
    axum::Json(university): axum::Json<NewUniversity>,
) -> Response
where
    R: TrackerRepository + 'static,
{
    match service.register_university(university) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_program_handler<R>(
    State(service): State<Arc<AdmissionTrackerService<R>>>,
    axum::Json(program): axum::Json<NewProgram>,
) -> Response
where
    R: TrackerRepository + 'static,
{
    match service.register_program(program) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn program_handler<R>(
    State(service): State<Arc<AdmissionTrackerService<R>>>,
    Path(program_id): Path<String>,
) -> Response
where
    R: TrackerRepository + 'static,
{
    let id = ProgramId(program_id);
    let view = service.program(&id).and_then(|program| {
        let history = service.history(&id)?;
        Ok(ProgramView {
            program,
            change: super::summary::chance_change(&history),
            latest: history.last().cloned(),
        })
    });

    match view {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn import_handler<R>(
    State(service): State<Arc<AdmissionTrackerService<R>>>,
    Path(program_id): Path<String>,
    axum::Json(request): axum::Json<ImportRequest>,
) -> Response
where
    R: TrackerRepository + 'static,
{
    let recorded_at = request
        .recorded_on
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap_or_else(current_time);

    match service.import_list(&ProgramId(program_id), &request.raw_list, recorded_at) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn history_handler<R>(
    State(service): State<Arc<AdmissionTrackerService<R>>>,
    Path(program_id): Path<String>,
) -> Response
where
    R: TrackerRepository + 'static,
{
    match service.history(&ProgramId(program_id)) {
        Ok(history) => (StatusCode::OK, axum::Json(history)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn summary_handler<R>(
    State(service): State<Arc<AdmissionTrackerService<R>>>,
) -> Response
where
    R: TrackerRepository + 'static,
{
    match service.portfolio_summary() {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_program_handler<R>(
    State(service): State<Arc<AdmissionTrackerService<R>>>,
    Path(program_id): Path<String>,
) -> Response
where
    R: TrackerRepository + 'static,
{
    match service.delete_program(&ProgramId(program_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_university_handler<R>(
    State(service): State<Arc<AdmissionTrackerService<R>>>,
    Path(university_id): Path<String>,
) -> Response
where
    R: TrackerRepository + 'static,
{
    match service.delete_university(&UniversityId(university_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

fn current_time() -> NaiveDateTime {
    Local::now().naive_local()
}

fn error_response(error: TrackerServiceError) -> Response {
    let status = match &error {
        TrackerServiceError::UnknownProgram(_)
        | TrackerServiceError::UnknownUniversity(_)
        | TrackerServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        TrackerServiceError::InvalidProgram(_) | TrackerServiceError::InvalidUniversity(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        TrackerServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        TrackerServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
