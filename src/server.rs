use crate::config::ServerConfig;
use crate::data::{Assignment, Classes, Commitments, Matches, Teachers};
use crate::error::ScheduleError;
use crate::input::check_input;
use crate::quality_assurance::{self, StaffingIssue};
use crate::solver::Scheduler;
use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

type HandlerError = (StatusCode, String);

#[derive(Debug, Clone)]
pub struct AppState {
    pub scheduler: Scheduler,
    pub config: ServerConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveRequest {
    pub teachers: Teachers,
    pub classes: Classes,
    #[serde(flatten)]
    pub commitments: Commitments,
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub teachers: Teachers,
    pub classes: Classes,
    pub matches: Matches,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub conflict: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DiagnoseRequest {
    pub teachers: Teachers,
    pub classes: Classes,
}

#[derive(Debug, Serialize)]
pub struct DiagnoseResponse {
    pub issues: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct AdviseRequest {
    pub teachers: Teachers,
    pub classes: Classes,
    pub assignment: Assignment,
}

fn accept(state: &AppState, teachers: &Teachers, classes: &Classes) -> Result<(), HandlerError> {
    let errors = check_input(teachers, classes, &state.config);
    if errors.is_empty() {
        Ok(())
    } else {
        Err((StatusCode::UNPROCESSABLE_ENTITY, errors.join("; ")))
    }
}

fn failed(e: ScheduleError) -> HandlerError {
    match e {
        ScheduleError::Solver(_) => {
            error!("{e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
        _ => (StatusCode::BAD_REQUEST, e.to_string()),
    }
}

async fn solve_handler(
    State(state): State<Arc<AppState>>,
    Json(input): Json<SolveRequest>,
) -> Result<Json<Assignment>, HandlerError> {
    accept(&state, &input.teachers, &input.classes)?;
    let scheduler = state.scheduler.clone();
    let solved = tokio::task::spawn_blocking(move || {
        scheduler.solve(&input.teachers, &input.classes, &input.commitments)
    })
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    solved.map(Json).map_err(failed)
}

async fn validate_handler(
    State(state): State<Arc<AppState>>,
    Json(input): Json<ValidateRequest>,
) -> Result<Json<ValidateResponse>, HandlerError> {
    accept(&state, &input.teachers, &input.classes)?;
    let violation = quality_assurance::find_conflict(&input.matches, &input.teachers, &input.classes)
        .map_err(failed)?;
    Ok(Json(ValidateResponse {
        conflict: violation.is_some(),
        violation: violation.map(|v| v.to_string()),
    }))
}

async fn diagnose_handler(
    State(state): State<Arc<AppState>>,
    Json(input): Json<DiagnoseRequest>,
) -> Result<Json<DiagnoseResponse>, HandlerError> {
    accept(&state, &input.teachers, &input.classes)?;
    Ok(Json(DiagnoseResponse {
        issues: quality_assurance::diagnose(&input.teachers, &input.classes),
    }))
}

async fn advise_handler(
    State(state): State<Arc<AppState>>,
    Json(input): Json<AdviseRequest>,
) -> Result<Json<Vec<StaffingIssue>>, HandlerError> {
    accept(&state, &input.teachers, &input.classes)?;
    quality_assurance::advise(&input.teachers, &input.classes, &input.assignment)
        .map(Json)
        .map_err(failed)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/v1/assignments/solve", post(solve_handler))
        .route("/v1/assignments/validate", post(validate_handler))
        .route("/v1/assignments/diagnose", post(diagnose_handler))
        .route("/v1/assignments/advise", post(advise_handler))
        .with_state(Arc::new(state))
}

pub async fn run_server(state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(state.config.addr).await?;
    info!("Server running at http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await
}
