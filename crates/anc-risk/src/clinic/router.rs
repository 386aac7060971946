use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Local;
use serde_json::json;

use super::domain::{PatientId, PatientRegistration};
use super::repository::{AlertPublisher, ClinicRepository};
use super::service::{ClinicService, ClinicServiceError};

/// Header carrying the signed-in staff member's full name.
pub const ASSESSED_BY_HEADER: &str = "x-assessed-by";

/// Router builder exposing patient registration, assessment, alert, and report endpoints.
pub fn clinic_router<R, A>(service: Arc<ClinicService<R, A>>) -> Router
where
    R: ClinicRepository + 'static,
    A: AlertPublisher + 'static,
{
    Router::new()
        .route(
            "/api/v1/patients",
            post(register_handler::<R, A>).get(list_patients_handler::<R, A>),
        )
        .route(
            "/api/v1/patients/:patient_id",
            get(profile_handler::<R, A>),
        )
        .route("/api/v1/assessments", post(assess_handler::<R, A>))
        .route("/api/v1/alerts", get(alerts_handler::<R, A>))
        .route("/api/v1/reports/summary", get(summary_handler::<R, A>))
        .with_state(service)
}

pub(crate) async fn register_handler<R, A>(
    State(service): State<Arc<ClinicService<R, A>>>,
    body: String,
) -> Response
where
    R: ClinicRepository + 'static,
    A: AlertPublisher + 'static,
{
    let registration = match serde_json::from_str::<PatientRegistration>(&body) {
        Ok(registration) => registration,
        Err(err) => {
            return error_response(ClinicServiceError::InvalidRegistration(err.to_string()))
        }
    };

    match service.register_patient(registration) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn list_patients_handler<R, A>(
    State(service): State<Arc<ClinicService<R, A>>>,
) -> Response
where
    R: ClinicRepository + 'static,
    A: AlertPublisher + 'static,
{
    match service.patients() {
        Ok(patients) => (StatusCode::OK, axum::Json(patients)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn profile_handler<R, A>(
    State(service): State<Arc<ClinicService<R, A>>>,
    Path(patient_id): Path<String>,
) -> Response
where
    R: ClinicRepository + 'static,
    A: AlertPublisher + 'static,
{
    match service.patient_profile(&PatientId(patient_id)) {
        Ok(profile) => (StatusCode::OK, axum::Json(profile)).into_response(),
        Err(err) => error_response(err),
    }
}

/// Takes the raw body so undecodable payloads surface as an `{error}` result.
pub(crate) async fn assess_handler<R, A>(
    State(service): State<Arc<ClinicService<R, A>>>,
    headers: HeaderMap,
    body: String,
) -> Response
where
    R: ClinicRepository + 'static,
    A: AlertPublisher + 'static,
{
    let assessed_by = headers
        .get(ASSESSED_BY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string);

    match service.assess(&body, assessed_by) {
        Ok(result) => {
            let payload = json!({
                "patient_id": result.patient.patient_id,
                "risk_assessment": result.risk_assessment,
                "alert": result.alert,
                "assessed_by": result.visit.assessed_by,
            });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn alerts_handler<R, A>(
    State(service): State<Arc<ClinicService<R, A>>>,
) -> Response
where
    R: ClinicRepository + 'static,
    A: AlertPublisher + 'static,
{
    match service.alert_board() {
        Ok(board) => (StatusCode::OK, axum::Json(board)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn summary_handler<R, A>(
    State(service): State<Arc<ClinicService<R, A>>>,
) -> Response
where
    R: ClinicRepository + 'static,
    A: AlertPublisher + 'static,
{
    let today = Local::now().date_naive();
    match service.summary(today) {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: ClinicServiceError) -> Response {
    let status = match &err {
        ClinicServiceError::Intake(_) | ClinicServiceError::InvalidRegistration(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ClinicServiceError::PatientNotFound(_) => StatusCode::NOT_FOUND,
        ClinicServiceError::IdentifiersExhausted(_) => StatusCode::CONFLICT,
        ClinicServiceError::Repository(_) | ClinicServiceError::Encoding(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = match &err {
        ClinicServiceError::Intake(intake) => intake.error_payload(),
        other => json!({ "error": other.to_string() }),
    };
    (status, axum::Json(payload)).into_response()
}
