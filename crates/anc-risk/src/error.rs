use crate::clinic::{ClinicServiceError, IntakeError, RegisterImportError};
use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Clinic(ClinicServiceError),
    Import(RegisterImportError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Clinic(err) => write!(f, "clinic error: {}", err),
            AppError::Import(err) => write!(f, "register import error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Clinic(err) => Some(err),
            AppError::Import(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Clinic(
                ClinicServiceError::Intake(_) | ClinicServiceError::InvalidRegistration(_),
            )
            | AppError::Import(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Clinic(ClinicServiceError::PatientNotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Clinic(ClinicServiceError::IdentifiersExhausted(_)) => StatusCode::CONFLICT,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Clinic(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<ClinicServiceError> for AppError {
    fn from(value: ClinicServiceError) -> Self {
        Self::Clinic(value)
    }
}

impl From<IntakeError> for AppError {
    fn from(value: IntakeError) -> Self {
        Self::Clinic(ClinicServiceError::Intake(value))
    }
}

impl From<RegisterImportError> for AppError {
    fn from(value: RegisterImportError) -> Self {
        Self::Import(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clinic::{PatientId, VisitSubmission};

    #[test]
    fn intake_failures_map_to_unprocessable_entity() {
        let err = VisitSubmission::from_json("{not json").expect_err("payload rejected");
        let response = AppError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn missing_patients_map_to_not_found() {
        let err = ClinicServiceError::PatientNotFound(PatientId("MUR404".to_string()));
        let response = AppError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn rejected_registrations_map_to_unprocessable_entity() {
        let err = ClinicServiceError::InvalidRegistration("gestation_weeks".to_string());
        let response = AppError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
