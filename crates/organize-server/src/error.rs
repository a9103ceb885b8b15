use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("user not found: {0}")]
    UserNotFound(Uuid),

    #[error("offered service not found: {0}")]
    ServiceNotFound(Uuid),

    #[error("establishment not found: {0}")]
    EstablishmentNotFound(Uuid),

    #[error("no establishment found for owner: {0}")]
    EstablishmentNotFoundForOwner(Uuid),

    #[error("employee not found: {0}")]
    EmployeeNotFound(Uuid),

    #[error("appointment not found: {0}")]
    AppointmentNotFound(Uuid),

    #[error("employee {employee_id} already has an appointment between {start_time} and {end_time}")]
    EmployeeUnavailable {
        employee_id: Uuid,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    },

    #[error("invalid status: {0}")]
    InvalidStatus(String),

    #[error("missing or malformed user identity")]
    Unauthenticated,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, details) = match &self {
            Self::UserNotFound(_) => (StatusCode::NOT_FOUND, "user_not_found", None),
            Self::ServiceNotFound(_) => (StatusCode::NOT_FOUND, "service_not_found", None),
            Self::EstablishmentNotFound(_) | Self::EstablishmentNotFoundForOwner(_) => {
                (StatusCode::NOT_FOUND, "establishment_not_found", None)
            }
            Self::EmployeeNotFound(_) => (StatusCode::NOT_FOUND, "employee_not_found", None),
            Self::AppointmentNotFound(_) => (StatusCode::NOT_FOUND, "appointment_not_found", None),
            Self::EmployeeUnavailable {
                employee_id,
                start_time,
                end_time,
            } => (
                StatusCode::CONFLICT,
                "employee_unavailable",
                Some(serde_json::json!({
                    "employee_id": employee_id,
                    "start_time": start_time,
                    "end_time": end_time
                })),
            ),
            Self::InvalidStatus(_) => (StatusCode::BAD_REQUEST, "invalid_status", None),
            Self::Unauthenticated => (StatusCode::UNAUTHORIZED, "unauthenticated", None),
            Self::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code,
                message: self.to_string(),
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
