use std::sync::Arc;

use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

use crate::api::middleware::identity::AuthContext;
use crate::domain::{Appointment, CreateAppointmentRequest, DateRangeQuery, UpdateStatusRequest};
use crate::error::Result;
use crate::AppState;

pub async fn list_mine(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Query(range): Query<DateRangeQuery>,
) -> Result<Json<Vec<Appointment>>> {
    let appointments = state
        .appointments
        .list_for_client(auth.user_id, range.start, range.end)
        .await?;

    Ok(Json(appointments))
}

pub async fn list_establishment(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Query(range): Query<DateRangeQuery>,
) -> Result<Json<Vec<Appointment>>> {
    let appointments = state
        .appointments
        .list_for_owner(auth.user_id, range.start, range.end)
        .await?;

    Ok(Json(appointments))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateAppointmentRequest>,
) -> Result<impl IntoResponse> {
    let appointment = state.appointments.create(req, auth.user_id).await?;

    Ok((StatusCode::CREATED, Json(appointment)))
}

pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<Appointment>> {
    let appointment = state.appointments.update_status(id, &req.status).await?;

    Ok(Json(appointment))
}
