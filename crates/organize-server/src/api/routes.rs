use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::IntoResponse;
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::api::handlers::{appointments, health};
use crate::api::middleware::identity;
use crate::AppState;

async fn fallback() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": {
                "code": "not_found",
                "message": "The requested endpoint does not exist"
            }
        })),
    )
}

pub fn build(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route(
            "/appointments",
            get(appointments::list_mine).post(appointments::create),
        )
        .route("/appointments/:id/status", patch(appointments::update_status))
        .route(
            "/establishment/appointments",
            get(appointments::list_establishment),
        )
        .layer(from_fn(identity::middleware));

    let public = Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready));

    let api = Router::new()
        .nest("/v1", protected)
        .merge(public)
        .fallback(fallback);

    api.with_state(state).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(Duration::from_secs(30)))
            .layer(CompressionLayer::new())
            .layer(CorsLayer::permissive()),
    )
}
