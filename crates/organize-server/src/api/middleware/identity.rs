use axum::body::Body;
use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

use crate::error::AppError;

/// Set by the upstream gateway once it has authenticated the caller.
pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Clone, Copy, Debug)]
pub struct AuthContext {
    pub user_id: Uuid,
}

pub async fn middleware(mut req: Request<Body>, next: Next) -> Result<Response, AppError> {
    let user_id = user_id(req.headers()).ok_or(AppError::Unauthenticated)?;

    req.extensions_mut().insert(AuthContext { user_id });

    Ok(next.run(req).await)
}

fn user_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| Uuid::parse_str(v.trim()).ok())
}
