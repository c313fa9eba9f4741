//! Resolve the caller's session into the user it belongs to.

use crate::{
    auth::{AuthService, User},
    tessera::handlers::{Message, extract_session_token},
};
use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/auth/session",
    responses (
        (status = 200, description = "Session is active", body = User, content_type = "application/json"),
        (status = 401, description = "No active session", body = Message),
    ),
    tag = "auth"
)]
pub async fn session(headers: HeaderMap, service: Extension<Arc<AuthService>>) -> impl IntoResponse {
    let token = extract_session_token(&headers, service.config().session_cookie_name());

    match service.current_user(token.as_deref()).await {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(err) => err.into_response(),
    }
}
