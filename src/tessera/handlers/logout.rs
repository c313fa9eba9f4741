use crate::{
    auth::{AuthService, LogoutOutcome},
    tessera::handlers::{Message, clear_session_cookie, extract_session_token},
};
use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::instrument;

#[utoipa::path(
    get,
    path = "/api/auth/logout",
    responses (
        (status = 200, description = "Session destroyed, or there was none", body = Message, content_type = "application/json"),
        (status = 500, description = "Store failure", body = Message),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn logout(headers: HeaderMap, service: Extension<Arc<AuthService>>) -> impl IntoResponse {
    let token = extract_session_token(&headers, service.config().session_cookie_name());

    let message = match service.logout(token.as_deref()).await {
        Ok(LogoutOutcome::LoggedOut) => "logged out",
        Ok(LogoutOutcome::NoSession) => "no session",
        Err(err) => return err.into_response(),
    };

    // Always clear the cookie, even if the session record was missing.
    let mut response_headers = HeaderMap::new();
    if let Ok(cookie) = clear_session_cookie(service.config()) {
        response_headers.insert(SET_COOKIE, cookie);
    }

    (StatusCode::OK, response_headers, Json(Message::new(message))).into_response()
}
