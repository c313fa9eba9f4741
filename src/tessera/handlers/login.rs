use crate::{
    auth::AuthService,
    tessera::handlers::{Credentials, Message, payload, session_cookie},
};
use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::IntoResponse,
};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{error, instrument};

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = Credentials,
    responses (
        (status = 200, description = "Login successful, session cookie set", body = Message, content_type = "application/json"),
        (status = 400, description = "Missing or malformed payload", body = Message),
        (status = 401, description = "Invalid credentials", body = Message),
        (status = 500, description = "Store failure", body = Message),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn login(
    service: Extension<Arc<AuthService>>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> impl IntoResponse {
    let credentials = match payload(body) {
        Ok(credentials) => credentials,
        Err(response) => return response,
    };

    let password = SecretString::from(credentials.password);
    let session = match service.login(&credentials.username, &password).await {
        Ok(session) => session,
        Err(err) => return err.into_response(),
    };

    let mut headers = HeaderMap::new();
    match session_cookie(service.config(), &session.token) {
        Ok(cookie) => {
            headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => {
            error!("Failed to build session cookie: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(Message::new("Internal server error")),
            )
                .into_response();
        }
    }

    (
        StatusCode::OK,
        headers,
        Json(Message::new(format!("Welcome {}!", session.user.username))),
    )
        .into_response()
}
