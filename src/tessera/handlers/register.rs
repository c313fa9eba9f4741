use crate::{
    auth::{AuthService, User},
    tessera::handlers::{Credentials, Message, payload},
};
use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::instrument;

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = Credentials,
    responses (
        (status = 200, description = "Registration successful", body = User, content_type = "application/json"),
        (status = 400, description = "Missing or malformed payload", body = Message),
        (status = 422, description = "Username taken, invalid username or password too short", body = Message),
        (status = 500, description = "Store failure", body = Message),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn register(
    service: Extension<Arc<AuthService>>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> impl IntoResponse {
    let credentials = match payload(body) {
        Ok(credentials) => credentials,
        Err(response) => return response,
    };

    let password = SecretString::from(credentials.password);
    match service.register(&credentials.username, &password).await {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(err) => err.into_response(),
    }
}
