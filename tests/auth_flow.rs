use anyhow::{Context, Result};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{
        Request, StatusCode,
        header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE},
    },
    response::Response,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tessera::{
    auth::{AuthConfig, AuthService, MemorySessionStore, MemoryUserStore, PasswordHasher},
    tessera::router,
};
use tower::ServiceExt;

fn app() -> Result<Router> {
    let service = AuthService::new(
        Arc::new(MemoryUserStore::new()),
        Arc::new(MemorySessionStore::new()),
        PasswordHasher::new(8, 1, 1)?,
        AuthConfig::new(),
    )?;
    Ok(router(Arc::new(service)))
}

async fn post_json(app: &Router, uri: &str, body: &Value) -> Result<Response> {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(body)?))?,
        )
        .await?;
    Ok(response)
}

async fn get(app: &Router, uri: &str, header: Option<(&str, String)>) -> Result<Response> {
    let mut request = Request::builder().method("GET").uri(uri);
    if let Some((name, value)) = header {
        request = request.header(name, value);
    }
    Ok(app.clone().oneshot(request.body(Body::empty())?).await?)
}

async fn json_body(response: Response) -> Result<Value> {
    let body = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&body)?)
}

/// `name=value` pair of the session cookie set by `response`.
fn session_cookie(response: &Response) -> Result<String> {
    let header = response
        .headers()
        .get(SET_COOKIE)
        .context("missing Set-Cookie")?
        .to_str()?;
    header
        .split(';')
        .next()
        .map(str::to_string)
        .context("empty Set-Cookie")
}

async fn register_and_login(app: &Router, username: &str, password: &str) -> Result<String> {
    let credentials = json!({ "username": username, "password": password });
    let response = post_json(app, "/api/auth/register", &credentials).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json(app, "/api/auth/login", &credentials).await?;
    assert_eq!(response.status(), StatusCode::OK);
    session_cookie(&response)
}

#[tokio::test]
async fn register_returns_user() -> Result<()> {
    let app = app()?;

    let response = post_json(
        &app,
        "/api/auth/register",
        &json!({ "username": "sue", "password": "hunter22" }),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await?;
    assert_eq!(body["username"], "sue");
    assert!(body["id"].is_i64());
    assert!(body.get("password_hash").is_none());
    Ok(())
}

#[tokio::test]
async fn register_rejects_duplicates_and_short_passwords() -> Result<()> {
    let app = app()?;
    let credentials = json!({ "username": "sue", "password": "hunter22" });

    post_json(&app, "/api/auth/register", &credentials).await?;
    let response = post_json(&app, "/api/auth/register", &credentials).await?;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json_body(response).await?["message"], "Username taken");

    let response = post_json(
        &app,
        "/api/auth/register",
        &json!({ "username": "bob", "password": "abc" }),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        json_body(response).await?["message"],
        "Password must be longer than 3 chars"
    );

    let response = post_json(
        &app,
        "/api/auth/register",
        &json!({ "username": "   ", "password": "hunter22" }),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json_body(response).await?["message"], "Invalid username");
    Ok(())
}

#[tokio::test]
async fn malformed_payload_is_bad_request() -> Result<()> {
    let app = app()?;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from("{\"username\":"))?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await?["message"], "Missing payload");

    let response = post_json(&app, "/api/auth/register", &json!({ "username": "sue" })).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn login_sets_session_cookie() -> Result<()> {
    let app = app()?;
    let credentials = json!({ "username": "sue", "password": "hunter22" });
    post_json(&app, "/api/auth/register", &credentials).await?;

    let response = post_json(&app, "/api/auth/login", &credentials).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(SET_COOKIE)
        .context("missing Set-Cookie")?
        .to_str()?
        .to_string();
    assert!(set_cookie.starts_with("tessera_session="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Max-Age=43200"));

    assert_eq!(json_body(response).await?["message"], "Welcome sue!");
    Ok(())
}

#[tokio::test]
async fn login_failures_are_indistinguishable() -> Result<()> {
    let app = app()?;
    post_json(
        &app,
        "/api/auth/register",
        &json!({ "username": "sue", "password": "hunter22" }),
    )
    .await?;

    for credentials in [
        json!({ "username": "sue", "password": "wrong-password" }),
        json!({ "username": "nobody", "password": "hunter22" }),
    ] {
        let response = post_json(&app, "/api/auth/login", &credentials).await?;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(SET_COOKIE).is_none());
        assert_eq!(json_body(response).await?["message"], "Invalid credentials");
    }
    Ok(())
}

#[tokio::test]
async fn session_resolves_cookie_and_bearer() -> Result<()> {
    let app = app()?;
    let cookie = register_and_login(&app, "sue", "hunter22").await?;

    let response = get(&app, "/api/auth/session", Some((COOKIE.as_str(), cookie.clone()))).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await?["username"], "sue");

    let token = cookie
        .strip_prefix("tessera_session=")
        .context("unexpected cookie name")?;
    let response = get(
        &app,
        "/api/auth/session",
        Some((AUTHORIZATION.as_str(), format!("Bearer {token}"))),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(&app, "/api/auth/session", None).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await?["message"], "no session");
    Ok(())
}

#[tokio::test]
async fn logout_destroys_session() -> Result<()> {
    let app = app()?;
    let cookie = register_and_login(&app, "sue", "hunter22").await?;

    let response = get(&app, "/api/auth/logout", Some((COOKIE.as_str(), cookie.clone()))).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let cleared = response
        .headers()
        .get(SET_COOKIE)
        .context("missing Set-Cookie")?
        .to_str()?
        .to_string();
    assert!(cleared.contains("Max-Age=0"));
    assert_eq!(json_body(response).await?["message"], "logged out");

    let response = get(&app, "/api/auth/session", Some((COOKIE.as_str(), cookie.clone()))).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get(&app, "/api/auth/logout", Some((COOKIE.as_str(), cookie))).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(SET_COOKIE).is_some());
    assert_eq!(json_body(response).await?["message"], "no session");
    Ok(())
}

#[tokio::test]
async fn sessions_are_independent() -> Result<()> {
    let app = app()?;
    let first = register_and_login(&app, "sue", "hunter22").await?;
    let response = post_json(
        &app,
        "/api/auth/login",
        &json!({ "username": "sue", "password": "hunter22" }),
    )
    .await?;
    let second = session_cookie(&response)?;
    assert_ne!(first, second);

    get(&app, "/api/auth/logout", Some((COOKIE.as_str(), first))).await?;

    let response = get(&app, "/api/auth/session", Some((COOKIE.as_str(), second))).await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn health_reports_store() -> Result<()> {
    let app = app()?;

    let response = get(&app, "/health", None).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let app_header = response
        .headers()
        .get("x-app")
        .context("missing X-App")?
        .to_str()?
        .to_string();
    assert!(app_header.starts_with("tessera:"));
    assert!(response.headers().get("x-request-id").is_some());

    let body = json_body(response).await?;
    assert_eq!(body["name"], "tessera");
    assert_eq!(body["store"], "ok");
    Ok(())
}
