use std::sync::Arc;

use axum::{Json, extract::{State, Request}, http::{header, StatusCode, Method}, middleware::Next, response::Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::{info, warn};

use service::auth::{domain::{Claims, LoginInput, RegisterInput}, service::{AuthConfig, AuthService}};
use service::auth::repo::seaorm::SeaOrmAuthRepository;

use crate::errors::JsonApiError;

pub const AUTH_COOKIE: &str = "auth_token";

#[derive(Clone)]
pub struct ServerAuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: ServerAuthConfig,
}

impl ServerState {
    pub fn auth_service(&self) -> AuthService<SeaOrmAuthRepository> {
        let repo = Arc::new(SeaOrmAuthRepository { db: self.db.clone() });
        AuthService::new(repo, AuthConfig::new(self.auth.jwt_secret.clone(), self.auth.token_ttl_hours))
    }
}

#[derive(Serialize)]
pub struct RegisterOutput { pub user_id: i64, pub email: String, pub role: String }

#[derive(Serialize)]
pub struct LoginOutput { pub user_id: i64, pub email: String, pub name: String, pub role: String, pub token: String, pub expires_at: i64 }

#[utoipa::path(post, path = "/auth/register", tag = "auth", request_body = crate::openapi::RegisterRequest, responses((status = 201, description = "Registered"), (status = 409, description = "Conflict"), (status = 422, description = "Validation Error")))]
pub async fn register(State(state): State<ServerState>, Json(input): Json<RegisterInput>) -> Result<(StatusCode, Json<RegisterOutput>), JsonApiError> {
    let user = state.auth_service().register(input).await?;
    Ok((StatusCode::CREATED, Json(RegisterOutput { user_id: user.id, email: user.email, role: user.role })))
}

#[utoipa::path(post, path = "/auth/login", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Logged In"), (status = 401, description = "Unauthorized")))]
pub async fn login(State(state): State<ServerState>, jar: CookieJar, Json(input): Json<LoginInput>) -> Result<(CookieJar, Json<LoginOutput>), JsonApiError> {
    let session = state.auth_service().login(input).await?;
    let mut cookie = Cookie::new(AUTH_COOKIE, session.token.clone());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(false);
    cookie.set_same_site(SameSite::Lax);
    let user = session.user;
    let out = LoginOutput { user_id: user.id, email: user.email, name: user.name, role: user.role, token: session.token, expires_at: session.expires_at };
    Ok((jar.add(cookie), Json(out)))
}

#[utoipa::path(post, path = "/auth/logout", tag = "auth", responses((status = 204, description = "Cookie cleared")))]
pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let mut cookie = Cookie::from(AUTH_COOKIE);
    cookie.set_path("/");
    (jar.remove(cookie), StatusCode::NO_CONTENT)
}

/// Token from `Authorization: Bearer ..`, falling back to the `auth_token` cookie.
fn extract_token(req: &Request) -> Result<Option<String>, JsonApiError> {
    if let Some(h) = req.headers().get(header::AUTHORIZATION) {
        let value = h.to_str().map_err(|_| JsonApiError::unauthorized("malformed Authorization header"))?;
        return match value.strip_prefix("Bearer ") {
            Some(t) if !t.trim().is_empty() => Ok(Some(t.trim().to_string())),
            _ => Err(JsonApiError::unauthorized("expected Bearer token")),
        };
    }
    let jar = CookieJar::from_headers(req.headers());
    Ok(jar.get(AUTH_COOKIE).map(|c| c.value().to_string()).filter(|t| !t.is_empty()))
}

/// Verify the caller's token and attach its `Claims` to the request.
/// Missing or invalid tokens get 401; CORS preflight passes through.
pub async fn require_bearer_token(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    if req.method() == Method::OPTIONS {
        return Ok(next.run(req).await);
    }
    let path = req.uri().path().to_string();
    let Some(token) = extract_token(&req)? else {
        warn!(%path, "missing Authorization header and auth_token cookie");
        return Err(JsonApiError::unauthorized("authentication required"));
    };
    let claims = state.auth_service().verify_token(&token).map_err(|e| {
        warn!(%path, err = %e, "token validation failed");
        JsonApiError::unauthorized("invalid or expired token")
    })?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Must run after `require_bearer_token`.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, JsonApiError> {
    match req.extensions().get::<Claims>() {
        Some(claims) if claims.is_admin() => Ok(next.run(req).await),
        Some(claims) => {
            info!(uid = claims.uid, path = %req.uri().path(), "admin route denied");
            Err(JsonApiError::forbidden("admin role required"))
        }
        None => Err(JsonApiError::unauthorized("authentication required")),
    }
}
