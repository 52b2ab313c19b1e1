pub mod auth;
pub mod movies;
pub mod scores;

use axum::{
    extract::State,
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::{warn, Level};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

use crate::openapi::ApiDoc;
use auth::ServerState;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health(State(state): State<ServerState>) -> Json<Health> {
    match state.db.ping().await {
        Ok(()) => Json(Health::ok()),
        Err(e) => {
            warn!(err = %e, "database ping failed");
            Json(Health::degraded())
        }
    }
}

/// Build the full application router, including public, authenticated, and admin routes
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    // Public routes (health, auth, read-only catalogue)
    let public = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/movies", get(movies::list))
        .route("/movies/:id", get(movies::get));

    // Any signed-in user
    let user_routes = Router::new()
        .route("/scores", put(scores::save))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_bearer_token));

    // Admin routes; the bearer layer is added last so it runs first
    let admin_routes = Router::new()
        .route("/movies", post(movies::create))
        .route("/movies/:id", put(movies::update).delete(movies::delete))
        .route_layer(middleware::from_fn(auth::require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_bearer_token));

    // Compose
    public
        .merge(user_routes)
        .merge(admin_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // one INFO span per request with method and path
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                // status code and latency
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 5xx at ERROR
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
