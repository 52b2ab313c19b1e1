use std::sync::Arc;

use axum::{extract::State, Extension, Json};

use service::auth::{domain::Claims, repo::seaorm::SeaOrmAuthRepository};
use service::movie::domain::MovieDto;
use service::score::{domain::ScoreDto, repo::seaorm::SeaOrmScoreRepository, ScoreService};
use service::user_service::TokenUserService;

use crate::{errors::JsonApiError, routes::auth::ServerState};

#[utoipa::path(
    put, path = "/scores", tag = "scores",
    request_body = crate::openapi::ScoreDoc,
    responses(
        (status = 200, description = "Movie with updated aggregate", body = crate::openapi::MovieDoc),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Movie not found"),
        (status = 422, description = "Score out of range")
    ),
    security(("bearer" = []))
)]
pub async fn save(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Json(dto): Json<ScoreDto>,
) -> Result<Json<MovieDto>, JsonApiError> {
    let users = TokenUserService::new(Arc::new(SeaOrmAuthRepository { db: state.db.clone() }), Some(claims));
    let svc = ScoreService::new(Arc::new(users), Arc::new(SeaOrmScoreRepository { db: state.db.clone() }));
    Ok(Json(svc.save_score(dto).await?))
}
