use std::sync::Arc;

use axum::{extract::{Path, Query, State}, http::StatusCode, Json};
use serde::Deserialize;

use service::movie::{domain::{MovieDto, MovieInput}, repo::seaorm::SeaOrmMovieRepository, MovieService};
use service::pagination::{Page, Pagination};

use crate::{errors::JsonApiError, routes::auth::ServerState};

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MovieQuery {
    /// Case-insensitive title fragment
    pub title: Option<String>,
    /// 1-based
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl MovieQuery {
    fn pagination(&self) -> Pagination {
        let d = Pagination::default();
        Pagination { page: self.page.unwrap_or(d.page), per_page: self.per_page.unwrap_or(d.per_page) }
    }
}

fn movie_service(state: &ServerState) -> MovieService<SeaOrmMovieRepository> {
    MovieService::new(Arc::new(SeaOrmMovieRepository { db: state.db.clone() }))
}

#[utoipa::path(
    get, path = "/movies", tag = "movies",
    params(MovieQuery),
    responses((status = 200, description = "Page of movies", body = crate::openapi::MoviePageDoc))
)]
pub async fn list(State(state): State<ServerState>, Query(q): Query<MovieQuery>) -> Result<Json<Page<MovieDto>>, JsonApiError> {
    let page = movie_service(&state).find_all(q.title.as_deref().unwrap_or(""), q.pagination()).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get, path = "/movies/{id}", tag = "movies",
    params(("id" = i64, Path, description = "Movie id")),
    responses(
        (status = 200, description = "Movie", body = crate::openapi::MovieDoc),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get(State(state): State<ServerState>, Path(id): Path<i64>) -> Result<Json<MovieDto>, JsonApiError> {
    Ok(Json(movie_service(&state).find_by_id(id).await?))
}

#[utoipa::path(
    post, path = "/movies", tag = "movies",
    request_body = crate::openapi::MovieInputDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::MovieDoc),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 422, description = "Validation Error")
    ),
    security(("bearer" = []))
)]
pub async fn create(State(state): State<ServerState>, Json(input): Json<MovieInput>) -> Result<(StatusCode, Json<MovieDto>), JsonApiError> {
    let created = movie_service(&state).insert(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put, path = "/movies/{id}", tag = "movies",
    params(("id" = i64, Path, description = "Movie id")),
    request_body = crate::openapi::MovieInputDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::MovieDoc),
        (status = 404, description = "Not Found"),
        (status = 422, description = "Validation Error")
    ),
    security(("bearer" = []))
)]
pub async fn update(State(state): State<ServerState>, Path(id): Path<i64>, Json(input): Json<MovieInput>) -> Result<Json<MovieDto>, JsonApiError> {
    Ok(Json(movie_service(&state).update(id, input).await?))
}

#[utoipa::path(
    delete, path = "/movies/{id}", tag = "movies",
    params(("id" = i64, Path, description = "Movie id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Movie still has scores")
    ),
    security(("bearer" = []))
)]
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i64>) -> Result<StatusCode, JsonApiError> {
    movie_service(&state).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_defaults_to_first_page() {
        let p = MovieQuery::default().pagination();
        assert_eq!(p, Pagination::default());
        let q = MovieQuery { title: None, page: Some(3), per_page: Some(5) };
        assert_eq!(q.pagination().offset(), 10);
    }
}
