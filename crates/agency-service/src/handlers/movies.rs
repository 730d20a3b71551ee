//! Movie resource handlers.

use crate::errors::AgencyError;
use crate::models::{DeleteResponse, Movie, MovieUpdate, NewMovie};
use crate::routes::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;

/// Handler for `GET /api/v1/movies`. Requires `view:movies`.
#[tracing::instrument(skip_all, name = "agency.movies.list")]
pub async fn list_movies(State(state): State<Arc<AppState>>) -> Json<Vec<Movie>> {
    let catalog = state.catalog.read().await;
    Json(catalog.movies().to_vec())
}

/// Handler for `POST /api/v1/movies`. Requires `add:movies`.
#[tracing::instrument(skip_all, name = "agency.movies.create")]
pub async fn create_movie(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewMovie>,
) -> (StatusCode, Json<Movie>) {
    let mut catalog = state.catalog.write().await;
    let movie = catalog.add_movie(new);
    tracing::debug!(target: "agency.movies", movie_id = movie.id, "movie created");
    (StatusCode::CREATED, Json(movie))
}

/// Handler for `PATCH /api/v1/movies/{id}`. Requires `edit:movies`.
#[tracing::instrument(skip_all, name = "agency.movies.update")]
pub async fn update_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(update): Json<MovieUpdate>,
) -> Result<Json<Movie>, AgencyError> {
    let mut catalog = state.catalog.write().await;
    catalog
        .update_movie(id, update)
        .map(Json)
        .ok_or_else(|| AgencyError::NotFound(format!("Movie {id} not found.")))
}

/// Handler for `DELETE /api/v1/movies/{id}`. Requires `delete:movies`.
#[tracing::instrument(skip_all, name = "agency.movies.delete")]
pub async fn delete_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<DeleteResponse>, AgencyError> {
    let mut catalog = state.catalog.write().await;
    if catalog.delete_movie(id) {
        tracing::debug!(target: "agency.movies", movie_id = id, "movie deleted");
        Ok(Json(DeleteResponse { deleted: id }))
    } else {
        Err(AgencyError::NotFound(format!("Movie {id} not found.")))
    }
}
