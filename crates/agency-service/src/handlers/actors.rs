//! Actor resource handlers.
//!
//! Authorization happens in route middleware before these run; handlers
//! only touch the catalog.

use crate::errors::AgencyError;
use crate::models::{Actor, ActorUpdate, DeleteResponse, NewActor};
use crate::routes::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;

/// Handler for `GET /api/v1/actors`. Requires `view:actors`.
#[tracing::instrument(skip_all, name = "agency.actors.list")]
pub async fn list_actors(State(state): State<Arc<AppState>>) -> Json<Vec<Actor>> {
    let catalog = state.catalog.read().await;
    Json(catalog.actors().to_vec())
}

/// Handler for `POST /api/v1/actors`. Requires `add:actors`.
#[tracing::instrument(skip_all, name = "agency.actors.create")]
pub async fn create_actor(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewActor>,
) -> (StatusCode, Json<Actor>) {
    let mut catalog = state.catalog.write().await;
    let actor = catalog.add_actor(new);
    tracing::debug!(target: "agency.actors", actor_id = actor.id, "actor created");
    (StatusCode::CREATED, Json(actor))
}

/// Handler for `PATCH /api/v1/actors/{id}`. Requires `edit:actors`.
#[tracing::instrument(skip_all, name = "agency.actors.update")]
pub async fn update_actor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(update): Json<ActorUpdate>,
) -> Result<Json<Actor>, AgencyError> {
    let mut catalog = state.catalog.write().await;
    catalog
        .update_actor(id, update)
        .map(Json)
        .ok_or_else(|| AgencyError::NotFound(format!("Actor {id} not found.")))
}

/// Handler for `DELETE /api/v1/actors/{id}`. Requires `delete:actors`.
#[tracing::instrument(skip_all, name = "agency.actors.delete")]
pub async fn delete_actor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<DeleteResponse>, AgencyError> {
    let mut catalog = state.catalog.write().await;
    if catalog.delete_actor(id) {
        tracing::debug!(target: "agency.actors", actor_id = id, "actor deleted");
        Ok(Json(DeleteResponse { deleted: id }))
    } else {
        Err(AgencyError::NotFound(format!("Actor {id} not found.")))
    }
}
