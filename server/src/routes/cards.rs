//! Card routes.

use axum::{
    extract::{Path, Query, State},
    routing::{post, put},
    Json, Router,
};

use crate::auth::AuthUser;
use crate::error::Result;
use crate::handlers::{
    handle_create_card, handle_delete_card, handle_move_card, handle_update_card,
    CreateCardQuery, MoveCardQuery, UpdateCardRequest,
};
use crate::AppState;
use kanban_engine::Card;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cards", post(create_handler))
        .route("/cards/{id}", put(update_handler).delete(delete_handler))
        .route("/cards/{id}/move", put(move_handler))
}

/// POST /cards?sectionId=&title=
async fn create_handler(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<CreateCardQuery>,
) -> Result<Json<Card>> {
    Ok(Json(handle_create_card(&state.pool, query).await?))
}

/// PUT /cards/{id} (json: title, description)
async fn update_handler(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(card_id): Path<i64>,
    Json(request): Json<UpdateCardRequest>,
) -> Result<Json<Card>> {
    Ok(Json(handle_update_card(&state.pool, card_id, request).await?))
}

/// DELETE /cards/{id}
async fn delete_handler(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(card_id): Path<i64>,
) -> Result<Json<Card>> {
    Ok(Json(handle_delete_card(&state.pool, card_id).await?))
}

/// PUT /cards/{id}/move?sectionId=&position=
async fn move_handler(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(card_id): Path<i64>,
    Query(query): Query<MoveCardQuery>,
) -> Result<Json<Card>> {
    Ok(Json(handle_move_card(&state.pool, card_id, query).await?))
}
