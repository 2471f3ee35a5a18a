//! Board routes.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};

use crate::auth::AuthUser;
use crate::db::BoardRow;
use crate::error::Result;
use crate::handlers::{
    handle_create_board, handle_delete_board, handle_get_board, handle_list_boards,
    handle_rename_board, CreateBoardQuery, RenameQuery,
};
use crate::AppState;
use kanban_engine::Board;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/boards", get(list_handler).post(create_handler))
        .route(
            "/boards/{id}",
            get(get_handler).put(rename_handler).delete(delete_handler),
        )
}

/// GET /boards
async fn list_handler(State(state): State<AppState>, _auth: AuthUser) -> Result<Json<Vec<BoardRow>>> {
    Ok(Json(handle_list_boards(&state.pool).await?))
}

/// POST /boards?title=
async fn create_handler(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<CreateBoardQuery>,
) -> Result<Json<BoardRow>> {
    Ok(Json(handle_create_board(&state.pool, query).await?))
}

/// GET /boards/{id} - full board in order.
async fn get_handler(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(board_id): Path<i64>,
) -> Result<Json<Board>> {
    Ok(Json(handle_get_board(&state.pool, board_id).await?))
}

/// PUT /boards/{id}?newTitle=
async fn rename_handler(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(board_id): Path<i64>,
    Query(query): Query<RenameQuery>,
) -> Result<Json<BoardRow>> {
    Ok(Json(handle_rename_board(&state.pool, board_id, query).await?))
}

/// DELETE /boards/{id}
async fn delete_handler(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(board_id): Path<i64>,
) -> Result<Json<BoardRow>> {
    Ok(Json(handle_delete_board(&state.pool, board_id).await?))
}
