//! Board handlers.

use crate::db::{self, BoardRow};
use crate::error::{AppError, Result};
use kanban_engine::Board;
use serde::Deserialize;
use sqlx::PgPool;

use super::require_title;

/// Query for `POST /boards`.
#[derive(Debug, Deserialize)]
pub struct CreateBoardQuery {
    pub title: String,
}

/// Query for `PUT /boards/{id}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameQuery {
    pub new_title: String,
}

pub async fn handle_list_boards(pool: &PgPool) -> Result<Vec<BoardRow>> {
    Ok(db::list_boards(pool).await?)
}

/// Full board with its sections and cards in order.
pub async fn handle_get_board(pool: &PgPool, board_id: i64) -> Result<Board> {
    db::fetch_board(pool, board_id)
        .await?
        .ok_or_else(|| AppError::board_not_found(board_id))
}

pub async fn handle_create_board(pool: &PgPool, query: CreateBoardQuery) -> Result<BoardRow> {
    let title = require_title(&query.title)?;
    let board = db::create_board(pool, title).await?;
    tracing::info!(board_id = board.id, "Board created");
    Ok(board)
}

pub async fn handle_rename_board(
    pool: &PgPool,
    board_id: i64,
    query: RenameQuery,
) -> Result<BoardRow> {
    let title = require_title(&query.new_title)?;
    db::rename_board(pool, board_id, title)
        .await?
        .ok_or_else(|| AppError::board_not_found(board_id))
}

pub async fn handle_delete_board(pool: &PgPool, board_id: i64) -> Result<BoardRow> {
    let board = db::delete_board(pool, board_id)
        .await?
        .ok_or_else(|| AppError::board_not_found(board_id))?;
    tracing::info!(board_id, "Board deleted");
    Ok(board)
}
