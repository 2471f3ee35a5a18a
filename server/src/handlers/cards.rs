//! Card handlers.

use crate::db::{self, CardMoveError};
use crate::error::{AppError, Result};
use kanban_engine::Card;
use serde::Deserialize;
use sqlx::PgPool;

use super::{require_position, require_title};

/// Query for `POST /cards`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCardQuery {
    pub section_id: i64,
    pub title: String,
}

/// Query for `PUT /cards/{id}/move`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCardQuery {
    pub section_id: i64,
    pub position: i64,
}

/// JSON body for `PUT /cards/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateCardRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

pub async fn handle_create_card(pool: &PgPool, query: CreateCardQuery) -> Result<Card> {
    let title = require_title(&query.title)?;
    let card = db::create_card(pool, query.section_id, title)
        .await?
        .ok_or_else(|| AppError::section_not_found(query.section_id))?;
    Ok(card.to_card())
}

pub async fn handle_update_card(
    pool: &PgPool,
    card_id: i64,
    request: UpdateCardRequest,
) -> Result<Card> {
    let title = require_title(&request.title)?;
    let card = db::update_card(pool, card_id, title, request.description.as_deref())
        .await?
        .ok_or_else(|| AppError::card_not_found(card_id))?;
    Ok(card.to_card())
}

/// Delete a card, returning the deleted card.
pub async fn handle_delete_card(pool: &PgPool, card_id: i64) -> Result<Card> {
    let card = db::delete_card(pool, card_id)
        .await?
        .ok_or_else(|| AppError::card_not_found(card_id))?;
    Ok(card.to_card())
}

/// Move a card, possibly into another section of the same board.
///
/// The response carries the section and index the card landed on.
pub async fn handle_move_card(pool: &PgPool, card_id: i64, query: MoveCardQuery) -> Result<Card> {
    let position = require_position(query.position)?;
    match db::move_card(pool, card_id, query.section_id, position).await? {
        Ok(card) => Ok(card.to_card()),
        Err(CardMoveError::CardNotFound) => Err(AppError::card_not_found(card_id)),
        Err(CardMoveError::SectionNotFound | CardMoveError::CrossBoard) => {
            Err(AppError::section_not_found(query.section_id))
        }
    }
}
