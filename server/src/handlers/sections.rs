//! Section handlers.

use crate::db;
use crate::error::{AppError, Result};
use kanban_engine::Section;
use serde::Deserialize;
use sqlx::PgPool;

use super::{require_position, require_title};

/// Form body for `POST /sections`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSectionForm {
    pub board_id: i64,
    pub title: String,
}

/// Query for `PUT /sections/{id}/move`.
#[derive(Debug, Deserialize)]
pub struct MoveSectionQuery {
    pub position: i64,
}

pub async fn handle_create_section(pool: &PgPool, form: CreateSectionForm) -> Result<Section> {
    let title = require_title(&form.title)?;
    let section = db::create_section(pool, form.board_id, title)
        .await?
        .ok_or_else(|| AppError::board_not_found(form.board_id))?;
    Ok(section.to_section())
}

pub async fn handle_rename_section(
    pool: &PgPool,
    section_id: i64,
    new_title: &str,
) -> Result<Section> {
    let title = require_title(new_title)?;
    let section = db::rename_section(pool, section_id, title)
        .await?
        .ok_or_else(|| AppError::section_not_found(section_id))?;
    Ok(section.to_section())
}

/// Delete a section and its cards, returning the deleted section.
pub async fn handle_delete_section(pool: &PgPool, section_id: i64) -> Result<Section> {
    let section = db::delete_section(pool, section_id)
        .await?
        .ok_or_else(|| AppError::section_not_found(section_id))?;
    Ok(section.to_section())
}

/// Move a section; the response carries where it actually landed.
pub async fn handle_move_section(
    pool: &PgPool,
    section_id: i64,
    query: MoveSectionQuery,
) -> Result<Section> {
    let position = require_position(query.position)?;
    let section = db::move_section(pool, section_id, position)
        .await?
        .ok_or_else(|| AppError::section_not_found(section_id))?;
    Ok(section.to_section())
}
