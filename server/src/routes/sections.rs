//! Section routes.

use axum::{
    extract::{Path, Query, State},
    routing::{post, put},
    Form, Json, Router,
};

use crate::auth::AuthUser;
use crate::error::Result;
use crate::handlers::{
    handle_create_section, handle_delete_section, handle_move_section, handle_rename_section,
    CreateSectionForm, MoveSectionQuery, RenameQuery,
};
use crate::AppState;
use kanban_engine::Section;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sections", post(create_handler))
        .route("/sections/{id}", put(rename_handler).delete(delete_handler))
        .route("/sections/{id}/move", put(move_handler))
}

/// POST /sections (form: boardId, title)
async fn create_handler(
    State(state): State<AppState>,
    _auth: AuthUser,
    Form(form): Form<CreateSectionForm>,
) -> Result<Json<Section>> {
    Ok(Json(handle_create_section(&state.pool, form).await?))
}

/// PUT /sections/{id}?newTitle=
async fn rename_handler(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(section_id): Path<i64>,
    Query(query): Query<RenameQuery>,
) -> Result<Json<Section>> {
    Ok(Json(
        handle_rename_section(&state.pool, section_id, &query.new_title).await?,
    ))
}

/// DELETE /sections/{id}
async fn delete_handler(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(section_id): Path<i64>,
) -> Result<Json<Section>> {
    Ok(Json(handle_delete_section(&state.pool, section_id).await?))
}

/// PUT /sections/{id}/move?position=
async fn move_handler(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(section_id): Path<i64>,
    Query(query): Query<MoveSectionQuery>,
) -> Result<Json<Section>> {
    Ok(Json(
        handle_move_section(&state.pool, section_id, query).await?,
    ))
}
