//! HTTP route definitions.

mod boards;
mod cards;
mod health;
mod sections;

use crate::AppState;
use axum::Router;

/// Create all application routes.
pub fn create_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(boards::routes())
        .merge(sections::routes())
        .merge(cards::routes())
}
