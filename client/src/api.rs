//! The board service contract.
//!
//! Every call returns a `'static` boxed future so the sync client can start
//! the request immediately and drive it on a spawned task.

use futures::future::BoxFuture;
use kanban_engine::{
    Board, BoardId, Card, CardId, Placement, Position, RemoteFailure, Section, SectionId,
};
use serde::{Deserialize, Serialize};

/// Result of a single remote call.
pub type ApiResult<T> = std::result::Result<T, RemoteFailure>;

/// New title and description for a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardUpdate {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Remote board service.
///
/// Move calls resolve to the placement the service settled on, when its
/// response carried one. Their futures must not send anything until first
/// polled; moves of one entity are chained on that.
pub trait BoardApi: Send + Sync {
    fn fetch_board(&self, board_id: BoardId) -> BoxFuture<'static, ApiResult<Board>>;

    fn move_section(
        &self,
        section_id: SectionId,
        position: Position,
    ) -> BoxFuture<'static, ApiResult<Option<Placement>>>;

    fn move_card(
        &self,
        card_id: CardId,
        section_id: SectionId,
        position: Position,
    ) -> BoxFuture<'static, ApiResult<Option<Placement>>>;

    fn create_section(
        &self,
        board_id: BoardId,
        title: String,
    ) -> BoxFuture<'static, ApiResult<Section>>;

    fn rename_section(
        &self,
        section_id: SectionId,
        title: String,
    ) -> BoxFuture<'static, ApiResult<Section>>;

    fn delete_section(&self, section_id: SectionId) -> BoxFuture<'static, ApiResult<()>>;

    fn create_card(&self, section_id: SectionId, title: String)
        -> BoxFuture<'static, ApiResult<Card>>;

    fn update_card(&self, card_id: CardId, update: CardUpdate)
        -> BoxFuture<'static, ApiResult<Card>>;

    fn delete_card(&self, card_id: CardId) -> BoxFuture<'static, ApiResult<()>>;
}

/// Placement reported by a section move response.
pub fn section_placement(section: &Section) -> Placement {
    Placement::Section {
        index: section.position,
    }
}

/// Placement reported by a card move response, if it names the section.
pub fn card_placement(card: &Card) -> Option<Placement> {
    card.section_id.map(|section_id| Placement::Card {
        section_id,
        index: card.position,
    })
}
