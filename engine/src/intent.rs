//! Move intents.
//!
//! A move is expressed as a value, not a direct mutation. The drag
//! interpreter produces it, the store applies it, and the sync client
//! persists it, so none of the three needs to know about the others.

use crate::{CardId, Position, SectionId};
use serde::{Deserialize, Serialize};

/// Move a section to a new index on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionMove {
    /// Section being moved
    pub section_id: SectionId,
    /// Index before the move
    pub from_index: Position,
    /// Requested index after the move
    pub to_index: Position,
}

/// Move a card within or across sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardMove {
    /// Card being moved
    pub card_id: CardId,
    /// Section the card leaves
    pub source_section_id: SectionId,
    /// Section the card lands in (may equal the source)
    pub destination_section_id: SectionId,
    /// Index before the move, within the source section
    pub from_index: Position,
    /// Requested index after the move, within the destination section
    pub to_index: Position,
}

impl CardMove {
    /// Whether the card stays in its section.
    pub fn is_same_section(&self) -> bool {
        self.source_section_id == self.destination_section_id
    }
}

/// A validated reorder request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MoveIntent {
    Section(SectionMove),
    Card(CardMove),
}

impl MoveIntent {
    /// Create a section move intent.
    pub fn section(section_id: SectionId, from_index: Position, to_index: Position) -> Self {
        MoveIntent::Section(SectionMove {
            section_id,
            from_index,
            to_index,
        })
    }

    /// Create a card move intent.
    pub fn card(
        card_id: CardId,
        source_section_id: SectionId,
        destination_section_id: SectionId,
        from_index: Position,
        to_index: Position,
    ) -> Self {
        MoveIntent::Card(CardMove {
            card_id,
            source_section_id,
            destination_section_id,
            from_index,
            to_index,
        })
    }

    /// The entity whose order this intent changes.
    pub fn entity(&self) -> EntityKey {
        match self {
            MoveIntent::Section(m) => EntityKey::Section(m.section_id),
            MoveIntent::Card(m) => EntityKey::Card(m.card_id),
        }
    }

    /// Where the entity is requested to land.
    pub fn destination(&self) -> Placement {
        match self {
            MoveIntent::Section(m) => Placement::Section { index: m.to_index },
            MoveIntent::Card(m) => Placement::Card {
                section_id: m.destination_section_id,
                index: m.to_index,
            },
        }
    }
}

/// Identifies a movable entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum EntityKey {
    Section(SectionId),
    Card(CardId),
}

impl std::fmt::Display for EntityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKey::Section(id) => write!(f, "section:{}", id),
            EntityKey::Card(id) => write!(f, "card:{}", id),
        }
    }
}

/// Where an entity sits on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Placement {
    #[serde(rename_all = "camelCase")]
    Section { index: Position },
    #[serde(rename_all = "camelCase")]
    Card { section_id: SectionId, index: Position },
}
