//! Board, section and card types.

use crate::reorder::{self, Positioned};
use crate::{error::Result, BoardId, CardId, Error, Position, SectionId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A card inside a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Index within the owning section
    pub position: Position,
    /// Owning section, when the remote service reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_id: Option<SectionId>,
}

impl Card {
    /// Create a card with no description.
    pub fn new(id: CardId, title: impl Into<String>, position: Position) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            position,
            section_id: None,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl Positioned for Card {
    fn position(&self) -> Position {
        self.position
    }

    fn set_position(&mut self, position: Position) {
        self.position = position;
    }
}

/// A named, ordered column of cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: SectionId,
    pub title: String,
    /// Index within the board
    pub position: Position,
    #[serde(default)]
    pub cards: Vec<Card>,
}

impl Section {
    /// Create an empty section.
    pub fn new(id: SectionId, title: impl Into<String>, position: Position) -> Self {
        Self {
            id,
            title: title.into(),
            position,
            cards: Vec::new(),
        }
    }

    /// Replace the cards, re-densifying their positions.
    pub fn with_cards(mut self, cards: Vec<Card>) -> Self {
        self.set_cards(cards);
        self
    }

    /// Replace the whole card sequence and rewrite positions and owners.
    pub(crate) fn set_cards(&mut self, mut cards: Vec<Card>) {
        reorder::reindex(&mut cards);
        for card in &mut cards {
            card.section_id = Some(self.id);
        }
        self.cards = cards;
    }

    /// Index of a card within this section.
    pub fn card_index(&self, card_id: CardId) -> Option<usize> {
        self.cards.iter().position(|c| c.id == card_id)
    }

    /// Card ids in order.
    pub fn card_ids(&self) -> Vec<CardId> {
        self.cards.iter().map(|c| c.id).collect()
    }
}

impl Positioned for Section {
    fn position(&self) -> Position {
        self.position
    }

    fn set_position(&mut self, position: Position) {
        self.position = position;
    }
}

/// A board owning its sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: BoardId,
    pub title: String,
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl Board {
    /// Create an empty board.
    pub fn new(id: BoardId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            sections: Vec::new(),
        }
    }

    /// Append a section, placing it at the end.
    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        reorder::reindex(&mut self.sections);
        self
    }

    /// Sort sections and cards by `(position, id)` and rewrite positions
    /// densely.
    ///
    /// The remote service may hand back gapped or duplicated positions, so
    /// every board entering the store goes through here.
    pub fn normalized(mut self) -> Self {
        self.sections.sort_by_key(|s| (s.position, s.id));
        reorder::reindex(&mut self.sections);
        for section in &mut self.sections {
            let mut cards = std::mem::take(&mut section.cards);
            cards.sort_by_key(|c| (c.position, c.id));
            section.set_cards(cards);
        }
        self
    }

    /// Check the dense-position and single-ownership invariants.
    pub fn validate(&self) -> Result<()> {
        if !reorder::is_dense(&self.sections) {
            return Err(Error::InvalidBoard(
                "section positions are not dense".to_string(),
            ));
        }

        let mut section_ids = HashSet::new();
        let mut card_ids = HashSet::new();
        for section in &self.sections {
            if !section_ids.insert(section.id) {
                return Err(Error::InvalidBoard(format!(
                    "duplicate section {}",
                    section.id
                )));
            }
            if !reorder::is_dense(&section.cards) {
                return Err(Error::InvalidBoard(format!(
                    "card positions in section {} are not dense",
                    section.id
                )));
            }
            for card in &section.cards {
                if !card_ids.insert(card.id) {
                    return Err(Error::InvalidBoard(format!("duplicate card {}", card.id)));
                }
            }
        }

        Ok(())
    }

    /// Get a section by ID.
    pub fn section(&self, id: SectionId) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// Index of a section within the board.
    pub fn section_index(&self, id: SectionId) -> Option<usize> {
        self.sections.iter().position(|s| s.id == id)
    }

    /// Locate a card as `(section index, card index)`.
    pub fn locate_card(&self, card_id: CardId) -> Option<(usize, usize)> {
        self.sections.iter().enumerate().find_map(|(si, section)| {
            section.card_index(card_id).map(|ci| (si, ci))
        })
    }

    /// Get a card by ID.
    pub fn card(&self, card_id: CardId) -> Option<&Card> {
        self.locate_card(card_id)
            .map(|(si, ci)| &self.sections[si].cards[ci])
    }

    /// Section ids in order.
    pub fn section_ids(&self) -> Vec<SectionId> {
        self.sections.iter().map(|s| s.id).collect()
    }

    /// Total number of cards across all sections.
    pub fn card_count(&self) -> usize {
        self.sections.iter().map(|s| s.cards.len()).sum()
    }
}
