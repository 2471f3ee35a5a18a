//! Drag event interpreter.
//!
//! Turns the raw end-of-drag event reported by the UI into a [`MoveIntent`],
//! or decides that the gesture changes nothing. Interpretation only reads the
//! board; applying the intent is the store's job.

use crate::intent::MoveIntent;
use crate::model::Board;
use crate::{error::Result, Error, Position, SectionId};
use serde::{Deserialize, Serialize};

/// What kind of thing was dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DragKind {
    /// A whole section (column) on the board
    #[serde(rename = "SECTION", alias = "COLUMN")]
    Section,
    /// A card within or across sections
    #[serde(rename = "CARD")]
    Card,
}

/// One end of a drag gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragLocation {
    /// Section the location belongs to; ignored for section drags
    #[serde(default)]
    pub container_id: Option<SectionId>,
    pub index: Position,
}

impl DragLocation {
    /// A location on the board-level section list.
    pub fn board(index: Position) -> Self {
        Self {
            container_id: None,
            index,
        }
    }

    /// A location inside a section.
    pub fn in_section(section_id: SectionId, index: Position) -> Self {
        Self {
            container_id: Some(section_id),
            index,
        }
    }
}

/// A completed drag gesture as reported by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragEnd {
    pub kind: DragKind,
    /// Id of the dragged section or card
    pub moved_id: i64,
    pub source: DragLocation,
    /// `None` when the item was dropped outside any valid target
    #[serde(default)]
    pub destination: Option<DragLocation>,
}

impl DragEnd {
    /// A section drag from `from` to `to`.
    pub fn section(section_id: SectionId, from: Position, to: Option<Position>) -> Self {
        Self {
            kind: DragKind::Section,
            moved_id: section_id,
            source: DragLocation::board(from),
            destination: to.map(DragLocation::board),
        }
    }

    /// A card drag between two section locations.
    pub fn card(card_id: i64, source: DragLocation, destination: Option<DragLocation>) -> Self {
        Self {
            kind: DragKind::Card,
            moved_id: card_id,
            source,
            destination,
        }
    }
}

/// Why a gesture produced no move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NoOpReason {
    /// Dropped outside any target
    Cancelled,
    /// Dropped exactly where it started
    Unchanged,
}

/// Result of interpreting a gesture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "camelCase")]
pub enum Interpretation {
    Move { intent: MoveIntent },
    NoOp { reason: NoOpReason },
}

impl Interpretation {
    /// The intent, when the gesture moved something.
    pub fn intent(&self) -> Option<&MoveIntent> {
        match self {
            Interpretation::Move { intent } => Some(intent),
            Interpretation::NoOp { .. } => None,
        }
    }

    fn noop(reason: NoOpReason) -> Self {
        Interpretation::NoOp { reason }
    }
}

/// Interpret a drag gesture against the current board.
///
/// Never mutates anything. Errors mean the gesture was malformed or stale and
/// must be dropped.
pub fn interpret(board: &Board, event: &DragEnd) -> Result<Interpretation> {
    let Some(destination) = event.destination else {
        return Ok(Interpretation::noop(NoOpReason::Cancelled));
    };

    match event.kind {
        DragKind::Section => interpret_section(board, event, destination),
        DragKind::Card => interpret_card(board, event, destination),
    }
}

fn interpret_section(
    board: &Board,
    event: &DragEnd,
    destination: DragLocation,
) -> Result<Interpretation> {
    let section_id = event.moved_id;
    let from = board
        .section_index(section_id)
        .ok_or(Error::SectionNotFound(section_id))?;
    if event.source.index != from {
        return Err(Error::Validation(format!(
            "section {} is at index {}, gesture started at {}",
            section_id, from, event.source.index
        )));
    }

    let to = destination.index.min(board.sections.len() - 1);
    if to == from {
        return Ok(Interpretation::noop(NoOpReason::Unchanged));
    }

    Ok(Interpretation::Move {
        intent: MoveIntent::section(section_id, from, to),
    })
}

fn interpret_card(
    board: &Board,
    event: &DragEnd,
    destination: DragLocation,
) -> Result<Interpretation> {
    let card_id = event.moved_id;
    let source_id = event
        .source
        .container_id
        .ok_or_else(|| Error::Validation("card drag without source container".to_string()))?;
    let destination_id = destination
        .container_id
        .ok_or_else(|| Error::Validation("card drag without destination container".to_string()))?;

    let source = board
        .section(source_id)
        .ok_or(Error::SectionNotFound(source_id))?;
    let target = board
        .section(destination_id)
        .ok_or(Error::SectionNotFound(destination_id))?;

    let from = event.source.index;
    match source.cards.get(from) {
        Some(card) if card.id == card_id => {}
        _ if board.card(card_id).is_none() => return Err(Error::CardNotFound(card_id)),
        _ => {
            return Err(Error::Validation(format!(
                "card {} is not at index {} of section {}",
                card_id, from, source_id
            )))
        }
    }

    // The gesture reports the final index. Within one section that index is
    // taken against the list without the dragged card, so it tops out one
    // lower than for a drop into another section.
    let to = if source_id == destination_id {
        destination.index.min(source.cards.len() - 1)
    } else {
        destination.index.min(target.cards.len())
    };

    if source_id == destination_id && to == from {
        return Ok(Interpretation::noop(NoOpReason::Unchanged));
    }

    Ok(Interpretation::Move {
        intent: MoveIntent::card(card_id, source_id, destination_id, from, to),
    })
}
