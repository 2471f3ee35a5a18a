//! Row types for boards, sections and cards.

use kanban_engine::{Board, Card, Section};
use serde::Serialize;
use sqlx::Row;

/// A stored board row, without its sections.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardRow {
    pub id: i64,
    pub title: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for BoardRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(BoardRow {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// A stored section row.
#[derive(Debug, Clone)]
pub struct SectionRow {
    pub id: i64,
    pub board_id: i64,
    pub title: String,
    pub position: i32,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for SectionRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(SectionRow {
            id: row.try_get("id")?,
            board_id: row.try_get("board_id")?,
            title: row.try_get("title")?,
            position: row.try_get("position")?,
        })
    }
}

impl SectionRow {
    /// Convert to an engine section with no cards.
    pub fn to_section(&self) -> Section {
        Section::new(self.id, self.title.clone(), position(self.position))
    }
}

/// A stored card row.
#[derive(Debug, Clone)]
pub struct CardRow {
    pub id: i64,
    pub section_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub position: i32,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for CardRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(CardRow {
            id: row.try_get("id")?,
            section_id: row.try_get("section_id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            position: row.try_get("position")?,
        })
    }
}

impl CardRow {
    /// Convert to an engine card, carrying its section id.
    pub fn to_card(&self) -> Card {
        let mut card = Card::new(self.id, self.title.clone(), position(self.position));
        card.description = self.description.clone();
        card.section_id = Some(self.section_id);
        card
    }
}

/// Assemble a board from its rows.
///
/// Sections and cards may arrive in any order; the result is normalized.
pub fn assemble_board(board: &BoardRow, sections: &[SectionRow], cards: &[CardRow]) -> Board {
    let mut assembled = Board::new(board.id, board.title.clone());
    assembled.sections = sections
        .iter()
        .map(|row| {
            let mut section = row.to_section();
            section.cards = cards
                .iter()
                .filter(|card| card.section_id == row.id)
                .map(CardRow::to_card)
                .collect();
            section
        })
        .collect();
    assembled.normalized()
}

fn position(stored: i32) -> usize {
    usize::try_from(stored).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_row() -> BoardRow {
        BoardRow {
            id: 1,
            title: "Board".into(),
            created_at: chrono::Utc::now(),
        }
    }

    fn section(id: i64, position: i32) -> SectionRow {
        SectionRow {
            id,
            board_id: 1,
            title: format!("S{}", id),
            position,
        }
    }

    fn card(id: i64, section_id: i64, position: i32) -> CardRow {
        CardRow {
            id,
            section_id,
            title: format!("C{}", id),
            description: None,
            position,
        }
    }

    #[test]
    fn assembles_in_stored_order() {
        let sections = [section(20, 1), section(10, 0)];
        let cards = [card(3, 10, 1), card(4, 20, 0), card(2, 10, 0)];

        let board = assemble_board(&board_row(), &sections, &cards);
        assert_eq!(board.section_ids(), vec![10, 20]);
        assert_eq!(board.section(10).unwrap().card_ids(), vec![2, 3]);
        assert_eq!(board.card(4).unwrap().section_id, Some(20));
        assert!(board.validate().is_ok());
    }

    #[test]
    fn gapped_positions_are_densified() {
        let sections = [section(10, 4)];
        let cards = [card(1, 10, 9), card(2, 10, 3)];

        let board = assemble_board(&board_row(), &sections, &cards);
        let positions: Vec<_> = board.sections[0].cards.iter().map(|c| c.position).collect();
        assert_eq!(board.sections[0].position, 0);
        assert_eq!(board.section(10).unwrap().card_ids(), vec![2, 1]);
        assert_eq!(positions, vec![0, 1]);
    }

    #[test]
    fn card_keeps_description() {
        let mut row = card(1, 10, 0);
        row.description = Some("notes".into());
        let card = row.to_card();
        assert_eq!(card.description.as_deref(), Some("notes"));
        assert_eq!(card.section_id, Some(10));
    }
}
