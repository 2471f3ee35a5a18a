//! Queries for boards, sections and cards.
//!
//! Every statement that changes an order runs in a transaction holding the
//! board row lock, so concurrent moves on one board are serialized.

use super::records::{assemble_board, BoardRow, CardRow, SectionRow};
use crate::ordering::{dense_positions, plan_move, plan_transfer};
use kanban_engine::Board;
use sqlx::{PgPool, Postgres, Transaction};

type Tx<'a> = Transaction<'a, Postgres>;

// ============================================================================
// Boards
// ============================================================================

/// All boards, oldest first.
pub async fn list_boards(pool: &PgPool) -> Result<Vec<BoardRow>, sqlx::Error> {
    sqlx::query_as::<_, BoardRow>(
        r#"SELECT id, title, created_at FROM boards ORDER BY created_at ASC, id ASC"#,
    )
    .fetch_all(pool)
    .await
}

pub async fn create_board(pool: &PgPool, title: &str) -> Result<BoardRow, sqlx::Error> {
    sqlx::query_as::<_, BoardRow>(
        r#"INSERT INTO boards (title) VALUES ($1) RETURNING id, title, created_at"#,
    )
    .bind(title)
    .fetch_one(pool)
    .await
}

pub async fn rename_board(
    pool: &PgPool,
    board_id: i64,
    title: &str,
) -> Result<Option<BoardRow>, sqlx::Error> {
    sqlx::query_as::<_, BoardRow>(
        r#"UPDATE boards SET title = $2 WHERE id = $1 RETURNING id, title, created_at"#,
    )
    .bind(board_id)
    .bind(title)
    .fetch_optional(pool)
    .await
}

/// Delete a board; sections and cards go with it.
pub async fn delete_board(pool: &PgPool, board_id: i64) -> Result<Option<BoardRow>, sqlx::Error> {
    sqlx::query_as::<_, BoardRow>(
        r#"DELETE FROM boards WHERE id = $1 RETURNING id, title, created_at"#,
    )
    .bind(board_id)
    .fetch_optional(pool)
    .await
}

/// Load a board with its sections and cards in order.
pub async fn fetch_board(pool: &PgPool, board_id: i64) -> Result<Option<Board>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let Some(board) = sqlx::query_as::<_, BoardRow>(
        r#"SELECT id, title, created_at FROM boards WHERE id = $1"#,
    )
    .bind(board_id)
    .fetch_optional(&mut *tx)
    .await?
    else {
        return Ok(None);
    };

    let sections = sqlx::query_as::<_, SectionRow>(
        r#"
        SELECT id, board_id, title, position
        FROM sections
        WHERE board_id = $1
        ORDER BY position ASC, id ASC
        "#,
    )
    .bind(board_id)
    .fetch_all(&mut *tx)
    .await?;

    let cards = sqlx::query_as::<_, CardRow>(
        r#"
        SELECT c.id, c.section_id, c.title, c.description, c.position
        FROM cards c
        JOIN sections s ON s.id = c.section_id
        WHERE s.board_id = $1
        ORDER BY c.section_id ASC, c.position ASC, c.id ASC
        "#,
    )
    .bind(board_id)
    .fetch_all(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(Some(assemble_board(&board, &sections, &cards)))
}

async fn lock_board(tx: &mut Tx<'_>, board_id: i64) -> Result<bool, sqlx::Error> {
    let locked: Option<(i64,)> = sqlx::query_as(r#"SELECT id FROM boards WHERE id = $1 FOR UPDATE"#)
        .bind(board_id)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(locked.is_some())
}

// ============================================================================
// Sections
// ============================================================================

async fn section_ids(tx: &mut Tx<'_>, board_id: i64) -> Result<Vec<i64>, sqlx::Error> {
    let rows: Vec<(i64,)> = sqlx::query_as(
        r#"SELECT id FROM sections WHERE board_id = $1 ORDER BY position ASC, id ASC"#,
    )
    .bind(board_id)
    .fetch_all(&mut **tx)
    .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}

async fn write_section_order(tx: &mut Tx<'_>, ids: &[i64]) -> Result<(), sqlx::Error> {
    let (ids, positions) = dense_positions(ids);
    sqlx::query(
        r#"
        UPDATE sections AS s
        SET position = v.position
        FROM UNNEST($1::BIGINT[], $2::INTEGER[]) AS v(id, position)
        WHERE s.id = v.id
        "#,
    )
    .bind(ids)
    .bind(positions)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn section_board(tx: &mut Tx<'_>, section_id: i64) -> Result<Option<i64>, sqlx::Error> {
    let row: Option<(i64,)> = sqlx::query_as(r#"SELECT board_id FROM sections WHERE id = $1"#)
        .bind(section_id)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(row.map(|(board_id,)| board_id))
}

async fn get_section(tx: &mut Tx<'_>, section_id: i64) -> Result<SectionRow, sqlx::Error> {
    sqlx::query_as::<_, SectionRow>(
        r#"SELECT id, board_id, title, position FROM sections WHERE id = $1"#,
    )
    .bind(section_id)
    .fetch_one(&mut **tx)
    .await
}

/// Append a section to a board. `None` if the board does not exist.
pub async fn create_section(
    pool: &PgPool,
    board_id: i64,
    title: &str,
) -> Result<Option<SectionRow>, sqlx::Error> {
    let mut tx = pool.begin().await?;
    if !lock_board(&mut tx, board_id).await? {
        return Ok(None);
    }

    let position = section_ids(&mut tx, board_id).await?.len() as i32;
    let section = sqlx::query_as::<_, SectionRow>(
        r#"
        INSERT INTO sections (board_id, title, position)
        VALUES ($1, $2, $3)
        RETURNING id, board_id, title, position
        "#,
    )
    .bind(board_id)
    .bind(title)
    .bind(position)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(Some(section))
}

pub async fn rename_section(
    pool: &PgPool,
    section_id: i64,
    title: &str,
) -> Result<Option<SectionRow>, sqlx::Error> {
    sqlx::query_as::<_, SectionRow>(
        r#"
        UPDATE sections SET title = $2 WHERE id = $1
        RETURNING id, board_id, title, position
        "#,
    )
    .bind(section_id)
    .bind(title)
    .fetch_optional(pool)
    .await
}

/// Delete a section with its cards and close the gap it leaves.
pub async fn delete_section(
    pool: &PgPool,
    section_id: i64,
) -> Result<Option<SectionRow>, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let Some(board_id) = section_board(&mut tx, section_id).await? else {
        return Ok(None);
    };
    lock_board(&mut tx, board_id).await?;

    let deleted = sqlx::query_as::<_, SectionRow>(
        r#"DELETE FROM sections WHERE id = $1 RETURNING id, board_id, title, position"#,
    )
    .bind(section_id)
    .fetch_optional(&mut *tx)
    .await?;

    let remaining = section_ids(&mut tx, board_id).await?;
    write_section_order(&mut tx, &remaining).await?;

    tx.commit().await?;
    Ok(deleted)
}

/// Move a section to `position` (clamped) and rewrite the board's order.
pub async fn move_section(
    pool: &PgPool,
    section_id: i64,
    position: usize,
) -> Result<Option<SectionRow>, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let Some(board_id) = section_board(&mut tx, section_id).await? else {
        return Ok(None);
    };
    lock_board(&mut tx, board_id).await?;

    let ids = section_ids(&mut tx, board_id).await?;
    let Some((order, landed)) = plan_move(&ids, section_id, position) else {
        return Ok(None);
    };
    write_section_order(&mut tx, &order).await?;

    let section = get_section(&mut tx, section_id).await?;
    tx.commit().await?;

    tracing::debug!(section_id, board_id, position = landed, "Section moved");
    Ok(Some(section))
}

// ============================================================================
// Cards
// ============================================================================

async fn card_ids(tx: &mut Tx<'_>, section_id: i64) -> Result<Vec<i64>, sqlx::Error> {
    let rows: Vec<(i64,)> = sqlx::query_as(
        r#"SELECT id FROM cards WHERE section_id = $1 ORDER BY position ASC, id ASC"#,
    )
    .bind(section_id)
    .fetch_all(&mut **tx)
    .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}

async fn write_card_order(
    tx: &mut Tx<'_>,
    section_id: i64,
    ids: &[i64],
) -> Result<(), sqlx::Error> {
    let (ids, positions) = dense_positions(ids);
    sqlx::query(
        r#"
        UPDATE cards AS c
        SET position = v.position, section_id = $3
        FROM UNNEST($1::BIGINT[], $2::INTEGER[]) AS v(id, position)
        WHERE c.id = v.id
        "#,
    )
    .bind(ids)
    .bind(positions)
    .bind(section_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Board holding a card, read without a lock.
async fn card_board(tx: &mut Tx<'_>, card_id: i64) -> Result<Option<i64>, sqlx::Error> {
    let row: Option<(i64,)> = sqlx::query_as(
        r#"
        SELECT s.board_id
        FROM cards c
        JOIN sections s ON s.id = c.section_id
        WHERE c.id = $1
        "#,
    )
    .bind(card_id)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(row.map(|(board_id,)| board_id))
}

async fn get_card(tx: &mut Tx<'_>, card_id: i64) -> Result<Option<CardRow>, sqlx::Error> {
    sqlx::query_as::<_, CardRow>(
        r#"SELECT id, section_id, title, description, position FROM cards WHERE id = $1"#,
    )
    .bind(card_id)
    .fetch_optional(&mut **tx)
    .await
}

/// Append a card to a section. `None` if the section does not exist.
pub async fn create_card(
    pool: &PgPool,
    section_id: i64,
    title: &str,
) -> Result<Option<CardRow>, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let Some(board_id) = section_board(&mut tx, section_id).await? else {
        return Ok(None);
    };
    lock_board(&mut tx, board_id).await?;

    let position = card_ids(&mut tx, section_id).await?.len() as i32;
    let card = sqlx::query_as::<_, CardRow>(
        r#"
        INSERT INTO cards (section_id, title, position)
        VALUES ($1, $2, $3)
        RETURNING id, section_id, title, description, position
        "#,
    )
    .bind(section_id)
    .bind(title)
    .bind(position)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(Some(card))
}

/// Replace a card's title and description. Its position is untouched.
pub async fn update_card(
    pool: &PgPool,
    card_id: i64,
    title: &str,
    description: Option<&str>,
) -> Result<Option<CardRow>, sqlx::Error> {
    sqlx::query_as::<_, CardRow>(
        r#"
        UPDATE cards SET title = $2, description = $3 WHERE id = $1
        RETURNING id, section_id, title, description, position
        "#,
    )
    .bind(card_id)
    .bind(title)
    .bind(description)
    .fetch_optional(pool)
    .await
}

/// Delete a card and close the gap it leaves.
pub async fn delete_card(pool: &PgPool, card_id: i64) -> Result<Option<CardRow>, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let Some(board_id) = card_board(&mut tx, card_id).await? else {
        return Ok(None);
    };
    lock_board(&mut tx, board_id).await?;

    // Cards never leave their board, but may have changed section while we
    // waited for the lock.
    let Some(card) = get_card(&mut tx, card_id).await? else {
        return Ok(None);
    };

    sqlx::query(r#"DELETE FROM cards WHERE id = $1"#)
        .bind(card_id)
        .execute(&mut *tx)
        .await?;

    let remaining = card_ids(&mut tx, card.section_id).await?;
    write_card_order(&mut tx, card.section_id, &remaining).await?;

    tx.commit().await?;
    Ok(Some(card))
}

/// Why a card move could not be carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardMoveError {
    CardNotFound,
    SectionNotFound,
    /// Destination section belongs to another board
    CrossBoard,
}

/// Move a card into `section_id` at `position` (clamped) and rewrite the
/// order of every section involved.
pub async fn move_card(
    pool: &PgPool,
    card_id: i64,
    section_id: i64,
    position: usize,
) -> Result<Result<CardRow, CardMoveError>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let Some(board_id) = card_board(&mut tx, card_id).await? else {
        return Ok(Err(CardMoveError::CardNotFound));
    };
    lock_board(&mut tx, board_id).await?;

    // Everything below is read under the board lock.
    let Some(card) = get_card(&mut tx, card_id).await? else {
        return Ok(Err(CardMoveError::CardNotFound));
    };
    let Some(target_board) = section_board(&mut tx, section_id).await? else {
        return Ok(Err(CardMoveError::SectionNotFound));
    };
    if target_board != board_id {
        return Ok(Err(CardMoveError::CrossBoard));
    }

    let source = card_ids(&mut tx, card.section_id).await?;
    let landed = if card.section_id == section_id {
        let Some((order, landed)) = plan_move(&source, card_id, position) else {
            return Ok(Err(CardMoveError::CardNotFound));
        };
        write_card_order(&mut tx, section_id, &order).await?;
        landed
    } else {
        let destination = card_ids(&mut tx, section_id).await?;
        let Some(transfer) = plan_transfer(&source, &destination, card_id, position) else {
            return Ok(Err(CardMoveError::CardNotFound));
        };
        write_card_order(&mut tx, card.section_id, &transfer.source).await?;
        write_card_order(&mut tx, section_id, &transfer.destination).await?;
        transfer.position
    };

    let moved = get_card(&mut tx, card_id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;
    tx.commit().await?;

    tracing::debug!(
        card_id,
        from_section = card.section_id,
        to_section = section_id,
        position = landed,
        "Card moved"
    );
    Ok(Ok(moved))
}
