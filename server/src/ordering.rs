//! Order planning for stored sections and cards.
//!
//! Given the ids of a scope in their stored order, compute the new order
//! after a move. The database layer then writes positions `0..n-1` back.

use kanban_engine::reorder;

/// New order of one scope after moving `moved` to `to` (clamped).
///
/// Returns the new id order and the index the item landed on, or `None` if
/// `moved` is not in `ids`.
pub fn plan_move(ids: &[i64], moved: i64, to: usize) -> Option<(Vec<i64>, usize)> {
    let from = ids.iter().position(|&id| id == moved)?;
    let to = to.min(ids.len() - 1);
    Some((reorder::move_item(ids, from, to), to))
}

/// Orders of both scopes after moving a card between them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub source: Vec<i64>,
    pub destination: Vec<i64>,
    /// Index the card landed on in the destination
    pub position: usize,
}

/// Move `moved` out of `source` into `destination` at `to` (clamped to the
/// destination length).
pub fn plan_transfer(
    source: &[i64],
    destination: &[i64],
    moved: i64,
    to: usize,
) -> Option<Transfer> {
    let from = source.iter().position(|&id| id == moved)?;
    let (rest, card) = reorder::remove_at(source, from)?;
    let position = to.min(destination.len());
    Some(Transfer {
        source: rest,
        destination: reorder::insert_at(destination, position, card),
        position,
    })
}

/// Positions to store for `ids`, as `(ids, positions)` ready for binding.
pub fn dense_positions(ids: &[i64]) -> (Vec<i64>, Vec<i32>) {
    let positions = (0..ids.len()).map(|p| p as i32).collect();
    (ids.to_vec(), positions)
}
