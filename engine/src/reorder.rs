//! Ordered collection primitive.
//!
//! Every function here takes a slice and returns a fresh `Vec`. Nothing is
//! spliced in place, so a caller holding the previous sequence (for example a
//! rollback snapshot) never observes the change.

use crate::Position;

/// Items that carry their own index within an ordered scope.
pub trait Positioned {
    fn position(&self) -> Position;
    fn set_position(&mut self, position: Position);
}

/// Remove the element at `from` and reinsert it at `to`.
///
/// `to` is clamped to `[0, len - 1]`, i.e. the valid insertion range once the
/// element has been removed. An out-of-range `from` yields an unchanged copy.
pub fn move_item<T: Clone>(items: &[T], from: usize, to: usize) -> Vec<T> {
    match remove_at(items, from) {
        Some((rest, item)) => insert_at(&rest, to, item),
        None => items.to_vec(),
    }
}

/// Remove the element at `index`, returning the remaining sequence and the
/// removed element. `None` when `index` is out of range.
pub fn remove_at<T: Clone>(items: &[T], index: usize) -> Option<(Vec<T>, T)> {
    if index >= items.len() {
        return None;
    }
    let mut rest = Vec::with_capacity(items.len() - 1);
    rest.extend_from_slice(&items[..index]);
    rest.extend_from_slice(&items[index + 1..]);
    Some((rest, items[index].clone()))
}

/// Insert `item` at `index`, clamped to `[0, len]`.
pub fn insert_at<T: Clone>(items: &[T], index: usize, item: T) -> Vec<T> {
    let index = index.min(items.len());
    let mut out = Vec::with_capacity(items.len() + 1);
    out.extend_from_slice(&items[..index]);
    out.push(item);
    out.extend_from_slice(&items[index..]);
    out
}

/// Rewrite positions so they read `0..n-1` in sequence order.
pub fn reindex<T: Positioned>(items: &mut [T]) {
    for (index, item) in items.iter_mut().enumerate() {
        if item.position() != index {
            item.set_position(index);
        }
    }
}

/// Check that positions read exactly `0..n-1` in sequence order.
pub fn is_dense<T: Positioned>(items: &[T]) -> bool {
    items
        .iter()
        .enumerate()
        .all(|(index, item)| item.position() == index)
}
