//! Store - the in-memory board state container.
//!
//! The store holds the board behind an `Arc`. Every mutation builds a new
//! board and swaps the pointer, so a snapshot taken before a move stays valid
//! as a rollback target no matter what happens afterwards.

use crate::intent::{EntityKey, MoveIntent, Placement};
use crate::model::{Board, Card, Section};
use crate::reorder;
use crate::snapshot::BoardSnapshot;
use crate::{error::Result, CardId, Epoch, Error, Position, Revision, SectionId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Why the board changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeCause {
    /// Whole board overwritten from an authoritative fetch
    Replaced,
    SectionMoved,
    CardMoved,
    /// Optimistic move rolled back after a remote failure
    Reverted,
    /// Local order aligned with the server's answer
    Corrected,
    /// Create/rename/delete/update from the non-core layer
    Edited,
}

/// Notification delivered to subscribers after each mutation.
#[derive(Debug, Clone, Copy)]
pub struct BoardChange<'a> {
    pub cause: ChangeCause,
    pub board: &'a Board,
    pub revision: Revision,
}

/// Handle returned by [`BoardStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A subscriber callback.
pub type Listener = Box<dyn FnMut(&BoardChange<'_>) + Send>;

/// The placement an entity had before and after an applied move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedMove {
    pub entity: EntityKey,
    pub from: Placement,
    /// Actual landing spot, after clamping
    pub to: Placement,
}

impl AppliedMove {
    /// Whether the move changed anything.
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }
}

/// The board state store.
pub struct BoardStore {
    board: Arc<Board>,
    /// Bumped by every `replace_board`
    epoch: Epoch,
    /// Bumped by every mutation
    revision: Revision,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl std::fmt::Debug for BoardStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoardStore")
            .field("board", &self.board)
            .field("epoch", &self.epoch)
            .field("revision", &self.revision)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for BoardStore {
    fn default() -> Self {
        Self::new(Board::new(0, ""))
    }
}

impl BoardStore {
    /// Create a store seeded with `board`.
    ///
    /// The board is normalized on the way in but not validated: it must not
    /// repeat a section or card id. Use [`try_new`](Self::try_new) for boards
    /// from outside the process.
    pub fn new(board: Board) -> Self {
        Self {
            board: Arc::new(board.normalized()),
            epoch: 0,
            revision: 0,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Create a store seeded with `board`, rejecting boards that break the
    /// single-ownership invariant.
    pub fn try_new(board: Board) -> Result<Self> {
        let board = board.normalized();
        board.validate()?;
        Ok(Self::new(board))
    }

    /// Current board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Immutable copy of the current board, usable as a rollback target.
    pub fn snapshot(&self) -> Arc<Board> {
        Arc::clone(&self.board)
    }

    /// Current epoch.
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Current revision.
    pub fn revision(&self) -> Revision {
        self.revision
    }

    /// Register a listener called synchronously after every mutation.
    pub fn subscribe(&mut self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    /// Overwrite the board with an authoritative copy.
    ///
    /// Starts a new epoch; moves issued against the previous board can no
    /// longer be resolved against this one.
    pub fn replace_board(&mut self, board: Board) -> Result<Epoch> {
        let board = board.normalized();
        board.validate()?;
        self.epoch += 1;
        self.commit(board, ChangeCause::Replaced);
        Ok(self.epoch)
    }

    /// Swap a previously taken snapshot back in.
    pub fn restore(&mut self, snapshot: Arc<Board>) {
        self.board = snapshot;
        self.revision += 1;
        self.notify(ChangeCause::Reverted);
    }

    /// Apply a move intent.
    pub fn apply(&mut self, intent: &MoveIntent) -> Result<AppliedMove> {
        match intent {
            MoveIntent::Section(m) => self.apply_section_move(m.section_id, m.to_index),
            MoveIntent::Card(m) => self.apply_card_move(
                m.card_id,
                m.source_section_id,
                m.destination_section_id,
                m.to_index,
            ),
        }
    }

    /// Move a section to `destination_index` (clamped).
    pub fn apply_section_move(
        &mut self,
        section_id: SectionId,
        destination_index: Position,
    ) -> Result<AppliedMove> {
        self.move_section(section_id, destination_index, ChangeCause::SectionMoved)
    }

    /// Move a card into `destination_section_id` at `destination_index`
    /// (clamped).
    pub fn apply_card_move(
        &mut self,
        card_id: CardId,
        source_section_id: SectionId,
        destination_section_id: SectionId,
        destination_index: Position,
    ) -> Result<AppliedMove> {
        self.move_card(
            card_id,
            source_section_id,
            destination_section_id,
            destination_index,
            ChangeCause::CardMoved,
        )
    }

    /// Capture the current board for caching.
    pub fn export_snapshot(&self) -> BoardSnapshot {
        BoardSnapshot::new((*self.board).clone(), self.epoch, self.revision)
    }

    /// Load a cached board. Behaves like [`replace_board`](Self::replace_board).
    pub fn import_snapshot(&mut self, snapshot: BoardSnapshot) -> Result<Epoch> {
        snapshot.validate()?;
        self.replace_board(snapshot.board)
    }

    /// Where an entity currently sits.
    pub fn placement_of(&self, entity: EntityKey) -> Option<Placement> {
        placement_in(&self.board, entity)
    }

    /// Move an entity to `placement` on behalf of reconciliation.
    pub(crate) fn place(
        &mut self,
        entity: EntityKey,
        placement: Placement,
        cause: ChangeCause,
    ) -> Result<AppliedMove> {
        match (entity, placement) {
            (EntityKey::Section(id), Placement::Section { index }) => {
                self.move_section(id, index, cause)
            }
            (EntityKey::Card(id), Placement::Card { section_id, index }) => {
                let (si, _) = self.board.locate_card(id).ok_or(Error::CardNotFound(id))?;
                let source = self.board.sections[si].id;
                self.move_card(id, source, section_id, index, cause)
            }
            (entity, placement) => Err(Error::Validation(format!(
                "placement {:?} does not fit {}",
                placement, entity
            ))),
        }
    }

    fn move_section(
        &mut self,
        section_id: SectionId,
        destination_index: Position,
        cause: ChangeCause,
    ) -> Result<AppliedMove> {
        let from = self
            .board
            .section_index(section_id)
            .ok_or(Error::SectionNotFound(section_id))?;
        let to = destination_index.min(self.board.sections.len() - 1);

        let mut sections = reorder::move_item(&self.board.sections, from, to);
        reorder::reindex(&mut sections);

        let mut board = self.board_shell();
        board.sections = sections;
        self.commit(board, cause);

        Ok(AppliedMove {
            entity: EntityKey::Section(section_id),
            from: Placement::Section { index: from },
            to: Placement::Section { index: to },
        })
    }

    fn move_card(
        &mut self,
        card_id: CardId,
        source_section_id: SectionId,
        destination_section_id: SectionId,
        destination_index: Position,
        cause: ChangeCause,
    ) -> Result<AppliedMove> {
        let src = self
            .board
            .section_index(source_section_id)
            .ok_or(Error::SectionNotFound(source_section_id))?;
        let dst = self
            .board
            .section_index(destination_section_id)
            .ok_or(Error::SectionNotFound(destination_section_id))?;
        let from = self.board.sections[src]
            .card_index(card_id)
            .ok_or(Error::CardNotFound(card_id))?;

        let mut sections = self.board.sections.clone();
        let to = if src == dst {
            // One array: the removal and the insertion both index into it,
            // so the dragged card cannot displace its own landing spot.
            let cards = &sections[src].cards;
            let to = destination_index.min(cards.len() - 1);
            let reordered = reorder::move_item(cards, from, to);
            sections[src].set_cards(reordered);
            to
        } else {
            let (rest, card) = reorder::remove_at(&sections[src].cards, from)
                .ok_or(Error::CardNotFound(card_id))?;
            let to = destination_index.min(sections[dst].cards.len());
            let landed = reorder::insert_at(&sections[dst].cards, to, card);
            sections[src].set_cards(rest);
            sections[dst].set_cards(landed);
            to
        };

        let mut board = self.board_shell();
        board.sections = sections;
        self.commit(board, cause);

        Ok(AppliedMove {
            entity: EntityKey::Card(card_id),
            from: Placement::Card {
                section_id: source_section_id,
                index: from,
            },
            to: Placement::Card {
                section_id: destination_section_id,
                index: to,
            },
        })
    }

    /// Insert a section at its `position` (clamped to the end).
    pub fn insert_section(&mut self, section: Section) -> Result<()> {
        if self.board.section(section.id).is_some() {
            return Err(Error::InvalidBoard(format!(
                "section {} already exists",
                section.id
            )));
        }
        for card in &section.cards {
            if self.board.card(card.id).is_some() {
                return Err(Error::InvalidBoard(format!("card {} already exists", card.id)));
            }
        }

        let mut section = section;
        let mut cards = std::mem::take(&mut section.cards);
        cards.sort_by_key(|c| (c.position, c.id));
        section.set_cards(cards);

        let index = section.position;
        let mut sections = reorder::insert_at(&self.board.sections, index, section);
        reorder::reindex(&mut sections);

        let mut board = self.board_shell();
        board.sections = sections;
        self.commit(board, ChangeCause::Edited);
        Ok(())
    }

    /// Remove a section together with its cards.
    pub fn remove_section(&mut self, section_id: SectionId) -> Result<Section> {
        let index = self
            .board
            .section_index(section_id)
            .ok_or(Error::SectionNotFound(section_id))?;
        let (mut sections, removed) = reorder::remove_at(&self.board.sections, index)
            .ok_or(Error::SectionNotFound(section_id))?;
        reorder::reindex(&mut sections);

        let mut board = self.board_shell();
        board.sections = sections;
        self.commit(board, ChangeCause::Edited);
        Ok(removed)
    }

    /// Change a section's title.
    pub fn rename_section(&mut self, section_id: SectionId, title: impl Into<String>) -> Result<()> {
        let index = self
            .board
            .section_index(section_id)
            .ok_or(Error::SectionNotFound(section_id))?;

        let mut sections = self.board.sections.clone();
        sections[index].title = title.into();

        let mut board = self.board_shell();
        board.sections = sections;
        self.commit(board, ChangeCause::Edited);
        Ok(())
    }

    /// Insert a card into a section at its `position` (clamped to the end).
    pub fn insert_card(&mut self, section_id: SectionId, card: Card) -> Result<()> {
        let index = self
            .board
            .section_index(section_id)
            .ok_or(Error::SectionNotFound(section_id))?;
        if self.board.card(card.id).is_some() {
            return Err(Error::InvalidBoard(format!("card {} already exists", card.id)));
        }

        let mut sections = self.board.sections.clone();
        let at = card.position;
        let cards = reorder::insert_at(&sections[index].cards, at, card);
        sections[index].set_cards(cards);

        let mut board = self.board_shell();
        board.sections = sections;
        self.commit(board, ChangeCause::Edited);
        Ok(())
    }

    /// Remove a card from whichever section holds it.
    pub fn remove_card(&mut self, card_id: CardId) -> Result<Card> {
        let (si, ci) = self
            .board
            .locate_card(card_id)
            .ok_or(Error::CardNotFound(card_id))?;

        let mut sections = self.board.sections.clone();
        let (rest, removed) =
            reorder::remove_at(&sections[si].cards, ci).ok_or(Error::CardNotFound(card_id))?;
        sections[si].set_cards(rest);

        let mut board = self.board_shell();
        board.sections = sections;
        self.commit(board, ChangeCause::Edited);
        Ok(removed)
    }

    /// Change a card's title and description. Its position is untouched.
    pub fn update_card(
        &mut self,
        card_id: CardId,
        title: impl Into<String>,
        description: Option<String>,
    ) -> Result<()> {
        let (si, ci) = self
            .board
            .locate_card(card_id)
            .ok_or(Error::CardNotFound(card_id))?;

        let mut sections = self.board.sections.clone();
        let card = &mut sections[si].cards[ci];
        card.title = title.into();
        card.description = description;

        let mut board = self.board_shell();
        board.sections = sections;
        self.commit(board, ChangeCause::Edited);
        Ok(())
    }

    fn board_shell(&self) -> Board {
        Board::new(self.board.id, self.board.title.clone())
    }

    fn commit(&mut self, board: Board, cause: ChangeCause) {
        debug_assert!(board.validate().is_ok(), "store invariant broken");
        self.board = Arc::new(board);
        self.revision += 1;
        self.notify(cause);
    }

    fn notify(&mut self, cause: ChangeCause) {
        let change = BoardChange {
            cause,
            board: &self.board,
            revision: self.revision,
        };
        for (_, listener) in self.listeners.iter_mut() {
            listener(&change);
        }
    }
}

/// Where an entity sits on `board`.
pub fn placement_in(board: &Board, entity: EntityKey) -> Option<Placement> {
    match entity {
        EntityKey::Section(id) => board
            .section_index(id)
            .map(|index| Placement::Section { index }),
        EntityKey::Card(id) => board.locate_card(id).map(|(si, ci)| Placement::Card {
            section_id: board.sections[si].id,
            index: ci,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn test_board() -> Board {
        Board::new(1, "Board")
            .with_section(Section::new(10, "A", 0).with_cards(vec![
                Card::new(1, "1", 0),
                Card::new(2, "2", 1),
                Card::new(3, "3", 2),
            ]))
            .with_section(
                Section::new(20, "B", 1)
                    .with_cards(vec![Card::new(4, "4", 0), Card::new(5, "5", 1)]),
            )
    }

    fn test_store() -> BoardStore {
        BoardStore::new(test_board())
    }

    #[test]
    fn try_new_rejects_duplicate_ids() {
        let duplicate_card = Board::new(1, "Board")
            .with_section(Section::new(10, "A", 0).with_cards(vec![Card::new(1, "1", 0)]))
            .with_section(Section::new(20, "B", 1).with_cards(vec![Card::new(1, "again", 0)]));
        assert!(matches!(
            BoardStore::try_new(duplicate_card),
            Err(Error::InvalidBoard(_))
        ));

        let duplicate_section = Board::new(1, "Board")
            .with_section(Section::new(10, "A", 0))
            .with_section(Section::new(10, "A again", 1));
        assert!(matches!(
            BoardStore::try_new(duplicate_section),
            Err(Error::InvalidBoard(_))
        ));

        let store = BoardStore::try_new(test_board()).unwrap();
        assert_eq!(store.board().section_ids(), vec![10, 20]);
        assert_eq!(store.revision(), 0);
    }

    fn cards(store: &BoardStore, section_id: SectionId) -> Vec<CardId> {
        store.board().section(section_id).unwrap().card_ids()
    }

    #[test]
    fn section_move() {
        let mut store = test_store();
        let applied = store.apply_section_move(20, 0).unwrap();

        assert_eq!(store.board().section_ids(), vec![20, 10]);
        assert_eq!(store.board().sections[0].position, 0);
        assert_eq!(store.board().sections[1].position, 1);
        assert_eq!(applied.from, Placement::Section { index: 1 });
        assert_eq!(applied.to, Placement::Section { index: 0 });
    }

    #[test]
    fn section_move_clamps() {
        let mut store = test_store();
        let applied = store.apply_section_move(10, 42).unwrap();
        assert_eq!(store.board().section_ids(), vec![20, 10]);
        assert_eq!(applied.to, Placement::Section { index: 1 });
    }

    #[test]
    fn section_move_unknown_section() {
        let mut store = test_store();
        let before = store.revision();
        let result = store.apply_section_move(99, 0);
        assert_eq!(result, Err(Error::SectionNotFound(99)));
        assert_eq!(store.revision(), before);
    }

    #[test]
    fn card_move_within_section() {
        let mut store = test_store();
        store.apply_card_move(1, 10, 10, 2).unwrap();
        assert_eq!(cards(&store, 10), vec![2, 3, 1]);
        assert!(store.board().validate().is_ok());
    }

    #[test]
    fn card_move_within_section_backward() {
        let mut store = test_store();
        store.apply_card_move(3, 10, 10, 0).unwrap();
        assert_eq!(cards(&store, 10), vec![3, 1, 2]);
    }

    #[test]
    fn card_move_within_section_clamps_to_last() {
        let mut store = test_store();
        let applied = store.apply_card_move(1, 10, 10, 100).unwrap();
        assert_eq!(cards(&store, 10), vec![2, 3, 1]);
        assert_eq!(
            applied.to,
            Placement::Card {
                section_id: 10,
                index: 2
            }
        );
    }

    #[test]
    fn card_move_across_sections() {
        let mut store = test_store();
        store.apply_card_move(2, 10, 20, 0).unwrap();

        assert_eq!(cards(&store, 10), vec![1, 3]);
        assert_eq!(cards(&store, 20), vec![2, 4, 5]);
        assert_eq!(store.board().card(2).unwrap().section_id, Some(20));
        assert!(store.board().validate().is_ok());
    }

    #[test]
    fn card_move_across_sections_clamps_to_end() {
        let mut store = test_store();
        let applied = store.apply_card_move(1, 10, 20, 10).unwrap();
        assert_eq!(cards(&store, 20), vec![4, 5, 1]);
        assert_eq!(
            applied.to,
            Placement::Card {
                section_id: 20,
                index: 2
            }
        );
    }

    #[test]
    fn card_move_into_empty_section() {
        let mut store = test_store();
        store.insert_section(Section::new(30, "C", 2)).unwrap();
        store.apply_card_move(5, 20, 30, 0).unwrap();
        assert_eq!(cards(&store, 30), vec![5]);
        assert_eq!(cards(&store, 20), vec![4]);
    }

    #[test]
    fn card_move_missing_destination_section() {
        let mut store = test_store();
        let before = store.snapshot();
        let result = store.apply_card_move(1, 10, 77, 0);
        assert_eq!(result, Err(Error::SectionNotFound(77)));
        assert_eq!(store.board(), &*before);
    }

    #[test]
    fn card_move_card_not_in_source() {
        let mut store = test_store();
        let result = store.apply_card_move(4, 10, 20, 0);
        assert_eq!(result, Err(Error::CardNotFound(4)));
    }

    #[test]
    fn snapshot_survives_later_moves() {
        let mut store = test_store();
        let snapshot = store.snapshot();
        store.apply_card_move(2, 10, 20, 0).unwrap();

        assert_eq!(snapshot.section(10).unwrap().card_ids(), vec![1, 2, 3]);
        store.restore(snapshot);
        assert_eq!(cards(&store, 10), vec![1, 2, 3]);
        assert_eq!(cards(&store, 20), vec![4, 5]);
    }

    #[test]
    fn replace_board_bumps_epoch() {
        let mut store = test_store();
        assert_eq!(store.epoch(), 0);
        let epoch = store.replace_board(test_board()).unwrap();
        assert_eq!(epoch, 1);
        assert_eq!(store.epoch(), 1);
    }

    #[test]
    fn replace_board_rejects_duplicates() {
        let mut store = test_store();
        let mut board = test_board();
        board.sections[1].cards.push(Card::new(1, "dup", 9));
        assert!(matches!(
            store.replace_board(board),
            Err(Error::InvalidBoard(_))
        ));
        assert_eq!(store.epoch(), 0);
    }

    #[test]
    fn subscribers_see_every_mutation() {
        let seen = std::sync::Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        let mut store = test_store();
        let id = store.subscribe(Box::new(move |change: &BoardChange<'_>| {
            sink.lock()
                .unwrap()
                .push((change.cause, change.board.section_ids()));
        }));

        store.apply_section_move(20, 0).unwrap();
        store.rename_section(10, "Renamed").unwrap();
        assert!(store.unsubscribe(id));
        store.apply_section_move(20, 1).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], (ChangeCause::SectionMoved, vec![20, 10]));
        assert_eq!(seen[1].0, ChangeCause::Edited);
    }

    #[test]
    fn failed_apply_does_not_notify() {
        let count = std::sync::Arc::new(Mutex::new(0));
        let sink = count.clone();
        let mut store = test_store();
        store.subscribe(Box::new(move |_: &BoardChange<'_>| {
            *sink.lock().unwrap() += 1
        }));

        let _ = store.apply_section_move(99, 0);
        assert_eq!(*count.lock().unwrap(), 0);
    }

    #[test]
    fn insert_and_remove_section_keep_positions_dense() {
        let mut store = test_store();
        store.insert_section(Section::new(30, "Middle", 1)).unwrap();
        assert_eq!(store.board().section_ids(), vec![10, 30, 20]);

        let removed = store.remove_section(10).unwrap();
        assert_eq!(removed.cards.len(), 3);
        assert_eq!(store.board().section_ids(), vec![30, 20]);
        assert!(store.board().validate().is_ok());
    }

    #[test]
    fn insert_duplicate_section() {
        let mut store = test_store();
        let result = store.insert_section(Section::new(10, "again", 0));
        assert!(matches!(result, Err(Error::InvalidBoard(_))));
    }

    #[test]
    fn insert_update_remove_card() {
        let mut store = test_store();
        store.insert_card(20, Card::new(6, "6", 99)).unwrap();
        assert_eq!(cards(&store, 20), vec![4, 5, 6]);

        store
            .update_card(6, "six", Some("details".to_string()))
            .unwrap();
        let card = store.board().card(6).unwrap();
        assert_eq!(card.title, "six");
        assert_eq!(card.description.as_deref(), Some("details"));
        assert_eq!(card.position, 2);

        let removed = store.remove_card(4).unwrap();
        assert_eq!(removed.id, 4);
        assert_eq!(cards(&store, 20), vec![5, 6]);
        assert!(store.board().validate().is_ok());
    }

    #[test]
    fn insert_card_duplicate_id() {
        let mut store = test_store();
        let result = store.insert_card(20, Card::new(1, "dup", 0));
        assert!(matches!(result, Err(Error::InvalidBoard(_))));
    }

    #[test]
    fn snapshot_export_import() {
        let mut store = test_store();
        store.apply_card_move(1, 10, 20, 0).unwrap();
        let snapshot = store.export_snapshot();
        assert_eq!(snapshot.revision, 1);

        let mut other = BoardStore::default();
        let epoch = other.import_snapshot(snapshot).unwrap();
        assert_eq!(epoch, 1);
        assert_eq!(other.board(), store.board());
    }

    #[test]
    fn placement_lookup() {
        let store = test_store();
        assert_eq!(
            store.placement_of(EntityKey::Card(5)),
            Some(Placement::Card {
                section_id: 20,
                index: 1
            })
        );
        assert_eq!(
            store.placement_of(EntityKey::Section(20)),
            Some(Placement::Section { index: 1 })
        );
        assert_eq!(store.placement_of(EntityKey::Card(99)), None);
    }
}
