//! Reconciliation of optimistic moves with remote outcomes.
//!
//! Each move goes through `Pending -> {Confirmed, Failed}`. The reconciler
//! applies the move to the store immediately, remembers the board as it was
//! just before, and later decides what a remote answer is allowed to do.
//!
//! # Rules
//!
//! 1. Every move is tagged with its entity's next sequence number.
//! 2. Only the answer for the entity's newest live move may touch the store.
//!    A move stops being live once it is confirmed or reverted. Older
//!    answers are discarded, or reported as a consistency warning when they
//!    carry a failure.
//! 3. A failure reverts the move. If nothing else changed the store since,
//!    the pre-move snapshot is swapped back in exactly; otherwise the entity
//!    alone is moved back to where it was, so later moves survive.
//! 4. A superseded move that failed leaves its pre-move placement behind.
//!    If the newer move fails too, the entity goes back to that placement,
//!    not just to where the newer move found it. A newer confirmation
//!    forgets it.
//! 5. A confirmation whose authoritative placement differs from the
//!    optimistic one moves the entity to the server's placement.
//! 6. Answers for moves issued before the last `replace_board` are ignored.

use crate::clock::{MoveClock, Seq};
use crate::intent::{EntityKey, MoveIntent, Placement};
use crate::model::Board;
use crate::store::{AppliedMove, BoardStore, ChangeCause};
use crate::{error::Result, Epoch, RemoteFailure, Revision};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Identifier of a pending move.
pub type TicketId = u64;

/// Handle for an in-flight move, returned by [`Reconciler::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveTicket {
    pub id: TicketId,
    pub entity: EntityKey,
    pub seq: Seq,
    pub epoch: Epoch,
}

/// What the remote service said about a move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SyncOutcome {
    /// Persisted; carries the server's placement when it returned one
    Confirmed { placement: Option<Placement> },
    Failed { failure: RemoteFailure },
}

impl SyncOutcome {
    /// Confirmation without an authoritative placement.
    pub fn confirmed() -> Self {
        SyncOutcome::Confirmed { placement: None }
    }

    /// Confirmation carrying the server's placement.
    pub fn confirmed_at(placement: Placement) -> Self {
        SyncOutcome::Confirmed {
            placement: Some(placement),
        }
    }

    /// Failure with a reason.
    pub fn failed(failure: RemoteFailure) -> Self {
        SyncOutcome::Failed { failure }
    }
}

/// Why an answer was dropped without touching the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiscardReason {
    /// A newer move for the same entity is in flight or done
    Stale,
    /// The board was replaced after the move was issued
    Cancelled,
    /// The ticket was never issued or already resolved
    Unknown,
}

/// A divergence the reconciler could not repair on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ConsistencyWarning {
    /// A superseded move failed remotely. The store is left alone until the
    /// newer move resolves; if that one fails too, both are undone.
    #[serde(rename_all = "camelCase")]
    SupersededFailure {
        entity: EntityKey,
        failure: RemoteFailure,
    },
    /// The store could not be moved to the required placement
    #[serde(rename_all = "camelCase")]
    Unplaceable {
        entity: EntityKey,
        wanted: Placement,
        reason: String,
    },
}

/// What resolving a ticket did to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "resolution", rename_all = "camelCase")]
pub enum Resolution {
    /// Server agreed with the optimistic state
    Confirmed,
    /// Server disagreed; the store now matches the server
    Corrected { from: Placement, to: Placement },
    /// Move undone after a failure. `exact` is true when the pre-move
    /// snapshot was restored as a whole.
    Reverted { failure: RemoteFailure, exact: bool },
    Discarded { reason: DiscardReason },
    Inconsistent { warning: ConsistencyWarning },
}

impl Resolution {
    /// The remote failure behind this resolution, if any.
    pub fn failure(&self) -> Option<&RemoteFailure> {
        match self {
            Resolution::Reverted { failure, .. } => Some(failure),
            Resolution::Inconsistent {
                warning: ConsistencyWarning::SupersededFailure { failure, .. },
            } => Some(failure),
            _ => None,
        }
    }

    /// Whether the failure must be surfaced for re-authentication.
    pub fn requires_reauth(&self) -> bool {
        self.failure().is_some_and(RemoteFailure::requires_reauth)
    }

    /// Whether the store was changed by this resolution.
    pub fn touched_store(&self) -> bool {
        matches!(
            self,
            Resolution::Corrected { .. } | Resolution::Reverted { .. }
        )
    }
}

/// Running totals, handy for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileStats {
    pub begun: u64,
    pub confirmed: u64,
    pub corrected: u64,
    pub reverted: u64,
    pub discarded: u64,
    pub warnings: u64,
}

impl ReconcileStats {
    fn record(&mut self, resolution: &Resolution) {
        match resolution {
            Resolution::Confirmed => self.confirmed += 1,
            Resolution::Corrected { .. } => self.corrected += 1,
            Resolution::Reverted { .. } => self.reverted += 1,
            Resolution::Discarded { .. } => self.discarded += 1,
            Resolution::Inconsistent { .. } => self.warnings += 1,
        }
    }
}

/// A move that has been applied locally and awaits its remote answer.
#[derive(Debug, Clone)]
struct PendingMove {
    ticket: MoveTicket,
    intent: MoveIntent,
    applied: AppliedMove,
    /// Board as it was right before the optimistic apply
    snapshot: Arc<Board>,
    /// Store revision right after the optimistic apply
    revision_after: Revision,
}

/// Pre-move placement of the earliest failed move still masked by a newer one.
#[derive(Debug, Clone, Copy)]
struct FailedOrigin {
    seq: Seq,
    epoch: Epoch,
    placement: Placement,
}

/// Sequences optimistic moves against their remote outcomes.
#[derive(Debug, Default)]
pub struct Reconciler {
    clock: MoveClock,
    pending: BTreeMap<TicketId, PendingMove>,
    /// Highest confirmed sequence number per entity
    confirmed: BTreeMap<EntityKey, Seq>,
    failed_origins: BTreeMap<EntityKey, FailedOrigin>,
    next_ticket: TicketId,
    stats: ReconcileStats,
}

impl Reconciler {
    /// Create a reconciler with nothing in flight.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `intent` optimistically and start tracking it.
    ///
    /// On error the store is untouched and nothing is tracked.
    pub fn begin(&mut self, store: &mut BoardStore, intent: MoveIntent) -> Result<MoveTicket> {
        self.prune(store.epoch());

        let snapshot = store.snapshot();
        let applied = store.apply(&intent)?;

        let entity = intent.entity();
        self.next_ticket += 1;
        let ticket = MoveTicket {
            id: self.next_ticket,
            entity,
            seq: self.clock.tick(entity),
            epoch: store.epoch(),
        };

        self.pending.insert(
            ticket.id,
            PendingMove {
                ticket,
                intent,
                applied,
                snapshot,
                revision_after: store.revision(),
            },
        );
        self.stats.begun += 1;

        Ok(ticket)
    }

    /// Apply a remote answer for `ticket`.
    pub fn resolve(
        &mut self,
        store: &mut BoardStore,
        ticket: MoveTicket,
        outcome: SyncOutcome,
    ) -> Resolution {
        let resolution = self.resolve_inner(store, ticket, outcome);
        self.stats.record(&resolution);
        resolution
    }

    fn resolve_inner(
        &mut self,
        store: &mut BoardStore,
        ticket: MoveTicket,
        outcome: SyncOutcome,
    ) -> Resolution {
        if ticket.epoch != store.epoch() {
            self.pending.remove(&ticket.id);
            return Resolution::Discarded {
                reason: DiscardReason::Cancelled,
            };
        }

        let Some(pending) = self.pending.remove(&ticket.id) else {
            return Resolution::Discarded {
                reason: DiscardReason::Unknown,
            };
        };

        let entity = ticket.entity;
        let current = self.is_current(entity, ticket.seq);

        match outcome {
            SyncOutcome::Confirmed { placement } => {
                self.record_confirmed(entity, ticket.seq);
                match placement {
                    _ if !current => Resolution::Discarded {
                        reason: DiscardReason::Stale,
                    },
                    None => Resolution::Confirmed,
                    Some(server) => Self::correct(store, &pending, server),
                }
            }
            SyncOutcome::Failed { failure } if !current => {
                self.record_failed_origin(&pending);
                Resolution::Inconsistent {
                    warning: ConsistencyWarning::SupersededFailure { entity, failure },
                }
            }
            SyncOutcome::Failed { failure } => {
                let origin = self
                    .failed_origins
                    .remove(&entity)
                    .filter(|origin| origin.epoch == ticket.epoch && origin.seq < ticket.seq)
                    .map(|origin| origin.placement);
                Self::revert(store, pending, failure, origin)
            }
        }
    }

    /// Whether no newer move of `entity` is pending or confirmed.
    fn is_current(&self, entity: EntityKey, seq: Seq) -> bool {
        let newer_pending = self
            .pending
            .values()
            .any(|p| p.ticket.entity == entity && p.ticket.seq > seq);
        let newer_confirmed = self.confirmed.get(&entity).is_some_and(|&c| c > seq);
        !newer_pending && !newer_confirmed
    }

    fn record_confirmed(&mut self, entity: EntityKey, seq: Seq) {
        let highest = self.confirmed.entry(entity).or_insert(seq);
        *highest = (*highest).max(seq);
        if self
            .failed_origins
            .get(&entity)
            .is_some_and(|origin| origin.seq < seq)
        {
            self.failed_origins.remove(&entity);
        }
    }

    /// Remember where a superseded failed move found its entity, unless an
    /// earlier failure is already remembered or a later move was confirmed.
    fn record_failed_origin(&mut self, pending: &PendingMove) {
        let ticket = pending.ticket;
        let masked = self.pending.values().any(|p| {
            p.ticket.entity == ticket.entity && p.ticket.seq > ticket.seq
        });
        let newer_confirmed = self
            .confirmed
            .get(&ticket.entity)
            .is_some_and(|&c| c > ticket.seq);
        if !masked || newer_confirmed {
            return;
        }

        let origin = FailedOrigin {
            seq: ticket.seq,
            epoch: ticket.epoch,
            placement: pending.applied.from,
        };
        self.failed_origins
            .entry(ticket.entity)
            .and_modify(|existing| {
                if existing.seq > origin.seq {
                    *existing = origin;
                }
            })
            .or_insert(origin);
    }

    fn correct(store: &mut BoardStore, pending: &PendingMove, server: Placement) -> Resolution {
        if pending.applied.to == server {
            return Resolution::Confirmed;
        }

        let entity = pending.ticket.entity;
        match store.place(entity, server, ChangeCause::Corrected) {
            Ok(applied) => Resolution::Corrected {
                from: applied.from,
                to: applied.to,
            },
            Err(e) => Resolution::Inconsistent {
                warning: ConsistencyWarning::Unplaceable {
                    entity,
                    wanted: server,
                    reason: e.to_string(),
                },
            },
        }
    }

    fn revert(
        store: &mut BoardStore,
        pending: PendingMove,
        failure: RemoteFailure,
        origin: Option<Placement>,
    ) -> Resolution {
        if origin.is_none() && store.revision() == pending.revision_after {
            store.restore(pending.snapshot);
            return Resolution::Reverted {
                failure,
                exact: true,
            };
        }

        let entity = pending.ticket.entity;
        let original = origin.unwrap_or(pending.applied.from);
        match store.place(entity, original, ChangeCause::Reverted) {
            Ok(_) => Resolution::Reverted {
                failure,
                exact: false,
            },
            Err(e) => Resolution::Inconsistent {
                warning: ConsistencyWarning::Unplaceable {
                    entity,
                    wanted: original,
                    reason: e.to_string(),
                },
            },
        }
    }

    /// Drop every pending move. Their answers will resolve as
    /// [`DiscardReason::Unknown`] or [`DiscardReason::Cancelled`].
    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.pending.len();
        self.pending.clear();
        self.failed_origins.clear();
        cancelled
    }

    /// Drop pending moves issued under another epoch.
    fn prune(&mut self, epoch: Epoch) {
        self.pending.retain(|_, p| p.ticket.epoch == epoch);
        self.failed_origins.retain(|_, origin| origin.epoch == epoch);
    }

    /// Whether `ticket` is still awaiting its answer.
    pub fn is_pending(&self, ticket: &MoveTicket) -> bool {
        self.pending.contains_key(&ticket.id)
    }

    /// Number of moves awaiting an answer.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// The intent behind a pending ticket.
    pub fn intent(&self, ticket: &MoveTicket) -> Option<&MoveIntent> {
        self.pending.get(&ticket.id).map(|p| &p.intent)
    }

    /// Per-entity sequence numbers.
    pub fn clock(&self) -> &MoveClock {
        &self.clock
    }

    /// Totals since creation.
    pub fn stats(&self) -> ReconcileStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Card, Section};
    use crate::CardId;

    fn board() -> Board {
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

    fn cards(store: &BoardStore, section_id: i64) -> Vec<CardId> {
        store.board().section(section_id).unwrap().card_ids()
    }

    fn network() -> RemoteFailure {
        RemoteFailure::Network {
            message: "connection reset".into(),
        }
    }

    #[test]
    fn failed_card_move_reverts_exactly() {
        let mut store = BoardStore::new(board());
        let mut reconciler = Reconciler::new();
        let before = store.snapshot();

        let ticket = reconciler
            .begin(&mut store, MoveIntent::card(2, 10, 20, 1, 0))
            .unwrap();
        assert_eq!(cards(&store, 10), vec![1, 3]);
        assert_eq!(cards(&store, 20), vec![2, 4, 5]);

        let resolution = reconciler.resolve(&mut store, ticket, SyncOutcome::failed(network()));
        assert_eq!(
            resolution,
            Resolution::Reverted {
                failure: network(),
                exact: true
            }
        );
        assert_eq!(store.board(), &*before);
        assert_eq!(reconciler.pending_count(), 0);
    }

    #[test]
    fn confirmed_with_same_placement_does_nothing() {
        let mut store = BoardStore::new(board());
        let mut reconciler = Reconciler::new();

        let ticket = reconciler
            .begin(&mut store, MoveIntent::section(20, 1, 0))
            .unwrap();
        let revision = store.revision();

        let resolution = reconciler.resolve(
            &mut store,
            ticket,
            SyncOutcome::confirmed_at(Placement::Section { index: 0 }),
        );
        assert_eq!(resolution, Resolution::Confirmed);
        assert_eq!(store.revision(), revision);
        assert_eq!(store.board().section_ids(), vec![20, 10]);
    }

    #[test]
    fn confirmed_with_other_placement_corrects() {
        let mut store = BoardStore::new(board());
        let mut reconciler = Reconciler::new();

        let ticket = reconciler
            .begin(&mut store, MoveIntent::card(1, 10, 10, 0, 2))
            .unwrap();
        assert_eq!(cards(&store, 10), vec![2, 3, 1]);

        let resolution = reconciler.resolve(
            &mut store,
            ticket,
            SyncOutcome::confirmed_at(Placement::Card {
                section_id: 20,
                index: 1,
            }),
        );
        assert!(matches!(resolution, Resolution::Corrected { .. }));
        assert_eq!(cards(&store, 10), vec![2, 3]);
        assert_eq!(cards(&store, 20), vec![4, 1, 5]);
    }

    #[test]
    fn stale_confirmation_is_discarded() {
        let mut store = BoardStore::new(board());
        let mut reconciler = Reconciler::new();

        let first = reconciler
            .begin(&mut store, MoveIntent::card(1, 10, 20, 0, 0))
            .unwrap();
        let second = reconciler
            .begin(&mut store, MoveIntent::card(1, 20, 20, 0, 2))
            .unwrap();
        assert!(second.seq > first.seq);
        assert_eq!(cards(&store, 20), vec![4, 5, 1]);

        // The first answer arrives last and claims a different placement.
        let resolution = reconciler.resolve(&mut store, second, SyncOutcome::confirmed());
        assert_eq!(resolution, Resolution::Confirmed);
        let resolution = reconciler.resolve(
            &mut store,
            first,
            SyncOutcome::confirmed_at(Placement::Card {
                section_id: 20,
                index: 0,
            }),
        );
        assert_eq!(
            resolution,
            Resolution::Discarded {
                reason: DiscardReason::Stale
            }
        );
        assert_eq!(cards(&store, 20), vec![4, 5, 1]);
    }

    #[test]
    fn superseded_failure_skips_revert() {
        let mut store = BoardStore::new(board());
        let mut reconciler = Reconciler::new();

        let first = reconciler
            .begin(&mut store, MoveIntent::section(10, 0, 1))
            .unwrap();
        let _second = reconciler
            .begin(&mut store, MoveIntent::section(10, 1, 0))
            .unwrap();
        let revision = store.revision();

        let resolution = reconciler.resolve(&mut store, first, SyncOutcome::failed(network()));
        assert_eq!(
            resolution,
            Resolution::Inconsistent {
                warning: ConsistencyWarning::SupersededFailure {
                    entity: EntityKey::Section(10),
                    failure: network(),
                }
            }
        );
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn two_failed_moves_of_one_card_both_revert() {
        let mut store = BoardStore::new(board());
        let mut reconciler = Reconciler::new();

        let first = reconciler
            .begin(&mut store, MoveIntent::card(2, 10, 20, 1, 0))
            .unwrap();
        let second = reconciler
            .begin(&mut store, MoveIntent::card(2, 20, 20, 0, 2))
            .unwrap();
        assert_eq!(cards(&store, 20), vec![4, 5, 2]);

        let resolution = reconciler.resolve(&mut store, first, SyncOutcome::failed(network()));
        assert!(matches!(resolution, Resolution::Inconsistent { .. }));
        assert_eq!(cards(&store, 20), vec![4, 5, 2]);

        let resolution = reconciler.resolve(&mut store, second, SyncOutcome::failed(network()));
        assert_eq!(
            resolution,
            Resolution::Reverted {
                failure: network(),
                exact: false
            }
        );
        assert_eq!(cards(&store, 10), vec![1, 2, 3]);
        assert_eq!(cards(&store, 20), vec![4, 5]);
        assert!(store.board().validate().is_ok());
    }

    #[test]
    fn two_failed_moves_revert_in_either_order() {
        let mut store = BoardStore::new(board());
        let mut reconciler = Reconciler::new();
        let before = store.snapshot();

        let first = reconciler
            .begin(&mut store, MoveIntent::section(10, 0, 1))
            .unwrap();
        let second = reconciler
            .begin(&mut store, MoveIntent::section(10, 1, 0))
            .unwrap();

        // Newest fails first: back to where the first move left things.
        let resolution = reconciler.resolve(&mut store, second, SyncOutcome::failed(network()));
        assert!(matches!(resolution, Resolution::Reverted { exact: true, .. }));
        assert_eq!(store.board().section_ids(), vec![20, 10]);

        // The first move is now the newest live one and is undone as well.
        let resolution = reconciler.resolve(&mut store, first, SyncOutcome::failed(network()));
        assert!(matches!(resolution, Resolution::Reverted { .. }));
        assert_eq!(store.board().section_ids(), before.section_ids());
        assert_eq!(reconciler.pending_count(), 0);
    }

    #[test]
    fn later_confirmation_forgets_earlier_failure() {
        let mut store = BoardStore::new(board());
        let mut reconciler = Reconciler::new();

        let first = reconciler
            .begin(&mut store, MoveIntent::card(1, 10, 20, 0, 0))
            .unwrap();
        let second = reconciler
            .begin(&mut store, MoveIntent::card(1, 20, 20, 0, 1))
            .unwrap();
        reconciler.resolve(&mut store, first, SyncOutcome::failed(network()));
        assert_eq!(
            reconciler.resolve(&mut store, second, SyncOutcome::confirmed()),
            Resolution::Confirmed
        );
        assert_eq!(cards(&store, 20), vec![4, 1, 5]);

        // A third move failing only undoes itself.
        let third = reconciler
            .begin(&mut store, MoveIntent::card(1, 20, 10, 1, 0))
            .unwrap();
        let resolution = reconciler.resolve(&mut store, third, SyncOutcome::failed(network()));
        assert!(matches!(resolution, Resolution::Reverted { exact: true, .. }));
        assert_eq!(cards(&store, 10), vec![2, 3]);
        assert_eq!(cards(&store, 20), vec![4, 1, 5]);
    }

    #[test]
    fn failure_after_unrelated_move_compensates() {
        let mut store = BoardStore::new(board());
        let mut reconciler = Reconciler::new();

        let failing = reconciler
            .begin(&mut store, MoveIntent::card(2, 10, 20, 1, 0))
            .unwrap();
        let other = reconciler
            .begin(&mut store, MoveIntent::card(5, 20, 10, 2, 0))
            .unwrap();
        assert_eq!(cards(&store, 10), vec![5, 1, 3]);
        assert_eq!(cards(&store, 20), vec![2, 4]);

        let resolution = reconciler.resolve(&mut store, failing, SyncOutcome::failed(network()));
        assert_eq!(
            resolution,
            Resolution::Reverted {
                failure: network(),
                exact: false
            }
        );
        // Card 2 is back at index 1 of A; card 5's move survives.
        assert_eq!(cards(&store, 10), vec![5, 2, 1, 3]);
        assert_eq!(cards(&store, 20), vec![4]);
        assert!(store.board().validate().is_ok());

        assert_eq!(
            reconciler.resolve(&mut store, other, SyncOutcome::confirmed()),
            Resolution::Confirmed
        );
    }

    #[test]
    fn replaced_board_cancels_pending() {
        let mut store = BoardStore::new(board());
        let mut reconciler = Reconciler::new();

        let ticket = reconciler
            .begin(&mut store, MoveIntent::section(20, 1, 0))
            .unwrap();
        store.replace_board(board()).unwrap();
        assert_eq!(reconciler.cancel_all(), 1);

        let resolution = reconciler.resolve(&mut store, ticket, SyncOutcome::failed(network()));
        assert_eq!(
            resolution,
            Resolution::Discarded {
                reason: DiscardReason::Cancelled
            }
        );
        assert_eq!(store.board().section_ids(), vec![10, 20]);
    }

    #[test]
    fn unknown_ticket_is_discarded() {
        let mut store = BoardStore::new(board());
        let mut reconciler = Reconciler::new();

        let ticket = reconciler
            .begin(&mut store, MoveIntent::section(20, 1, 0))
            .unwrap();
        reconciler.resolve(&mut store, ticket, SyncOutcome::confirmed());

        let again = reconciler.resolve(&mut store, ticket, SyncOutcome::failed(network()));
        assert_eq!(
            again,
            Resolution::Discarded {
                reason: DiscardReason::Unknown
            }
        );
        assert_eq!(store.board().section_ids(), vec![20, 10]);
    }

    #[test]
    fn begin_error_tracks_nothing() {
        let mut store = BoardStore::new(board());
        let mut reconciler = Reconciler::new();

        let result = reconciler.begin(&mut store, MoveIntent::card(1, 10, 99, 0, 0));
        assert_eq!(result, Err(crate::Error::SectionNotFound(99)));
        assert_eq!(reconciler.pending_count(), 0);
        assert_eq!(reconciler.clock().current(EntityKey::Card(1)), 0);
    }

    #[test]
    fn unauthorized_requires_reauth() {
        let mut store = BoardStore::new(board());
        let mut reconciler = Reconciler::new();

        let ticket = reconciler
            .begin(&mut store, MoveIntent::section(20, 1, 0))
            .unwrap();
        let resolution = reconciler.resolve(
            &mut store,
            ticket,
            SyncOutcome::failed(RemoteFailure::Unauthorized),
        );
        assert!(resolution.requires_reauth());
        assert!(resolution.touched_store());
        assert_eq!(store.board().section_ids(), vec![10, 20]);
    }

    #[test]
    fn move_after_revert_starts_fresh() {
        let mut store = BoardStore::new(board());
        let mut reconciler = Reconciler::new();

        let ticket = reconciler
            .begin(&mut store, MoveIntent::card(3, 10, 20, 2, 0))
            .unwrap();
        reconciler.resolve(&mut store, ticket, SyncOutcome::failed(network()));
        assert_eq!(cards(&store, 10), vec![1, 2, 3]);

        let ticket = reconciler
            .begin(&mut store, MoveIntent::card(3, 10, 10, 2, 0))
            .unwrap();
        assert_eq!(ticket.seq, 2);
        assert_eq!(
            reconciler.resolve(&mut store, ticket, SyncOutcome::confirmed()),
            Resolution::Confirmed
        );
        assert_eq!(cards(&store, 10), vec![3, 1, 2]);
    }

    #[test]
    fn stats_follow_resolutions() {
        let mut store = BoardStore::new(board());
        let mut reconciler = Reconciler::new();

        let a = reconciler
            .begin(&mut store, MoveIntent::section(20, 1, 0))
            .unwrap();
        let b = reconciler
            .begin(&mut store, MoveIntent::card(1, 10, 10, 0, 1))
            .unwrap();
        reconciler.resolve(&mut store, a, SyncOutcome::confirmed());
        reconciler.resolve(&mut store, b, SyncOutcome::failed(RemoteFailure::NotFound));

        let stats = reconciler.stats();
        assert_eq!(stats.begun, 2);
        assert_eq!(stats.confirmed, 1);
        assert_eq!(stats.reverted, 1);
    }
}
