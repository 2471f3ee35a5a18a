//! Remote persistence of optimistic moves.
//!
//! Each move is sent on its own tokio task. When the call finishes, its
//! outcome comes back as a [`Completion`] on an unbounded channel.
//!
//! Moves of the same entity are chained: a task waits for the previous move
//! of its entity to finish before sending, so the service applies them in the
//! order they were made. Moves of different entities run concurrently and
//! may complete in any order.

use crate::api::{ApiResult, BoardApi};
use kanban_engine::{
    CardMove, EntityKey, MoveIntent, MoveTicket, Placement, SectionMove, SyncOutcome,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Outcome of one persisted move, tagged with the ticket that issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub ticket: MoveTicket,
    pub outcome: SyncOutcome,
}

/// Sends moves to the board service.
pub struct SyncClient {
    api: Arc<dyn BoardApi>,
    completions: mpsc::UnboundedSender<Completion>,
    /// Last persist task per entity
    in_flight: HashMap<EntityKey, JoinHandle<()>>,
}

impl SyncClient {
    /// Create a client and the receiving end of its completion channel.
    pub fn new(api: Arc<dyn BoardApi>) -> (Self, mpsc::UnboundedReceiver<Completion>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                api,
                completions: tx,
                in_flight: HashMap::new(),
            },
            rx,
        )
    }

    /// The underlying service.
    pub fn api(&self) -> &Arc<dyn BoardApi> {
        &self.api
    }

    /// Number of entities with a persist task still running.
    pub fn in_flight(&self) -> usize {
        self.in_flight
            .values()
            .filter(|task| !task.is_finished())
            .count()
    }

    /// Persist any move intent.
    pub fn persist(&mut self, ticket: MoveTicket, intent: &MoveIntent) {
        match intent {
            MoveIntent::Section(m) => self.persist_section_move(ticket, m),
            MoveIntent::Card(m) => self.persist_card_move(ticket, m),
        }
    }

    pub fn persist_section_move(&mut self, ticket: MoveTicket, m: &SectionMove) {
        let call = self.api.move_section(m.section_id, m.to_index);
        self.spawn(ticket, call)
    }

    pub fn persist_card_move(&mut self, ticket: MoveTicket, m: &CardMove) {
        let call = self
            .api
            .move_card(m.card_id, m.destination_section_id, m.to_index);
        self.spawn(ticket, call)
    }

    /// Run `call` after the previous move of the same entity has finished.
    ///
    /// `call` must not start its request before it is first polled.
    fn spawn(
        &mut self,
        ticket: MoveTicket,
        call: futures::future::BoxFuture<'static, ApiResult<Option<Placement>>>,
    ) {
        self.in_flight.retain(|_, task| !task.is_finished());
        let previous = self.in_flight.remove(&ticket.entity);

        let completions = self.completions.clone();
        let task = tokio::spawn(async move {
            if let Some(previous) = previous {
                if let Err(e) = previous.await {
                    tracing::warn!(entity = %ticket.entity, error = %e, "Previous persist task died");
                }
            }

            let outcome = match call.await {
                Ok(placement) => {
                    tracing::debug!(entity = %ticket.entity, seq = ticket.seq, "Move persisted");
                    SyncOutcome::Confirmed { placement }
                }
                Err(failure) => {
                    tracing::warn!(
                        entity = %ticket.entity,
                        seq = ticket.seq,
                        error = %failure,
                        "Move failed"
                    );
                    SyncOutcome::Failed { failure }
                }
            };

            if completions.send(Completion { ticket, outcome }).is_err() {
                tracing::debug!(entity = %ticket.entity, "Session gone, dropping completion");
            }
        });
        self.in_flight.insert(ticket.entity, task);
    }
}
