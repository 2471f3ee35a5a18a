//! A live board session.
//!
//! The session owns the store, the reconciler and the sync client, and is the
//! single place where gestures enter and remote outcomes are applied. It is
//! driven from one task; the only concurrency is the in-flight requests.

use crate::api::{BoardApi, CardUpdate};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::http::HttpBoardApi;
use crate::sync::{Completion, SyncClient};
use kanban_engine::{
    interpret, Board, BoardId, BoardSnapshot, BoardStore, CardId, DragEnd, Epoch, Interpretation,
    Listener, MoveTicket, Reconciler, Resolution, SectionId, SubscriptionId,
};
use std::sync::Arc;
use tokio::sync::mpsc;

pub struct BoardSession {
    board_id: BoardId,
    store: BoardStore,
    reconciler: Reconciler,
    sync: SyncClient,
    completions: mpsc::UnboundedReceiver<Completion>,
}

impl BoardSession {
    /// Create a session with an empty board. Call [`load`](Self::load) next.
    pub fn new(api: Arc<dyn BoardApi>, board_id: BoardId) -> Self {
        let (sync, completions) = SyncClient::new(api);
        Self {
            board_id,
            store: BoardStore::new(Board::new(board_id, "")),
            reconciler: Reconciler::new(),
            sync,
            completions,
        }
    }

    /// Create a session talking to the HTTP service in `config`.
    pub fn connect(config: &ClientConfig, board_id: BoardId) -> Result<Self> {
        let api = HttpBoardApi::new(config)?;
        Ok(Self::new(Arc::new(api), board_id))
    }

    pub fn board_id(&self) -> BoardId {
        self.board_id
    }

    pub fn board(&self) -> &Board {
        self.store.board()
    }

    pub fn store(&self) -> &BoardStore {
        &self.store
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Register a listener on the underlying store.
    pub fn subscribe(&mut self, listener: Listener) -> SubscriptionId {
        self.store.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    /// Fetch the board and replace local state with it.
    ///
    /// Moves still in flight are cancelled; their answers will be discarded.
    pub async fn load(&mut self) -> Result<Epoch> {
        let board = self.sync.api().fetch_board(self.board_id).await?;
        let epoch = self.store.replace_board(board)?;
        let cancelled = self.reconciler.cancel_all();

        tracing::info!(
            board_id = self.board_id,
            epoch,
            cancelled,
            sections = self.store.board().sections.len(),
            cards = self.store.board().card_count(),
            "Board loaded"
        );
        Ok(epoch)
    }

    /// Show a cached board until the first fetch completes.
    pub fn load_cached(&mut self, snapshot: BoardSnapshot) -> Result<Epoch> {
        let epoch = self.store.import_snapshot(snapshot)?;
        self.reconciler.cancel_all();
        Ok(epoch)
    }

    /// Capture the current board for caching.
    pub fn snapshot(&self) -> BoardSnapshot {
        self.store.export_snapshot()
    }

    /// Apply a finished drag gesture and start persisting it.
    ///
    /// Returns the ticket of the move, or `None` when the gesture changed
    /// nothing. Malformed or stale gestures are logged and dropped.
    pub fn handle_drag_end(&mut self, event: &DragEnd) -> Option<MoveTicket> {
        let intent = match interpret(self.store.board(), event) {
            Ok(Interpretation::Move { intent }) => intent,
            Ok(Interpretation::NoOp { reason }) => {
                tracing::debug!(?reason, moved_id = event.moved_id, "Drag changed nothing");
                return None;
            }
            Err(e) => {
                tracing::warn!(error = %e, moved_id = event.moved_id, "Dropping drag");
                return None;
            }
        };

        let ticket = match self.reconciler.begin(&mut self.store, intent.clone()) {
            Ok(ticket) => ticket,
            Err(e) => {
                tracing::warn!(error = %e, "Move rejected by store");
                return None;
            }
        };

        tracing::debug!(entity = %ticket.entity, seq = ticket.seq, "Move applied optimistically");
        self.sync.persist(ticket, &intent);
        Some(ticket)
    }

    /// Apply every completion that has already arrived, without waiting.
    pub fn process_completed(&mut self) -> Vec<Resolution> {
        let mut resolutions = Vec::new();
        while let Ok(completion) = self.completions.try_recv() {
            resolutions.push(self.apply_completion(completion));
        }
        resolutions
    }

    /// Wait for the next completion and apply it.
    ///
    /// Returns `None` once no move is pending.
    pub async fn next_resolution(&mut self) -> Option<Resolution> {
        if self.reconciler.pending_count() == 0 {
            return None;
        }
        let completion = self.completions.recv().await?;
        Some(self.apply_completion(completion))
    }

    /// Wait until every pending move has been resolved.
    pub async fn settle(&mut self) -> Vec<Resolution> {
        let mut resolutions = Vec::new();
        while let Some(resolution) = self.next_resolution().await {
            resolutions.push(resolution);
        }
        resolutions
    }

    fn apply_completion(&mut self, completion: Completion) -> Resolution {
        let Completion { ticket, outcome } = completion;
        let resolution = self.reconciler.resolve(&mut self.store, ticket, outcome);

        match &resolution {
            Resolution::Confirmed => {
                tracing::debug!(entity = %ticket.entity, seq = ticket.seq, "Move confirmed")
            }
            Resolution::Corrected { from, to } => {
                tracing::info!(entity = %ticket.entity, ?from, ?to, "Move corrected by server")
            }
            Resolution::Reverted { failure, exact } => {
                tracing::warn!(entity = %ticket.entity, error = %failure, exact, "Move reverted")
            }
            Resolution::Discarded { reason } => {
                tracing::debug!(entity = %ticket.entity, ?reason, "Completion discarded")
            }
            Resolution::Inconsistent { warning } => {
                tracing::warn!(entity = %ticket.entity, ?warning, "Board may diverge from server")
            }
        }
        if resolution.requires_reauth() {
            tracing::warn!("Board service rejected the credential");
        }

        resolution
    }

    /// Create a section at the end of the board.
    pub async fn create_section(&mut self, title: impl Into<String>) -> Result<SectionId> {
        let section = self
            .sync
            .api()
            .create_section(self.board_id, title.into())
            .await?;
        let id = section.id;
        self.store.insert_section(section)?;
        Ok(id)
    }

    pub async fn rename_section(
        &mut self,
        section_id: SectionId,
        title: impl Into<String>,
    ) -> Result<()> {
        let section = self
            .sync
            .api()
            .rename_section(section_id, title.into())
            .await?;
        self.store.rename_section(section_id, section.title)?;
        Ok(())
    }

    /// Delete a section and its cards.
    pub async fn delete_section(&mut self, section_id: SectionId) -> Result<()> {
        self.sync.api().delete_section(section_id).await?;
        self.store.remove_section(section_id)?;
        Ok(())
    }

    /// Create a card at the end of a section.
    pub async fn create_card(
        &mut self,
        section_id: SectionId,
        title: impl Into<String>,
    ) -> Result<CardId> {
        let card = self
            .sync
            .api()
            .create_card(section_id, title.into())
            .await?;
        let id = card.id;
        self.store.insert_card(section_id, card)?;
        Ok(id)
    }

    pub async fn update_card(
        &mut self,
        card_id: CardId,
        title: impl Into<String>,
        description: Option<String>,
    ) -> Result<()> {
        let update = CardUpdate {
            title: title.into(),
            description,
        };
        let card = self.sync.api().update_card(card_id, update).await?;
        self.store.update_card(card_id, card.title, card.description)?;
        Ok(())
    }

    pub async fn delete_card(&mut self, card_id: CardId) -> Result<()> {
        self.sync.api().delete_card(card_id).await?;
        self.store.remove_card(card_id)?;
        Ok(())
    }
}
