//! # Kanban Engine
//!
//! Ordering core for a kanban board with optimistic drag-and-drop.
//!
//! The crate turns drag gestures into reorder intents, applies them to an
//! in-memory board right away, and later reconciles each move with what the
//! remote service answered. It has no IO: the caller performs the network
//! calls and feeds their outcomes back in.
//!
//! ## Design Principles
//!
//! - **No IO**: the engine never touches the network or the clock
//! - **Dense order**: positions within a scope are always `0..n-1`
//! - **Latest wins**: only the newest move of an entity may correct or revert it
//!
//! ## Core Concepts
//!
//! ### Board
//!
//! A [`Board`] holds ordered [`Section`]s, each holding ordered [`Card`]s.
//! The [`BoardStore`] owns the current board and replaces it wholesale on
//! every mutation, so a snapshot taken earlier is a valid rollback target.
//!
//! ### Gestures and intents
//!
//! [`interpret`] turns a [`DragEnd`] into a [`MoveIntent`] or a no-op. The
//! store applies intents; the [`Reconciler`] decides what remote answers may
//! do to the store afterwards.
//!
//! ## Quick Start
//!
//! ```rust
//! use kanban_engine::{
//!     interpret, Board, BoardStore, Card, DragEnd, DragLocation, Reconciler, Resolution,
//!     Section, SyncOutcome,
//! };
//!
//! let board = Board::new(1, "Sprint")
//!     .with_section(Section::new(10, "Todo", 0).with_cards(vec![Card::new(1, "Write", 0)]))
//!     .with_section(Section::new(20, "Done", 1));
//!
//! let mut store = BoardStore::new(board);
//! let mut reconciler = Reconciler::new();
//!
//! let gesture = DragEnd::card(
//!     1,
//!     DragLocation::in_section(10, 0),
//!     Some(DragLocation::in_section(20, 0)),
//! );
//! let interpretation = interpret(store.board(), &gesture).unwrap();
//! let intent = interpretation.intent().unwrap().clone();
//!
//! let ticket = reconciler.begin(&mut store, intent).unwrap();
//! assert_eq!(store.board().section(20).unwrap().card_ids(), vec![1]);
//!
//! let resolution = reconciler.resolve(&mut store, ticket, SyncOutcome::confirmed());
//! assert_eq!(resolution, Resolution::Confirmed);
//! ```
//!
//! ## Persistence
//!
//! Use [`BoardStore::export_snapshot`] and [`BoardStore::import_snapshot`]
//! with [`BoardSnapshot`] to cache a board between sessions.

pub mod clock;
pub mod drag;
pub mod error;
pub mod intent;
pub mod model;
pub mod reconcile;
pub mod reorder;
pub mod snapshot;
pub mod store;

// Re-export main types at crate root
pub use clock::{MoveClock, Seq};
pub use drag::{interpret, DragEnd, DragKind, DragLocation, Interpretation, NoOpReason};
pub use error::{Error, RemoteFailure};
pub use intent::{CardMove, EntityKey, MoveIntent, Placement, SectionMove};
pub use model::{Board, Card, Section};
pub use reconcile::{
    ConsistencyWarning, DiscardReason, MoveTicket, ReconcileStats, Reconciler, Resolution,
    SyncOutcome, TicketId,
};
pub use reorder::Positioned;
pub use snapshot::{BoardSnapshot, SnapshotMetadata, SNAPSHOT_FORMAT_VERSION};
pub use store::{AppliedMove, BoardChange, BoardStore, ChangeCause, Listener, SubscriptionId};

/// Type aliases for clarity
pub type BoardId = i64;
pub type SectionId = i64;
pub type CardId = i64;
pub type Position = usize;
pub type Epoch = u64;
pub type Revision = u64;
