//! # Kanban Client
//!
//! Connects a [`kanban_engine`] board to the remote board service.
//!
//! [`BoardSession`] is the entry point: it loads the board, applies drag
//! gestures optimistically, persists them through a [`BoardApi`], and feeds
//! each answer back into the engine's reconciler.
//!
//! ```no_run
//! use kanban_client::{BoardSession, ClientConfig};
//! use kanban_engine::{DragEnd, DragLocation};
//!
//! # async fn run() -> kanban_client::Result<()> {
//! let config = ClientConfig::load()?;
//! let mut session = BoardSession::connect(&config, 1)?;
//! session.load().await?;
//!
//! let gesture = DragEnd::card(
//!     2,
//!     DragLocation::in_section(10, 1),
//!     Some(DragLocation::in_section(20, 0)),
//! );
//! session.handle_drag_end(&gesture);
//! for resolution in session.settle().await {
//!     println!("{:?}", resolution);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod session;
pub mod sync;

pub use api::{ApiResult, BoardApi, CardUpdate};
pub use config::{ClientConfig, ConfigError};
pub use error::{Result, SyncError};
pub use http::HttpBoardApi;
pub use session::BoardSession;
pub use sync::{Completion, SyncClient};
